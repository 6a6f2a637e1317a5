mod common;

use common::{FailingLogStore, Fixture};
use devctl_control::{
    BatchOrchestrator, BatchSummary, NO_ELIGIBLE_DEVICES, NO_MATCHING_COMMAND, PreconditionError,
};
use devctl_storage::{DeviceRecord, ExecutionLogQuery, ExecutionLogStore};
use domain::{CommandType, DeviceStatus, ExecutionContext, ResultStatus, TriggerType};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[tokio::test]
async fn mixed_outcomes_are_aggregated() {
    let fixture = Fixture::new();
    fixture.preset("preset-no-power", "TCP", None);
    fixture.command("hdmi", "preset-no-power", "INPUT_CHANGE", 1);
    fixture.device("d1", "preset-tcp", "ok-d1", 1);
    fixture.device("d2", "preset-tcp", "slow-d2", 2);
    fixture.device("d3", "preset-no-power", "ok-d3", 3);
    let orchestrator = fixture.orchestrator(Duration::from_millis(150), 8);

    let result = orchestrator
        .execute_batch("room-101", CommandType::PowerOn, &ExecutionContext::manual("admin"))
        .await
        .expect("batch");

    assert_eq!(result.attempts.len(), 2);
    assert_eq!(
        result.summary,
        BatchSummary {
            success: 1,
            fail: 0,
            timeout: 1,
            skipped: 1,
        }
    );
    assert_eq!(result.attempts[0].device_id, "d1");
    assert_eq!(result.attempts[0].status, ResultStatus::Success);
    assert_eq!(result.attempts[1].device_id, "d2");
    assert_eq!(result.attempts[1].status, ResultStatus::Timeout);
    assert_eq!(result.skipped.len(), 1);
    assert_eq!(result.skipped[0].device_id, "d3");
    assert_eq!(result.skipped[0].reason, NO_MATCHING_COMMAND);
    assert!(result.errors.is_empty());

    let d3_rows = fixture
        .logs
        .list(&ExecutionLogQuery {
            device_id: Some("d3".to_string()),
            ..ExecutionLogQuery::default()
        })
        .await
        .expect("list");
    assert_eq!(d3_rows.total, 0);
    assert_eq!(fixture.log_count(), 2);
}

#[tokio::test]
async fn space_without_active_devices_is_empty_result() {
    let fixture = Fixture::new();
    fixture.device_record(DeviceRecord {
        device_id: "sleeping".to_string(),
        space_id: "room-101".to_string(),
        preset_id: "preset-tcp".to_string(),
        name: "Sleeping".to_string(),
        address: Some("ok-sleeping".to_string()),
        port: None,
        mac_address: None,
        status: DeviceStatus::Inactive,
        display_order: 0,
    });
    let orchestrator = fixture.orchestrator(Duration::from_millis(150), 8);

    let result = orchestrator
        .execute_batch("room-101", CommandType::PowerOff, &ExecutionContext::default())
        .await
        .expect("batch");

    assert!(result.attempts.is_empty());
    assert!(result.skipped.is_empty());
    assert_eq!(result.summary, BatchSummary::default());
    assert_eq!(result.message, NO_ELIGIBLE_DEVICES);
    assert_eq!(fixture.tcp.calls(), 0);
}

#[tokio::test]
async fn batch_preconditions() {
    let fixture = Fixture::new();
    let orchestrator = fixture.orchestrator(Duration::from_millis(150), 8);

    let err = orchestrator
        .execute_batch("room-999", CommandType::PowerOn, &ExecutionContext::default())
        .await
        .expect_err("space");
    assert!(matches!(
        err.as_precondition(),
        Some(PreconditionError::SpaceNotFound(_))
    ));

    let err = orchestrator
        .execute_batch("room-101", CommandType::InputChange, &ExecutionContext::default())
        .await
        .expect_err("type");
    assert_eq!(
        err.as_precondition().map(|e| e.code()),
        Some("BATCH.UNSUPPORTED_COMMAND")
    );
    assert_eq!(fixture.log_count(), 0);
}

#[tokio::test]
async fn lowest_display_order_command_is_used() {
    let fixture = Fixture::new();
    fixture.command("power-on-early", "preset-tcp", "POWER_ON", 0);
    fixture.device("d1", "preset-tcp", "ok-d1", 0);
    let orchestrator = fixture.orchestrator(Duration::from_millis(150), 8);

    let result = orchestrator
        .execute_batch("room-101", CommandType::PowerOn, &ExecutionContext::default())
        .await
        .expect("batch");
    assert_eq!(result.attempts.len(), 1);
    assert_eq!(result.attempts[0].command_id, "power-on-early");
}

#[tokio::test]
async fn fifty_devices_complete_in_about_one_device_latency() {
    let fixture = Fixture::new();
    for index in 0..50 {
        fixture.device(&format!("d{index:02}"), "preset-tcp", &format!("delay-{index}"), index);
    }
    let orchestrator = fixture.orchestrator(Duration::from_secs(1), 64);

    let started = Instant::now();
    let result = orchestrator
        .execute_batch("room-101", CommandType::PowerOn, &ExecutionContext::default())
        .await
        .expect("batch");
    let elapsed = started.elapsed();

    assert_eq!(result.summary.success, 50);
    assert_eq!(fixture.tcp.calls(), 50);
    assert!(elapsed < Duration::from_secs(2), "batch took {elapsed:?}");
    let ids: Vec<&str> = result.attempts.iter().map(|a| a.device_id.as_str()).collect();
    let mut sorted = ids.clone();
    sorted.sort_unstable();
    assert_eq!(ids, sorted);
}

#[tokio::test]
async fn concurrency_bound_is_respected() {
    let fixture = Fixture::new();
    for index in 0..4 {
        fixture.device(&format!("d{index}"), "preset-tcp", &format!("delay-{index}"), index);
    }
    let orchestrator = fixture.orchestrator(Duration::from_secs(1), 1);

    let started = Instant::now();
    let result = orchestrator
        .execute_batch("room-101", CommandType::PowerOn, &ExecutionContext::default())
        .await
        .expect("batch");

    assert_eq!(result.summary.success, 4);
    assert!(started.elapsed() >= Duration::from_millis(750));
}

#[tokio::test]
async fn mappings_skip_invalid_pairs() {
    let fixture = Fixture::new();
    fixture.preset("preset-other", "TCP", None);
    fixture.command("other-on", "preset-other", "POWER_ON", 1);
    fixture.device("d1", "preset-tcp", "ok-d1", 0);
    fixture.device("d2", "preset-tcp", "refuse-d2", 1);
    let orchestrator = fixture.orchestrator(Duration::from_millis(150), 8);

    let result = orchestrator
        .execute_mappings(
            vec![
                ("d1".to_string(), "power-on".to_string()),
                ("d2".to_string(), "power-on".to_string()),
                ("ghost".to_string(), "power-on".to_string()),
                ("d1".to_string(), "other-on".to_string()),
            ],
            &ExecutionContext::nfc("tag-1"),
        )
        .await
        .expect("mappings");

    assert_eq!(result.attempts.len(), 2);
    assert_eq!(result.summary.success, 1);
    assert_eq!(result.summary.fail, 1);
    assert_eq!(result.summary.skipped, 2);
    assert_eq!(result.skipped[0].device_id, "ghost");
    assert!(result.skipped[0].reason.contains("device not found"));
    assert!(result.skipped[1].reason.contains("does not belong to preset"));
    assert!(result.attempts.iter().all(|a| a.trigger == TriggerType::Nfc));
    assert_eq!(fixture.log_count(), 2);
}

#[tokio::test]
async fn log_failures_are_collected_not_raised() {
    let fixture = Fixture::new();
    fixture.device("d1", "preset-tcp", "ok-d1", 0);
    fixture.device("d2", "preset-tcp", "ok-d2", 1);
    let dispatcher =
        fixture.dispatcher_with_log(Duration::from_millis(150), Arc::new(FailingLogStore));
    let orchestrator = BatchOrchestrator::new(dispatcher, 4);

    let result = orchestrator
        .execute_batch("room-101", CommandType::PowerOn, &ExecutionContext::default())
        .await
        .expect("batch");

    assert!(result.attempts.is_empty());
    assert_eq!(result.errors.len(), 2);
    assert!(result.errors.iter().all(|e| e.message.contains("database unavailable")));
    assert!(result.message.contains("2 not logged"));
}

#[tokio::test]
async fn abandoned_batch_still_logs_every_sent_command() {
    let fixture = Fixture::new();
    fixture.device("d1", "preset-tcp", "delay-d1", 1);
    fixture.device("d2", "preset-tcp", "delay-d2", 2);
    fixture.device("d3", "preset-tcp", "delay-d3", 3);
    let orchestrator = fixture.orchestrator(Duration::from_millis(1000), 8);

    let abandoned = tokio::time::timeout(
        Duration::from_millis(50),
        orchestrator.execute_batch("room-101", CommandType::PowerOn, &ExecutionContext::default()),
    )
    .await;
    assert!(abandoned.is_err());

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(fixture.tcp.calls(), 3);
    assert_eq!(fixture.log_count(), fixture.tcp.calls());
}
