mod common;

use common::{FailingLogStore, Fixture};
use devctl_control::{ControlError, PreconditionError};
use devctl_storage::{DeviceRecord, ExecutionLogQuery, ExecutionLogStore, PresetRecord};
use domain::{DeviceStatus, ExecutionContext, ResultStatus, TriggerType};
use std::sync::Arc;
use std::time::{Duration, Instant};

const TIMEOUT: Duration = Duration::from_millis(300);

#[tokio::test]
async fn successful_dispatch_writes_one_attempt() {
    let fixture = Fixture::new();
    fixture.device("projector", "preset-tcp", "ok-projector", 0);
    let dispatcher = fixture.dispatcher(TIMEOUT);

    let attempt = dispatcher
        .execute("projector", "power-on", &ExecutionContext::manual("user-7"), None)
        .await
        .expect("execute");

    assert_eq!(attempt.status, ResultStatus::Success);
    assert_eq!(attempt.message, "reply: OK");
    assert_eq!(attempt.device_id, "projector");
    assert_eq!(attempt.space_id, "room-101");
    assert_eq!(attempt.command_id, "power-on");
    assert_eq!(attempt.actor_id, "user-7");
    assert_eq!(attempt.trigger, TriggerType::Manual);
    assert_eq!(fixture.log_count(), 1);
    assert_eq!(fixture.tcp.calls(), 1);
}

#[tokio::test]
async fn unknown_device_is_rejected_without_log() {
    let fixture = Fixture::new();
    let dispatcher = fixture.dispatcher(TIMEOUT);

    let err = dispatcher
        .execute("missing", "power-on", &ExecutionContext::default(), None)
        .await
        .expect_err("precondition");

    assert!(matches!(
        err,
        ControlError::Precondition(PreconditionError::DeviceNotFound(ref id)) if id == "missing"
    ));
    assert_eq!(err.as_precondition().map(|e| e.code()), Some("DEVICE.NOT_FOUND"));
    assert_eq!(fixture.log_count(), 0);
    assert_eq!(fixture.tcp.calls(), 0);
}

#[tokio::test]
async fn inactive_device_is_rejected_without_log() {
    let fixture = Fixture::new();
    fixture.device_record(DeviceRecord {
        device_id: "screen".to_string(),
        space_id: "room-101".to_string(),
        preset_id: "preset-tcp".to_string(),
        name: "Screen".to_string(),
        address: Some("ok-screen".to_string()),
        port: None,
        mac_address: None,
        status: DeviceStatus::Inactive,
        display_order: 0,
    });
    let dispatcher = fixture.dispatcher(TIMEOUT);

    let err = dispatcher
        .execute("screen", "power-on", &ExecutionContext::default(), None)
        .await
        .expect_err("precondition");

    assert!(matches!(
        err.as_precondition(),
        Some(PreconditionError::DeviceInactive(_))
    ));
    assert_eq!(fixture.log_count(), 0);
}

#[tokio::test]
async fn command_from_other_preset_is_rejected() {
    let fixture = Fixture::new();
    fixture.preset("preset-other", "TCP", None);
    fixture.command("other-on", "preset-other", "POWER_ON", 1);
    fixture.device("projector", "preset-tcp", "ok-projector", 0);
    let dispatcher = fixture.dispatcher(TIMEOUT);

    let err = dispatcher
        .execute("projector", "other-on", &ExecutionContext::default(), None)
        .await
        .expect_err("precondition");
    assert_eq!(
        err.as_precondition().map(|e| e.code()),
        Some("COMMAND.PRESET_MISMATCH")
    );

    let err = dispatcher
        .execute("projector", "nope", &ExecutionContext::default(), None)
        .await
        .expect_err("precondition");
    assert_eq!(err.as_precondition().map(|e| e.code()), Some("COMMAND.NOT_FOUND"));
    assert_eq!(fixture.log_count(), 0);
}

#[tokio::test]
async fn timed_out_dispatch_is_timeout_never_fail() {
    let fixture = Fixture::new();
    fixture.device("relay", "preset-tcp", "slow-relay", 0);
    let dispatcher = fixture.dispatcher(Duration::from_millis(100));

    let attempt = dispatcher
        .execute("relay", "power-on", &ExecutionContext::default(), None)
        .await
        .expect("execute");

    assert_eq!(attempt.status, ResultStatus::Timeout);
    assert_eq!(attempt.message, "no response within 100 ms");
    assert_eq!(fixture.log_count(), 1);
}

#[tokio::test]
async fn per_call_timeout_overrides_default() {
    let fixture = Fixture::new();
    fixture.device("relay", "preset-tcp", "slow-relay", 0);
    let dispatcher = fixture.dispatcher(Duration::from_secs(10));

    let started = Instant::now();
    let attempt = dispatcher
        .execute(
            "relay",
            "power-on",
            &ExecutionContext::default(),
            Some(Duration::from_millis(80)),
        )
        .await
        .expect("execute");

    assert_eq!(attempt.status, ResultStatus::Timeout);
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn guard_abandons_driver_that_ignores_deadline() {
    let fixture = Fixture::new();
    fixture.device("relay", "preset-tcp", "hang-relay", 0);
    let dispatcher = fixture.dispatcher(Duration::from_millis(100));

    let started = Instant::now();
    let attempt = dispatcher
        .execute("relay", "power-on", &ExecutionContext::default(), None)
        .await
        .expect("execute");

    assert_eq!(attempt.status, ResultStatus::Timeout);
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(fixture.log_count(), 1);
}

#[tokio::test]
async fn refused_connection_is_fail() {
    let fixture = Fixture::new();
    fixture.device("relay", "preset-tcp", "refuse-relay", 0);
    let dispatcher = fixture.dispatcher(TIMEOUT);

    let attempt = dispatcher
        .execute("relay", "power-on", &ExecutionContext::default(), None)
        .await
        .expect("execute");

    assert_eq!(attempt.status, ResultStatus::Fail);
    assert!(attempt.message.contains("connection refused"));
}

#[tokio::test]
async fn wol_without_valid_mac_fails_before_driver() {
    let fixture = Fixture::new();
    fixture.preset("preset-wol", "WOL", None);
    fixture.command("wake", "preset-wol", "POWER_ON", 1);
    let mut pc = DeviceRecord {
        device_id: "pc".to_string(),
        space_id: "room-101".to_string(),
        preset_id: "preset-wol".to_string(),
        name: "PC".to_string(),
        address: None,
        port: None,
        mac_address: None,
        status: DeviceStatus::Active,
        display_order: 0,
    };
    fixture.device_record(pc.clone());
    let dispatcher = fixture.dispatcher(TIMEOUT);

    let attempt = dispatcher
        .execute("pc", "wake", &ExecutionContext::default(), None)
        .await
        .expect("execute");
    assert_eq!(attempt.status, ResultStatus::Fail);
    assert!(attempt.message.contains("missing hardware address"));

    pc.mac_address = Some("00:11:22".to_string());
    fixture.device_record(pc.clone());
    let attempt = dispatcher
        .execute("pc", "wake", &ExecutionContext::default(), None)
        .await
        .expect("execute");
    assert_eq!(attempt.status, ResultStatus::Fail);
    assert!(attempt.message.contains("invalid hardware address"));
    assert_eq!(fixture.wol.calls(), 0);

    pc.mac_address = Some("00-11-22-33-44-55".to_string());
    fixture.device_record(pc);
    let attempt = dispatcher
        .execute("pc", "wake", &ExecutionContext::default(), None)
        .await
        .expect("execute");
    assert_eq!(attempt.status, ResultStatus::Success);
    assert!(attempt.message.contains("fire-and-forget"));
    assert_eq!(fixture.wol.calls(), 1);
    assert_eq!(fixture.log_count(), 3);
}

#[tokio::test]
async fn unusable_configuration_becomes_fail_attempt() {
    let fixture = Fixture::new();
    fixture.preset("preset-modbus", "MODBUS", None);
    fixture.command("modbus-on", "preset-modbus", "POWER_ON", 1);
    fixture.device("plc", "preset-modbus", "ok-plc", 0);
    fixture.preset("preset-udp", "UDP", None);
    fixture.command("udp-on", "preset-udp", "POWER_ON", 1);
    fixture.device("udp-device", "preset-udp", "ok-udp", 1);
    fixture.device("no-address", "preset-tcp", "", 2);
    let dispatcher = fixture.dispatcher(TIMEOUT);
    let ctx = ExecutionContext::default();

    let attempt = dispatcher.execute("plc", "modbus-on", &ctx, None).await.expect("execute");
    assert_eq!(attempt.status, ResultStatus::Fail);
    assert_eq!(attempt.message, "unknown protocol: MODBUS");

    let attempt = dispatcher.execute("udp-device", "udp-on", &ctx, None).await.expect("execute");
    assert_eq!(attempt.status, ResultStatus::Fail);
    assert_eq!(attempt.message, "no driver registered for UDP");

    let attempt = dispatcher.execute("no-address", "power-on", &ctx, None).await.expect("execute");
    assert_eq!(attempt.status, ResultStatus::Fail);
    assert!(attempt.message.contains("no network address"));

    assert_eq!(fixture.tcp.calls(), 0);
    assert_eq!(fixture.log_count(), 3);
}

#[tokio::test]
async fn invalid_payload_is_fail_attempt() {
    let fixture = Fixture::new();
    fixture.inventory
        .upsert_command(devctl_storage::CommandRecord {
            command_id: "broken".to_string(),
            preset_id: "preset-tcp".to_string(),
            name: "broken".to_string(),
            payload: "A5 ZZ".to_string(),
            command_type: "CUSTOM".to_string(),
            display_order: 9,
        })
        .unwrap();
    fixture.device("projector", "preset-tcp", "ok-projector", 0);
    let dispatcher = fixture.dispatcher(TIMEOUT);

    let attempt = dispatcher
        .execute("projector", "broken", &ExecutionContext::default(), None)
        .await
        .expect("execute");
    assert_eq!(attempt.status, ResultStatus::Fail);
    assert!(attempt.message.starts_with("encoding error"));
    assert_eq!(fixture.tcp.calls(), 0);
}

#[tokio::test]
async fn port_resolution_prefers_device_then_preset_then_default() {
    let fixture = Fixture::new();
    fixture.preset("preset-port", "TCP", Some(7000));
    fixture.command("port-on", "preset-port", "POWER_ON", 1);
    fixture.device("default-port", "preset-tcp", "ok-a", 0);
    fixture.device("preset-port", "preset-port", "ok-b", 1);
    fixture.device_record(DeviceRecord {
        device_id: "device-port".to_string(),
        space_id: "room-101".to_string(),
        preset_id: "preset-port".to_string(),
        name: "Override".to_string(),
        address: Some("ok-c".to_string()),
        port: Some(9000),
        mac_address: None,
        status: DeviceStatus::Active,
        display_order: 2,
    });
    let dispatcher = fixture.dispatcher(TIMEOUT);
    let ctx = ExecutionContext::default();

    dispatcher.execute("default-port", "power-on", &ctx, None).await.expect("execute");
    dispatcher.execute("preset-port", "port-on", &ctx, None).await.expect("execute");
    dispatcher.execute("device-port", "port-on", &ctx, None).await.expect("execute");

    let ports: Vec<Option<u16>> = fixture.tcp.endpoints().iter().map(|e| e.port).collect();
    assert_eq!(ports, vec![Some(4001), Some(7000), Some(9000)]);
}

#[tokio::test]
async fn log_write_failure_is_storage_error() {
    let fixture = Fixture::new();
    fixture.device("projector", "preset-tcp", "ok-projector", 0);
    let dispatcher = fixture.dispatcher_with_log(TIMEOUT, Arc::new(FailingLogStore));

    let err = dispatcher
        .execute("projector", "power-on", &ExecutionContext::default(), None)
        .await
        .expect_err("storage");
    assert!(matches!(err, ControlError::Storage(ref msg) if msg.contains("database unavailable")));
    assert_eq!(fixture.tcp.calls(), 1);
}

#[tokio::test]
async fn nfc_trigger_is_recorded_and_listable() {
    let fixture = Fixture::new();
    fixture.device("projector", "preset-tcp", "ok-projector", 0);
    let dispatcher = fixture.dispatcher(TIMEOUT);

    dispatcher
        .execute("projector", "power-off", &ExecutionContext::nfc("tag-42"), None)
        .await
        .expect("execute");

    let page = fixture
        .logs
        .list(&ExecutionLogQuery {
            space_id: Some("room-101".to_string()),
            ..ExecutionLogQuery::default()
        })
        .await
        .expect("list");
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].trigger, TriggerType::Nfc);
    assert_eq!(page.items[0].actor_id, "tag-42");
}

#[tokio::test]
async fn abandoned_execute_still_logs_sent_command() {
    let fixture = Fixture::new();
    fixture.device("projector", "preset-tcp", "delay-projector", 0);
    let dispatcher = fixture.dispatcher(TIMEOUT);

    let abandoned = tokio::time::timeout(
        Duration::from_millis(50),
        dispatcher.execute("projector", "power-on", &ExecutionContext::default(), None),
    )
    .await;
    assert!(abandoned.is_err());
    assert_eq!(fixture.log_count(), 0);

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(fixture.tcp.calls(), 1);
    assert_eq!(fixture.log_count(), 1);
}

#[tokio::test]
async fn blank_device_address_falls_back_to_preset_address() {
    let fixture = Fixture::new();
    fixture.preset_record(PresetRecord {
        preset_id: "preset-shared".to_string(),
        name: "preset-shared".to_string(),
        protocol: "TCP".to_string(),
        address: Some("ok-preset-host".to_string()),
        port: Some(5000),
        description: None,
    });
    fixture.command("shared-on", "preset-shared", "POWER_ON", 1);
    fixture.device_record(DeviceRecord {
        device_id: "screen".to_string(),
        space_id: "room-101".to_string(),
        preset_id: "preset-shared".to_string(),
        name: "Screen".to_string(),
        address: Some("   ".to_string()),
        port: None,
        mac_address: None,
        status: DeviceStatus::Active,
        display_order: 0,
    });
    let dispatcher = fixture.dispatcher(TIMEOUT);

    let attempt = dispatcher
        .execute("screen", "shared-on", &ExecutionContext::default(), None)
        .await
        .expect("execute");

    assert_eq!(attempt.status, ResultStatus::Success);
    let endpoints = fixture.tcp.endpoints();
    assert_eq!(endpoints[0].host, "ok-preset-host");
    assert_eq!(endpoints[0].port, Some(5000));
}
