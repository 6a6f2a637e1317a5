//! Telemetry 指标快照。
//!
//! - GET /metrics

use api_contract::{ApiResponse, MetricsSnapshotDto};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use devctl_telemetry::metrics;

pub async fn get_metrics() -> Response {
    let snapshot = metrics().snapshot();
    (
        StatusCode::OK,
        Json(ApiResponse::success(MetricsSnapshotDto {
            dispatches: snapshot.dispatches,
            dispatch_success: snapshot.dispatch_success,
            dispatch_fail: snapshot.dispatch_fail,
            dispatch_timeout: snapshot.dispatch_timeout,
            preconditions_rejected: snapshot.preconditions_rejected,
            log_write_failures: snapshot.log_write_failures,
            batches: snapshot.batches,
            batch_skipped_devices: snapshot.batch_skipped_devices,
            dispatch_latency_ms_total: snapshot.dispatch_latency_ms_total,
            dispatch_latency_ms_count: snapshot.dispatch_latency_ms_count,
        })),
    )
        .into_response()
}
