//! 控制执行 handlers
//!
//! - POST /control/execute：单设备执行
//! - POST /control/batch：空间批量开关机
//! - POST /control/mappings：按（设备，命令）映射执行
//!
//! 已分派的命令无论 SUCCESS / FAIL / TIMEOUT 均返回 200，结果在执行记录中；
//! 只有前置校验失败和存储失败返回错误响应。

use crate::AppState;
use crate::middleware::require_actor;
use crate::utils::response::{
    attempt_to_dto, bad_request_error, batch_result_to_dto, control_error,
};
use crate::utils::validation::{normalize_required, parse_field};
use api_contract::{
    ApiResponse, ExecuteBatchRequest, ExecuteCommandRequest, ExecuteMappingsRequest,
};
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use domain::{CommandType, TriggerType};
use std::time::Duration;

/// 单设备执行
pub async fn execute_command(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ExecuteCommandRequest>,
) -> Response {
    let ctx = match require_actor(&headers, TriggerType::Manual) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    let device_id = match normalize_required(req.device_id, "deviceId") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let command_id = match normalize_required(req.command_id, "commandId") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let max_timeout = state.dispatcher().config().max_timeout;
    let timeout = match req.timeout_ms.map(Duration::from_millis) {
        Some(timeout) if timeout.is_zero() => {
            return bad_request_error("timeoutMs must be positive");
        }
        Some(timeout) if timeout > max_timeout => {
            return bad_request_error(format!(
                "timeoutMs must not exceed {}",
                max_timeout.as_millis()
            ));
        }
        timeout => timeout,
    };

    match state
        .dispatcher()
        .execute(&device_id, &command_id, &ctx, timeout)
        .await
    {
        Ok(attempt) => (
            StatusCode::OK,
            Json(ApiResponse::success(attempt_to_dto(attempt))),
        )
            .into_response(),
        Err(err) => control_error(err),
    }
}

/// 空间批量执行（仅 POWER_ON / POWER_OFF）
pub async fn execute_batch(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ExecuteBatchRequest>,
) -> Response {
    let ctx = match require_actor(&headers, TriggerType::Manual) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    let space_id = match normalize_required(req.space_id, "spaceId") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let command_type = match parse_field::<CommandType>(&req.command_type) {
        Ok(value) => value,
        Err(response) => return response,
    };

    match state
        .orchestrator
        .execute_batch(&space_id, command_type, &ctx)
        .await
    {
        Ok(result) => (
            StatusCode::OK,
            Json(ApiResponse::success(batch_result_to_dto(result))),
        )
            .into_response(),
        Err(err) => control_error(err),
    }
}

/// 映射执行，触发来源缺省为 NFC
pub async fn execute_mappings(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ExecuteMappingsRequest>,
) -> Response {
    let trigger = match req.trigger.as_deref() {
        Some(value) => match parse_field::<TriggerType>(value) {
            Ok(value) => value,
            Err(response) => return response,
        },
        None => TriggerType::Nfc,
    };
    let ctx = match require_actor(&headers, trigger) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    if req.mappings.is_empty() {
        return bad_request_error("mappings required");
    }
    let mut mappings = Vec::with_capacity(req.mappings.len());
    for mapping in req.mappings {
        let device_id = match normalize_required(mapping.device_id, "deviceId") {
            Ok(value) => value,
            Err(response) => return response,
        };
        let command_id = match normalize_required(mapping.command_id, "commandId") {
            Ok(value) => value,
            Err(response) => return response,
        };
        mappings.push((device_id, command_id));
    }

    match state.orchestrator.execute_mappings(mappings, &ctx).await {
        Ok(result) => (
            StatusCode::OK,
            Json(ApiResponse::success(batch_result_to_dto(result))),
        )
            .into_response(),
        Err(err) => control_error(err),
    }
}
