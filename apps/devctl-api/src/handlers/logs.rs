//! 执行日志 handlers
//!
//! - GET /control/logs?deviceId=&spaceId=&status=&fromMs=&toMs=&page=&limit=

use crate::AppState;
use crate::utils::response::{bad_request_error, log_page_to_dto, storage_error};
use crate::utils::validation::{normalize_optional, parse_field};
use api_contract::{ApiResponse, ExecutionLogQueryParams};
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use devctl_storage::{DEFAULT_PAGE_LIMIT, ExecutionLogQuery};
use domain::ResultStatus;

/// 分页查询执行日志（按时间倒序）
pub async fn list_execution_logs(
    State(state): State<AppState>,
    Query(params): Query<ExecutionLogQueryParams>,
) -> Response {
    let device_id = match normalize_optional(params.device_id, "deviceId") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let space_id = match normalize_optional(params.space_id, "spaceId") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let status = match params.status.as_deref() {
        Some(value) => match parse_field::<ResultStatus>(value) {
            Ok(value) => Some(value),
            Err(response) => return response,
        },
        None => None,
    };
    if let (Some(from_ms), Some(to_ms)) = (params.from_ms, params.to_ms)
        && from_ms > to_ms
    {
        return bad_request_error("fromMs must not be after toMs");
    }

    let query = ExecutionLogQuery {
        device_id,
        space_id,
        status,
        from_ms: params.from_ms,
        to_ms: params.to_ms,
        page: params.page.unwrap_or(1),
        limit: params.limit.unwrap_or(DEFAULT_PAGE_LIMIT),
    }
    .normalized();

    match state.log_store.list(&query).await {
        Ok(page) => (
            StatusCode::OK,
            Json(ApiResponse::success(log_page_to_dto(page))),
        )
            .into_response(),
        Err(err) => storage_error(err),
    }
}
