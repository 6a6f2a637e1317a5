//! HTTP 响应辅助函数和 DTO 转换
//!
//! - 错误响应：bad_request_error, precondition_error, storage_error, control_error
//! - DTO 转换：attempt_to_dto, batch_result_to_dto, log_page_to_dto
//!
//! 所有错误返回统一的 ApiResponse 格式；前置校验失败使用各自的稳定错误码。

use api_contract::{
    ApiResponse, BatchErrorDto, BatchResultDto, BatchSummaryDto, ExecutionAttemptDto,
    ExecutionLogItemDto, ExecutionLogPageDto, SkippedDeviceDto,
};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use devctl_control::{BatchResult, ControlError, PreconditionError};
use devctl_storage::{ExecutionAttemptRecord, ExecutionLogPage, StorageError};

/// 错误请求响应
pub fn bad_request_error(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::<()>::error("INVALID.REQUEST", message.into())),
    )
        .into_response()
}

/// 前置校验失败响应：不存在 → 404，状态冲突 → 409，不支持的批量命令 → 400
pub fn precondition_error(err: &PreconditionError) -> Response {
    let status = match err {
        PreconditionError::DeviceNotFound(_)
        | PreconditionError::CommandNotFound(_)
        | PreconditionError::PresetNotFound(_)
        | PreconditionError::SpaceNotFound(_) => StatusCode::NOT_FOUND,
        PreconditionError::DeviceInactive(_) | PreconditionError::CommandNotInPreset { .. } => {
            StatusCode::CONFLICT
        }
        PreconditionError::UnsupportedBatchCommand(_) => StatusCode::BAD_REQUEST,
    };
    (
        status,
        Json(ApiResponse::<()>::error(err.code(), err.to_string())),
    )
        .into_response()
}

/// 存储错误响应
pub fn storage_error(err: StorageError) -> Response {
    internal_error(err.to_string())
}

/// 控制链路错误响应
pub fn control_error(err: ControlError) -> Response {
    match err {
        ControlError::Precondition(err) => precondition_error(&err),
        err => internal_error(err.to_string()),
    }
}

fn internal_error(message: String) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::<()>::error("INTERNAL.ERROR", message)),
    )
        .into_response()
}

/// ExecutionAttemptRecord 转 ExecutionAttemptDto
pub fn attempt_to_dto(record: ExecutionAttemptRecord) -> ExecutionAttemptDto {
    ExecutionAttemptDto {
        log_id: record.log_id,
        device_id: record.device_id,
        space_id: record.space_id,
        command_id: record.command_id,
        actor_id: record.actor_id,
        trigger: record.trigger.as_str().to_string(),
        status: record.status.as_str().to_string(),
        message: record.message,
        ts_ms: record.ts_ms,
    }
}

/// BatchResult 转 BatchResultDto
pub fn batch_result_to_dto(result: BatchResult) -> BatchResultDto {
    BatchResultDto {
        attempts: result.attempts.into_iter().map(attempt_to_dto).collect(),
        skipped: result
            .skipped
            .into_iter()
            .map(|skipped| SkippedDeviceDto {
                device_id: skipped.device_id,
                device_name: skipped.device_name,
                reason: skipped.reason,
            })
            .collect(),
        errors: result
            .errors
            .into_iter()
            .map(|error| BatchErrorDto {
                device_id: error.device_id,
                command_id: error.command_id,
                message: error.message,
            })
            .collect(),
        summary: BatchSummaryDto {
            success: result.summary.success,
            fail: result.summary.fail,
            timeout: result.summary.timeout,
            skipped: result.summary.skipped,
        },
        message: result.message,
    }
}

/// ExecutionLogPage 转 ExecutionLogPageDto（附带倒序展示序号）
pub fn log_page_to_dto(page: ExecutionLogPage) -> ExecutionLogPageDto {
    let numbers: Vec<u64> = (0..page.items.len())
        .map(|index| page.display_no(index))
        .collect();
    ExecutionLogPageDto {
        items: page
            .items
            .into_iter()
            .zip(numbers)
            .map(|(record, no)| ExecutionLogItemDto {
                no,
                attempt: attempt_to_dto(record),
            })
            .collect(),
        total: page.total,
        page: page.page,
        limit: page.limit,
        total_pages: page.total_pages,
    }
}
