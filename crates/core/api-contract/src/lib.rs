//! 稳定的 DTO 与 API 响应契约。
//!
//! 请求体统一接受 camelCase，并兼容 snake_case 别名；响应体统一输出 camelCase。

use serde::{Deserialize, Serialize};

/// 标准 API 响应封装。
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

/// 失败响应的错误体。
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                code: code.into(),
                message: message.into(),
            }),
        }
    }
}

/// 单设备执行请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteCommandRequest {
    #[serde(alias = "device_id")]
    pub device_id: String,
    #[serde(alias = "command_id")]
    pub command_id: String,
    /// 覆盖默认截止时间（毫秒）
    #[serde(default, alias = "timeout_ms")]
    pub timeout_ms: Option<u64>,
}

/// 空间批量执行请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteBatchRequest {
    #[serde(alias = "space_id")]
    pub space_id: String,
    /// POWER_ON / POWER_OFF
    #[serde(alias = "command_type")]
    pub command_type: String,
}

/// 一条（设备，命令）映射。
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingDto {
    #[serde(alias = "device_id")]
    pub device_id: String,
    #[serde(alias = "command_id")]
    pub command_id: String,
}

/// 映射执行请求体（NFC 标签等）。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteMappingsRequest {
    pub mappings: Vec<MappingDto>,
    /// MANUAL / NFC，缺省为 NFC
    #[serde(default)]
    pub trigger: Option<String>,
}

/// 执行记录返回结构。
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionAttemptDto {
    pub log_id: i64,
    pub device_id: String,
    pub space_id: String,
    pub command_id: String,
    pub actor_id: String,
    pub trigger: String,
    pub status: String,
    pub message: String,
    pub ts_ms: i64,
}

/// 批量执行中被跳过的设备。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedDeviceDto {
    pub device_id: String,
    pub device_name: Option<String>,
    pub reason: String,
}

/// 已分派但未能写入日志的目标。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchErrorDto {
    pub device_id: String,
    pub command_id: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummaryDto {
    pub success: usize,
    pub fail: usize,
    pub timeout: usize,
    pub skipped: usize,
}

/// 批量 / 映射执行结果。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResultDto {
    pub attempts: Vec<ExecutionAttemptDto>,
    pub skipped: Vec<SkippedDeviceDto>,
    pub errors: Vec<BatchErrorDto>,
    pub summary: BatchSummaryDto,
    pub message: String,
}

/// 执行日志查询参数（query string）。
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionLogQueryParams {
    #[serde(default, alias = "device_id")]
    pub device_id: Option<String>,
    #[serde(default, alias = "space_id")]
    pub space_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "from_ms")]
    pub from_ms: Option<i64>,
    #[serde(default, alias = "to_ms")]
    pub to_ms: Option<i64>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
}

/// 日志列表项：展示序号 + 执行记录。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionLogItemDto {
    pub no: u64,
    #[serde(flatten)]
    pub attempt: ExecutionAttemptDto,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionLogPageDto {
    pub items: Vec<ExecutionLogItemDto>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
}

/// 控制链路指标快照。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshotDto {
    pub dispatches: u64,
    pub dispatch_success: u64,
    pub dispatch_fail: u64,
    pub dispatch_timeout: u64,
    pub preconditions_rejected: u64,
    pub log_write_failures: u64,
    pub batches: u64,
    pub batch_skipped_devices: u64,
    pub dispatch_latency_ms_total: u64,
    pub dispatch_latency_ms_count: u64,
}
