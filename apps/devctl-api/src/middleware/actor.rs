//! 执行人提取
//!
//! 认证由上游网关负责；这里只要求调用方声明执行人，用于写入执行日志。

use crate::utils::response::bad_request_error;
use axum::{http::HeaderMap, response::Response};
use domain::{ExecutionContext, TriggerType};

pub const ACTOR_HEADER: &str = "x-actor-id";

/// 从 `x-actor-id` 请求头构造执行上下文；缺失或为空时返回 400。
pub fn require_actor(
    headers: &HeaderMap,
    trigger: TriggerType,
) -> Result<ExecutionContext, Response> {
    let actor_id = headers
        .get(ACTOR_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| bad_request_error(format!("{ACTOR_HEADER} header required")))?;
    Ok(ExecutionContext {
        actor_id: actor_id.to_string(),
        trigger,
    })
}
