//! 路由定义
//!
//! 集中管理所有 API 路由，将路径映射到对应的 handlers。
//! 路由包括：
//! - 健康检查：/health
//! - 指标快照：/metrics
//! - 控制执行：/control/execute, /control/batch, /control/mappings
//! - 执行日志：/control/logs

use super::AppState;
use super::handlers::*;
use axum::{
    Router,
    routing::{get, post},
};

/// 创建 API 路由
///
/// 返回包含所有 API 端点的 Router，由 `build_app` 同时挂载到 / 和 /api/
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(get_metrics))
        .route("/control/execute", post(execute_command))
        .route("/control/batch", post(execute_batch))
        .route("/control/mappings", post(execute_mappings))
        .route("/control/logs", get(list_execution_logs))
}
