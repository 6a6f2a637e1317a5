//! 设备控制 HTTP 服务
//!
//! 薄 HTTP 层：把请求转换为执行引擎调用，把执行记录与批量结果转换为 DTO。
//! 认证不在本服务范围内，调用方通过 `x-actor-id` 请求头声明执行人。

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod utils;

use axum::{Router, middleware as axum_middleware};
use devctl_control::{BatchOrchestrator, CommandDispatcher};
use devctl_storage::ExecutionLogStore;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// 应用共享状态
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: BatchOrchestrator,
    pub log_store: Arc<dyn ExecutionLogStore>,
}

impl AppState {
    pub fn new(orchestrator: BatchOrchestrator, log_store: Arc<dyn ExecutionLogStore>) -> Self {
        Self {
            orchestrator,
            log_store,
        }
    }

    pub fn dispatcher(&self) -> &CommandDispatcher {
        self.orchestrator.dispatcher()
    }
}

/// 组装完整应用：根路径与 `/api` 前缀挂载同一组路由，并注入 request_id/trace_id。
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(routes::create_api_router())
        .nest("/api", routes::create_api_router())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(axum_middleware::from_fn(middleware::request_context))
}
