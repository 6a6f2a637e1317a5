//! 设备控制执行服务入口：加载配置、连接数据库、注册协议驱动并启动 HTTP 服务。

use devctl_api::{AppState, build_app};
use devctl_config::AppConfig;
use devctl_control::{BatchOrchestrator, CommandDispatcher, DispatchConfig};
use devctl_protocol::{DriverRegistry, TransportConfig};
use devctl_storage::{
    ExecutionLogStore, InventoryStore, PgExecutionLogStore, PgInventoryStore, connect_pool,
    run_migrations,
};
use devctl_telemetry::init_tracing;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在），便于直接 cargo run 启动
    dotenvy::dotenv().ok();
    // 从环境变量加载运行配置
    let config = AppConfig::from_env()?;
    // 初始化结构化日志
    init_tracing();

    // Postgres：库存只读，执行日志只追加
    let pool = connect_pool(&config.database_url).await?;
    run_migrations(&pool).await?;
    let inventory: Arc<dyn InventoryStore> = Arc::new(PgInventoryStore::new(pool.clone()));
    let log_store: Arc<dyn ExecutionLogStore> = Arc::new(PgExecutionLogStore::new(pool));

    // 五种内置协议驱动
    let drivers = DriverRegistry::with_defaults(&TransportConfig {
        tcp_quiet_period: config.tcp_quiet_period(),
        max_response_bytes: config.tcp_max_response_bytes,
        rs232_line_terminator: config.rs232_line_terminator.clone(),
        wol_broadcast_addr: config.wol_broadcast_addr.clone(),
    })?;
    let protocols = drivers.protocols();

    let dispatcher = CommandDispatcher::new(
        inventory,
        log_store.clone(),
        Arc::new(drivers),
        DispatchConfig {
            timeout: config.dispatch_timeout(),
            max_timeout: config.dispatch_timeout_max(),
            default_port: config.default_port,
            ..DispatchConfig::default()
        },
    );
    let orchestrator = BatchOrchestrator::new(dispatcher, config.batch_max_concurrency);
    let app = build_app(AppState::new(orchestrator, log_store));

    info!(
        target: "devctl.api",
        http_addr = %config.http_addr,
        protocols = ?protocols,
        dispatch_timeout_ms = config.dispatch_timeout_ms,
        dispatch_timeout_max_ms = config.dispatch_timeout_max_ms,
        batch_max_concurrency = config.batch_max_concurrency,
        "server_starting"
    );
    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
