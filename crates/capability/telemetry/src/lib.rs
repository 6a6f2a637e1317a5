//! 追踪、请求 ID 与控制链路指标。

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{EnvFilter, fmt};

/// 请求级追踪标识。
#[derive(Debug, Clone)]
pub struct RequestIds {
    pub request_id: String,
    pub trace_id: String,
}

/// 指标快照。
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
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

/// 控制链路指标（进程级计数器）。
pub struct TelemetryMetrics {
    dispatches: AtomicU64,
    dispatch_success: AtomicU64,
    dispatch_fail: AtomicU64,
    dispatch_timeout: AtomicU64,
    preconditions_rejected: AtomicU64,
    log_write_failures: AtomicU64,
    batches: AtomicU64,
    batch_skipped_devices: AtomicU64,
    dispatch_latency_ms_total: AtomicU64,
    dispatch_latency_ms_count: AtomicU64,
}

impl Default for TelemetryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryMetrics {
    pub fn new() -> Self {
        Self {
            dispatches: AtomicU64::new(0),
            dispatch_success: AtomicU64::new(0),
            dispatch_fail: AtomicU64::new(0),
            dispatch_timeout: AtomicU64::new(0),
            preconditions_rejected: AtomicU64::new(0),
            log_write_failures: AtomicU64::new(0),
            batches: AtomicU64::new(0),
            batch_skipped_devices: AtomicU64::new(0),
            dispatch_latency_ms_total: AtomicU64::new(0),
            dispatch_latency_ms_count: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            dispatches: self.dispatches.load(Ordering::Relaxed),
            dispatch_success: self.dispatch_success.load(Ordering::Relaxed),
            dispatch_fail: self.dispatch_fail.load(Ordering::Relaxed),
            dispatch_timeout: self.dispatch_timeout.load(Ordering::Relaxed),
            preconditions_rejected: self.preconditions_rejected.load(Ordering::Relaxed),
            log_write_failures: self.log_write_failures.load(Ordering::Relaxed),
            batches: self.batches.load(Ordering::Relaxed),
            batch_skipped_devices: self.batch_skipped_devices.load(Ordering::Relaxed),
            dispatch_latency_ms_total: self.dispatch_latency_ms_total.load(Ordering::Relaxed),
            dispatch_latency_ms_count: self.dispatch_latency_ms_count.load(Ordering::Relaxed),
        }
    }
}

static METRICS: OnceLock<TelemetryMetrics> = OnceLock::new();

/// 获取全局指标实例。
pub fn metrics() -> &'static TelemetryMetrics {
    METRICS.get_or_init(TelemetryMetrics::new)
}

/// 初始化 tracing（默认 info）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 生成新的 request_id 与 trace_id。
pub fn new_request_ids() -> RequestIds {
    RequestIds {
        request_id: uuid::Uuid::new_v4().to_string(),
        trace_id: uuid::Uuid::new_v4().to_string(),
    }
}

/// 记录一次分派（已通过前置校验）。
pub fn record_dispatch() {
    metrics().dispatches.fetch_add(1, Ordering::Relaxed);
}

pub fn record_dispatch_success() {
    metrics().dispatch_success.fetch_add(1, Ordering::Relaxed);
}

pub fn record_dispatch_fail() {
    metrics().dispatch_fail.fetch_add(1, Ordering::Relaxed);
}

pub fn record_dispatch_timeout() {
    metrics().dispatch_timeout.fetch_add(1, Ordering::Relaxed);
}

/// 记录前置校验拒绝次数（不写日志）。
pub fn record_precondition_rejected() {
    metrics()
        .preconditions_rejected
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录执行日志写入失败次数。
pub fn record_log_write_failure() {
    metrics().log_write_failures.fetch_add(1, Ordering::Relaxed);
}

/// 记录批量执行次数及跳过的设备数。
pub fn record_batch(skipped_devices: u64) {
    let metrics = metrics();
    metrics.batches.fetch_add(1, Ordering::Relaxed);
    metrics
        .batch_skipped_devices
        .fetch_add(skipped_devices, Ordering::Relaxed);
}

/// 记录单次分派耗时（毫秒，含编码、传输与分类）。
pub fn record_dispatch_latency_ms(latency_ms: u64) {
    let metrics = metrics();
    metrics
        .dispatch_latency_ms_total
        .fetch_add(latency_ms, Ordering::Relaxed);
    metrics
        .dispatch_latency_ms_count
        .fetch_add(1, Ordering::Relaxed);
}
