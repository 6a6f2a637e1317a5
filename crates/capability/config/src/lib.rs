//! 应用运行配置加载。

use std::env;
use std::time::Duration;

/// 配置加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env: {0}")]
    Missing(String),
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
}

/// 应用运行配置。
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_addr: String,
    pub database_url: String,
    /// 单条命令默认截止时间（毫秒）
    pub dispatch_timeout_ms: u64,
    /// 调用方可指定的单条命令截止时间上限（毫秒）
    pub dispatch_timeout_max_ms: u64,
    /// TCP / RS232 写出后等待首个应答的静默期（毫秒）
    pub tcp_quiet_period_ms: u64,
    pub tcp_max_response_bytes: usize,
    /// 设备与预设均未配置端口时的默认端口
    pub default_port: u16,
    pub rs232_line_terminator: String,
    pub wol_broadcast_addr: String,
    /// 批量执行并发上限（至少 1）
    pub batch_max_concurrency: usize,
}

impl AppConfig {
    /// 从环境变量读取配置。
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("DEVCTL_DATABASE_URL")
            .map_err(|_| ConfigError::Missing("DEVCTL_DATABASE_URL".to_string()))?;
        let http_addr =
            env::var("DEVCTL_HTTP_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let dispatch_timeout_ms = read_u64_with_default("DEVCTL_DISPATCH_TIMEOUT_MS", 5000)?;
        if dispatch_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "DEVCTL_DISPATCH_TIMEOUT_MS".to_string(),
                "0".to_string(),
            ));
        }
        let dispatch_timeout_max_ms =
            read_u64_with_default("DEVCTL_DISPATCH_TIMEOUT_MAX_MS", 60_000)?;
        if dispatch_timeout_max_ms < dispatch_timeout_ms {
            return Err(ConfigError::Invalid(
                "DEVCTL_DISPATCH_TIMEOUT_MAX_MS".to_string(),
                dispatch_timeout_max_ms.to_string(),
            ));
        }
        let tcp_quiet_period_ms = read_u64_with_default("DEVCTL_TCP_QUIET_PERIOD_MS", 2000)?;
        let tcp_max_response_bytes =
            read_usize_with_default("DEVCTL_TCP_MAX_RESPONSE_BYTES", 4096)?.max(1);
        let default_port = read_u16_with_default("DEVCTL_DEFAULT_PORT", 4001)?;
        let rs232_line_terminator = env::var("DEVCTL_RS232_LINE_TERMINATOR")
            .map(|value| decode_escapes(&value))
            .unwrap_or_else(|_| "\r".to_string());
        let wol_broadcast_addr = env::var("DEVCTL_WOL_BROADCAST_ADDR")
            .unwrap_or_else(|_| "255.255.255.255:9".to_string());
        let batch_max_concurrency = read_usize_with_default("DEVCTL_BATCH_MAX_CONCURRENCY", 16)?;
        if batch_max_concurrency == 0 {
            return Err(ConfigError::Invalid(
                "DEVCTL_BATCH_MAX_CONCURRENCY".to_string(),
                "0".to_string(),
            ));
        }

        Ok(Self {
            http_addr,
            database_url,
            dispatch_timeout_ms,
            dispatch_timeout_max_ms,
            tcp_quiet_period_ms,
            tcp_max_response_bytes,
            default_port,
            rs232_line_terminator,
            wol_broadcast_addr,
            batch_max_concurrency,
        })
    }

    pub fn dispatch_timeout(&self) -> Duration {
        Duration::from_millis(self.dispatch_timeout_ms)
    }

    pub fn dispatch_timeout_max(&self) -> Duration {
        Duration::from_millis(self.dispatch_timeout_max_ms)
    }

    pub fn tcp_quiet_period(&self) -> Duration {
        Duration::from_millis(self.tcp_quiet_period_ms)
    }
}

fn read_u64_with_default(key: &str, default: u64) -> Result<u64, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_usize_with_default(key: &str, default: usize) -> Result<usize, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .trim()
        .parse::<usize>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_u16_with_default(key: &str, default: u16) -> Result<u16, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .trim()
        .parse::<u16>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

/// 解码 `\r` `\n` `\t` 转义（环境变量中无法直接写入控制字符）。
fn decode_escapes(value: &str) -> String {
    value
        .replace("\\r", "\r")
        .replace("\\n", "\n")
        .replace("\\t", "\t")
}
