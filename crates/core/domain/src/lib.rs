pub mod control;

pub use control::{
    CommandType, DeviceStatus, Protocol, ResultStatus, TriggerType, UnknownVariant,
};

/// 执行上下文：标识本次控制由谁、以何种方式触发。
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pub actor_id: String,
    pub trigger: TriggerType,
}

impl ExecutionContext {
    /// 手动触发（控制台 / API）。
    pub fn manual(actor_id: impl Into<String>) -> Self {
        Self {
            actor_id: actor_id.into(),
            trigger: TriggerType::Manual,
        }
    }

    /// NFC 标签触发。
    pub fn nfc(actor_id: impl Into<String>) -> Self {
        Self {
            actor_id: actor_id.into(),
            trigger: TriggerType::Nfc,
        }
    }
}

impl Default for ExecutionContext {
    /// 系统上下文（仅用于测试或占位）。
    fn default() -> Self {
        Self::manual("system")
    }
}

/// 获取当前时间戳（毫秒）
pub fn now_epoch_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
