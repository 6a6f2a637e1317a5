//! 控制链路错误

use devctl_storage::StorageError;

/// 前置校验失败：同步返回，不写执行日志。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreconditionError {
    #[error("device not found: {0}")]
    DeviceNotFound(String),
    #[error("device is inactive: {0}")]
    DeviceInactive(String),
    #[error("command not found: {0}")]
    CommandNotFound(String),
    #[error("command {command_id} does not belong to preset {preset_id}")]
    CommandNotInPreset {
        command_id: String,
        preset_id: String,
    },
    #[error("preset not found: {0}")]
    PresetNotFound(String),
    #[error("space not found: {0}")]
    SpaceNotFound(String),
    #[error("command type {0} cannot be used for batch execution")]
    UnsupportedBatchCommand(String),
}

impl PreconditionError {
    /// 对外稳定错误码
    pub fn code(&self) -> &'static str {
        match self {
            Self::DeviceNotFound(_) => "DEVICE.NOT_FOUND",
            Self::DeviceInactive(_) => "DEVICE.INACTIVE",
            Self::CommandNotFound(_) => "COMMAND.NOT_FOUND",
            Self::CommandNotInPreset { .. } => "COMMAND.PRESET_MISMATCH",
            Self::PresetNotFound(_) => "PRESET.NOT_FOUND",
            Self::SpaceNotFound(_) => "SPACE.NOT_FOUND",
            Self::UnsupportedBatchCommand(_) => "BATCH.UNSUPPORTED_COMMAND",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    #[error(transparent)]
    Precondition(#[from] PreconditionError),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("dispatch task failed: {0}")]
    Task(String),
}

impl From<StorageError> for ControlError {
    fn from(err: StorageError) -> Self {
        Self::Storage(err.to_string())
    }
}

impl ControlError {
    pub fn as_precondition(&self) -> Option<&PreconditionError> {
        match self {
            Self::Precondition(err) => Some(err),
            Self::Storage(_) | Self::Task(_) => None,
        }
    }
}
