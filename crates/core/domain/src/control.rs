//! 设备控制领域枚举。
//!
//! 存储层以字符串保存这些值（与外部资产库的列定义一致），
//! 引擎内部统一转换为封闭枚举后再参与分派。

use std::fmt;
use std::str::FromStr;

/// 枚举值解析失败。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {}: {}", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

fn unknown(kind: &'static str, value: &str) -> UnknownVariant {
    UnknownVariant {
        kind,
        value: value.to_string(),
    }
}

/// 预设通信协议。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    Tcp,
    Udp,
    Wol,
    Http,
    Rs232,
}

impl Protocol {
    pub const ALL: [Protocol; 5] = [
        Protocol::Tcp,
        Protocol::Udp,
        Protocol::Wol,
        Protocol::Http,
        Protocol::Rs232,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "TCP",
            Protocol::Udp => "UDP",
            Protocol::Wol => "WOL",
            Protocol::Http => "HTTP",
            Protocol::Rs232 => "RS232",
        }
    }

    /// 发送后不等待设备确认的协议（成功仅表示“已发出”）。
    pub fn is_fire_and_forget(&self) -> bool {
        matches!(self, Protocol::Udp | Protocol::Wol)
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "TCP" => Ok(Protocol::Tcp),
            "UDP" => Ok(Protocol::Udp),
            "WOL" => Ok(Protocol::Wol),
            "HTTP" => Ok(Protocol::Http),
            "RS232" | "RS-232" => Ok(Protocol::Rs232),
            _ => Err(unknown("protocol", value)),
        }
    }
}

/// 命令语义类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandType {
    PowerOn,
    PowerOff,
    InputChange,
    Custom,
}

impl CommandType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandType::PowerOn => "POWER_ON",
            CommandType::PowerOff => "POWER_OFF",
            CommandType::InputChange => "INPUT_CHANGE",
            CommandType::Custom => "CUSTOM",
        }
    }

    /// 仅电源开/关可用于空间批量控制。
    pub fn is_batchable(&self) -> bool {
        matches!(self, CommandType::PowerOn | CommandType::PowerOff)
    }
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommandType {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "POWER_ON" => Ok(CommandType::PowerOn),
            "POWER_OFF" => Ok(CommandType::PowerOff),
            "INPUT_CHANGE" => Ok(CommandType::InputChange),
            "CUSTOM" => Ok(CommandType::Custom),
            _ => Err(unknown("command type", value)),
        }
    }
}

/// 设备启用状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceStatus {
    Active,
    Inactive,
}

impl DeviceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceStatus::Active => "ACTIVE",
            DeviceStatus::Inactive => "INACTIVE",
        }
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceStatus {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "ACTIVE" => Ok(DeviceStatus::Active),
            "INACTIVE" => Ok(DeviceStatus::Inactive),
            _ => Err(unknown("device status", value)),
        }
    }
}

/// 单次执行的终态。
///
/// - `Success`：设备已应答，或发送型协议写出成功
/// - `Fail`：结果已知为否定（拒绝连接、NAK、非 2xx 等）
/// - `Timeout`：截止时间前未得出结果，设备侧结果未知
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultStatus {
    Success,
    Fail,
    Timeout,
}

impl ResultStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultStatus::Success => "SUCCESS",
            ResultStatus::Fail => "FAIL",
            ResultStatus::Timeout => "TIMEOUT",
        }
    }
}

impl fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResultStatus {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "SUCCESS" => Ok(ResultStatus::Success),
            "FAIL" => Ok(ResultStatus::Fail),
            "TIMEOUT" => Ok(ResultStatus::Timeout),
            _ => Err(unknown("result status", value)),
        }
    }
}

/// 执行触发来源。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriggerType {
    #[default]
    Manual,
    Nfc,
}

impl TriggerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerType::Manual => "MANUAL",
            TriggerType::Nfc => "NFC",
        }
    }
}

impl fmt::Display for TriggerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TriggerType {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "MANUAL" => Ok(TriggerType::Manual),
            "NFC" => Ok(TriggerType::Nfc),
            _ => Err(unknown("trigger type", value)),
        }
    }
}
