//! 协议相关类型定义

use domain::ResultStatus;
use std::time::Duration;

/// 目标端点（已合并设备覆盖值与预设默认值）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// 主机地址（IP 或域名）
    pub host: String,
    /// 端口；HTTP 可为空（使用 80）
    pub port: Option<u16>,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: Option<u16>) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// `host:port` 形式，IPv6 地址自动加方括号。
    pub fn authority(&self) -> String {
        let host = if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        };
        match self.port {
            Some(port) => format!("{host}:{port}"),
            None => host,
        }
    }
}

/// HTTP 请求描述（由文本载荷解析）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequestSpec {
    pub method: String,
    pub path: String,
    pub body: Option<String>,
}

/// 编码后的可发送帧
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// 原始字节（TCP / UDP）
    Bytes(Vec<u8>),
    /// 单行文本，由驱动追加行终止符（RS-232 over IP）
    Line(String),
    /// HTTP 请求
    Http(HttpRequestSpec),
    /// WOL 魔术包（102 字节）
    MagicPacket(Vec<u8>),
}

impl Frame {
    pub fn kind(&self) -> &'static str {
        match self {
            Frame::Bytes(_) => "bytes",
            Frame::Line(_) => "line",
            Frame::Http(_) => "http",
            Frame::MagicPacket(_) => "magic_packet",
        }
    }
}

/// 写出后设备侧的确认程度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// 设备已应答
    Replied,
    /// 已写出，静默期内设备未应答
    WrittenNoReply,
    /// 数据报已发出，无任何送达保证
    FireAndForget,
}

/// 驱动返回的原始结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportReply {
    pub delivery: Delivery,
    pub response: Option<Vec<u8>>,
    /// HTTP 状态码
    pub status_code: Option<u16>,
}

impl TransportReply {
    pub fn replied(response: Vec<u8>) -> Self {
        Self {
            delivery: Delivery::Replied,
            response: Some(response),
            status_code: None,
        }
    }

    pub fn written() -> Self {
        Self {
            delivery: Delivery::WrittenNoReply,
            response: None,
            status_code: None,
        }
    }

    pub fn fire_and_forget() -> Self {
        Self {
            delivery: Delivery::FireAndForget,
            response: None,
            status_code: None,
        }
    }

    pub fn http(status_code: u16, body: Vec<u8>) -> Self {
        Self {
            delivery: Delivery::Replied,
            response: Some(body),
            status_code: Some(status_code),
        }
    }
}

/// 分类结果（状态 + 说明）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub status: ResultStatus,
    pub message: String,
}

impl Classification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: ResultStatus::Success,
            message: message.into(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            status: ResultStatus::Fail,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            status: ResultStatus::Timeout,
            message: message.into(),
        }
    }
}

/// 驱动配置
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// TCP/RS-232 写出后等待首个应答的静默期
    pub tcp_quiet_period: Duration,
    /// 单次应答最大读取字节数
    pub max_response_bytes: usize,
    /// RS-232 行终止符
    pub rs232_line_terminator: String,
    /// WOL 广播地址
    pub wol_broadcast_addr: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tcp_quiet_period: Duration::from_millis(2000),
            max_response_bytes: 4096,
            rs232_line_terminator: "\r".to_string(),
            wol_broadcast_addr: "255.255.255.255:9".to_string(),
        }
    }
}
