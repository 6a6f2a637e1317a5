//! 协议错误类型定义

use domain::Protocol;
use std::io;

/// 命令编码错误
///
/// 命令载荷在创建/更新时即应通过校验；若分派时仍出现，
/// 作为 FAIL 结果记录，不会静默丢弃。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodingError {
    /// 空载荷
    #[error("empty payload spec")]
    Empty,

    /// 非十六进制 token
    #[error("invalid hex token `{0}`")]
    InvalidHexToken(String),

    /// 十六进制 token 长度为奇数
    #[error("odd-length hex token `{0}`")]
    OddLength(String),

    /// 设备未配置 MAC 地址
    #[error("missing hardware address")]
    MissingHardwareAddress,

    /// MAC 地址格式错误
    #[error("invalid hardware address `{0}`")]
    InvalidHardwareAddress(String),

    /// HTTP 请求描述错误
    #[error("invalid http request spec: {0}")]
    InvalidHttpSpec(String),
}

/// 传输错误
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// 连接被拒绝
    #[error("connection refused: {0}")]
    Refused(String),

    /// 连接被重置/中止
    #[error("connection reset: {0}")]
    Reset(String),

    /// 主机/网络不可达
    #[error("host unreachable: {0}")]
    Unreachable(String),

    /// 地址解析失败
    #[error("address resolution failed: {0}")]
    Resolve(String),

    /// 端点配置错误
    #[error("invalid endpoint: {0}")]
    Endpoint(String),

    /// 驱动不支持该帧类型
    #[error("{protocol} driver cannot send this frame")]
    FrameMismatch { protocol: Protocol },

    /// HTTP 客户端错误
    #[error("http error: {0}")]
    Http(String),

    /// IO 错误
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// 截止时间内未得出结果
    #[error("timeout after {0} ms")]
    Timeout(u64),
}

impl TransportError {
    /// 按 IO 错误种类归类，保留对端地址作为诊断信息。
    pub fn from_io(err: io::Error, addr: &str) -> Self {
        match err.kind() {
            io::ErrorKind::ConnectionRefused => Self::Refused(format!("{addr}: {err}")),
            io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe => Self::Reset(format!("{addr}: {err}")),
            io::ErrorKind::HostUnreachable | io::ErrorKind::NetworkUnreachable => {
                Self::Unreachable(format!("{addr}: {err}"))
            }
            _ => Self::Io(err),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}
