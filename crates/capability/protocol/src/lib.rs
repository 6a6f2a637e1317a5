//! # 协议传输能力模块
//!
//! 把命令载荷编码为协议帧，经对应驱动发往设备，并将原始结果归类为
//! SUCCESS / FAIL / TIMEOUT。支持：
//! - **TCP**：十六进制载荷，短连接，静默期内等待应答
//! - **UDP**：十六进制载荷，单个数据报，不等待应答
//! - **WOL**：由设备 MAC 生成魔术包，UDP 广播
//! - **HTTP**：`[METHOD ]path[ body]` 文本载荷
//! - **RS232**：串口服务器 TCP 会话，按行收发
//!
//! ## 架构设计
//!
//! ```text
//! Command.payload + Preset.protocol
//!       │
//!       ▼
//! codec::encode ──► Frame
//!       │
//!       ▼
//! DriverRegistry ──► TransportDriver::send(endpoint, frame, timeout)
//!       │
//!       ▼
//! codec::classify ──► Classification { status, message }
//! ```

pub mod codec;
mod driver;
mod error;
mod http;
mod rs232;
mod stream;
mod tcp;
mod types;
mod udp;
mod wol;

pub use driver::{DriverRegistry, TransportDriver};
pub use error::{EncodingError, TransportError};
pub use http::HttpDriver;
pub use rs232::Rs232Driver;
pub use tcp::TcpDriver;
pub use types::*;
pub use udp::UdpDriver;
pub use wol::WolDriver;
