//! RS-232 over IP 驱动
//!
//! 串口服务器上的 TCP 会话，按行收发：写出时追加行终止符，
//! 应答读到 `\r` 或 `\n` 为止。

use crate::driver::TransportDriver;
use crate::error::TransportError;
use crate::stream::{ReadPolicy, exchange};
use crate::types::{Endpoint, Frame, TransportReply};
use async_trait::async_trait;
use domain::Protocol;
use std::time::Duration;

pub struct Rs232Driver {
    line_terminator: String,
    policy: ReadPolicy,
}

impl Rs232Driver {
    pub fn new(line_terminator: String, quiet_period: Duration, max_response_bytes: usize) -> Self {
        Self {
            line_terminator,
            policy: ReadPolicy {
                quiet_period,
                max_bytes: max_response_bytes.max(1),
                terminators: vec![b'\r', b'\n'],
            },
        }
    }

    /// 追加行终止符（已以终止符结尾则保持不变）
    pub fn frame_line(&self, line: &str) -> Vec<u8> {
        let mut bytes = line.as_bytes().to_vec();
        if !self.line_terminator.is_empty() && !line.ends_with(&self.line_terminator) {
            bytes.extend_from_slice(self.line_terminator.as_bytes());
        }
        bytes
    }
}

#[async_trait]
impl TransportDriver for Rs232Driver {
    fn protocol(&self) -> Protocol {
        Protocol::Rs232
    }

    async fn send(
        &self,
        endpoint: &Endpoint,
        frame: &Frame,
        timeout: Duration,
    ) -> Result<TransportReply, TransportError> {
        let Frame::Line(line) = frame else {
            return Err(TransportError::FrameMismatch {
                protocol: Protocol::Rs232,
            });
        };
        if endpoint.port.is_none() {
            return Err(TransportError::Endpoint(format!(
                "{}: port required",
                endpoint.host
            )));
        }
        let payload = self.frame_line(line);
        exchange(&endpoint.authority(), &payload, timeout, &self.policy).await
    }
}
