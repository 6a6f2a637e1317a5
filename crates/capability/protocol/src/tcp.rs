//! TCP 驱动
//!
//! 每条命令新建一条短连接：写出十六进制载荷，读取首个应答数据块后关闭。
//! 静默期内无应答视为“已写出、设备未应答”。

use crate::driver::TransportDriver;
use crate::error::TransportError;
use crate::stream::{ReadPolicy, exchange};
use crate::types::{Endpoint, Frame, TransportReply};
use async_trait::async_trait;
use domain::Protocol;
use std::time::Duration;

pub struct TcpDriver {
    policy: ReadPolicy,
}

impl TcpDriver {
    pub fn new(quiet_period: Duration, max_response_bytes: usize) -> Self {
        Self {
            policy: ReadPolicy {
                quiet_period,
                max_bytes: max_response_bytes.max(1),
                terminators: Vec::new(),
            },
        }
    }
}

#[async_trait]
impl TransportDriver for TcpDriver {
    fn protocol(&self) -> Protocol {
        Protocol::Tcp
    }

    async fn send(
        &self,
        endpoint: &Endpoint,
        frame: &Frame,
        timeout: Duration,
    ) -> Result<TransportReply, TransportError> {
        let Frame::Bytes(payload) = frame else {
            return Err(TransportError::FrameMismatch {
                protocol: Protocol::Tcp,
            });
        };
        if endpoint.port.is_none() {
            return Err(TransportError::Endpoint(format!(
                "{}: port required",
                endpoint.host
            )));
        }
        exchange(&endpoint.authority(), payload, timeout, &self.policy).await
    }
}
