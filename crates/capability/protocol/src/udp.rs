//! UDP 驱动
//!
//! 发送单个数据报，不等待应答。成功仅表示本机发送完成，
//! 不代表设备已收到（fire-and-forget）。

use crate::driver::TransportDriver;
use crate::error::TransportError;
use crate::stream::resolve;
use crate::types::{Endpoint, Frame, TransportReply};
use async_trait::async_trait;
use domain::Protocol;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::{Instant, timeout_at};
use tracing::debug;

#[derive(Debug, Default)]
pub struct UdpDriver;

impl UdpDriver {
    pub fn new() -> Self {
        Self
    }
}

/// 按目标地址族绑定临时端口
pub(crate) async fn bind_for(target: &SocketAddr) -> std::io::Result<UdpSocket> {
    let local = if target.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
    UdpSocket::bind(local).await
}

/// 在截止时间内发送一个数据报
pub(crate) async fn send_datagram(
    socket: &UdpSocket,
    payload: &[u8],
    target: SocketAddr,
    deadline: Instant,
    timeout_ms: u64,
) -> Result<(), TransportError> {
    match timeout_at(deadline, socket.send_to(payload, target)).await {
        Ok(Ok(_)) => Ok(()),
        Ok(Err(err)) => Err(TransportError::from_io(err, &target.to_string())),
        Err(_) => Err(TransportError::Timeout(timeout_ms)),
    }
}

#[async_trait]
impl TransportDriver for UdpDriver {
    fn protocol(&self) -> Protocol {
        Protocol::Udp
    }

    async fn send(
        &self,
        endpoint: &Endpoint,
        frame: &Frame,
        timeout: Duration,
    ) -> Result<TransportReply, TransportError> {
        let Frame::Bytes(payload) = frame else {
            return Err(TransportError::FrameMismatch {
                protocol: Protocol::Udp,
            });
        };
        if endpoint.port.is_none() {
            return Err(TransportError::Endpoint(format!(
                "{}: port required",
                endpoint.host
            )));
        }
        let deadline = Instant::now() + timeout;
        let timeout_ms = timeout.as_millis() as u64;
        let target = resolve(&endpoint.authority(), deadline, timeout_ms).await?;
        let socket = bind_for(&target).await?;
        send_datagram(&socket, payload, target, deadline, timeout_ms).await?;
        debug!(target: "devctl.protocol", peer = %target, bytes = payload.len(), "datagram_sent");
        Ok(TransportReply::fire_and_forget())
    }
}
