//! Wake-on-LAN 驱动
//!
//! 魔术包由设备 MAC 构造（见 [`crate::codec::magic_packet`]），
//! 以 UDP 广播发往配置的广播地址。成功仅表示已发出，不代表设备已开机。

use crate::driver::TransportDriver;
use crate::error::TransportError;
use crate::stream::resolve;
use crate::types::{Endpoint, Frame, TransportReply};
use crate::udp::{bind_for, send_datagram};
use async_trait::async_trait;
use domain::Protocol;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

pub struct WolDriver {
    broadcast_addr: String,
}

impl WolDriver {
    pub fn new(broadcast_addr: String) -> Self {
        Self { broadcast_addr }
    }
}

#[async_trait]
impl TransportDriver for WolDriver {
    fn protocol(&self) -> Protocol {
        Protocol::Wol
    }

    async fn send(
        &self,
        endpoint: &Endpoint,
        frame: &Frame,
        timeout: Duration,
    ) -> Result<TransportReply, TransportError> {
        let Frame::MagicPacket(packet) = frame else {
            return Err(TransportError::FrameMismatch {
                protocol: Protocol::Wol,
            });
        };
        let deadline = Instant::now() + timeout;
        let timeout_ms = timeout.as_millis() as u64;
        let target = resolve(&self.broadcast_addr, deadline, timeout_ms).await?;
        let socket = bind_for(&target).await?;
        socket.set_broadcast(true)?;
        send_datagram(&socket, packet, target, deadline, timeout_ms).await?;
        debug!(
            target: "devctl.protocol",
            device_host = %endpoint.host,
            broadcast = %target,
            "magic_packet_sent"
        );
        Ok(TransportReply::fire_and_forget())
    }
}
