//! 短连接 TCP 交互（TCP 与 RS-232 over IP 共用）
//!
//! 连接 → 写出 → 静默期内等待首个应答 → 按终止符/长度/EOF/截止时间收尾 → 关闭。

use crate::error::TransportError;
use crate::types::TransportReply;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{Instant, timeout_at};
use tracing::debug;

/// 应答读取策略
#[derive(Debug, Clone)]
pub(crate) struct ReadPolicy {
    pub quiet_period: Duration,
    pub max_bytes: usize,
    /// 任一字节出现即视为应答结束；为空时读到首个数据块即结束
    pub terminators: Vec<u8>,
}

impl ReadPolicy {
    fn is_complete(&self, response: &[u8]) -> bool {
        response.len() >= self.max_bytes
            || self.terminators.is_empty()
            || response.iter().any(|byte| self.terminators.contains(byte))
    }
}

/// 在截止时间内解析主机地址
pub(crate) async fn resolve(
    authority: &str,
    deadline: Instant,
    timeout_ms: u64,
) -> Result<SocketAddr, TransportError> {
    let mut addrs = match timeout_at(deadline, tokio::net::lookup_host(authority)).await {
        Ok(Ok(addrs)) => addrs,
        Ok(Err(err)) => return Err(TransportError::Resolve(format!("{authority}: {err}"))),
        Err(_) => return Err(TransportError::Timeout(timeout_ms)),
    };
    addrs
        .next()
        .ok_or_else(|| TransportError::Resolve(format!("{authority}: no address")))
}

pub(crate) async fn exchange(
    authority: &str,
    payload: &[u8],
    timeout: Duration,
    policy: &ReadPolicy,
) -> Result<TransportReply, TransportError> {
    let deadline = Instant::now() + timeout;
    let timeout_ms = timeout.as_millis() as u64;
    let addr = resolve(authority, deadline, timeout_ms).await?;

    let mut stream = match timeout_at(deadline, TcpStream::connect(addr)).await {
        Ok(Ok(stream)) => stream,
        Ok(Err(err)) => return Err(TransportError::from_io(err, authority)),
        Err(_) => return Err(TransportError::Timeout(timeout_ms)),
    };

    let write = async {
        stream.write_all(payload).await?;
        stream.flush().await
    };
    match timeout_at(deadline, write).await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => return Err(TransportError::from_io(err, authority)),
        Err(_) => return Err(TransportError::Timeout(timeout_ms)),
    }
    debug!(target: "devctl.protocol", peer = %authority, bytes = payload.len(), "payload_written");

    let mut chunk = vec![0u8; policy.max_bytes.clamp(1, 4096)];
    let mut response = Vec::new();

    let quiet_deadline = Instant::now() + policy.quiet_period;
    match timeout_at(quiet_deadline.min(deadline), stream.read(&mut chunk)).await {
        Err(_) if quiet_deadline <= deadline => {
            let _ = stream.shutdown().await;
            return Ok(TransportReply::written());
        }
        Err(_) => return Err(TransportError::Timeout(timeout_ms)),
        Ok(Ok(0)) => return Ok(TransportReply::written()),
        Ok(Ok(n)) => response.extend_from_slice(&chunk[..n]),
        Ok(Err(err)) => return Err(TransportError::from_io(err, authority)),
    }

    while !policy.is_complete(&response) {
        match timeout_at(deadline, stream.read(&mut chunk)).await {
            Ok(Ok(0)) | Err(_) => break,
            Ok(Ok(n)) => response.extend_from_slice(&chunk[..n]),
            Ok(Err(err)) => {
                debug!(
                    target: "devctl.protocol",
                    peer = %authority,
                    error = %err,
                    "read_aborted_after_partial_reply"
                );
                break;
            }
        }
    }
    response.truncate(policy.max_bytes);
    let _ = stream.shutdown().await;
    Ok(TransportReply::replied(response))
}
