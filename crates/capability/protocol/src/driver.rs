//! 传输驱动抽象与协议查找表

use crate::error::TransportError;
use crate::http::HttpDriver;
use crate::rs232::Rs232Driver;
use crate::tcp::TcpDriver;
use crate::types::{Endpoint, Frame, TransportConfig, TransportReply};
use crate::udp::UdpDriver;
use crate::wol::WolDriver;
use async_trait::async_trait;
use domain::Protocol;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// 传输驱动
///
/// 每次调用独立建立并关闭通道，不在调用之间共享可变状态；
/// 驱动自行执行 `timeout` 截止时间。
#[async_trait]
pub trait TransportDriver: Send + Sync {
    /// 驱动对应的协议
    fn protocol(&self) -> Protocol;

    /// 发送一帧并（可选地）等待应答
    async fn send(
        &self,
        endpoint: &Endpoint,
        frame: &Frame,
        timeout: Duration,
    ) -> Result<TransportReply, TransportError>;
}

/// 按协议标签选择驱动的查找表
#[derive(Clone, Default)]
pub struct DriverRegistry {
    drivers: HashMap<Protocol, Arc<dyn TransportDriver>>,
}

impl DriverRegistry {
    /// 空查找表
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册全部五种内置驱动
    pub fn with_defaults(config: &TransportConfig) -> Result<Self, TransportError> {
        let mut registry = Self::new();
        registry.register(Arc::new(TcpDriver::new(
            config.tcp_quiet_period,
            config.max_response_bytes,
        )));
        registry.register(Arc::new(UdpDriver::new()));
        registry.register(Arc::new(WolDriver::new(config.wol_broadcast_addr.clone())));
        registry.register(Arc::new(HttpDriver::new(config.max_response_bytes)?));
        registry.register(Arc::new(Rs232Driver::new(
            config.rs232_line_terminator.clone(),
            config.tcp_quiet_period,
            config.max_response_bytes,
        )));
        Ok(registry)
    }

    /// 注册驱动，返回被替换的旧驱动
    pub fn register(
        &mut self,
        driver: Arc<dyn TransportDriver>,
    ) -> Option<Arc<dyn TransportDriver>> {
        self.drivers.insert(driver.protocol(), driver)
    }

    pub fn get(&self, protocol: Protocol) -> Option<Arc<dyn TransportDriver>> {
        self.drivers.get(&protocol).cloned()
    }

    /// 已注册协议（按固定顺序）
    pub fn protocols(&self) -> Vec<Protocol> {
        Protocol::ALL
            .into_iter()
            .filter(|protocol| self.drivers.contains_key(protocol))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn defaults_cover_every_protocol() {
        let registry = DriverRegistry::with_defaults(&TransportConfig::default()).unwrap();
        assert_eq!(registry.protocols(), Protocol::ALL.to_vec());
        for protocol in Protocol::ALL {
            assert_eq!(registry.get(protocol).unwrap().protocol(), protocol);
        }
    }

    #[test]
    fn register_replaces_existing_driver() {
        let mut registry = DriverRegistry::new();
        assert!(registry.get(Protocol::Udp).is_none());
        assert!(registry.register(Arc::new(UdpDriver::new())).is_none());
        assert!(registry.register(Arc::new(UdpDriver::new())).is_some());
        assert_eq!(registry.protocols(), vec![Protocol::Udp]);
    }
}
