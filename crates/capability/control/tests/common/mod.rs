#![allow(dead_code)]

use async_trait::async_trait;
use devctl_control::{BatchOrchestrator, CommandDispatcher, DispatchConfig};
use devctl_protocol::{
    DriverRegistry, Endpoint, Frame, TransportDriver, TransportError, TransportReply,
};
use devctl_storage::{
    CommandRecord, DeviceRecord, ExecutionAttemptRecord, ExecutionLogPage, ExecutionLogQuery,
    ExecutionLogStore, InMemoryExecutionLogStore, InMemoryInventoryStore, NewExecutionAttempt,
    PresetRecord, SpaceRecord, StorageError,
};
use domain::{DeviceStatus, Protocol};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// 按主机名决定行为的脚本化驱动：
/// - `ok*`：立即应答 `OK`
/// - `slow*`：等到截止时间后返回超时
/// - `hang*`：无视截止时间一直挂起
/// - `refuse*`：连接被拒绝
/// - `delay*`：200 ms 后应答 `OK`
pub struct StubDriver {
    protocol: Protocol,
    calls: AtomicUsize,
    endpoints: Mutex<Vec<Endpoint>>,
}

impl StubDriver {
    pub fn new(protocol: Protocol) -> Arc<Self> {
        Arc::new(Self {
            protocol,
            calls: AtomicUsize::new(0),
            endpoints: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn endpoints(&self) -> Vec<Endpoint> {
        self.endpoints.lock().unwrap().clone()
    }
}

#[async_trait]
impl TransportDriver for StubDriver {
    fn protocol(&self) -> Protocol {
        self.protocol
    }

    async fn send(
        &self,
        endpoint: &Endpoint,
        _frame: &Frame,
        timeout: Duration,
    ) -> Result<TransportReply, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.endpoints.lock().unwrap().push(endpoint.clone());
        let host = endpoint.host.as_str();
        if host.starts_with("ok") {
            Ok(TransportReply::replied(b"OK".to_vec()))
        } else if host.starts_with("slow") {
            tokio::time::sleep(timeout).await;
            Err(TransportError::Timeout(timeout.as_millis() as u64))
        } else if host.starts_with("hang") {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(TransportReply::written())
        } else if host.starts_with("refuse") {
            Err(TransportError::Refused(format!("{host}: connection refused")))
        } else if host.starts_with("delay") {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(TransportReply::replied(b"OK".to_vec()))
        } else {
            Ok(TransportReply::fire_and_forget())
        }
    }
}

/// 追加总是失败的日志存储
pub struct FailingLogStore;

#[async_trait]
impl ExecutionLogStore for FailingLogStore {
    async fn append(
        &self,
        _attempt: NewExecutionAttempt,
    ) -> Result<ExecutionAttemptRecord, StorageError> {
        Err(StorageError::new("database unavailable"))
    }

    async fn list(&self, _query: &ExecutionLogQuery) -> Result<ExecutionLogPage, StorageError> {
        Err(StorageError::new("database unavailable"))
    }
}

pub struct Fixture {
    pub inventory: Arc<InMemoryInventoryStore>,
    pub logs: Arc<InMemoryExecutionLogStore>,
    pub tcp: Arc<StubDriver>,
    pub wol: Arc<StubDriver>,
    pub drivers: Arc<DriverRegistry>,
}

impl Fixture {
    pub fn new() -> Self {
        let tcp = StubDriver::new(Protocol::Tcp);
        let wol = StubDriver::new(Protocol::Wol);
        let mut registry = DriverRegistry::new();
        registry.register(tcp.clone());
        registry.register(wol.clone());
        let fixture = Self {
            inventory: Arc::new(InMemoryInventoryStore::new()),
            logs: Arc::new(InMemoryExecutionLogStore::new()),
            tcp,
            wol,
            drivers: Arc::new(registry),
        };
        fixture.space("room-101");
        fixture.preset("preset-tcp", "TCP", None);
        fixture.command("power-on", "preset-tcp", "POWER_ON", 1);
        fixture.command("power-off", "preset-tcp", "POWER_OFF", 2);
        fixture.command("input-hdmi", "preset-tcp", "INPUT_CHANGE", 3);
        fixture
    }

    pub fn space(&self, space_id: &str) {
        self.inventory
            .upsert_space(SpaceRecord {
                space_id: space_id.to_string(),
                name: space_id.to_string(),
            })
            .unwrap();
    }

    pub fn preset(&self, preset_id: &str, protocol: &str, port: Option<u16>) {
        self.inventory
            .upsert_preset(PresetRecord {
                preset_id: preset_id.to_string(),
                name: preset_id.to_string(),
                protocol: protocol.to_string(),
                address: None,
                port,
                description: None,
            })
            .unwrap();
    }

    pub fn preset_record(&self, record: PresetRecord) {
        self.inventory.upsert_preset(record).unwrap();
    }

    pub fn command(&self, command_id: &str, preset_id: &str, command_type: &str, order: i32) {
        self.inventory
            .upsert_command(CommandRecord {
                command_id: command_id.to_string(),
                preset_id: preset_id.to_string(),
                name: command_id.to_string(),
                payload: "A5 5A 01".to_string(),
                command_type: command_type.to_string(),
                display_order: order,
            })
            .unwrap();
    }

    pub fn device(&self, device_id: &str, preset_id: &str, host: &str, order: i32) {
        self.device_record(DeviceRecord {
            device_id: device_id.to_string(),
            space_id: "room-101".to_string(),
            preset_id: preset_id.to_string(),
            name: format!("Device {device_id}"),
            address: Some(host.to_string()),
            port: None,
            mac_address: None,
            status: DeviceStatus::Active,
            display_order: order,
        });
    }

    pub fn device_record(&self, record: DeviceRecord) {
        self.inventory.upsert_device(record).unwrap();
    }

    pub fn dispatcher(&self, timeout: Duration) -> CommandDispatcher {
        self.dispatcher_with_log(timeout, self.logs.clone())
    }

    pub fn dispatcher_with_log(
        &self,
        timeout: Duration,
        logs: Arc<dyn ExecutionLogStore>,
    ) -> CommandDispatcher {
        CommandDispatcher::new(
            self.inventory.clone(),
            logs,
            self.drivers.clone(),
            DispatchConfig {
                timeout,
                max_timeout: Duration::from_secs(60),
                default_port: 4001,
                guard: Duration::from_millis(50),
            },
        )
    }

    pub fn orchestrator(&self, timeout: Duration, max_concurrency: usize) -> BatchOrchestrator {
        BatchOrchestrator::new(self.dispatcher(timeout), max_concurrency)
    }

    pub fn log_count(&self) -> usize {
        self.logs.len().unwrap()
    }
}
