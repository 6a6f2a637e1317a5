//! 单设备命令分派
//!
//! 前置校验 → 有效地址 → 协议驱动 → 编码 → 限时发送 → 分类 → 写一条执行日志。
//! 前置校验失败不写日志；其余任何结果（含编码错误、驱动缺失、超时）都落为
//! FAIL / TIMEOUT 记录。

use crate::error::{ControlError, PreconditionError};
use devctl_protocol::codec;
use devctl_protocol::{Classification, DriverRegistry, Endpoint, TransportError};
use devctl_storage::{
    CommandRecord, DeviceRecord, ExecutionAttemptRecord, ExecutionLogStore, InventoryStore,
    NewExecutionAttempt, PresetRecord,
};
use devctl_telemetry::{
    record_dispatch, record_dispatch_fail, record_dispatch_latency_ms, record_dispatch_success,
    record_dispatch_timeout, record_log_write_failure, record_precondition_rejected,
};
use domain::{ExecutionContext, Protocol, ResultStatus, now_epoch_ms};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// 分派配置。
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// 单条命令默认截止时间
    pub timeout: Duration,
    /// 调用方指定截止时间的上限
    pub max_timeout: Duration,
    /// 设备与预设均未配置端口时使用（TCP / UDP / RS232）
    pub default_port: u16,
    /// 驱动自身截止时间之外的兜底余量
    pub guard: Duration,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(5000),
            max_timeout: Duration::from_millis(60_000),
            default_port: 4001,
            guard: Duration::from_millis(250),
        }
    }
}

/// 已通过前置校验的分派目标。
#[derive(Debug, Clone)]
pub struct ResolvedTarget {
    pub device: DeviceRecord,
    pub preset: PresetRecord,
    pub command: CommandRecord,
}

#[derive(Clone)]
pub struct CommandDispatcher {
    inventory: Arc<dyn InventoryStore>,
    log_store: Arc<dyn ExecutionLogStore>,
    drivers: Arc<DriverRegistry>,
    config: DispatchConfig,
}

impl CommandDispatcher {
    pub fn new(
        inventory: Arc<dyn InventoryStore>,
        log_store: Arc<dyn ExecutionLogStore>,
        drivers: Arc<DriverRegistry>,
        config: DispatchConfig,
    ) -> Self {
        Self {
            inventory,
            log_store,
            drivers,
            config,
        }
    }

    pub fn inventory(&self) -> &Arc<dyn InventoryStore> {
        &self.inventory
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// 执行单条命令，返回写入的执行记录。
    ///
    /// `timeout` 为空时使用配置的默认截止时间，超出上限时按上限截断。
    pub async fn execute(
        &self,
        device_id: &str,
        command_id: &str,
        ctx: &ExecutionContext,
        timeout: Option<Duration>,
    ) -> Result<ExecutionAttemptRecord, ControlError> {
        let target = match self.resolve(device_id, command_id).await {
            Ok(target) => target,
            Err(ControlError::Precondition(err)) => {
                record_precondition_rejected();
                warn!(
                    target: "devctl.control",
                    device_id = %device_id,
                    command_id = %command_id,
                    actor_id = %ctx.actor_id,
                    error = %err,
                    "execute_rejected"
                );
                return Err(err.into());
            }
            Err(err) => return Err(err),
        };
        self.dispatch_resolved(&target, ctx, timeout).await
    }

    /// 前置校验：设备存在且启用、命令存在且属于设备预设、预设存在。
    pub async fn resolve(
        &self,
        device_id: &str,
        command_id: &str,
    ) -> Result<ResolvedTarget, ControlError> {
        let device = self
            .inventory
            .find_device(device_id)
            .await?
            .ok_or_else(|| PreconditionError::DeviceNotFound(device_id.to_string()))?;
        if !device.is_active() {
            return Err(PreconditionError::DeviceInactive(device_id.to_string()).into());
        }
        let command = self
            .inventory
            .find_command(command_id)
            .await?
            .ok_or_else(|| PreconditionError::CommandNotFound(command_id.to_string()))?;
        if command.preset_id != device.preset_id {
            return Err(PreconditionError::CommandNotInPreset {
                command_id: command_id.to_string(),
                preset_id: device.preset_id.clone(),
            }
            .into());
        }
        let preset = self
            .inventory
            .find_preset(&device.preset_id)
            .await?
            .ok_or_else(|| PreconditionError::PresetNotFound(device.preset_id.clone()))?;
        Ok(ResolvedTarget {
            device,
            preset,
            command,
        })
    }

    /// 对已校验目标执行分派并写日志。
    ///
    /// 发送与写日志在独立任务中完成：调用方放弃等待（客户端断开、外层超时）时，
    /// 已发出的命令仍会落一条执行记录。仅在写日志失败时返回错误。
    pub async fn dispatch_resolved(
        &self,
        target: &ResolvedTarget,
        ctx: &ExecutionContext,
        timeout: Option<Duration>,
    ) -> Result<ExecutionAttemptRecord, ControlError> {
        let dispatcher = self.clone();
        let target = target.clone();
        let ctx = ctx.clone();
        let handle =
            tokio::spawn(async move { dispatcher.dispatch_and_log(&target, &ctx, timeout).await });
        match handle.await {
            Ok(result) => result,
            Err(err) => {
                warn!(target: "devctl.control", error = %err, "dispatch_task_failed");
                Err(ControlError::Task(err.to_string()))
            }
        }
    }

    async fn dispatch_and_log(
        &self,
        target: &ResolvedTarget,
        ctx: &ExecutionContext,
        timeout: Option<Duration>,
    ) -> Result<ExecutionAttemptRecord, ControlError> {
        let started_at = Instant::now();
        let timeout = timeout
            .unwrap_or(self.config.timeout)
            .min(self.config.max_timeout);
        record_dispatch();

        let classification = self.transmit(target, timeout).await;
        let elapsed_ms = started_at.elapsed().as_millis() as u64;
        record_dispatch_latency_ms(elapsed_ms);
        match classification.status {
            ResultStatus::Success => record_dispatch_success(),
            ResultStatus::Fail => record_dispatch_fail(),
            ResultStatus::Timeout => record_dispatch_timeout(),
        }
        info!(
            target: "devctl.control",
            device_id = %target.device.device_id,
            command_id = %target.command.command_id,
            protocol = %target.preset.protocol,
            actor_id = %ctx.actor_id,
            trigger = %ctx.trigger,
            status = %classification.status,
            message = %classification.message,
            elapsed_ms = elapsed_ms,
            "command_dispatched"
        );

        let attempt = NewExecutionAttempt {
            device_id: target.device.device_id.clone(),
            space_id: target.device.space_id.clone(),
            command_id: target.command.command_id.clone(),
            actor_id: ctx.actor_id.clone(),
            trigger: ctx.trigger,
            status: classification.status,
            message: classification.message,
            ts_ms: now_epoch_ms(),
        };
        self.log_store.append(attempt).await.map_err(|err| {
            record_log_write_failure();
            warn!(
                target: "devctl.control",
                device_id = %target.device.device_id,
                command_id = %target.command.command_id,
                error = %err,
                "execution_log_write_failed"
            );
            ControlError::from(err)
        })
    }

    async fn transmit(&self, target: &ResolvedTarget, timeout: Duration) -> Classification {
        let protocol = match target.preset.protocol.parse::<Protocol>() {
            Ok(protocol) => protocol,
            Err(err) => return Classification::fail(err.to_string()),
        };
        let Some(endpoint) = self.endpoint(protocol, &target.device, &target.preset) else {
            return Classification::fail("no network address configured for device");
        };
        let Some(driver) = self.drivers.get(protocol) else {
            return Classification::fail(format!("no driver registered for {protocol}"));
        };
        let frame = match codec::encode(
            protocol,
            &target.command.payload,
            target.device.mac_address.as_deref(),
        ) {
            Ok(frame) => frame,
            Err(err) => return codec::classify_encoding_error(&err),
        };

        let guard = timeout + self.config.guard;
        let send = driver.send(&endpoint, &frame, timeout);
        let result = match tokio::time::timeout(guard, send).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    target: "devctl.control",
                    device_id = %target.device.device_id,
                    protocol = %protocol,
                    guard_ms = guard.as_millis() as u64,
                    "driver_deadline_overrun"
                );
                Err(TransportError::Timeout(timeout.as_millis() as u64))
            }
        };
        codec::classify(protocol, &result)
    }

    /// 有效端点：设备覆盖 > 预设默认 > 协议默认端口。
    ///
    /// WOL 发往广播地址，设备地址可为空。
    fn endpoint(
        &self,
        protocol: Protocol,
        device: &DeviceRecord,
        preset: &PresetRecord,
    ) -> Option<Endpoint> {
        let host = non_blank(device.address.as_deref()).or(non_blank(preset.address.as_deref()));
        let host = match (host, protocol) {
            (Some(host), _) => host.to_string(),
            (None, Protocol::Wol) => String::new(),
            (None, _) => return None,
        };
        let port = device.port.or(preset.port).or(match protocol {
            Protocol::Tcp | Protocol::Udp | Protocol::Rs232 => Some(self.config.default_port),
            Protocol::Http | Protocol::Wol => None,
        });
        Some(Endpoint::new(host, port))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
