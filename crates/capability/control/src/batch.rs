//! 批量执行
//!
//! 把一个逻辑命令（如“101 教室全部开机”）扇出到空间内所有启用设备，
//! 或按 NFC 映射执行一组（设备，命令）对。每个目标一个 tokio 任务，
//! 由信号量限制并发；单个设备的失败或超时不阻塞其他设备。

use crate::dispatcher::{CommandDispatcher, ResolvedTarget};
use crate::error::{ControlError, PreconditionError};
use devctl_storage::{CommandRecord, ExecutionAttemptRecord, PresetRecord};
use devctl_telemetry::{record_batch, record_precondition_rejected};
use domain::{CommandType, ExecutionContext, ResultStatus};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

pub const NO_MATCHING_COMMAND: &str = "no matching command defined";
pub const NO_ELIGIBLE_DEVICES: &str = "no eligible devices";

/// 被跳过的设备（未分派、不写日志）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedDevice {
    pub device_id: String,
    pub device_name: Option<String>,
    pub reason: String,
}

/// 已分派但执行日志写入失败的目标。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchError {
    pub device_id: String,
    pub command_id: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub success: usize,
    pub fail: usize,
    pub timeout: usize,
    pub skipped: usize,
}

/// 批量结果（不持久化）。
#[derive(Debug, Clone)]
pub struct BatchResult {
    pub attempts: Vec<ExecutionAttemptRecord>,
    pub skipped: Vec<SkippedDevice>,
    pub errors: Vec<BatchError>,
    pub summary: BatchSummary,
    pub message: String,
}

impl BatchResult {
    fn build(
        attempts: Vec<ExecutionAttemptRecord>,
        skipped: Vec<SkippedDevice>,
        errors: Vec<BatchError>,
        dispatched: usize,
    ) -> Self {
        let mut summary = BatchSummary {
            skipped: skipped.len(),
            ..BatchSummary::default()
        };
        for attempt in &attempts {
            match attempt.status {
                ResultStatus::Success => summary.success += 1,
                ResultStatus::Fail => summary.fail += 1,
                ResultStatus::Timeout => summary.timeout += 1,
            }
        }
        let message = if dispatched == 0 {
            NO_ELIGIBLE_DEVICES.to_string()
        } else {
            let mut message = format!(
                "{dispatched} device(s) dispatched: {} success, {} fail, {} timeout, {} skipped",
                summary.success, summary.fail, summary.timeout, summary.skipped
            );
            if !errors.is_empty() {
                message.push_str(&format!(", {} not logged", errors.len()));
            }
            message
        };
        Self {
            attempts,
            skipped,
            errors,
            summary,
            message,
        }
    }
}

#[derive(Clone)]
pub struct BatchOrchestrator {
    dispatcher: CommandDispatcher,
    max_concurrency: usize,
}

impl BatchOrchestrator {
    pub fn new(dispatcher: CommandDispatcher, max_concurrency: usize) -> Self {
        Self {
            dispatcher,
            max_concurrency: max_concurrency.max(1),
        }
    }

    pub fn dispatcher(&self) -> &CommandDispatcher {
        &self.dispatcher
    }

    /// 对空间内所有启用设备执行某一类型命令（仅 POWER_ON / POWER_OFF）。
    ///
    /// 每台设备取其预设中 display_order 最小的同类型命令；没有则跳过。
    pub async fn execute_batch(
        &self,
        space_id: &str,
        command_type: CommandType,
        ctx: &ExecutionContext,
    ) -> Result<BatchResult, ControlError> {
        if !command_type.is_batchable() {
            record_precondition_rejected();
            return Err(PreconditionError::UnsupportedBatchCommand(command_type.to_string()).into());
        }
        let inventory = self.dispatcher.inventory();
        if inventory.find_space(space_id).await?.is_none() {
            record_precondition_rejected();
            return Err(PreconditionError::SpaceNotFound(space_id.to_string()).into());
        }

        let devices = inventory.list_space_devices(space_id).await?;
        let mut presets: HashMap<String, Option<(PresetRecord, Vec<CommandRecord>)>> =
            HashMap::new();
        let mut targets = Vec::new();
        let mut skipped = Vec::new();
        for device in devices.into_iter().filter(|device| device.is_active()) {
            if !presets.contains_key(&device.preset_id) {
                let loaded = match inventory.find_preset(&device.preset_id).await? {
                    Some(preset) => {
                        let commands = inventory.list_commands(&preset.preset_id).await?;
                        Some((preset, commands))
                    }
                    None => None,
                };
                presets.insert(device.preset_id.clone(), loaded);
            }
            let Some(Some((preset, commands))) = presets.get(&device.preset_id) else {
                skipped.push(SkippedDevice {
                    device_id: device.device_id.clone(),
                    device_name: Some(device.name.clone()),
                    reason: PreconditionError::PresetNotFound(device.preset_id.clone()).to_string(),
                });
                continue;
            };
            let command = commands.iter().find(|command| {
                command
                    .command_type
                    .parse::<CommandType>()
                    .is_ok_and(|parsed| parsed == command_type)
            });
            match command {
                Some(command) => targets.push(ResolvedTarget {
                    preset: preset.clone(),
                    command: command.clone(),
                    device,
                }),
                None => skipped.push(SkippedDevice {
                    device_id: device.device_id.clone(),
                    device_name: Some(device.name.clone()),
                    reason: NO_MATCHING_COMMAND.to_string(),
                }),
            }
        }

        info!(
            target: "devctl.control",
            space_id = %space_id,
            command_type = %command_type,
            actor_id = %ctx.actor_id,
            targets = targets.len(),
            skipped = skipped.len(),
            "batch_started"
        );
        Ok(self.fan_out(targets, ctx, skipped).await)
    }

    /// 按（设备，命令）映射执行，常用于 NFC 标签触发。
    ///
    /// 未通过前置校验的映射记为跳过，不写日志。
    pub async fn execute_mappings(
        &self,
        mappings: Vec<(String, String)>,
        ctx: &ExecutionContext,
    ) -> Result<BatchResult, ControlError> {
        let mut targets = Vec::new();
        let mut skipped = Vec::new();
        for (device_id, command_id) in mappings {
            match self.dispatcher.resolve(&device_id, &command_id).await {
                Ok(target) => targets.push(target),
                Err(ControlError::Precondition(err)) => skipped.push(SkippedDevice {
                    device_id,
                    device_name: None,
                    reason: err.to_string(),
                }),
                Err(err) => return Err(err),
            }
        }

        info!(
            target: "devctl.control",
            actor_id = %ctx.actor_id,
            trigger = %ctx.trigger,
            targets = targets.len(),
            skipped = skipped.len(),
            "mappings_started"
        );
        Ok(self.fan_out(targets, ctx, skipped).await)
    }

    async fn fan_out(
        &self,
        targets: Vec<ResolvedTarget>,
        ctx: &ExecutionContext,
        skipped: Vec<SkippedDevice>,
    ) -> BatchResult {
        let dispatched = targets.len();
        let mut errors = Vec::new();
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut tasks = JoinSet::new();
        for (index, target) in targets.into_iter().enumerate() {
            let semaphore = semaphore.clone();
            let dispatcher = self.dispatcher.clone();
            let ctx = ctx.clone();
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let result = dispatcher.dispatch_resolved(&target, &ctx, None).await;
                (index, target, result)
            });
        }

        let mut attempts = Vec::with_capacity(dispatched);
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, target, Ok(attempt))) => {
                    attempts.push((target.device.display_order, index, attempt))
                }
                Ok((_, target, Err(err))) => errors.push(BatchError {
                    device_id: target.device.device_id,
                    command_id: target.command.command_id,
                    message: err.to_string(),
                }),
                Err(err) => {
                    warn!(target: "devctl.control", error = %err, "batch_task_failed");
                    errors.push(BatchError {
                        device_id: String::new(),
                        command_id: String::new(),
                        message: err.to_string(),
                    });
                }
            }
        }
        attempts.sort_by(|a, b| {
            a.0.cmp(&b.0)
                .then_with(|| a.2.device_id.cmp(&b.2.device_id))
                .then_with(|| a.1.cmp(&b.1))
        });
        let attempts: Vec<ExecutionAttemptRecord> =
            attempts.into_iter().map(|(_, _, attempt)| attempt).collect();

        record_batch(skipped.len() as u64);
        let result = BatchResult::build(attempts, skipped, errors, dispatched);
        info!(
            target: "devctl.control",
            actor_id = %ctx.actor_id,
            success = result.summary.success,
            fail = result.summary.fail,
            timeout = result.summary.timeout,
            skipped = result.summary.skipped,
            errors = result.errors.len(),
            "batch_completed"
        );
        result
    }
}
