//! 数据模型
//!
//! - 库存模型（只读，由外部库存系统维护）：PresetRecord, CommandRecord, DeviceRecord, SpaceRecord
//! - 执行日志模型：NewExecutionAttempt, ExecutionAttemptRecord
//! - 日志查询：ExecutionLogQuery, ExecutionLogPage

use domain::{DeviceStatus, ResultStatus, TriggerType};

/// 预设：协议 + 默认地址 + 命令集合。
///
/// `protocol` 保留原始标签，未知协议在分派时记为 FAIL。
#[derive(Debug, Clone)]
pub struct PresetRecord {
    pub preset_id: String,
    pub name: String,
    pub protocol: String,
    pub address: Option<String>,
    pub port: Option<u16>,
    pub description: Option<String>,
}

/// 命令：载荷编码方式由所属预设的协议决定。
#[derive(Debug, Clone)]
pub struct CommandRecord {
    pub command_id: String,
    pub preset_id: String,
    pub name: String,
    pub payload: String,
    /// POWER_ON / POWER_OFF / INPUT_CHANGE / CUSTOM
    pub command_type: String,
    pub display_order: i32,
}

/// 设备：地址/端口可覆盖预设默认值。
#[derive(Debug, Clone)]
pub struct DeviceRecord {
    pub device_id: String,
    pub space_id: String,
    pub preset_id: String,
    pub name: String,
    pub address: Option<String>,
    pub port: Option<u16>,
    /// WOL 使用的 MAC 地址
    pub mac_address: Option<String>,
    pub status: DeviceStatus,
    pub display_order: i32,
}

impl DeviceRecord {
    pub fn is_active(&self) -> bool {
        self.status == DeviceStatus::Active
    }
}

#[derive(Debug, Clone)]
pub struct SpaceRecord {
    pub space_id: String,
    pub name: String,
}

/// 待写入的执行记录（终态，写入后不可变）。
#[derive(Debug, Clone)]
pub struct NewExecutionAttempt {
    pub device_id: String,
    /// 写入时冗余设备所在空间，便于按空间过滤
    pub space_id: String,
    pub command_id: String,
    pub actor_id: String,
    pub trigger: TriggerType,
    pub status: ResultStatus,
    pub message: String,
    pub ts_ms: i64,
}

/// 已持久化的执行记录。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionAttemptRecord {
    pub log_id: i64,
    pub device_id: String,
    pub space_id: String,
    pub command_id: String,
    pub actor_id: String,
    pub trigger: TriggerType,
    pub status: ResultStatus,
    pub message: String,
    pub ts_ms: i64,
}

impl ExecutionAttemptRecord {
    pub fn from_new(log_id: i64, attempt: NewExecutionAttempt) -> Self {
        Self {
            log_id,
            device_id: attempt.device_id,
            space_id: attempt.space_id,
            command_id: attempt.command_id,
            actor_id: attempt.actor_id,
            trigger: attempt.trigger,
            status: attempt.status,
            message: attempt.message,
            ts_ms: attempt.ts_ms,
        }
    }
}

pub const DEFAULT_PAGE_LIMIT: u32 = 20;
pub const MAX_PAGE_LIMIT: u32 = 100;

/// 执行日志查询条件（时间范围为闭区间，毫秒）。
#[derive(Debug, Clone)]
pub struct ExecutionLogQuery {
    pub device_id: Option<String>,
    pub space_id: Option<String>,
    pub status: Option<ResultStatus>,
    pub from_ms: Option<i64>,
    pub to_ms: Option<i64>,
    pub page: u32,
    pub limit: u32,
}

impl Default for ExecutionLogQuery {
    fn default() -> Self {
        Self {
            device_id: None,
            space_id: None,
            status: None,
            from_ms: None,
            to_ms: None,
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl ExecutionLogQuery {
    /// 页码至少为 1；每页条数限制在 1..=100。
    pub fn normalized(mut self) -> Self {
        self.page = self.page.max(1);
        self.limit = self.limit.clamp(1, MAX_PAGE_LIMIT);
        self
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }

    pub fn matches(&self, record: &ExecutionAttemptRecord) -> bool {
        self.device_id
            .as_deref()
            .is_none_or(|device_id| record.device_id == device_id)
            && self
                .space_id
                .as_deref()
                .is_none_or(|space_id| record.space_id == space_id)
            && self.status.is_none_or(|status| record.status == status)
            && self.from_ms.is_none_or(|from| record.ts_ms >= from)
            && self.to_ms.is_none_or(|to| record.ts_ms <= to)
    }
}

/// 分页结果（按时间倒序）。
#[derive(Debug, Clone)]
pub struct ExecutionLogPage {
    pub items: Vec<ExecutionAttemptRecord>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
}

impl ExecutionLogPage {
    pub fn new(items: Vec<ExecutionAttemptRecord>, total: u64, query: &ExecutionLogQuery) -> Self {
        Self {
            items,
            total,
            page: query.page,
            limit: query.limit,
            total_pages: total.div_ceil(u64::from(query.limit.max(1))),
        }
    }

    /// 列表展示序号：`total - offset - index`，首条最大。
    pub fn display_no(&self, index: usize) -> u64 {
        let offset = u64::from(self.page.saturating_sub(1)) * u64::from(self.limit);
        self.total.saturating_sub(offset + index as u64)
    }
}
