//! 存储接口 Trait 定义
//!
//! - InventoryStore：库存只读接口（预设、命令、设备、空间）
//! - ExecutionLogStore：执行日志，仅追加
//!
//! 设计原则：
//! - 已软删除的库存记录对引擎不可见
//! - 所有接口返回 StorageError
//! - 使用 async_trait 支持动态分发

use crate::error::StorageError;
use crate::models::{
    CommandRecord, DeviceRecord, ExecutionAttemptRecord, ExecutionLogPage, ExecutionLogQuery,
    NewExecutionAttempt, PresetRecord, SpaceRecord,
};
use async_trait::async_trait;

/// 库存存储接口（只读）
#[async_trait]
pub trait InventoryStore: Send + Sync {
    async fn find_device(&self, device_id: &str) -> Result<Option<DeviceRecord>, StorageError>;

    async fn find_preset(&self, preset_id: &str) -> Result<Option<PresetRecord>, StorageError>;

    async fn find_command(&self, command_id: &str) -> Result<Option<CommandRecord>, StorageError>;

    /// 列出预设下的命令（按 display_order 升序）
    async fn list_commands(&self, preset_id: &str) -> Result<Vec<CommandRecord>, StorageError>;

    async fn find_space(&self, space_id: &str) -> Result<Option<SpaceRecord>, StorageError>;

    /// 列出空间内的设备（含停用设备，按 display_order、device_id 排序）
    async fn list_space_devices(&self, space_id: &str) -> Result<Vec<DeviceRecord>, StorageError>;
}

/// 执行日志存储接口
///
/// 每次分派只在得出终态后写入一条；写入后不可修改。
#[async_trait]
pub trait ExecutionLogStore: Send + Sync {
    /// 追加一条记录并分配序列号
    async fn append(
        &self,
        attempt: NewExecutionAttempt,
    ) -> Result<ExecutionAttemptRecord, StorageError>;

    /// 按条件分页查询（时间倒序）
    async fn list(&self, query: &ExecutionLogQuery) -> Result<ExecutionLogPage, StorageError>;
}
