//! # PostgreSQL 存储实现模块
//!
//! ## 包含的实现
//!
//! - **InventoryStore** (`inventory.rs`)：库存只读查询，过滤软删除记录
//! - **ExecutionLogStore** (`execution_log.rs`)：执行日志追加与分页查询
//!
//! ## 数据库模式要求
//!
//! 见 `migrations/0001_device_control.sql`：
//! - `presets` / `commands` / `devices` / `spaces`：库存表（外部维护，`isdel` 软删除）
//! - `execution_logs`：执行日志表（`log_id bigserial`，`ts_ms` 毫秒时间戳）
//!
//! ## 索引
//! - `idx_execution_logs_device_ts`：(device_id, ts_ms desc)
//! - `idx_execution_logs_space_ts`：(space_id, ts_ms desc)
//! - `idx_devices_space`：(space_id, display_order)
//!
//! 所有 SQL 使用参数绑定（`$1`, `$2` 等），禁止字符串拼接用户输入。

pub mod execution_log;
pub mod inventory;

pub use execution_log::*;
pub use inventory::*;
