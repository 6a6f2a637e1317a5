//! 内存存储实现模块
//!
//! 用于测试和本地演示。
//!
//! 包含以下实现：
//! - InventoryStore: InMemoryInventoryStore
//! - ExecutionLogStore: InMemoryExecutionLogStore

pub mod execution_log;
pub mod inventory;

pub use execution_log::*;
pub use inventory::*;
