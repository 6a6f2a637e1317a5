//! # 设备控制执行引擎
//!
//! - [`CommandDispatcher`]：单设备分派（前置校验、限时发送、分类、写日志）
//! - [`BatchOrchestrator`]：按空间批量开关机 / 按映射批量执行
//!
//! 每次分派只在得出终态后写入一条执行日志；前置校验失败不写日志。
//! 引擎内没有自动重试。

mod batch;
mod dispatcher;
mod error;

pub use batch::{
    BatchError, BatchOrchestrator, BatchResult, BatchSummary, NO_ELIGIBLE_DEVICES,
    NO_MATCHING_COMMAND, SkippedDevice,
};
pub use dispatcher::{CommandDispatcher, DispatchConfig, ResolvedTarget};
pub use error::{ControlError, PreconditionError};
