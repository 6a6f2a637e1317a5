//! Handlers 模块

pub mod control;
pub mod health;
pub mod logs;
pub mod metrics;

pub use control::*;
pub use health::*;
pub use logs::*;
pub use metrics::*;
