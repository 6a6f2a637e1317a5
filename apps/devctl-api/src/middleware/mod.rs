//! 请求级中间件与请求头提取

mod actor;
mod request_context;

pub use actor::{ACTOR_HEADER, require_actor};
pub use request_context::request_context;
