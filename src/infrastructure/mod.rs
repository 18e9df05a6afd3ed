//! 基础设施层（Infrastructure Layer）
//!
//! 持有进程级资源（随机源、标准输入），只暴露能力，不认识业务流程。

pub mod console_prompt;
pub mod rng;

pub use console_prompt::{serve_requests, spawn_console_responder};
pub use rng::build_rng;
