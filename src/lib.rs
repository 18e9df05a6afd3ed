//! # Moderation Allocator
//!
//! 一个用于答卷复核分配的 Rust 应用程序：从评卷结果中按档位抽取答卷，
//! 并为每位评卷人的抽中答卷指定一位（不是本人的）复核人。
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有进程级资源，只暴露能力
//! - `build_rng` - 可设置种子的随机源
//! - `spawn_console_responder` - 唯一读取标准输入的地方
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，都是可单独测试的纯函数或小服务
//! - `record_filter` / `evaluator_grouper` - 列投影、轮次拆分、分组
//! - `categorizer` / `sampler` - 分档与抽样
//! - `moderator_assigner` - 错排分配复核人
//! - `validation` - 运行前校验
//! - `decision` - 单评卷人时的外部决定
//! - `workbook_writer` / `output_service` - 写出 xlsx
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一位评卷人"的处理流程
//! - `FileCtx` - 上下文封装（文件序号 + 文件名）
//! - `EvaluatorFlow` - 流程编排（分档 → 抽样）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 一次运行：读取、校验、逐个处理、输出
//! - `orchestrator/file_processor` - 单个文件的状态机
//!
//! ## 模块结构

pub mod cli;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{FileOutcome, LoadedFile, Record, Run, RunSummary};
pub use orchestrator::{process_file, App, RunReport};
pub use services::{Decision, DecisionSource};
pub use workflow::{EvaluatorFlow, FileCtx};
