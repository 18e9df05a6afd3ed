//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责一次运行的整体调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量文件处理器
//! - 管理一次运行的生命周期（读取、校验、处理、输出）
//! - 按输入顺序逐个处理文件
//! - 输出全局统计信息和运行摘要
//!
//! ### `file_processor` - 单个文件处理器
//! - 校验必需列与轮次
//! - 按评卷人分组，委托 EvaluatorFlow 分档与抽样
//! - 单评卷人时请求外部决定，否则分配复核人
//! - 输出单个文件的统计信息
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<LoadedFile>)
//!     ↓
//! file_processor (处理单个文件)
//!     ↓
//! workflow::EvaluatorFlow (处理单位评卷人)
//!     ↓
//! services (能力层：过滤 / 分组 / 分档 / 抽样 / 分配 / 输出)
//!     ↓
//! infrastructure (基础设施：随机源 / 控制台)
//! ```

pub mod batch_processor;
pub mod file_processor;

// 重新导出主要类型
pub use batch_processor::{App, RunReport};
pub use file_processor::process_file;
