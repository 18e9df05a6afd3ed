pub mod evaluator_flow;
pub mod file_ctx;
pub mod master_table;

pub use evaluator_flow::{EvaluatorFlow, EvaluatorResult};
pub use file_ctx::FileCtx;
pub use master_table::build_master;
