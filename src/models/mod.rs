pub mod loaders;
pub mod record;
pub mod run;

pub use loaders::{load_workbook, read_workbook, LoadedFile};
pub use record::{
    columns, Category, RawRow, Record, RecordKey, Selection, CYCLE_SENTINEL, IMPORT_COLUMNS,
    INSUFFICIENT_MODERATORS, REQUIRED_COLUMNS, UNKNOWN_EVALUATOR,
};
pub use run::{
    EvaluatorSummary, FileAllocation, FileOutcome, FileReport, FileStage, Run, RunSummary,
    TierCounts,
};
