//! 一次分配运行（Run）的结果模型
//!
//! Run 是一次性对象：开始处理时创建，下一次运行时整体丢弃。

use crate::models::record::{Category, Record};
use serde::Serialize;
use std::path::PathBuf;

/// 单个文件在处理流程中的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FileStage {
    Loaded,
    CycleValidated,
    Grouped,
    CategorizedAndSampled,
    AwaitingSingleEvaluatorDecision,
    Assigned,
    Aggregated,
}

/// 三个档位的计数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TierCounts {
    pub top: usize,
    pub middle: usize,
    pub bottom: usize,
}

impl TierCounts {
    /// 统计记录列表中各档位的数量
    pub fn of(records: &[Record]) -> Self {
        records
            .iter()
            .fold(TierCounts::default(), |mut counts, record| {
                match record.category {
                    Some(Category::Top) => counts.top += 1,
                    Some(Category::Middle) => counts.middle += 1,
                    Some(Category::Bottom) => counts.bottom += 1,
                    _ => {}
                }
                counts
            })
    }

    pub fn total(&self) -> usize {
        self.top + self.middle + self.bottom
    }
}

/// 单个评卷人的分档与抽取摘要
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluatorSummary {
    pub evaluator: String,
    pub booklets: usize,
    pub tiers: TierCounts,
    pub picked: TierCounts,
    pub moderator: Option<String>,
}

/// 单个文件成功处理后的分配结果
#[derive(Debug, Clone)]
pub struct FileAllocation {
    pub file_name: String,
    pub source_path: Option<PathBuf>,
    /// 投影后的总行数
    pub total_rows: usize,
    /// 主轮次记录数
    pub present: usize,
    pub evaluator_count: usize,
    /// 已分配复核人的抽中记录
    pub assigned: Vec<Record>,
    /// 全量记录（附带档位 / 抽中标记 / 复核人）
    pub master: Vec<Record>,
    pub summaries: Vec<EvaluatorSummary>,
    /// 分配器返回了 `INSUFFICIENT_MODERATORS`
    pub assignment_failed: bool,
}

impl FileAllocation {
    pub fn absent(&self) -> usize {
        self.total_rows - self.present
    }

    /// 完成提示：抽中答卷数 / 主轮次记录数
    pub fn allocation_message(&self) -> String {
        format!(
            "Allocation Successful: {} out of {} booklets",
            self.assigned.len(),
            self.present
        )
    }
}

/// 单个文件的最终结局
#[derive(Debug, Clone)]
pub enum FileOutcome {
    /// 正常完成并计入汇总
    Aggregated(FileAllocation),
    /// 缺少必需列，未进入核心处理
    Rejected { missing_columns: Vec<String> },
    /// 读取失败
    ReadFailed { reason: String },
    /// 出现非预期的轮次值，整个文件跳过
    SkippedInvalidCycle { invalid_cycles: Vec<String> },
    /// 单评卷人确认时用户取消
    Cancelled,
}

impl FileOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            FileOutcome::Aggregated(_) => "aggregated",
            FileOutcome::Rejected { .. } => "rejected",
            FileOutcome::ReadFailed { .. } => "read_failed",
            FileOutcome::SkippedInvalidCycle { .. } => "skipped_invalid_cycle",
            FileOutcome::Cancelled => "cancelled",
        }
    }
}

/// 单个文件的处理报告
#[derive(Debug, Clone)]
pub struct FileReport {
    pub file_name: String,
    pub outcome: FileOutcome,
}

/// 一次运行的全部结果
#[derive(Debug, Clone, Default)]
pub struct Run {
    pub files: Vec<FileReport>,
    /// 跨文件汇总的抽中记录
    pub all_selected: Vec<Record>,
}

impl Run {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一个文件的结局；成功的文件会并入跨文件汇总
    pub fn push(&mut self, report: FileReport) {
        if let FileOutcome::Aggregated(allocation) = &report.outcome {
            self.all_selected.extend(allocation.assigned.iter().cloned());
        }
        self.files.push(report);
    }

    pub fn allocations(&self) -> impl Iterator<Item = &FileAllocation> {
        self.files.iter().filter_map(|report| match &report.outcome {
            FileOutcome::Aggregated(allocation) => Some(allocation),
            _ => None,
        })
    }

    /// 所有成功文件的全量记录（批量文件的 Master Data）
    pub fn all_master(&self) -> Vec<Record> {
        self.allocations()
            .flat_map(|allocation| allocation.master.iter().cloned())
            .collect()
    }

    pub fn count(&self, label: &str) -> usize {
        self.files
            .iter()
            .filter(|report| report.outcome.label() == label)
            .count()
    }

    pub fn summary(&self, generated_files: &[PathBuf]) -> RunSummary {
        RunSummary {
            total_files: self.files.len(),
            processed: self.count("aggregated"),
            skipped_invalid_cycle: self.count("skipped_invalid_cycle"),
            cancelled: self.count("cancelled"),
            rejected: self.count("rejected"),
            read_failed: self.count("read_failed"),
            total_selected: self.all_selected.len(),
            files: self
                .files
                .iter()
                .map(|report| FileSummary {
                    file_name: report.file_name.clone(),
                    outcome: report.outcome.label(),
                    selected: match &report.outcome {
                        FileOutcome::Aggregated(allocation) => allocation.assigned.len(),
                        _ => 0,
                    },
                })
                .collect(),
            generated_files: generated_files
                .iter()
                .map(|path| path.display().to_string())
                .collect(),
        }
    }
}

/// 运行摘要（写入 JSON 报告）
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub total_files: usize,
    pub processed: usize,
    pub skipped_invalid_cycle: usize,
    pub cancelled: usize,
    pub rejected: usize,
    pub read_failed: usize,
    pub total_selected: usize,
    pub files: Vec<FileSummary>,
    pub generated_files: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileSummary {
    pub file_name: String,
    pub outcome: &'static str,
    pub selected: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allocation(name: &str, assigned: usize) -> FileAllocation {
        FileAllocation {
            file_name: name.to_string(),
            source_path: None,
            total_rows: 10,
            present: 8,
            evaluator_count: 2,
            assigned: vec![Record::default(); assigned],
            master: vec![Record::default(); 10],
            summaries: Vec::new(),
            assignment_failed: false,
        }
    }

    #[test]
    fn test_run_aggregates_only_successful_files() {
        let mut run = Run::new();
        run.push(FileReport {
            file_name: "a.xlsx".to_string(),
            outcome: FileOutcome::Aggregated(allocation("a.xlsx", 3)),
        });
        run.push(FileReport {
            file_name: "b.xlsx".to_string(),
            outcome: FileOutcome::SkippedInvalidCycle {
                invalid_cycles: vec!["makeup".to_string()],
            },
        });
        run.push(FileReport {
            file_name: "c.xlsx".to_string(),
            outcome: FileOutcome::Cancelled,
        });

        assert_eq!(run.all_selected.len(), 3);
        assert_eq!(run.all_master().len(), 10);

        let summary = run.summary(&[]);
        assert_eq!(summary.total_files, 3);
        assert_eq!(summary.processed, 1);
        assert_eq!(summary.skipped_invalid_cycle, 1);
        assert_eq!(summary.cancelled, 1);
        assert_eq!(summary.files[1].selected, 0);
    }

    #[test]
    fn test_allocation_message_counts_selected_over_present() {
        assert_eq!(
            allocation("a.xlsx", 3).allocation_message(),
            "Allocation Successful: 3 out of 8 booklets"
        );
    }

    #[test]
    fn test_absent_count() {
        assert_eq!(allocation("a.xlsx", 0).absent(), 2);
    }
}
