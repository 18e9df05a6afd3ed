//! 单个文件处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块负责处理单个输入文件，是文件级别的编排器。
//!
//! ## 处理阶段
//!
//! ```text
//! Loaded → CycleValidated → Grouped → CategorizedAndSampled
//!        → (AwaitingSingleEvaluatorDecision) → Assigned → Aggregated
//! ```
//!
//! 终止结局：缺少必需列（Rejected）、轮次异常（SkippedInvalidCycle）、
//! 用户取消（Cancelled）。任何一种都只影响当前文件。

use crate::config::Config;
use crate::models::{
    EvaluatorSummary, FileAllocation, FileOutcome, FileStage, LoadedFile, Record,
    IMPORT_COLUMNS, INSUFFICIENT_MODERATORS,
};
use crate::services::decision::{Decision, DecisionSource, SingleEvaluatorPrompt};
use crate::services::evaluator_grouper::group_by_evaluator;
use crate::services::moderator_assigner::{assign, AssignmentOutcome};
use crate::services::record_filter::{filter_columns, invalid_cycles, split_by_cycle};
use crate::utils::logging::{log_evaluator_summary, log_file_data};
use crate::workflow::{build_master, EvaluatorFlow, EvaluatorResult, FileCtx};
use indexmap::IndexMap;
use rand::Rng;
use tracing::{debug, error, info, warn};

/// 处理单个文件
///
/// # 参数
/// - `file`: 已读取的文件
/// - `ctx`: 文件上下文（用于日志）
/// - `config`: 配置
/// - `decisions`: 单评卷人时的决策来源
/// - `rng`: 抽样与分配共用的随机源
///
/// # 返回
/// 文件的最终结局，不会返回错误
pub async fn process_file<D, R>(
    file: LoadedFile,
    ctx: &FileCtx,
    config: &Config,
    decisions: &D,
    rng: &mut R,
) -> FileOutcome
where
    D: DecisionSource,
    R: Rng + ?Sized,
{
    log_file_start(ctx, file.rows.len());

    if let Err(e) = file.validate_columns() {
        error!("{} ❌ {}", ctx, e);
        return FileOutcome::Rejected {
            missing_columns: file.missing_columns(),
        };
    }

    let records = filter_columns(&file.rows, &IMPORT_COLUMNS);
    enter(ctx, FileStage::Loaded);

    // ========== 轮次校验 ==========
    let invalid = invalid_cycles(&records, &config.first_cycle_name);
    if !invalid.is_empty() {
        warn!(
            "{} ⛔ 跳过处理，发现异常轮次: {}",
            ctx,
            invalid.join(", ")
        );
        return FileOutcome::SkippedInvalidCycle {
            invalid_cycles: invalid,
        };
    }
    info!("{} ✅ 未发现异常轮次", ctx);
    let (primary, others) = split_by_cycle(&records, &config.first_cycle_name);
    enter(ctx, FileStage::CycleValidated);

    // ========== 分组 ==========
    let groups = group_by_evaluator(&primary);
    let pool: Vec<String> = groups.keys().cloned().collect();
    enter(ctx, FileStage::Grouped);

    // ========== 分档与抽样 ==========
    let flow = EvaluatorFlow::new(config);
    let results: Vec<EvaluatorResult> = groups
        .iter()
        .map(|(evaluator, booklets)| flow.run(evaluator, booklets, &mut *rng))
        .collect();
    let categorized: Vec<Record> = results
        .iter()
        .flat_map(|result| result.categorized.iter().cloned())
        .collect();
    let selected: Vec<Record> = results
        .iter()
        .flat_map(|result| result.selected.iter().cloned())
        .collect();
    enter(ctx, FileStage::CategorizedAndSampled);

    // ========== 分配复核人 ==========
    let mut assignment_failed = false;
    let assigned = match pool.as_slice() {
        [] => {
            warn!("{} ⚠️ 没有主轮次记录，无需分配", ctx);
            Vec::new()
        }
        [sole] => {
            enter(ctx, FileStage::AwaitingSingleEvaluatorDecision);
            warn!("{} ⚠️ 只有一位评卷人: {}", ctx, sole);
            match resolve_single_evaluator(ctx, sole, &selected, decisions).await {
                Some(moderator) => selected
                    .iter()
                    .cloned()
                    .map(|record| record.with_moderator(moderator.clone()))
                    .collect(),
                None => return FileOutcome::Cancelled,
            }
        }
        _ => {
            info!("{} ✅ 共 {} 位评卷人，开始分配复核人", ctx, pool.len());
            match assign(&selected, &pool, rng) {
                AssignmentOutcome::Assigned { records, .. } => records,
                AssignmentOutcome::InsufficientModerators { records } => {
                    error!(
                        "{} ❌ 复核人不足，抽中答卷已标记为 {}",
                        ctx, INSUFFICIENT_MODERATORS
                    );
                    assignment_failed = true;
                    records
                }
            }
        }
    };
    enter(ctx, FileStage::Assigned);

    // ========== 汇总 ==========
    let moderators = moderators_by_evaluator(&assigned);
    let summaries: Vec<EvaluatorSummary> = results
        .iter()
        .map(|result| result.summary(moderators.get(&result.evaluator).cloned()))
        .collect();

    let allocation = FileAllocation {
        file_name: ctx.file_name.clone(),
        source_path: ctx.source_path.clone(),
        total_rows: records.len(),
        present: primary.len(),
        evaluator_count: pool.len(),
        master: build_master(&categorized, &assigned, &others),
        assigned,
        summaries,
        assignment_failed,
    };
    enter(ctx, FileStage::Aggregated);

    log_file_complete(ctx, &allocation);

    FileOutcome::Aggregated(allocation)
}

/// 向决策方请求单评卷人的处理方式
///
/// 返回复核人；`None` 表示取消处理该文件。
async fn resolve_single_evaluator<D: DecisionSource>(
    ctx: &FileCtx,
    evaluator: &str,
    selected: &[Record],
    decisions: &D,
) -> Option<String> {
    let prompt = SingleEvaluatorPrompt {
        evaluator: evaluator.to_string(),
        booklets: selected.to_vec(),
        file_name: ctx.file_name.clone(),
    };

    match decisions.decide(prompt).await.normalized() {
        Decision::Same => {
            info!("{} ✅ 用户选择由评卷人本人复核: {}", ctx, evaluator);
            Some(evaluator.to_string())
        }
        Decision::Different(moderator) => {
            info!("{} ✅ 用户指定复核人: {}", ctx, moderator);
            Some(moderator)
        }
        Decision::DifferentCancelled => {
            warn!("{} ⛔ 用户取消输入复核人ID", ctx);
            None
        }
        Decision::Cancel => {
            warn!("{} ⛔ 用户选择跳过该文件", ctx);
            None
        }
    }
}

/// 评卷人 → 复核人（取自已分配的记录）
fn moderators_by_evaluator(assigned: &[Record]) -> IndexMap<String, String> {
    let mut moderators = IndexMap::new();
    for record in assigned {
        if let Some(moderator) = &record.moderated_by {
            moderators
                .entry(record.evaluator().to_string())
                .or_insert_with(|| moderator.clone());
        }
    }
    moderators
}

// ========== 日志辅助函数 ==========

fn enter(ctx: &FileCtx, stage: FileStage) {
    debug!("{} 阶段: {:?}", ctx, stage);
}

fn log_file_start(ctx: &FileCtx, row_count: usize) {
    info!("\n{} {}", ctx, "─".repeat(30));
    info!("{} 开始处理，共 {} 行", ctx, row_count);
}

fn log_file_complete(ctx: &FileCtx, allocation: &FileAllocation) {
    let prefix = ctx.to_string();
    log_file_data(&prefix, allocation);
    info!("{} {}", prefix, allocation.allocation_message());

    info!("{} 👥 评卷人明细:", prefix);
    for summary in &allocation.summaries {
        log_evaluator_summary(&prefix, summary);
    }
    info!("{} ✅ 文件处理完成\n", prefix);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RawRow, Selection};
    use crate::services::decision::{FixedDecision, ScriptedDecisions};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn headers() -> Vec<String> {
        IMPORT_COLUMNS.iter().map(|c| c.to_string()).collect()
    }

    fn row(evaluator: &str, script: &str, marks: u32, cycle: &str) -> RawRow {
        let mut row = RawRow::new();
        row.insert("Evaluated By".to_string(), evaluator.to_string());
        row.insert("Evaluator Id".to_string(), format!("{}-id", evaluator));
        row.insert("Script Id".to_string(), script.to_string());
        row.insert("Total Marks".to_string(), marks.to_string());
        row.insert("Cycle".to_string(), cycle.to_string());
        row.insert("Schedule Id".to_string(), format!("T-{}", script));
        row
    }

    fn file_of(name: &str, rows: Vec<RawRow>) -> LoadedFile {
        LoadedFile::from_rows(name, headers(), rows)
    }

    fn ctx(name: &str) -> FileCtx {
        FileCtx::new(1, name, None)
    }

    async fn run_one<D: DecisionSource>(file: LoadedFile, decisions: &D) -> FileOutcome {
        let name = file.name.clone();
        let mut rng = StdRng::seed_from_u64(42);
        process_file(file, &ctx(&name), &Config::default(), decisions, &mut rng).await
    }

    #[tokio::test]
    async fn test_missing_columns_rejects_file() {
        let file = LoadedFile::from_rows("bad.xlsx", vec!["Evaluated By".to_string()], Vec::new());
        let outcome = run_one(file, &FixedDecision(Decision::Same)).await;
        let FileOutcome::Rejected { missing_columns } = outcome else {
            panic!("应当被拒绝");
        };
        assert_eq!(missing_columns, vec!["Evaluator Id", "Script Id", "Cycle"]);
    }

    #[tokio::test]
    async fn test_invalid_cycle_skips_whole_file() {
        let rows = vec![
            row("A", "1", 10, "primary"),
            row("B", "2", 20, "makeup"),
            row("B", "3", 30, "-"),
        ];
        let outcome = run_one(file_of("cycles.xlsx", rows), &FixedDecision(Decision::Same)).await;
        let FileOutcome::SkippedInvalidCycle { invalid_cycles } = outcome else {
            panic!("应当跳过");
        };
        assert_eq!(invalid_cycles, vec!["makeup"]);
    }

    #[tokio::test]
    async fn test_multiple_evaluators_are_deranged() {
        let mut rows = Vec::new();
        for evaluator in ["A", "B", "C"] {
            for i in 0..10 {
                rows.push(row(evaluator, &format!("{}{}", evaluator, i), i * 7, "primary"));
            }
        }
        rows.push(row("A", "absent-1", 0, "-"));

        let outcome = run_one(file_of("multi.xlsx", rows), &FixedDecision(Decision::Cancel)).await;
        let FileOutcome::Aggregated(allocation) = outcome else {
            panic!("应当处理成功");
        };

        assert_eq!(allocation.total_rows, 31);
        assert_eq!(allocation.present, 30);
        assert_eq!(allocation.absent(), 1);
        assert_eq!(allocation.evaluator_count, 3);
        assert!(!allocation.assignment_failed);
        // 每位评卷人 ceil(5%·10) + ceil(10%·10) + ceil(5%·10) = 3
        assert_eq!(allocation.assigned.len(), 9);
        assert_eq!(
            allocation.allocation_message(),
            "Allocation Successful: 9 out of 30 booklets"
        );
        for record in &allocation.assigned {
            let moderator = record.moderated_by.as_deref().unwrap();
            assert_ne!(moderator, record.evaluated_by);
        }

        assert_eq!(allocation.master.len(), 31);
        assert_eq!(
            allocation.master.iter().filter(|r| r.is_selected()).count(),
            9
        );
        let last = allocation.master.last().unwrap();
        assert_eq!(last.value("Category"), "N/A");
        assert_eq!(last.selection, Selection::NotSelected);

        assert_eq!(allocation.summaries.len(), 3);
        assert!(allocation.summaries.iter().all(|s| s.moderator.is_some()));
    }

    #[tokio::test]
    async fn test_single_evaluator_same_and_different() {
        let rows = || -> Vec<RawRow> {
            (0..10).map(|i| row("A", &i.to_string(), i, "primary")).collect()
        };

        let same = run_one(file_of("solo.xlsx", rows()), &FixedDecision(Decision::Same)).await;
        let FileOutcome::Aggregated(allocation) = same else {
            panic!("应当处理成功");
        };
        assert!(allocation
            .assigned
            .iter()
            .all(|r| r.moderated_by.as_deref() == Some("A")));

        let different = run_one(
            file_of("solo.xlsx", rows()),
            &FixedDecision(Decision::Different("Z".to_string())),
        )
        .await;
        let FileOutcome::Aggregated(allocation) = different else {
            panic!("应当处理成功");
        };
        assert!(!allocation.assigned.is_empty());
        assert!(allocation
            .assigned
            .iter()
            .all(|r| r.moderated_by.as_deref() == Some("Z")));
    }

    #[tokio::test]
    async fn test_single_evaluator_cancel_variants() {
        let decisions = ScriptedDecisions::new([
            Decision::Cancel,
            Decision::Different("  ".to_string()),
            Decision::DifferentCancelled,
        ]);
        for name in ["x.xlsx", "y.xlsx", "z.xlsx"] {
            let rows: Vec<RawRow> = (0..5).map(|i| row("A", &i.to_string(), i, "primary")).collect();
            let outcome = run_one(file_of(name, rows), &decisions).await;
            assert!(matches!(outcome, FileOutcome::Cancelled));
        }
        assert_eq!(decisions.asked_files(), vec!["x.xlsx", "y.xlsx", "z.xlsx"]);
    }

    #[tokio::test]
    async fn test_no_primary_records_produces_empty_allocation() {
        let rows = vec![row("A", "1", 10, "-"), row("B", "2", 10, "")];
        let decisions = ScriptedDecisions::default();
        let outcome = run_one(file_of("empty.xlsx", rows), &decisions).await;
        let FileOutcome::Aggregated(allocation) = outcome else {
            panic!("应当处理成功");
        };
        assert!(allocation.assigned.is_empty());
        assert_eq!(allocation.master.len(), 2);
        assert!(decisions.asked_files().is_empty());
    }
}
