//! 按评卷人分组 - 业务能力层

use crate::models::Record;
use indexmap::IndexMap;

/// 评卷人 → 该评卷人的答卷（保持输入顺序）
pub type EvaluatorGroups = IndexMap<String, Vec<Record>>;

/// 按评卷人分组
///
/// 分组顺序为评卷人首次出现的顺序；缺失评卷人归入 `Unknown`。
pub fn group_by_evaluator(records: &[Record]) -> EvaluatorGroups {
    let mut groups = EvaluatorGroups::new();
    for record in records {
        groups
            .entry(record.evaluator().to_string())
            .or_default()
            .push(record.clone());
    }
    groups
}
