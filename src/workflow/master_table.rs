//! 全量表构建 - 流程层
//!
//! 主轮次记录按评卷人分组、组内按排名排列，附带档位、抽中标记和复核人；
//! 非主轮次记录追加在末尾，档位为 `N/A`，不抽中，复核人为空。

use crate::models::{Category, Record, RecordKey, Selection};
use std::collections::HashMap;

/// 构建全量表
///
/// - `categorized`: 各评卷人已分档的答卷（按分组及排名顺序）
/// - `assigned`: 已分配复核人的抽中答卷
/// - `others`: 非主轮次记录
pub fn build_master(categorized: &[Record], assigned: &[Record], others: &[Record]) -> Vec<Record> {
    let moderators: HashMap<RecordKey, Option<String>> = assigned
        .iter()
        .map(|record| (record.key(), record.moderated_by.clone()))
        .collect();

    let primary = categorized.iter().cloned().map(|mut record| {
        match moderators.get(&record.key()) {
            Some(moderator) => {
                record.selection = Selection::Selected;
                record.moderated_by = moderator.clone();
            }
            None => {
                record.selection = Selection::NotSelected;
                record.moderated_by = None;
            }
        }
        record
    });

    let rest = others.iter().cloned().map(|mut record| {
        record.category = Some(Category::NotApplicable);
        record.selection = Selection::NotSelected;
        record.moderated_by = None;
        record
    });

    primary.chain(rest).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn booklet(evaluator: &str, script: &str, cycle: &str) -> Record {
        Record {
            evaluated_by: evaluator.to_string(),
            evaluator_id: format!("{}-id", evaluator),
            script_id: script.to_string(),
            cycle: cycle.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_master_marks_selected_and_appends_others() {
        let categorized = vec![
            booklet("A", "1", "primary").with_category(Category::Top),
            booklet("A", "2", "primary").with_category(Category::Bottom),
        ];
        let mut picked = booklet("A", "2", "primary")
            .with_category(Category::Bottom)
            .with_moderator("B");
        picked.selection = Selection::Selected;
        let others = vec![booklet("C", "9", "-")];

        let master = build_master(&categorized, &[picked], &others);

        assert_eq!(master.len(), 3);
        assert!(!master[0].is_selected());
        assert_eq!(master[0].moderated_by, None);
        assert!(master[1].is_selected());
        assert_eq!(master[1].moderated_by.as_deref(), Some("B"));
        assert_eq!(master[2].category, Some(Category::NotApplicable));
        assert!(!master[2].is_selected());
    }
}
