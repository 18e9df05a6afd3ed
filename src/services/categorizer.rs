//! 分档 - 业务能力层
//!
//! 按分数从高到低排序后，前 `ceil(top% · n)` 份为 Top，
//! 接下来 `ceil(middle% · n)` 份为 Middle，其余为 Bottom。
//! Bottom 的比例只参与配置校验，不参与计数。

use crate::models::{Category, Record, TierCounts};

/// `ceil(percent / 100 · n)`，整数运算避免浮点误差
pub fn percent_of(percent: u32, n: usize) -> usize {
    (percent as usize * n).div_ceil(100)
}

/// 计算 n 份答卷在给定比例下的档位人数
///
/// Top 与 Middle 之和超过 n 时依次截断，Bottom 永不为负。
pub fn tier_counts(n: usize, top_pct: u32, middle_pct: u32) -> TierCounts {
    let top = percent_of(top_pct, n).min(n);
    let middle = percent_of(middle_pct, n).min(n - top);
    TierCounts {
        top,
        middle,
        bottom: n - top - middle,
    }
}

/// 按总分降序稳定排序（同分保持原相对顺序）
pub fn sort_by_total_marks(records: &[Record]) -> Vec<Record> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| b.score().total_cmp(&a.score()));
    sorted
}

/// 为一位评卷人的答卷分档，返回按排名排序的副本
pub fn categorize(records: &[Record], top_pct: u32, middle_pct: u32) -> Vec<Record> {
    let sorted = sort_by_total_marks(records);
    let counts = tier_counts(sorted.len(), top_pct, middle_pct);

    sorted
        .into_iter()
        .enumerate()
        .map(|(rank, record)| {
            let category = if rank < counts.top {
                Category::Top
            } else if rank < counts.top + counts.middle {
                Category::Middle
            } else {
                Category::Bottom
            };
            record.with_category(category)
        })
        .collect()
}
