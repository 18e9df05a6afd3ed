//! 抽样 - 业务能力层
//!
//! 每个档位的抽取数量按整个评卷人分组的人数计算（不是档位人数），
//! 档位内先做均匀洗牌，再取前 `pick` 份；不足时整档取走。

use crate::models::{Category, Record, Selection};
use crate::services::categorizer::percent_of;
use rand::seq::SliceRandom;
use rand::Rng;

/// 三个档位的抽取比例（占整个分组的百分比）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickPercentages {
    pub top: u32,
    pub middle: u32,
    pub bottom: u32,
}

/// 从单个档位中随机抽取 `pick_count` 份（Fisher–Yates 洗牌后取前缀）
pub fn pick_from_tier<R: Rng + ?Sized>(
    tier: &[Record],
    pick_count: usize,
    rng: &mut R,
) -> Vec<Record> {
    let mut shuffled = tier.to_vec();
    shuffled.shuffle(rng);
    shuffled.truncate(pick_count);
    shuffled
}

/// 从已分档的答卷中按档位抽取，结果依次为 Top、Middle、Bottom
///
/// 返回的记录已标记为 `Selected`。
pub fn sample<R: Rng + ?Sized>(
    categorized: &[Record],
    picks: PickPercentages,
    group_size: usize,
    rng: &mut R,
) -> Vec<Record> {
    let plan = [
        (Category::Top, picks.top),
        (Category::Middle, picks.middle),
        (Category::Bottom, picks.bottom),
    ];

    let mut selected = Vec::new();
    for (category, percent) in plan {
        let tier: Vec<Record> = categorized
            .iter()
            .filter(|record| record.category == Some(category))
            .cloned()
            .collect();
        let pick_count = percent_of(percent, group_size);
        selected.extend(pick_from_tier(&tier, pick_count, rng));
    }

    for record in &mut selected {
        record.selection = Selection::Selected;
    }
    selected
}
