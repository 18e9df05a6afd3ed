//! 评卷人处理流程 - 流程层
//!
//! 核心职责：定义"一位评卷人"的分档与抽样流程
//!
//! 流程顺序：
//! 1. 按总分排序并分档（Top / Middle / Bottom）
//! 2. 各档位按整个分组人数计算抽取数量并随机抽取

use crate::config::Config;
use crate::models::{EvaluatorSummary, Record, TierCounts};
use crate::services::categorizer::categorize;
use crate::services::sampler::{sample, PickPercentages};
use rand::Rng;
use tracing::debug;

/// 单位评卷人的处理结果
#[derive(Debug, Clone)]
pub struct EvaluatorResult {
    pub evaluator: String,
    /// 按排名排序并已分档的全部答卷
    pub categorized: Vec<Record>,
    /// 抽中的答卷（Top → Middle → Bottom）
    pub selected: Vec<Record>,
}

impl EvaluatorResult {
    /// 分档与抽取摘要，`moderator` 在分配完成后补充
    pub fn summary(&self, moderator: Option<String>) -> EvaluatorSummary {
        EvaluatorSummary {
            evaluator: self.evaluator.clone(),
            booklets: self.categorized.len(),
            tiers: TierCounts::of(&self.categorized),
            picked: TierCounts::of(&self.selected),
            moderator,
        }
    }
}

/// 评卷人处理流程
///
/// - 不持有任何资源，随机源由调用方传入
/// - 只处理单个评卷人的答卷
pub struct EvaluatorFlow {
    top_category: u32,
    middle_category: u32,
    picks: PickPercentages,
}

impl EvaluatorFlow {
    /// 创建新的评卷人处理流程
    pub fn new(config: &Config) -> Self {
        Self {
            top_category: config.top_category,
            middle_category: config.middle_category,
            picks: PickPercentages {
                top: config.pick_top,
                middle: config.pick_middle,
                bottom: config.pick_bottom,
            },
        }
    }

    pub fn run<R: Rng + ?Sized>(
        &self,
        evaluator: &str,
        records: &[Record],
        rng: &mut R,
    ) -> EvaluatorResult {
        let categorized = categorize(records, self.top_category, self.middle_category);
        let selected = sample(&categorized, self.picks, records.len(), rng);

        debug!(
            "评卷人 {}: 答卷 {} 份 | 档位 {:?} | 抽中 {} 份",
            evaluator,
            records.len(),
            TierCounts::of(&categorized),
            selected.len()
        );

        EvaluatorResult {
            evaluator: evaluator.to_string(),
            categorized,
            selected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_default_config_on_twenty_booklets() {
        let records: Vec<Record> = (0..20)
            .map(|i| Record {
                evaluated_by: "A".to_string(),
                script_id: format!("S{}", i),
                total_marks: i.to_string(),
                ..Default::default()
            })
            .collect();

        let flow = EvaluatorFlow::new(&Config::default());
        let result = flow.run("A", &records, &mut StdRng::seed_from_u64(1));
        let summary = result.summary(Some("B".to_string()));

        assert_eq!(summary.booklets, 20);
        assert_eq!(
            summary.tiers,
            TierCounts {
                top: 4,
                middle: 8,
                bottom: 8
            }
        );
        // ceil(5% · 20) = 1, ceil(10% · 20) = 2, ceil(5% · 20) = 1
        assert_eq!(
            summary.picked,
            TierCounts {
                top: 1,
                middle: 2,
                bottom: 1
            }
        );
        assert_eq!(result.categorized[0].total_marks, "19");
    }
}
