//! 复核人分配 - 业务能力层
//!
//! 在文件内评卷人池上生成一个随机错排（无不动点的排列），
//! 每位评卷人被抽中的全部答卷交给同一位复核人。
//! 错排同时是双射，因此每位复核人恰好负责一位评卷人的答卷。

use crate::models::{Record, INSUFFICIENT_MODERATORS};
use indexmap::IndexMap;
use rand::Rng;
use tracing::error;

/// Sattolo 算法：返回 `pool` 的一个均匀随机单循环排列
///
/// `j` 严格小于 `i`，保证任何位置都不会映射回自身。
pub fn sattolo_derangement<R: Rng + ?Sized>(pool: &[String], rng: &mut R) -> Vec<String> {
    let mut deranged = pool.to_vec();
    for i in (1..deranged.len()).rev() {
        let j = rng.random_range(0..i);
        deranged.swap(i, j);
    }
    deranged
}

/// 评卷人 → 复核人（按评卷人池顺序）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeratorMapping {
    pairs: IndexMap<String, String>,
}

impl ModeratorMapping {
    /// 对评卷人池生成映射；池中少于两人时无解
    pub fn derive<R: Rng + ?Sized>(pool: &[String], rng: &mut R) -> Option<Self> {
        if pool.len() < 2 {
            return None;
        }
        let deranged = sattolo_derangement(pool, rng);
        let pairs = pool.iter().cloned().zip(deranged).collect();
        Some(Self { pairs })
    }

    pub fn moderator_for(&self, evaluator: &str) -> Option<&str> {
        self.pairs.get(evaluator).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs
            .iter()
            .map(|(evaluator, moderator)| (evaluator.as_str(), moderator.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// 分配结果
#[derive(Debug, Clone)]
pub enum AssignmentOutcome {
    /// 分配成功
    Assigned {
        records: Vec<Record>,
        mapping: ModeratorMapping,
    },
    /// 复核人不足，所有记录已标记 `INSUFFICIENT_MODERATORS`
    InsufficientModerators { records: Vec<Record> },
}

impl AssignmentOutcome {
    pub fn records(&self) -> &[Record] {
        match self {
            AssignmentOutcome::Assigned { records, .. }
            | AssignmentOutcome::InsufficientModerators { records } => records,
        }
    }

    pub fn is_assigned(&self) -> bool {
        matches!(self, AssignmentOutcome::Assigned { .. })
    }
}

/// 为抽中的答卷分配复核人
///
/// `pool` 为源文件中全部评卷人（不只是有抽中答卷的评卷人）。
pub fn assign<R: Rng + ?Sized>(
    selected: &[Record],
    pool: &[String],
    rng: &mut R,
) -> AssignmentOutcome {
    let mut needing: Vec<&str> = Vec::new();
    for record in selected {
        let evaluator = record.evaluator();
        if !needing.contains(&evaluator) {
            needing.push(evaluator);
        }
    }

    let outside_pool = needing
        .iter()
        .any(|evaluator| !pool.iter().any(|member| member == evaluator));

    let mapping = if needing.len() > pool.len() || outside_pool {
        None
    } else {
        ModeratorMapping::derive(pool, rng)
    };

    let Some(mapping) = mapping else {
        error!(
            "❌ 复核人不足: {} 位评卷人需要复核，可用复核人 {} 位",
            needing.len(),
            pool.len()
        );
        return AssignmentOutcome::InsufficientModerators {
            records: selected
                .iter()
                .cloned()
                .map(|record| record.with_moderator(INSUFFICIENT_MODERATORS))
                .collect(),
        };
    };

    let records = selected
        .iter()
        .cloned()
        .map(|record| {
            // 上面已确认每位评卷人都在池中
            let moderator = mapping
                .moderator_for(record.evaluator())
                .unwrap_or(INSUFFICIENT_MODERATORS)
                .to_string();
            record.with_moderator(moderator)
        })
        .collect();

    AssignmentOutcome::Assigned { records, mapping }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::{HashMap, HashSet};

    fn pool(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    fn booklet(evaluator: &str, script: &str) -> Record {
        Record {
            evaluated_by: evaluator.to_string(),
            script_id: script.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_derangement_has_no_fixed_points_and_is_bijective() {
        let mut rng = StdRng::seed_from_u64(2024);
        for n in 2..=40 {
            let members: Vec<String> = (0..n).map(|i| format!("E{}", i)).collect();
            for _ in 0..25 {
                let mapping = ModeratorMapping::derive(&members, &mut rng).unwrap();
                assert_eq!(mapping.len(), n);

                let mut moderators = HashSet::new();
                for (evaluator, moderator) in mapping.iter() {
                    assert_ne!(evaluator, moderator, "评卷人不能复核自己");
                    assert!(moderators.insert(moderator.to_string()));
                }
                let expected: HashSet<String> = members.iter().cloned().collect();
                assert_eq!(moderators, expected);
            }
        }
    }

    #[test]
    fn test_derangement_is_a_single_cycle() {
        let mut rng = StdRng::seed_from_u64(5);
        let members = pool(&["A", "B", "C", "D", "E", "F"]);
        let mapping = ModeratorMapping::derive(&members, &mut rng).unwrap();

        let mut current = "A";
        let mut visited = 0;
        loop {
            current = mapping.moderator_for(current).unwrap();
            visited += 1;
            if current == "A" {
                break;
            }
        }
        assert_eq!(visited, members.len());
    }

    #[test]
    fn test_pool_smaller_than_two_has_no_mapping() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(ModeratorMapping::derive(&[], &mut rng).is_none());
        assert!(ModeratorMapping::derive(&pool(&["A"]), &mut rng).is_none());

        let outcome = assign(&[booklet("A", "1")], &pool(&["A"]), &mut rng);
        assert!(!outcome.is_assigned());
        assert_eq!(
            outcome.records()[0].moderated_by.as_deref(),
            Some(INSUFFICIENT_MODERATORS)
        );
    }

    #[test]
    fn test_evaluator_outside_pool_is_flagged() {
        let mut rng = StdRng::seed_from_u64(1);
        let selected = vec![booklet("A", "1"), booklet("Z", "2")];
        let outcome = assign(&selected, &pool(&["A", "B"]), &mut rng);
        assert!(!outcome.is_assigned());
        assert!(outcome
            .records()
            .iter()
            .all(|r| r.moderated_by.as_deref() == Some(INSUFFICIENT_MODERATORS)));
    }

    /// 池为 [A, B, C]，只有 A、B 有抽中答卷：映射仍覆盖整个池
    #[test]
    fn test_mapping_spans_full_pool() {
        let members = pool(&["A", "B", "C"]);
        let selected = vec![booklet("A", "1"), booklet("A", "2"), booklet("B", "3")];

        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let AssignmentOutcome::Assigned { records, mapping } =
                assign(&selected, &members, &mut rng)
            else {
                panic!("应当分配成功");
            };
            assert_eq!(mapping.len(), 3);

            let by_evaluator: HashMap<&str, &str> = records
                .iter()
                .map(|r| (r.evaluated_by.as_str(), r.moderated_by.as_deref().unwrap()))
                .collect();
            let a = by_evaluator["A"];
            let b = by_evaluator["B"];
            assert!(a == "B" || a == "C");
            assert!(b == "A" || b == "C");
            assert_ne!(a, b);
        }
    }

    #[test]
    fn test_whole_group_goes_to_one_moderator() {
        let mut rng = StdRng::seed_from_u64(8);
        let members = pool(&["A", "B", "C", "D"]);
        let selected: Vec<Record> = (0..12)
            .map(|i| booklet(&members[i % 4], &i.to_string()))
            .collect();

        let outcome = assign(&selected, &members, &mut rng);
        let mut seen: HashMap<&str, &str> = HashMap::new();
        for record in outcome.records() {
            let moderator = record.moderated_by.as_deref().unwrap();
            assert_ne!(moderator, record.evaluated_by);
            let first = seen.entry(record.evaluated_by.as_str()).or_insert(moderator);
            assert_eq!(*first, moderator);
        }
    }

    #[test]
    fn test_two_evaluators_swap() {
        let mut rng = StdRng::seed_from_u64(0);
        let mapping = ModeratorMapping::derive(&pool(&["A", "B"]), &mut rng).unwrap();
        assert_eq!(mapping.moderator_for("A"), Some("B"));
        assert_eq!(mapping.moderator_for("B"), Some("A"));
    }
}
