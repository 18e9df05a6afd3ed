//! 记录过滤 - 业务能力层
//!
//! 列投影与按轮次拆分，均为纯函数。

use crate::models::{RawRow, Record, CYCLE_SENTINEL};

/// 只保留指定列，缺失列补空字符串，行顺序不变
///
/// 对自身输出（经 [`Record::to_row`] 还原后）再次调用结果不变。
pub fn filter_columns(rows: &[RawRow], columns: &[&str]) -> Vec<Record> {
    rows.iter()
        .map(|row| Record::from_row(row, columns))
        .collect()
}

/// 只保留轮次等于 `cycle_name` 的记录
pub fn filter_by_cycle(records: &[Record], cycle_name: &str) -> Vec<Record> {
    records
        .iter()
        .filter(|record| record.cycle == cycle_name)
        .cloned()
        .collect()
}

/// 拆分为（主轮次记录, 其余记录），其余记录仅用于报表
pub fn split_by_cycle(records: &[Record], cycle_name: &str) -> (Vec<Record>, Vec<Record>) {
    records
        .iter()
        .cloned()
        .partition(|record| record.cycle == cycle_name)
}

/// 找出既不是主轮次也不是占位符 `-` 的轮次值
///
/// 空值忽略；结果按首次出现顺序去重。
pub fn invalid_cycles(records: &[Record], cycle_name: &str) -> Vec<String> {
    let mut invalid: Vec<String> = Vec::new();
    for record in records {
        let cycle = record.cycle.as_str();
        if cycle.is_empty() || cycle == cycle_name || cycle == CYCLE_SENTINEL {
            continue;
        }
        if !invalid.iter().any(|seen| seen == cycle) {
            invalid.push(cycle.to_string());
        }
    }
    invalid
}
