//! 试卷记录模型
//!
//! 一行评卷结果即一份答卷（booklet）。必需字段使用强类型，
//! 其余透传列保存在有序的 `passthrough` 中，保证输出时列顺序不变。

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// 表格列名
pub mod columns {
    pub const REGISTER_NUMBER: &str = "Register Number";
    pub const STUDENT_NAME: &str = "Name of the student";
    pub const SCHEDULE_ID: &str = "Schedule Id";
    pub const SCHEDULE_NAME: &str = "Schedule Name";
    pub const STUDENT_EMAIL: &str = "Email of the student";
    pub const TOTAL_MARKS: &str = "Total Marks";
    pub const APPEARANCE_STATUS: &str = "Exam Appearance Status";
    pub const EVALUATED_BY: &str = "Evaluated By";
    pub const EVALUATOR_ID: &str = "Evaluator Id";
    pub const SCRIPT_ID: &str = "Script Id";
    pub const CYCLE: &str = "Cycle";

    pub const CATEGORY: &str = "Category";
    pub const SELECTED_FOR_MODERATION: &str = "Selected for Moderation";
    pub const MODERATED_BY: &str = "Moderated By";
}

/// 进入处理前必须存在的列
pub const REQUIRED_COLUMNS: [&str; 4] = [
    columns::EVALUATED_BY,
    columns::EVALUATOR_ID,
    columns::SCRIPT_ID,
    columns::CYCLE,
];

/// 读取后保留的列（按输出顺序）
pub const IMPORT_COLUMNS: [&str; 11] = [
    columns::REGISTER_NUMBER,
    columns::STUDENT_NAME,
    columns::SCHEDULE_ID,
    columns::SCHEDULE_NAME,
    columns::STUDENT_EMAIL,
    columns::TOTAL_MARKS,
    columns::APPEARANCE_STATUS,
    columns::EVALUATED_BY,
    columns::EVALUATOR_ID,
    columns::SCRIPT_ID,
    columns::CYCLE,
];

/// 缺失评卷人时使用的分组名
pub const UNKNOWN_EVALUATOR: &str = "Unknown";

/// 非主轮次的占位轮次值
pub const CYCLE_SENTINEL: &str = "-";

/// 无法分配复核人时写入 `Moderated By` 的标记值
pub const INSUFFICIENT_MODERATORS: &str = "INSUFFICIENT_MODERATORS";

/// 解析器产出的原始行：列名 → 单元格文本
pub type RawRow = IndexMap<String, String>;

/// 分数档位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    Top,
    Middle,
    Bottom,
    /// 非主轮次记录，不参与分档
    #[serde(rename = "N/A")]
    NotApplicable,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Top => "Top",
            Category::Middle => "Middle",
            Category::Bottom => "Bottom",
            Category::NotApplicable => "N/A",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 是否被抽中复核
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Selection {
    Selected,
    #[default]
    NotSelected,
}

impl Selection {
    pub fn as_str(self) -> &'static str {
        match self {
            Selection::Selected => "Selected",
            Selection::NotSelected => "Not Selected",
        }
    }
}

/// 跨记录集合识别同一份答卷的键：(评卷人, 答卷ID, 评卷人ID)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
    pub evaluator: String,
    pub script_id: String,
    pub evaluator_id: String,
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.evaluator, self.script_id, self.evaluator_id)
    }
}

/// 单份答卷的评卷记录
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    pub evaluated_by: String,
    pub evaluator_id: String,
    pub script_id: String,
    pub total_marks: String,
    pub cycle: String,
    /// 其余列（保持原表顺序）
    pub passthrough: IndexMap<String, String>,
    pub category: Option<Category>,
    pub selection: Selection,
    pub moderated_by: Option<String>,
}

impl Record {
    /// 从原始行构造，只保留 `wanted` 中列出的列，缺失列补空字符串
    pub fn from_row(row: &RawRow, wanted: &[&str]) -> Self {
        let mut record = Record::default();
        for &column in wanted {
            let value = row.get(column).cloned().unwrap_or_default();
            match column {
                columns::EVALUATED_BY => record.evaluated_by = value,
                columns::EVALUATOR_ID => record.evaluator_id = value,
                columns::SCRIPT_ID => record.script_id = value,
                columns::TOTAL_MARKS => record.total_marks = value,
                columns::CYCLE => record.cycle = value,
                other => {
                    record.passthrough.insert(other.to_string(), value);
                }
            }
        }
        record
    }

    /// 按列名取值，未知列返回空字符串
    pub fn value(&self, column: &str) -> &str {
        match column {
            columns::EVALUATED_BY => &self.evaluated_by,
            columns::EVALUATOR_ID => &self.evaluator_id,
            columns::SCRIPT_ID => &self.script_id,
            columns::TOTAL_MARKS => &self.total_marks,
            columns::CYCLE => &self.cycle,
            columns::CATEGORY => self.category.map(Category::as_str).unwrap_or(""),
            columns::SELECTED_FOR_MODERATION => self.selection.as_str(),
            columns::MODERATED_BY => self.moderated_by.as_deref().unwrap_or(""),
            other => self.passthrough.get(other).map(String::as_str).unwrap_or(""),
        }
    }

    /// 按给定列顺序还原为原始行
    pub fn to_row(&self, wanted: &[&str]) -> RawRow {
        wanted
            .iter()
            .map(|&column| (column.to_string(), self.value(column).to_string()))
            .collect()
    }

    /// 分组用的评卷人标识，缺失时归入 `Unknown`
    pub fn evaluator(&self) -> &str {
        if self.evaluated_by.is_empty() {
            UNKNOWN_EVALUATOR
        } else {
            &self.evaluated_by
        }
    }

    /// 数值分数，无法解析时按 0 处理
    pub fn score(&self) -> f64 {
        self.total_marks
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|marks| marks.is_finite())
            .unwrap_or(0.0)
    }

    pub fn key(&self) -> RecordKey {
        RecordKey {
            evaluator: self.evaluated_by.clone(),
            script_id: self.script_id.clone(),
            evaluator_id: self.evaluator_id.clone(),
        }
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_moderator(mut self, moderator: impl Into<String>) -> Self {
        self.moderated_by = Some(moderator.into());
        self
    }

    pub fn is_selected(&self) -> bool {
        self.selection == Selection::Selected
    }
}
