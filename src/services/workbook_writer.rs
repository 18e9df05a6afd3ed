//! 工作簿写入服务 - 业务能力层
//!
//! 只负责“把分配结果写成 xlsx”的能力：
//! - `Allocation Data`：抽中的答卷（测试ID / 学生ID / 复核人 / 档位 / 抽中标记）
//! - `Master Data`：全部记录及其档位、抽中标记、复核人

use crate::error::{AppError, AppResult};
use crate::models::{columns, Record, IMPORT_COLUMNS};
use chrono::{DateTime, Local};
use regex::Regex;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::path::Path;
use tracing::debug;

pub const ALLOCATION_SHEET: &str = "Allocation Data";
pub const MASTER_SHEET: &str = "Master Data";

pub const PROCESSED_PREFIX: &str = "Processed_";
pub const BULK_PREFIX: &str = "Bulk_Allocation_";
pub const FILE_EXTENSION: &str = ".xlsx";

/// `Allocation Data` 的表头
pub const ALLOCATION_HEADERS: [&str; 5] = [
    "Test Id",
    "User Id",
    "Evaluator Ids",
    columns::CATEGORY,
    columns::SELECTED_FOR_MODERATION,
];

/// 一张待写出的表
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// `Master Data` 的列：导入列 + 三个标注列
pub fn master_columns() -> Vec<&'static str> {
    IMPORT_COLUMNS
        .iter()
        .copied()
        .chain([
            columns::CATEGORY,
            columns::SELECTED_FOR_MODERATION,
            columns::MODERATED_BY,
        ])
        .collect()
}

/// 从全量记录中取出抽中的答卷并重命名列
pub fn build_allocation_table(master: &[Record]) -> Table {
    let rows = master
        .iter()
        .filter(|record| record.is_selected())
        .map(|record| {
            vec![
                record.value(columns::SCHEDULE_ID).to_string(),
                record.value(columns::STUDENT_EMAIL).to_string(),
                record.value(columns::MODERATED_BY).to_string(),
                record.value(columns::CATEGORY).to_string(),
                record.value(columns::SELECTED_FOR_MODERATION).to_string(),
            ]
        })
        .collect();

    Table {
        headers: ALLOCATION_HEADERS.iter().map(|h| h.to_string()).collect(),
        rows,
    }
}

pub fn build_master_table(master: &[Record]) -> Table {
    let columns = master_columns();
    let rows = master
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|column| record.value(column).to_string())
                .collect()
        })
        .collect();

    Table {
        headers: columns.iter().map(|c| c.to_string()).collect(),
        rows,
    }
}

/// `Processed_<原文件名去掉 .xlsx>.xlsx`
pub fn processed_file_name(original: &str) -> String {
    let base = match Regex::new(r"(?i)\.xlsx$") {
        Ok(re) => re.replace(original, "").into_owned(),
        Err(_) => original.to_string(),
    };
    format!("{}{}{}", PROCESSED_PREFIX, base, FILE_EXTENSION)
}

/// `Bulk_Allocation_<DD-MM-YYYY_HH-MM-SS>.xlsx`
pub fn bulk_file_name(now: DateTime<Local>) -> String {
    format!(
        "{}{}{}",
        BULK_PREFIX,
        now.format("%d-%m-%Y_%H-%M-%S"),
        FILE_EXTENSION
    )
}

/// 写出包含两个工作表的工作簿
pub fn write_workbook(path: &Path, allocation: &Table, master: &Table) -> AppResult<()> {
    let file = path.display().to_string();
    debug!(
        "写入工作簿: {} | 抽中 {} 行 | 全量 {} 行",
        file,
        allocation.rows.len(),
        master.rows.len()
    );

    let header_format = Format::new().set_bold();
    let mut workbook = Workbook::new();

    write_sheet(workbook.add_worksheet(), ALLOCATION_SHEET, allocation, &header_format)
        .map_err(|err| AppError::workbook_failed(&file, err))?;
    write_sheet(workbook.add_worksheet(), MASTER_SHEET, master, &header_format)
        .map_err(|err| AppError::workbook_failed(&file, err))?;

    workbook
        .save(path)
        .map_err(|err| AppError::workbook_failed(&file, err))
}

fn write_sheet(
    sheet: &mut Worksheet,
    name: &str,
    table: &Table,
    header_format: &Format,
) -> Result<(), rust_xlsxwriter::XlsxError> {
    sheet.set_name(name)?;
    for (col, header) in table.headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, header, header_format)?;
    }
    for (row_index, row) in table.rows.iter().enumerate() {
        let row_number = (row_index + 1) as u32;
        for (col, value) in row.iter().enumerate() {
            sheet.write_string(row_number, col as u16, value)?;
        }
    }
    Ok(())
}
