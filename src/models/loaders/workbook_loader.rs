use crate::error::{AppError, AppResult, FileError, InputError};
use crate::models::record::{RawRow, REQUIRED_COLUMNS};
use calamine::{open_workbook_auto, DataType, Reader};
use std::path::{Path, PathBuf};

/// 已读取的输入文件：表头 + 原始行
#[derive(Debug, Clone)]
pub struct LoadedFile {
    /// 文件名（不含目录）
    pub name: String,
    /// 磁盘路径，内存构造时为空
    pub path: Option<PathBuf>,
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl LoadedFile {
    /// 由内存中的表头和行构造（测试及其他解析器使用）
    pub fn from_rows(name: impl Into<String>, headers: Vec<String>, rows: Vec<RawRow>) -> Self {
        Self {
            name: name.into(),
            path: None,
            headers,
            rows,
        }
    }

    /// 缺失的必需列
    pub fn missing_columns(&self) -> Vec<String> {
        REQUIRED_COLUMNS
            .iter()
            .filter(|column| !self.headers.iter().any(|header| header == *column))
            .map(|column| column.to_string())
            .collect()
    }

    /// 校验必需列是否齐全
    pub fn validate_columns(&self) -> Result<(), InputError> {
        let missing = self.missing_columns();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(InputError::MissingColumns {
                file: self.name.clone(),
                missing,
            })
        }
    }
}

/// 同步读取工作簿的第一个工作表
///
/// 第一行作为表头，空行跳过，单元格统一转为去除首尾空白的文本。
pub fn read_workbook(path: &Path) -> AppResult<LoadedFile> {
    let name = file_name_of(path);

    if !path.exists() {
        return Err(FileError::NotFound {
            path: path.display().to_string(),
        }
        .into());
    }

    let mut workbook = open_workbook_auto(path)
        .map_err(|err| AppError::file_read_failed(path.display().to_string(), err))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| InputError::NoWorksheet { file: name.clone() })?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .ok_or_else(|| InputError::NoWorksheet { file: name.clone() })?
        .map_err(|err| AppError::file_read_failed(path.display().to_string(), err))?;

    let mut rows_iter = range.rows();
    let header_row = rows_iter
        .next()
        .ok_or_else(|| InputError::EmptyWorksheet { file: name.clone() })?;
    let headers: Vec<String> = header_row.iter().map(cell_to_string).collect();

    let mut rows = Vec::new();
    for row in rows_iter {
        let values: Vec<String> = row.iter().map(cell_to_string).collect();
        if values.iter().all(|value| value.is_empty()) {
            continue;
        }
        rows.push(zip_row(&headers, values));
    }

    Ok(LoadedFile {
        name,
        path: Some(path.to_path_buf()),
        headers,
        rows,
    })
}

/// 在阻塞线程池中读取工作簿
pub async fn load_workbook(path: &Path) -> AppResult<LoadedFile> {
    let owned = path.to_path_buf();
    tokio::task::spawn_blocking(move || read_workbook(&owned))
        .await
        .map_err(|err| AppError::Other(format!("读取任务执行失败: {}", err)))?
}

fn zip_row(headers: &[String], values: Vec<String>) -> RawRow {
    headers
        .iter()
        .zip(values)
        .filter(|(header, _)| !header.is_empty())
        .map(|(header, value)| (header.clone(), value))
        .collect()
}

fn cell_to_string(cell: &DataType) -> String {
    match cell {
        DataType::Empty => String::new(),
        _ => cell.to_string().trim().to_string(),
    }
}

pub(crate) fn file_name_of(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_reported_in_schema_order() {
        let file = LoadedFile::from_rows(
            "scores.xlsx",
            vec!["Evaluated By".to_string(), "Total Marks".to_string()],
            Vec::new(),
        );
        assert_eq!(
            file.missing_columns(),
            vec!["Evaluator Id", "Script Id", "Cycle"]
        );
        assert!(file.validate_columns().is_err());
    }

    #[test]
    fn test_zip_row_skips_blank_headers() {
        let headers = vec!["Cycle".to_string(), String::new()];
        let row = zip_row(&headers, vec!["primary".to_string(), "stray".to_string()]);
        assert_eq!(row.len(), 1);
        assert_eq!(row["Cycle"], "primary");
    }

    #[test]
    fn test_read_missing_file_fails() {
        let result = read_workbook(Path::new("/definitely/not/here.xlsx"));
        assert!(matches!(
            result,
            Err(AppError::File(FileError::NotFound { .. }))
        ));
    }
}
