//! 输出服务 - 业务能力层
//!
//! 负责把一次运行的结果写成文件：
//! - 每个产生了抽中答卷的文件各写一份 `Processed_*.xlsx`
//! - 所有文件汇总写一份 `Bulk_Allocation_*.xlsx`（放在第一个输入文件旁）
//!
//! 保存到输入文件目录失败时改存到配置的输出目录；写出失败只记录日志，不中断运行。

use crate::config::Config;
use crate::error::{AppError, AppResult, OutputError};
use crate::models::{FileAllocation, Run};
use crate::services::workbook_writer::{
    build_allocation_table, build_master_table, bulk_file_name, processed_file_name,
    write_workbook, Table,
};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// 输出结果
#[derive(Debug, Default, Clone)]
pub struct OutputReport {
    /// 成功写出的文件
    pub generated: Vec<PathBuf>,
    /// 写出失败的文件名及原因
    pub failed: Vec<(String, String)>,
}

/// 输出服务
pub struct OutputService {
    generate_schedule: bool,
    generate_bulk: bool,
    save_to_same_location: bool,
    output_dir: PathBuf,
}

impl OutputService {
    /// 创建新的输出服务
    pub fn new(config: &Config) -> Self {
        Self {
            generate_schedule: config.generate_schedule,
            generate_bulk: config.generate_bulk,
            save_to_same_location: config.save_to_same_location,
            output_dir: PathBuf::from(&config.output_dir),
        }
    }

    /// 按配置写出单文件结果和汇总结果
    pub fn generate(&self, run: &Run) -> OutputReport {
        let mut report = OutputReport::default();

        if self.generate_schedule {
            for allocation in run.allocations().filter(|a| !a.assigned.is_empty()) {
                let name = processed_file_name(&allocation.file_name);
                match self.write_individual(allocation, &name) {
                    Ok(path) => {
                        info!("💾 已保存: {}", path.display());
                        report.generated.push(path);
                    }
                    Err(e) => {
                        error!("❌ 保存 {} 失败: {}", name, e);
                        report.failed.push((name, e.to_string()));
                    }
                }
            }
        }

        if self.generate_bulk {
            if run.all_selected.is_empty() {
                warn!("⚠️ 没有任何抽中的答卷，汇总文件只包含全量数据");
            }
            let name = bulk_file_name(chrono::Local::now());
            match self.write_bulk(run, &name) {
                Ok(path) => {
                    info!("💾 汇总文件已保存: {}", path.display());
                    report.generated.push(path);
                }
                Err(e) => {
                    error!("❌ 保存汇总文件失败: {}", e);
                    report.failed.push((name, e.to_string()));
                }
            }
        }

        report
    }

    fn write_individual(&self, allocation: &FileAllocation, name: &str) -> AppResult<PathBuf> {
        let allocation_table = build_allocation_table(&allocation.master);
        let master_table = build_master_table(&allocation.master);
        let source_dir = allocation.source_path.as_deref().and_then(Path::parent);
        self.save_with_fallback(source_dir, name, &allocation_table, &master_table)
    }

    fn write_bulk(&self, run: &Run, name: &str) -> AppResult<PathBuf> {
        let master = run.all_master();
        let first_dir = run
            .allocations()
            .find_map(|allocation| allocation.source_path.as_deref())
            .and_then(Path::parent);
        self.save_with_fallback(
            first_dir,
            name,
            &build_allocation_table(&master),
            &build_master_table(&master),
        )
    }

    fn save_with_fallback(
        &self,
        preferred_dir: Option<&Path>,
        name: &str,
        allocation: &Table,
        master: &Table,
    ) -> AppResult<PathBuf> {
        if self.save_to_same_location {
            if let Some(dir) = preferred_dir {
                let path = dir.join(name);
                match write_workbook(&path, allocation, master) {
                    Ok(()) => return Ok(path),
                    Err(e) => warn!(
                        "⚠️ 无法保存到输入文件目录（{}），改存到 {}",
                        e,
                        self.output_dir.display()
                    ),
                }
            }
        }

        std::fs::create_dir_all(&self.output_dir).map_err(|e| {
            AppError::file_write_failed(self.output_dir.display().to_string(), e)
        })?;
        let path = self.output_dir.join(name);
        write_workbook(&path, allocation, master).map_err(|e| OutputError::SaveFailed {
            file: name.to_string(),
            reason: e.to_string(),
        })?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, FileOutcome, FileReport, Record, Selection};

    fn allocation(name: &str, source_path: Option<PathBuf>, picked: usize) -> FileAllocation {
        let master: Vec<Record> = (0..3)
            .map(|i| {
                let mut record = Record {
                    evaluated_by: "A".to_string(),
                    script_id: i.to_string(),
                    ..Default::default()
                }
                .with_category(Category::Top);
                if i < picked {
                    record.selection = Selection::Selected;
                    record.moderated_by = Some("B".to_string());
                }
                record
            })
            .collect();
        FileAllocation {
            file_name: name.to_string(),
            source_path,
            total_rows: 3,
            present: 3,
            evaluator_count: 1,
            assigned: master.iter().filter(|r| r.is_selected()).cloned().collect(),
            master,
            summaries: Vec::new(),
            assignment_failed: false,
        }
    }

    fn run_of(allocations: Vec<FileAllocation>) -> Run {
        let mut run = Run::new();
        for allocation in allocations {
            run.push(FileReport {
                file_name: allocation.file_name.clone(),
                outcome: FileOutcome::Aggregated(allocation),
            });
        }
        run
    }

    #[test]
    fn test_individual_files_only_for_files_with_selections() {
        let input_dir = tempfile::tempdir().unwrap();
        let output_dir = tempfile::tempdir().unwrap();
        let config = Config {
            generate_bulk: false,
            output_dir: output_dir.path().display().to_string(),
            ..Config::default()
        };

        let run = run_of(vec![
            allocation("a.xlsx", Some(input_dir.path().join("a.xlsx")), 2),
            allocation("b.xlsx", Some(input_dir.path().join("b.xlsx")), 0),
        ]);
        let report = OutputService::new(&config).generate(&run);

        assert_eq!(report.generated, vec![input_dir.path().join("Processed_a.xlsx")]);
        assert!(report.failed.is_empty());
    }

    #[test]
    fn test_falls_back_to_output_dir() {
        let output_dir = tempfile::tempdir().unwrap();
        let target = output_dir.path().join("nested");
        let config = Config {
            output_dir: target.display().to_string(),
            ..Config::default()
        };

        // 输入目录不存在，保存失败后改存到输出目录
        let missing = output_dir.path().join("gone").join("a.xlsx");
        let run = run_of(vec![allocation("a.xlsx", Some(missing), 1)]);
        let report = OutputService::new(&config).generate(&run);

        assert_eq!(report.generated.len(), 2);
        assert!(report.generated.iter().all(|path| path.starts_with(&target)));
        assert!(report.generated[1]
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("Bulk_Allocation_"));
    }

    #[test]
    fn test_bulk_written_even_without_selection() {
        let output_dir = tempfile::tempdir().unwrap();
        let config = Config {
            output_dir: output_dir.path().display().to_string(),
            ..Config::default()
        };
        let run = run_of(vec![allocation("a.xlsx", None, 0)]);
        let report = OutputService::new(&config).generate(&run);

        // 没有抽中答卷：不写单文件结果，但汇总文件照常生成
        assert!(report.failed.is_empty());
        assert_eq!(report.generated.len(), 1);
        let bulk = &report.generated[0];
        assert!(bulk.starts_with(output_dir.path()));
        assert!(bulk
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("Bulk_Allocation_"));

        let written = crate::models::read_workbook(bulk).unwrap();
        assert!(written.rows.is_empty());
    }
}
