//! 批量文件处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责一次分配运行的完整生命周期。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：记录启动信息
//! 2. **批量加载**：在阻塞线程池中读取所有输入文件
//! 3. **运行前校验**：配置或输入不合法时整次运行不开始
//! 4. **顺序处理**：逐个文件委托 file_processor，单个文件失败不影响其他文件
//! 5. **输出生成**：单文件结果与跨文件汇总
//! 6. **全局统计**：打印统计并写出 JSON 运行摘要

use crate::config::Config;
use crate::infrastructure::build_rng;
use crate::models::{load_workbook, FileOutcome, FileReport, LoadedFile, Run, RunSummary};
use crate::models::loaders::workbook_loader::file_name_of;
use crate::orchestrator::file_processor;
use crate::services::decision::DecisionSource;
use crate::services::output_service::{OutputReport, OutputService};
use crate::services::validation::validate_run;
use crate::utils::logging::{log_files_loaded, log_startup, print_final_stats, write_run_summary};
use crate::workflow::FileCtx;
use anyhow::Result;
use std::path::PathBuf;
use tracing::{error, info, warn};

/// 一次运行的最终结果
#[derive(Debug)]
pub struct RunReport {
    pub run: Run,
    pub output: OutputReport,
    pub summary: RunSummary,
}

/// 应用主结构
pub struct App {
    config: Config,
    inputs: Vec<PathBuf>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config, inputs: Vec<PathBuf>) -> Result<Self> {
        log_startup(&config);
        Ok(Self { config, inputs })
    }

    /// 运行应用主逻辑
    pub async fn run<D: DecisionSource>(&self, decisions: &D) -> Result<RunReport> {
        let loads = self.load_files().await;
        self.execute(loads, decisions).await
    }

    /// 处理已在内存中的文件（跳过读取步骤）
    pub async fn run_loaded<D: DecisionSource>(
        &self,
        files: Vec<LoadedFile>,
        decisions: &D,
    ) -> Result<RunReport> {
        let loads = files.into_iter().map(Ok).collect();
        self.execute(loads, decisions).await
    }

    /// 读取所有输入文件，读取失败的文件保留失败原因
    async fn load_files(&self) -> Vec<std::result::Result<LoadedFile, (String, String)>> {
        info!("\n📁 正在读取输入文件...");
        let mut loads = Vec::with_capacity(self.inputs.len());
        for path in &self.inputs {
            match load_workbook(path).await {
                Ok(file) => loads.push(Ok(file)),
                Err(e) => {
                    error!("❌ 读取 {} 失败: {}", path.display(), e);
                    loads.push(Err((file_name_of(path), e.to_string())));
                }
            }
        }
        loads
    }

    async fn execute<D: DecisionSource>(
        &self,
        loads: Vec<std::result::Result<LoadedFile, (String, String)>>,
        decisions: &D,
    ) -> Result<RunReport> {
        let valid = loads
            .iter()
            .filter(|load| matches!(load, Ok(file) if file.missing_columns().is_empty()))
            .count();
        log_files_loaded(loads.len(), valid);

        if let Err(e) = validate_run(&self.config, loads.len(), valid) {
            error!("❌ 运行前校验失败: {}", e);
            return Err(e.into());
        }

        let run = self.process_all_files(loads, decisions).await;

        let output = if run.allocations().next().is_some() {
            OutputService::new(&self.config).generate(&run)
        } else {
            warn!("⚠️ 没有成功处理的文件，不生成输出");
            OutputReport::default()
        };

        let summary = run.summary(&output.generated);
        print_final_stats(&summary, &self.config.output_log_file);
        match write_run_summary(&summary, &self.config.output_log_file) {
            Ok(path) => info!("📝 运行摘要已保存至: {}", path.display()),
            Err(e) => warn!("⚠️ 运行摘要保存失败: {}", e),
        }

        Ok(RunReport {
            run,
            output,
            summary,
        })
    }

    /// 按输入顺序逐个处理文件
    async fn process_all_files<D: DecisionSource>(
        &self,
        loads: Vec<std::result::Result<LoadedFile, (String, String)>>,
        decisions: &D,
    ) -> Run {
        let mut rng = build_rng(self.config.random_seed);
        let mut run = Run::new();
        let total = loads.len();

        for (index, load) in loads.into_iter().enumerate() {
            let report = match load {
                Ok(file) => {
                    let ctx = FileCtx::new(index + 1, file.name.clone(), file.path.clone());
                    info!("📄 处理第 {}/{} 个文件", index + 1, total);
                    let outcome =
                        file_processor::process_file(file, &ctx, &self.config, decisions, &mut rng)
                            .await;
                    FileReport {
                        file_name: ctx.file_name,
                        outcome,
                    }
                }
                Err((file_name, reason)) => FileReport {
                    file_name,
                    outcome: FileOutcome::ReadFailed { reason },
                },
            };
            run.push(report);
        }

        run
    }
}
