//! 日志工具模块
//!
//! 初始化 tracing（终端 + 处理日志文件），并提供日志格式化和输出的辅助函数

use crate::config::Config;
use crate::models::{EvaluatorSummary, FileAllocation, RunSummary};
use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// 初始化日志
///
/// 先写入日志文件头，再注册两个输出层：终端与日志文件（追加）。
/// `RUST_LOG` 优先；否则按 `verbose_logging` 取 `debug` 或 `info`。
pub fn init(config: &Config) -> Result<()> {
    init_log_file(&config.output_log_file)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if config.verbose_logging { "debug" } else { "info" })
    });

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.output_log_file)
        .with_context(|| format!("无法打开日志文件: {}", config.output_log_file))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(log_file)),
        )
        .try_init()?;

    Ok(())
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    if let Some(parent) = Path::new(log_file_path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
    {
        fs::create_dir_all(parent)?;
    }
    let log_header = format!(
        "{}\n复核分配日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)
        .with_context(|| format!("无法写入日志文件: {}", log_file_path))?;
    Ok(())
}

/// 运行摘要文件路径：与日志文件同目录的 `run_summary.json`
pub fn summary_path(log_file_path: &str) -> PathBuf {
    Path::new(log_file_path)
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join("run_summary.json")
}

/// 写出运行摘要（JSON）
pub fn write_run_summary(summary: &RunSummary, log_file_path: &str) -> Result<PathBuf> {
    let path = summary_path(log_file_path);
    let json = serde_json::to_string_pretty(summary)?;
    fs::write(&path, json).with_context(|| format!("无法写入运行摘要: {}", path.display()))?;
    Ok(path)
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 答卷复核分配");
    info!(
        "📊 分档比例: Top {}% / Middle {}% / Bottom {}%",
        config.top_category, config.middle_category, config.bottom_category
    );
    info!(
        "🎯 抽取比例: Top {}% / Middle {}% / Bottom {}%（上限 {}%）",
        config.pick_top, config.pick_middle, config.pick_bottom, config.max_booklets_per_evaluator
    );
    info!("🔁 主轮次: {}", config.first_cycle_name);
    info!(
        "📄 输出: 单文件 {} | 汇总文件 {}",
        config.generate_schedule, config.generate_bulk
    );
    info!("{}", "=".repeat(60));
}

/// 记录文件加载信息
pub fn log_files_loaded(total: usize, valid: usize) {
    info!("✓ 已选择 {} 个文件，其中 {} 个包含必需列", total, valid);
    info!("💡 文件将按顺序逐个处理\n");
}

/// 记录单个文件的数据统计
pub fn log_file_data(prefix: &str, allocation: &FileAllocation) {
    info!("{} 📋 数据统计:", prefix);
    info!("{}     Rows: {}", prefix, allocation.total_rows);
    info!("{}     Present: {}", prefix, allocation.present);
    info!("{}     Absent: {}", prefix, allocation.absent());
    info!("{}     Evaluators: {}", prefix, allocation.evaluator_count);
}

/// 记录单位评卷人的分档与抽取情况
pub fn log_evaluator_summary(prefix: &str, summary: &EvaluatorSummary) {
    info!(
        "{}     {} | 答卷 {} | Top {}/{} | Middle {}/{} | Bottom {}/{} | 复核人: {}",
        prefix,
        summary.evaluator,
        summary.booklets,
        summary.picked.top,
        summary.tiers.top,
        summary.picked.middle,
        summary.tiers.middle,
        summary.picked.bottom,
        summary.tiers.bottom,
        summary.moderator.as_deref().unwrap_or("-")
    );
}

/// 打印最终统计信息
pub fn print_final_stats(summary: &RunSummary, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", summary.processed, summary.total_files);
    info!("⛔ 轮次异常跳过: {}", summary.skipped_invalid_cycle);
    info!("🚫 用户取消: {}", summary.cancelled);
    info!("❌ 缺少必需列: {}", summary.rejected);
    info!("❌ 读取失败: {}", summary.read_failed);
    info!("🎯 抽中答卷总数: {}", summary.total_selected);
    for path in &summary.generated_files {
        info!("💾 {}", path);
    }
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}
