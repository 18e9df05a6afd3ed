//! 命令行参数
//!
//! 命令行参数是配置的最后一层，覆盖偏好设置文件和环境变量。

use crate::config::Config;
use crate::services::decision::Decision;
use clap::Parser;
use std::path::PathBuf;

/// 默认偏好设置文件
pub const DEFAULT_PREFERENCES_FILE: &str = "preferences.toml";

/// 单评卷人文件的处理方式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SingleEvaluatorPolicy {
    /// 在控制台询问
    Ask,
    /// 无人值守，一律采用固定决定
    Fixed(Decision),
}

fn parse_single_evaluator(value: &str) -> Result<SingleEvaluatorPolicy, String> {
    if value.trim().eq_ignore_ascii_case("ask") {
        return Ok(SingleEvaluatorPolicy::Ask);
    }
    Decision::parse_policy(value)
        .map(SingleEvaluatorPolicy::Fixed)
        .ok_or_else(|| format!("无法识别的处理方式: {} (可选: ask, same, cancel, moderator:<ID>)", value))
}

/// 答卷复核分配工具
#[derive(Parser, Debug)]
#[command(name = "moderation-allocator")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// 评卷结果文件（.xlsx），按给定顺序处理
    pub files: Vec<PathBuf>,

    /// 偏好设置文件
    #[arg(long, default_value = DEFAULT_PREFERENCES_FILE)]
    pub config: PathBuf,

    /// Top 档比例（%）
    #[arg(long)]
    pub top: Option<u32>,

    /// Middle 档比例（%）
    #[arg(long)]
    pub middle: Option<u32>,

    /// Bottom 档比例（%）
    #[arg(long)]
    pub bottom: Option<u32>,

    /// Top 档抽取比例（%）
    #[arg(long)]
    pub pick_top: Option<u32>,

    /// Middle 档抽取比例（%）
    #[arg(long)]
    pub pick_middle: Option<u32>,

    /// Bottom 档抽取比例（%）
    #[arg(long)]
    pub pick_bottom: Option<u32>,

    /// 每位评卷人最多抽取的比例（%）
    #[arg(long)]
    pub max_booklets: Option<u32>,

    /// 主轮次名称
    #[arg(long)]
    pub cycle: Option<String>,

    /// 不生成单文件结果
    #[arg(long)]
    pub no_individual: bool,

    /// 不生成汇总文件
    #[arg(long)]
    pub no_bulk: bool,

    /// 输出目录；指定后不再保存到输入文件所在目录
    #[arg(long)]
    pub output_dir: Option<String>,

    /// 处理日志文件
    #[arg(long)]
    pub log_file: Option<String>,

    /// 随机种子
    #[arg(long)]
    pub seed: Option<u64>,

    /// 单评卷人文件的处理方式：ask | same | cancel | moderator:<ID>
    #[arg(long, default_value = "ask", value_parser = parse_single_evaluator)]
    pub single_evaluator: SingleEvaluatorPolicy,

    /// 将最终配置保存到偏好设置文件
    #[arg(long)]
    pub save_preferences: bool,

    /// 显示详细日志
    #[arg(long, short)]
    pub verbose: bool,
}

impl Cli {
    /// 用命令行参数覆盖配置
    pub fn apply(&self, config: Config) -> Config {
        let mut config = config;
        if let Some(top) = self.top {
            config.top_category = top;
        }
        if let Some(middle) = self.middle {
            config.middle_category = middle;
        }
        if let Some(bottom) = self.bottom {
            config.bottom_category = bottom;
        }
        if let Some(pick) = self.pick_top {
            config.pick_top = pick;
        }
        if let Some(pick) = self.pick_middle {
            config.pick_middle = pick;
        }
        if let Some(pick) = self.pick_bottom {
            config.pick_bottom = pick;
        }
        if let Some(max) = self.max_booklets {
            config.max_booklets_per_evaluator = max;
        }
        if let Some(cycle) = &self.cycle {
            config.first_cycle_name = cycle.clone();
        }
        if self.no_individual {
            config.generate_schedule = false;
        }
        if self.no_bulk {
            config.generate_bulk = false;
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
            config.save_to_same_location = false;
        }
        if let Some(log_file) = &self.log_file {
            config.output_log_file = log_file.clone();
        }
        if self.seed.is_some() {
            config.random_seed = self.seed;
        }
        if self.verbose {
            config.verbose_logging = true;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from([
            "moderation-allocator",
            "a.xlsx",
            "b.xlsx",
            "--top",
            "30",
            "--pick-bottom",
            "6",
            "--cycle",
            "round-1",
            "--no-bulk",
            "--output-dir",
            "out",
            "--seed",
            "9",
        ]);
        let config = cli.apply(Config::default());

        assert_eq!(cli.files.len(), 2);
        assert_eq!(config.top_category, 30);
        assert_eq!(config.pick_bottom, 6);
        assert_eq!(config.first_cycle_name, "round-1");
        assert!(config.generate_schedule);
        assert!(!config.generate_bulk);
        assert_eq!(config.output_dir, "out");
        assert!(!config.save_to_same_location);
        assert_eq!(config.random_seed, Some(9));
        assert_eq!(cli.single_evaluator, SingleEvaluatorPolicy::Ask);
    }

    #[test]
    fn test_single_evaluator_policy() {
        let cli = Cli::parse_from(["moderation-allocator", "--single-evaluator", "moderator:EV-3"]);
        assert_eq!(
            cli.single_evaluator,
            SingleEvaluatorPolicy::Fixed(Decision::Different("EV-3".to_string()))
        );
        assert!(Cli::try_parse_from(["moderation-allocator", "--single-evaluator", "maybe"]).is_err());
    }
}
