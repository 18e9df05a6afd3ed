use crate::error::{AppError, AppResult, ConfigError, FileError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use tracing::warn;

/// 程序配置
///
/// 加载顺序：默认值 → 偏好设置文件（TOML）→ 环境变量 → 命令行参数。
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 主轮次名称，只有该轮次的记录参与分档和抽样
    pub first_cycle_name: String,
    // --- 分布比例（占评卷人答卷总数的百分比） ---
    pub top_category: u32,
    pub middle_category: u32,
    /// 只参与校验，Bottom 实际为剩余部分
    pub bottom_category: u32,
    // --- 抽取比例（占评卷人答卷总数的百分比） ---
    pub pick_top: u32,
    pub pick_middle: u32,
    pub pick_bottom: u32,
    /// 每位评卷人最多抽取的比例，三项抽取比例之和必须等于该值
    pub max_booklets_per_evaluator: u32,
    // --- 输出 ---
    /// 为每个输入文件生成 `Processed_*.xlsx`
    pub generate_schedule: bool,
    /// 生成跨文件的 `Bulk_Allocation_*.xlsx`
    pub generate_bulk: bool,
    /// 输出文件保存到输入文件所在目录
    pub save_to_same_location: bool,
    /// 输出目录（不保存到输入目录或保存失败时使用）
    pub output_dir: String,
    /// 处理日志文件
    pub output_log_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 随机种子，设置后抽样与分配可复现
    pub random_seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            first_cycle_name: "primary".to_string(),
            top_category: 20,
            middle_category: 40,
            bottom_category: 40,
            pick_top: 5,
            pick_middle: 10,
            pick_bottom: 5,
            max_booklets_per_evaluator: 20,
            generate_schedule: true,
            generate_bulk: true,
            save_to_same_location: true,
            output_dir: "output".to_string(),
            output_log_file: "processing_log.txt".to_string(),
            verbose_logging: false,
            random_seed: None,
        }
    }
}

impl Config {
    /// 默认值 → 偏好设置文件（存在时）→ 环境变量
    pub fn load(preferences: Option<&Path>) -> AppResult<Self> {
        let base = match preferences {
            Some(path) if path.exists() => Self::from_toml_file(path)?,
            _ => Self::default(),
        };
        Ok(base.overlay_env())
    }

    /// 读取偏好设置文件，缺失的字段使用默认值
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|err| AppError::file_read_failed(path.display().to_string(), err))?;
        toml::from_str(&content).map_err(|err| {
            FileError::TomlParseFailed {
                path: path.display().to_string(),
                source: Box::new(err),
            }
            .into()
        })
    }

    /// 保存偏好设置
    pub fn save_toml_file(&self, path: &Path) -> AppResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|err| AppError::Other(format!("偏好设置序列化失败: {}", err)))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|err| AppError::file_write_failed(parent.display().to_string(), err))?;
        }
        std::fs::write(path, content)
            .map_err(|err| AppError::file_write_failed(path.display().to_string(), err))
    }

    /// 用环境变量覆盖已有值；无法解析的值保留原值并给出警告
    pub fn overlay_env(self) -> Self {
        Self {
            first_cycle_name: std::env::var("FIRST_CYCLE_NAME").unwrap_or(self.first_cycle_name),
            top_category: env_parse("TOP_CATEGORY", self.top_category),
            middle_category: env_parse("MIDDLE_CATEGORY", self.middle_category),
            bottom_category: env_parse("BOTTOM_CATEGORY", self.bottom_category),
            pick_top: env_parse("PICK_TOP", self.pick_top),
            pick_middle: env_parse("PICK_MIDDLE", self.pick_middle),
            pick_bottom: env_parse("PICK_BOTTOM", self.pick_bottom),
            max_booklets_per_evaluator: env_parse(
                "MAX_BOOKLETS_PER_EVALUATOR",
                self.max_booklets_per_evaluator,
            ),
            generate_schedule: env_parse("GENERATE_SCHEDULE", self.generate_schedule),
            generate_bulk: env_parse("GENERATE_BULK", self.generate_bulk),
            save_to_same_location: env_parse("SAVE_TO_SAME_LOCATION", self.save_to_same_location),
            output_dir: std::env::var("OUTPUT_DIR").unwrap_or(self.output_dir),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(self.output_log_file),
            verbose_logging: env_parse("VERBOSE_LOGGING", self.verbose_logging),
            random_seed: match std::env::var("RANDOM_SEED") {
                Ok(_) => Some(env_parse("RANDOM_SEED", self.random_seed.unwrap_or_default())),
                Err(_) => self.random_seed,
            },
        }
    }
}

fn env_parse<T: FromStr>(var_name: &str, current: T) -> T {
    let Ok(raw) = std::env::var(var_name) else {
        return current;
    };
    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            let err = ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value: raw,
                expected_type: std::any::type_name::<T>().to_string(),
            };
            warn!("⚠️ {}，沿用原值", err);
            current
        }
    }
}
