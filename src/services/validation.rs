//! 配置校验 - 业务能力层
//!
//! 运行开始前做最终校验；任何一条失败都不允许开始运行。

use crate::config::Config;
use crate::error::ConfigError;

/// 分布比例校验：三项均不能为 0，且总和不超过 100
pub fn validate_distribution(top: u32, middle: u32, bottom: u32) -> Result<(), ConfigError> {
    if top == 0 || middle == 0 || bottom == 0 {
        return Err(ConfigError::ZeroCategory);
    }
    // 以 u64 求和，超大输入不会回绕
    if u64::from(top) + u64::from(middle) + u64::from(bottom) > 100 {
        return Err(ConfigError::CategorySumExceeds);
    }
    Ok(())
}

/// 抽取比例校验：三项之和必须恰好等于 `max_total`
pub fn validate_picking(
    pick_top: u32,
    pick_middle: u32,
    pick_bottom: u32,
    max_total: u32,
) -> Result<(), ConfigError> {
    let sum = u64::from(pick_top) + u64::from(pick_middle) + u64::from(pick_bottom);
    if sum != u64::from(max_total) {
        return Err(ConfigError::PickingSumMismatch { max: max_total });
    }
    Ok(())
}

/// 每位评卷人最大抽取比例须在 1–100 之间
pub fn validate_max_booklets(value: u32) -> Result<(), ConfigError> {
    if !(1..=100).contains(&value) {
        return Err(ConfigError::MaxBookletsOutOfRange { value });
    }
    Ok(())
}

/// 偏好设置的两项独立校验结果（供界面分别提示）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceValidation {
    pub distribution: Option<ConfigError>,
    pub picking: Option<ConfigError>,
}

impl PreferenceValidation {
    pub fn is_valid(&self) -> bool {
        self.distribution.is_none() && self.picking.is_none()
    }
}

pub fn validate_preferences(config: &Config) -> PreferenceValidation {
    PreferenceValidation {
        distribution: validate_distribution(
            config.top_category,
            config.middle_category,
            config.bottom_category,
        )
        .err(),
        picking: validate_picking(
            config.pick_top,
            config.pick_middle,
            config.pick_bottom,
            config.max_booklets_per_evaluator,
        )
        .err(),
    }
}

/// 运行前的完整校验
///
/// `selected_files` 为用户选择的文件数，`valid_files` 为其中必需列齐全的文件数。
pub fn validate_run(
    config: &Config,
    selected_files: usize,
    valid_files: usize,
) -> Result<(), ConfigError> {
    if selected_files == 0 {
        return Err(ConfigError::NoFilesSelected);
    }
    if valid_files == 0 {
        return Err(ConfigError::NoValidFiles);
    }
    validate_distribution(
        config.top_category,
        config.middle_category,
        config.bottom_category,
    )?;
    validate_max_booklets(config.max_booklets_per_evaluator)?;
    validate_picking(
        config.pick_top,
        config.pick_middle,
        config.pick_bottom,
        config.max_booklets_per_evaluator,
    )?;
    if !config.generate_schedule && !config.generate_bulk {
        return Err(ConfigError::NoOutputSelected);
    }
    Ok(())
}
