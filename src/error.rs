use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 文件读写错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 输入表格格式错误
    #[error("输入错误: {0}")]
    Input(#[from] InputError),
    /// 配置错误（分布 / 抽取比例不合法）
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 输出文件生成错误
    #[error("输出错误: {0}")]
    Output(#[from] OutputError),
    /// 其他错误（用于包装第三方库错误）
    #[error("错误: {0}")]
    Other(String),
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 文件不存在
    #[error("文件不存在: {path}")]
    NotFound { path: String },
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// 输入表格错误
#[derive(Debug, Error)]
pub enum InputError {
    /// 缺少必需列
    #[error("{file} is missing required columns: {}", .missing.join(", "))]
    MissingColumns { file: String, missing: Vec<String> },
    /// 工作簿中没有工作表
    #[error("{file}: the workbook does not contain any worksheets")]
    NoWorksheet { file: String },
    /// 工作表为空
    #[error("{file}: the worksheet is empty")]
    EmptyWorksheet { file: String },
}

/// 配置错误
///
/// 文案与操作界面上展示给用户的提示保持一致。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// 三个分布比例中存在 0
    #[error("None of the fields can be zero.")]
    ZeroCategory,
    /// 分布比例之和超过 100
    #[error("Category sum exceeds 100%. Please adjust the values.")]
    CategorySumExceeds,
    /// 抽取比例之和不等于每位评卷人的最大抽取比例
    #[error("Sum of top pick, middle pick, and bottom pick must be exactly equal to {max}%.")]
    PickingSumMismatch { max: u32 },
    /// 每位评卷人的最大抽取比例超出 1–100
    #[error("Maximum booklets per evaluator must be between 1 and 100 (got {value}).")]
    MaxBookletsOutOfRange { value: u32 },
    /// 没有选择任何输入文件
    #[error("Please select at least one Excel file to process.")]
    NoFilesSelected,
    /// 没有可处理的有效文件
    #[error("No valid files to process. Please check your file format.")]
    NoValidFiles,
    /// 没有选择任何输出类型
    #[error("Please select at least one output file type.")]
    NoOutputSelected,
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
}

/// 输出文件错误
#[derive(Debug, Error)]
pub enum OutputError {
    /// 生成工作簿失败
    #[error("生成工作簿失败 ({file}): {source}")]
    WorkbookFailed {
        file: String,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },
    /// 保存到输入文件所在目录与输出目录均失败
    #[error("无法保存 {file}: {reason}")]
    SaveFailed { file: String, reason: String },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建工作簿生成错误
    pub fn workbook_failed(file: impl Into<String>, source: rust_xlsxwriter::XlsxError) -> Self {
        AppError::Output(OutputError::WorkbookFailed {
            file: file.into(),
            source,
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
