//! 文件处理上下文
//!
//! 封装"我正在处理第几个文件、叫什么"这一信息

use std::fmt::Display;
use std::path::PathBuf;

/// 文件处理上下文
#[derive(Debug, Clone)]
pub struct FileCtx {
    /// 文件索引（从1开始，仅用于日志显示）
    pub file_index: usize,

    /// 文件名
    pub file_name: String,

    /// 源文件路径，内存数据为空
    pub source_path: Option<PathBuf>,
}

impl FileCtx {
    /// 创建新的文件上下文
    pub fn new(file_index: usize, file_name: impl Into<String>, source_path: Option<PathBuf>) -> Self {
        Self {
            file_index,
            file_name: file_name.into(),
            source_path,
        }
    }
}

impl Display for FileCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[文件 #{} {}]", self.file_index, self.file_name)
    }
}
