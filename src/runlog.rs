//! 运行日志
//!
//! 每次运行结束时向文本文件追加一行 `<时间> - Errors: <错误数>`

use crate::error::ReportError;
use chrono::{DateTime, Local};
use std::io::Write;
use std::path::{Path, PathBuf};

/// 单次运行的日志条目
#[derive(Debug, Clone, PartialEq)]
pub struct RunLogEntry {
    /// 运行时间
    pub timestamp: DateTime<Local>,
    /// 错误数
    pub error_count: usize,
}

impl std::fmt::Display for RunLogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} - Errors: {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S%.6f"),
            self.error_count
        )
    }
}

/// 追加写入的运行日志文件
#[derive(Debug, Clone)]
pub struct RunLog {
    path: PathBuf,
}

impl RunLog {
    /// 创建运行日志
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 日志文件路径
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 追加一条记录，文件不存在时自动创建
    pub fn append(&self, entry: &RunLogEntry) -> Result<(), ReportError> {
        let write_error = |source| ReportError::Write {
            path: self.path.display().to_string(),
            source,
        };

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(write_error)?;
        writeln!(file, "{entry}").map_err(write_error)
    }
}
