//! # 统一错误处理模块
//!
//! 定义 SymmState 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// SymmState 统一错误类型
#[derive(Error, Debug)]
pub enum SymmStateError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 输入文件错误（不重试）
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid input file: keyword '{keyword}'\nReason: {reason}")]
    ConfigError { keyword: String, reason: String },

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to parse output file: {path}\nReason: {reason}")]
    ParseError { path: String, reason: String },

    // ─────────────────────────────────────────────────────────────
    // 外部命令错误
    // ─────────────────────────────────────────────────────────────
    #[error("External command failed: {command}\n{stderr}")]
    ExternalToolError { command: String, stderr: String },

    // ─────────────────────────────────────────────────────────────
    // 调度器错误
    // ─────────────────────────────────────────────────────────────
    #[error("Job submission failed for '{script}': {reason}")]
    SubmissionError { script: String, reason: String },

    #[error("Scheduler status query failed after {attempts} attempt(s): {reason}")]
    PollError { attempts: u32, reason: String },

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ─────────────────────────────────────────────────────────────
    // CSV 错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

impl SymmStateError {
    /// 构造带路径的解析错误
    pub fn parse(path: impl Into<String>, reason: impl Into<String>) -> Self {
        SymmStateError::ParseError {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// 构造输入文件关键字错误
    pub fn config(keyword: impl Into<String>, reason: impl Into<String>) -> Self {
        SymmStateError::ConfigError {
            keyword: keyword.into(),
            reason: reason.into(),
        }
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, SymmStateError>;
