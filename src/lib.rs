//! # SymmState 库
//!
//! 供 `symmstate` 可执行文件使用，也可作为库直接调用：
//! 输出文件解析（`parsers`）、sbatch 脚本生成（`utils::slurm`）、
//! 作业协调（`scheduler`）与外部工具调用（`tools`）。
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用

pub mod batch;
pub mod cli;
pub mod commands;
pub mod error;
pub mod models;
pub mod parsers;
pub mod scheduler;
pub mod tools;
pub mod utils;

pub use error::{Result, SymmStateError};
