//! # extract 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/extract.rs`

use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// 提取内容
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ExtractKind {
    /// Total energy from ABINIT output
    Energy,
    /// Flexoelectric tensor from anaddb output
    Flexo,
    /// Clamped/relaxed-ion piezoelectric tensors from anaddb output
    Piezo,
}

impl std::fmt::Display for ExtractKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractKind::Energy => write!(f, "energy"),
            ExtractKind::Flexo => write!(f, "flexo"),
            ExtractKind::Piezo => write!(f, "piezo"),
        }
    }
}

/// extract 子命令参数
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Output file or directory
    pub path: PathBuf,

    /// What to extract
    #[arg(long, value_enum)]
    pub kind: ExtractKind,

    /// File name pattern(s) when PATH is a directory (comma-separated)
    #[arg(long, default_value = "*.abo,*.out,*.log")]
    pub pattern: String,

    /// Recurse into subdirectories
    #[arg(short, long, default_value_t = false)]
    pub recursive: bool,

    /// Number of parallel jobs (0 = all CPUs)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Write results to a CSV file
    #[arg(long)]
    pub output_csv: Option<PathBuf>,
}
