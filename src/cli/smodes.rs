//! # smodes 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/smodes.rs`

use clap::Args;
use std::path::PathBuf;

/// smodes 子命令参数
#[derive(Args, Debug)]
pub struct SmodesArgs {
    /// SMODES executable
    #[arg(long, default_value = "smodes", env = "SYMMSTATE_SMODES")]
    pub program: String,

    /// Structure file passed as the first argument
    #[arg(long)]
    pub structure: PathBuf,

    /// SMODES symmetry input file
    #[arg(long)]
    pub symmetry_input: PathBuf,

    /// Irreducible representation label (e.g. 'GM4-')
    #[arg(long)]
    pub irrep: String,

    /// Working directory for the run
    #[arg(long, default_value = ".")]
    pub workdir: PathBuf,

    /// Do not write output.log into the working directory
    #[arg(long, default_value_t = false)]
    pub no_log: bool,
}
