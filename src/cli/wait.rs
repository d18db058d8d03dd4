//! # wait 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/wait.rs`

use clap::Args;

/// wait 子命令参数
#[derive(Args, Debug)]
pub struct WaitArgs {
    /// Slurm job IDs
    #[arg(required = true)]
    pub job_ids: Vec<String>,

    /// Seconds between scheduler queries
    #[arg(long, default_value_t = 30)]
    pub poll_interval: u64,
}
