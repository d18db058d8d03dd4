//! # submit 子命令 CLI 定义
//!
//! 为 ABINIT 输入文件生成 sbatch 脚本并提交到 Slurm
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/submit.rs`

use clap::Args;
use std::path::PathBuf;

/// submit 子命令参数
#[derive(Args, Debug)]
pub struct SubmitArgs {
    /// ABINIT input files (one job per file)
    #[arg(required = true)]
    pub input_files: Vec<PathBuf>,

    // ─────────────────────────────────────────────────────────────
    // Batch script options
    // ─────────────────────────────────────────────────────────────
    /// Command template ({input_file}, {log_file}, {num_procs} are substituted)
    #[arg(
        long,
        default_value = "mpirun -np {num_procs} abinit < {input_file} > {log_file}"
    )]
    pub template: String,

    /// Extra lines (#SBATCH directives, module loads) inserted before the command
    #[arg(long)]
    pub preamble: Option<PathBuf>,

    /// Number of MPI processes
    #[arg(long, default_value_t = 1)]
    pub nprocs: u32,

    // ─────────────────────────────────────────────────────────────
    // Slurm options
    // ─────────────────────────────────────────────────────────────
    /// Slurm partition
    #[arg(long, default_value = "debug", env = "SYMMSTATE_PARTITION")]
    pub partition: String,

    /// Number of tasks
    #[arg(long, default_value_t = 1)]
    pub ntasks: u32,

    /// Time limit (e.g., '24:00:00')
    #[arg(long, default_value = "24:00:00")]
    pub time: String,

    // ─────────────────────────────────────────────────────────────
    // Execution control
    // ─────────────────────────────────────────────────────────────
    /// Only generate batch scripts, do not submit
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Remove batch scripts after successful submission
    #[arg(long, default_value_t = false)]
    pub remove_scripts: bool,

    /// Wait until all submitted jobs have finished
    #[arg(long, default_value_t = false)]
    pub wait: bool,

    /// Seconds between scheduler queries while waiting
    #[arg(long, default_value_t = 30)]
    pub poll_interval: u64,
}
