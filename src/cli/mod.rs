//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `check`: 检查 flpz 输入文件
//! - `smodes`: 调用对称性适配程序
//! - `submit`: 生成并提交 sbatch 脚本
//! - `wait`: 等待已提交作业结束
//! - `extract`: 从计算输出中提取能量与张量
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: check, smodes, submit, wait, extract

pub mod check;
pub mod extract;
pub mod smodes;
pub mod submit;
pub mod wait;

use clap::{Parser, Subcommand};

/// SymmState - 对称性适配结构扰动的作业工具箱
#[derive(Parser)]
#[command(name = "symmstate")]
#[command(version)]
#[command(about = "Symmetry-adapted distortion workflows for ABINIT on Slurm", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Parse an flpz input file and print its configuration
    Check(check::CheckArgs),

    /// Run the SMODES symmetry-adaptation program
    Smodes(smodes::SmodesArgs),

    /// Write batch scripts for ABINIT inputs and submit them to Slurm
    Submit(submit::SubmitArgs),

    /// Wait for already submitted Slurm jobs to finish
    Wait(wait::WaitArgs),

    /// Extract energies or tensors from ABINIT/anaddb output files
    Extract(extract::ExtractArgs),
}
