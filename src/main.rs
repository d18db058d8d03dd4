//! # SymmState - 对称性适配结构扰动工作流工具
//!
//! 为 ABINIT 振幅扫描计算生成并提交 Slurm 作业，等待其结束，
//! 并从输出中提取总能量、挠曲电张量与压电张量。
//!
//! ## 子命令
//! - `check`   - 检查 flpz 关键字输入文件
//! - `smodes`  - 调用 SMODES 对称性适配程序
//! - `submit`  - 生成 sbatch 脚本并提交
//! - `wait`    - 等待已提交作业结束
//! - `extract` - 批量提取能量与张量
//!
//! ## 依赖关系
//! ```text
//! main.rs → lib.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── parsers/   (输入文件与输出文件解析)
//!   │     ├── scheduler/ (作业提交与状态轮询)
//!   │     ├── tools/     (外部程序调用)
//!   │     ├── batch/     (并行批量提取)
//!   │     └── models/    (数据模型)
//!   ├── utils/      (工具函数)
//!   └── error.rs    (错误处理)
//! ```

use clap::Parser;
use symmstate::cli::Cli;
use symmstate::{commands, utils};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
