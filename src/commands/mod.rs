//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `parsers/`, `scheduler/`, `tools/`, `batch/`, `utils/`
//! - 子模块: check, smodes, submit, wait, extract

pub mod check;
pub mod extract;
pub mod smodes;
pub mod submit;
pub mod wait;

use crate::cli::Commands;
use crate::error::Result;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Check(args) => check::execute(args),
        Commands::Smodes(args) => smodes::execute(args),
        Commands::Submit(args) => submit::execute(args),
        Commands::Wait(args) => wait::execute(args),
        Commands::Extract(args) => extract::execute(args),
    }
}
