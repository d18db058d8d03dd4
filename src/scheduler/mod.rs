//! # 作业调度模块
//!
//! 提交 sbatch 脚本、批量查询作业状态、等待作业结束。
//!
//! ## 子模块
//! - `slurm`: 调度器接口与 Slurm 实现、输出解析
//! - `coordinator`: 作业跟踪与等待循环
//! - `interrupt`: 等待期间的 SIGINT 处理
//!
//! ## 依赖关系
//! - 被 `commands/submit.rs`, `commands/wait.rs` 使用

pub mod coordinator;
pub mod interrupt;
pub mod slurm;

pub use coordinator::{JobCoordinator, WaitOutcome};
pub use slurm::{Scheduler, SlurmScheduler};
