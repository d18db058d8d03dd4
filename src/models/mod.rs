//! # 数据模型模块
//!
//! 定义张量、作业和输入配置的数据模型。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `scheduler/` 和 `commands/` 使用
//! - 子模块: tensor, job, input

pub mod input;
pub mod job;
pub mod tensor;

pub use input::FlpzInput;
pub use job::{JobId, JobState};
pub use tensor::{PiezoTensors, Tensor, FLEXO_SHAPE, PIEZO_SHAPE};
