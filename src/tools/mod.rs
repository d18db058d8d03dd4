//! # 外部工具调用
//!
//! ## 依赖关系
//! - 被 `commands/smodes.rs` 使用

pub mod smodes;

pub use smodes::{run_symmetry_adaptation, SymmetryRequest};
