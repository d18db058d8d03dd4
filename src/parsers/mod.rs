//! # 解析器模块
//!
//! 提供计算输出（能量、张量）、关键字输入文件和数值块的解析器。
//!
//! ## 依赖关系
//! - 被 `commands/` 模块使用
//! - 使用 `models/` 数据模型
//! - 子模块: numeric, abinit_out, input_file

pub mod abinit_out;
pub mod input_file;
pub mod numeric;

use crate::error::{Result, SymmStateError};
use std::fs;
use std::path::Path;

/// 读取整个文本文件；文件不存在与读取失败分开报告
pub fn read_text_file(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(SymmStateError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    fs::read_to_string(path).map_err(|e| SymmStateError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })
}
