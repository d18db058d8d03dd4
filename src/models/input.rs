//! # 计算任务输入数据模型
//!
//! 关键字输入文件（`name`, `num_datapoints`, `genstruc`, `min`, `max`,
//! `sbatch_preamble`）解析后的配置。
//!
//! ## 依赖关系
//! - 被 `parsers/input_file.rs` 构造
//! - 被 `commands/check.rs` 使用

use serde::Serialize;
use std::path::PathBuf;

/// 扰动振幅扫描计算的输入
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlpzInput {
    /// 计算名称
    pub name: String,

    /// 振幅采样点数
    pub num_datapoints: usize,

    /// 结构（Abinit 输入）文件
    pub genstruc: PathBuf,

    /// 最小振幅
    pub min_amp: f64,

    /// 最大振幅
    pub max_amp: f64,

    /// sbatch 头文件
    pub sbatch_preamble: PathBuf,

    /// 可选：目标不可约表示
    pub irrep: Option<String>,

    /// 可选：对称性输入文件
    pub smodes_input: Option<PathBuf>,
}

impl FlpzInput {
    /// 等间距振幅网格 `min + i * (max - min) / (n - 1)`
    pub fn amplitudes(&self) -> Vec<f64> {
        if self.num_datapoints <= 1 {
            return vec![self.min_amp];
        }
        let step = (self.max_amp - self.min_amp) / (self.num_datapoints - 1) as f64;
        (0..self.num_datapoints)
            .map(|i| self.min_amp + i as f64 * step)
            .collect()
    }
}
