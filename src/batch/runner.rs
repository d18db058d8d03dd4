//! # 批量执行器
//!
//! 并行地对一组输出文件执行提取函数，汇总结果与失败信息。
//!
//! ## 功能
//! - 基于 rayon 的并行迭代（结果保持输入顺序）
//! - 进度条显示
//! - 错误收集与汇总报告
//!
//! ## 依赖关系
//! - 被 `commands/extract.rs` 调用
//! - 使用 `utils/progress.rs` 创建进度条
//! - 使用 `rayon` 进行并行计算

use crate::error::{Result, SymmStateError};
use crate::utils::progress;

use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// 单个文件处理结果
#[derive(Debug, Clone)]
pub enum ProcessResult<T> {
    Success(PathBuf, T),
    Failed(PathBuf, String), // (文件路径, 错误信息)
}

/// 批量处理结果
#[derive(Debug)]
pub struct BatchResult<T> {
    /// 成功提取的值（按输入顺序）
    pub successes: Vec<(PathBuf, T)>,
    /// 失败详情
    pub failures: Vec<(PathBuf, String)>,
}

impl<T> Default for BatchResult<T> {
    fn default() -> Self {
        BatchResult {
            successes: Vec::new(),
            failures: Vec::new(),
        }
    }
}

impl<T> BatchResult<T> {
    pub fn merge(&mut self, result: ProcessResult<T>) {
        match result {
            ProcessResult::Success(path, value) => self.successes.push((path, value)),
            ProcessResult::Failed(path, err) => self.failures.push((path, err)),
        }
    }

    pub fn total(&self) -> usize {
        self.successes.len() + self.failures.len()
    }
}

/// 批量执行器
pub struct BatchRunner {
    /// 并行作业数
    jobs: usize,
}

impl BatchRunner {
    /// `jobs` 为 0 时使用 CPU 核数
    pub fn new(jobs: usize) -> Self {
        let jobs = if jobs == 0 { num_cpus::get() } else { jobs };
        Self { jobs }
    }

    /// 并行处理文件列表
    pub fn run<T, F>(&self, files: &[PathBuf], processor: F) -> Result<BatchResult<T>>
    where
        T: Send,
        F: Fn(&Path) -> Result<T> + Sync + Send,
    {
        let pb = progress::create_progress_bar(files.len() as u64, "Extracting");

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()
            .map_err(|e| SymmStateError::Other(format!("thread pool: {}", e)))?;

        let results: Vec<ProcessResult<T>> = pool.install(|| {
            files
                .par_iter()
                .map(|file| {
                    let result = match processor(file) {
                        Ok(value) => ProcessResult::Success(file.clone(), value),
                        Err(e) => ProcessResult::Failed(file.clone(), e.to_string()),
                    };
                    pb.inc(1);
                    result
                })
                .collect()
        });

        pb.finish_and_clear();

        let mut batch_result = BatchResult::default();
        for result in results {
            batch_result.merge(result);
        }

        Ok(batch_result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_keeps_order_and_collects_failures() {
        let files: Vec<PathBuf> = (0..8).map(|i| PathBuf::from(format!("f{}", i))).collect();
        let runner = BatchRunner::new(4);

        let result = runner
            .run(&files, |p| {
                let name = p.display().to_string();
                if name == "f3" {
                    Err(SymmStateError::Other("boom".to_string()))
                } else {
                    Ok(name.len())
                }
            })
            .unwrap();

        assert_eq!(result.total(), 8);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].0, PathBuf::from("f3"));
        let order: Vec<_> = result.successes.iter().map(|(p, _)| p.clone()).collect();
        let mut sorted = order.clone();
        sorted.sort();
        assert_eq!(order, sorted);
    }
}
