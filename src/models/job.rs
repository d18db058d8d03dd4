//! # 作业数据模型
//!
//! 调度器分配的作业编号和作业状态。
//!
//! ## 依赖关系
//! - 被 `scheduler/` 使用
//! - 被 `commands/submit.rs`, `commands/wait.rs` 使用

use serde::Serialize;
use std::fmt;

/// 调度器分配的作业编号（不透明字符串）
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        JobId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 调度器报告的作业状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum JobState {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
    Timeout,
    OutOfMemory,
    NodeFail,
    Preempted,
    BootFail,
    Deadline,
    /// 查询结果中没有出现该作业（记账数据库可能滞后）
    Unknown,
    /// 其他非终态状态（CONFIGURING, SUSPENDED, REQUEUED 等）
    Other(String),
}

impl JobState {
    /// 从调度器状态字段解析
    ///
    /// `CANCELLED by 1234`、`CANCELLED+`、`RUNNING(x)` 等形式取第一个词。
    pub fn from_slurm(raw: &str) -> Self {
        let token = raw
            .split(|c: char| c == '+' || c == '(' || c.is_whitespace())
            .find(|s| !s.is_empty())
            .unwrap_or("")
            .to_ascii_uppercase();

        match token.as_str() {
            "PENDING" | "PD" => JobState::Pending,
            "RUNNING" | "R" | "COMPLETING" | "CG" => JobState::Running,
            "COMPLETED" | "CD" => JobState::Completed,
            "FAILED" | "F" => JobState::Failed,
            "CANCELLED" | "CA" => JobState::Cancelled,
            "TIMEOUT" | "TO" => JobState::Timeout,
            "OUT_OF_MEMORY" | "OOM" => JobState::OutOfMemory,
            "NODE_FAIL" | "NF" => JobState::NodeFail,
            "PREEMPTED" | "PR" => JobState::Preempted,
            "BOOT_FAIL" | "BF" => JobState::BootFail,
            "DEADLINE" | "DL" => JobState::Deadline,
            "" => JobState::Unknown,
            other => JobState::Other(other.to_string()),
        }
    }

    /// 终态：此后状态不再变化
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobState::Completed
                | JobState::Failed
                | JobState::Cancelled
                | JobState::Timeout
                | JobState::OutOfMemory
                | JobState::NodeFail
                | JobState::Preempted
                | JobState::BootFail
                | JobState::Deadline
        )
    }

    /// 只有 COMPLETED 算成功
    pub fn is_success(&self) -> bool {
        matches!(self, JobState::Completed)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobState::Pending => "PENDING",
            JobState::Running => "RUNNING",
            JobState::Completed => "COMPLETED",
            JobState::Failed => "FAILED",
            JobState::Cancelled => "CANCELLED",
            JobState::Timeout => "TIMEOUT",
            JobState::OutOfMemory => "OUT_OF_MEMORY",
            JobState::NodeFail => "NODE_FAIL",
            JobState::Preempted => "PREEMPTED",
            JobState::BootFail => "BOOT_FAIL",
            JobState::Deadline => "DEADLINE",
            JobState::Unknown => "UNKNOWN",
            JobState::Other(s) => s.as_str(),
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_normalization() {
        assert_eq!(JobState::from_slurm("CANCELLED by 1001"), JobState::Cancelled);
        assert_eq!(JobState::from_slurm("CANCELLED+"), JobState::Cancelled);
        assert_eq!(JobState::from_slurm("  running "), JobState::Running);
        assert_eq!(JobState::from_slurm("OUT_OF_MEMORY"), JobState::OutOfMemory);
        assert_eq!(
            JobState::from_slurm("REQUEUED"),
            JobState::Other("REQUEUED".to_string())
        );
    }

    #[test]
    fn test_terminal_set() {
        for s in ["COMPLETED", "FAILED", "CANCELLED", "TIMEOUT"] {
            assert!(JobState::from_slurm(s).is_terminal(), "{}", s);
        }
        for s in ["RUNNING", "PENDING", "SUSPENDED", ""] {
            assert!(!JobState::from_slurm(s).is_terminal(), "{}", s);
        }
        assert!(JobState::Completed.is_success());
        assert!(!JobState::Failed.is_success());
    }
}
