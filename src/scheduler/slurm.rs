//! # Slurm 调度器接口
//!
//! 通过 `sbatch` 提交作业，通过一次 `sacct` 批量查询所有作业状态。
//!
//! ## 依赖关系
//! - 被 `scheduler/coordinator.rs` 使用
//! - 使用 `models/job.rs`

use crate::error::{Result, SymmStateError};
use crate::models::{JobId, JobState};

use std::collections::{BTreeMap, HashSet};
use std::io::ErrorKind;
use std::path::Path;
use std::process::{Command, Output};

/// 调度器协作者
///
/// `submit` 返回提交命令的标准输出；`query` 对所有编号做一次批量查询，
/// 返回表格文本（每行一个作业）。
pub trait Scheduler {
    fn submit(&self, script: &Path) -> Result<String>;
    fn query(&self, ids: &[JobId]) -> Result<String>;
}

/// 基于 `sbatch` / `sacct` 的 Slurm 实现
#[derive(Debug, Clone)]
pub struct SlurmScheduler {
    pub sbatch: String,
    pub sacct: String,
}

impl Default for SlurmScheduler {
    fn default() -> Self {
        SlurmScheduler {
            sbatch: "sbatch".to_string(),
            sacct: "sacct".to_string(),
        }
    }
}

impl Scheduler for SlurmScheduler {
    fn submit(&self, script: &Path) -> Result<String> {
        // 在脚本所在目录提交，使相对路径的输入/日志文件落在同一目录
        let dir = script.parent().filter(|p| !p.as_os_str().is_empty());
        let file = script.file_name().map(Path::new).unwrap_or(script);

        let mut cmd = Command::new(&self.sbatch);
        cmd.arg(file);
        if let Some(dir) = dir {
            cmd.current_dir(dir);
        }

        let out = run_command(&mut cmd, &self.sbatch)?;
        Ok(String::from_utf8_lossy(&out.stdout).to_string())
    }

    fn query(&self, ids: &[JobId]) -> Result<String> {
        let id_list = ids
            .iter()
            .map(JobId::as_str)
            .collect::<Vec<_>>()
            .join(",");

        let mut cmd = Command::new(&self.sacct);
        cmd.args(["-X", "-n", "-P", "-o", "JobID,State", "-j", &id_list]);

        let out = run_command(&mut cmd, &self.sacct)?;
        Ok(String::from_utf8_lossy(&out.stdout).to_string())
    }
}

/// 运行外部命令；找不到可执行文件或非零退出都报告为 `ExternalToolError`
pub(crate) fn run_command(cmd: &mut Command, name: &str) -> Result<Output> {
    let out = cmd.output().map_err(|e| match e.kind() {
        ErrorKind::NotFound => SymmStateError::ExternalToolError {
            command: name.to_string(),
            stderr: "executable not found in PATH".to_string(),
        },
        _ => SymmStateError::ExternalToolError {
            command: name.to_string(),
            stderr: e.to_string(),
        },
    })?;

    if !out.status.success() {
        return Err(SymmStateError::ExternalToolError {
            command: format!("{:?}", cmd),
            stderr: String::from_utf8_lossy(&out.stderr).to_string(),
        });
    }

    Ok(out)
}

/// 从 `Submitted batch job 12345` 中取作业编号（最后一个记号，必须是整数）
pub fn parse_job_id(stdout: &str) -> Option<JobId> {
    let token = stdout.split_whitespace().last()?;
    // `--parsable` 输出形如 `12345;cluster`
    let token = token.split(';').next()?;
    token.parse::<u64>().ok()?;
    Some(JobId::new(token))
}

/// 解析状态表
///
/// 字段以 `|` 或空白分隔，第一列为作业编号，第二列起为状态。表头、分隔线、
/// 作业步（`123.batch`）以及非跟踪的编号都被跳过。查询结果中没有出现的
/// 作业记为 `Unknown`。
pub fn parse_state_table(text: &str, tracked: &[JobId]) -> BTreeMap<JobId, JobState> {
    let wanted: HashSet<&str> = tracked.iter().map(JobId::as_str).collect();
    let mut states: BTreeMap<JobId, JobState> = BTreeMap::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (id, state) = if line.contains('|') {
            let mut fields = line.split('|');
            (fields.next().unwrap_or("").trim(), fields.next().unwrap_or("").trim())
        } else {
            let mut fields = line.splitn(2, char::is_whitespace);
            (fields.next().unwrap_or(""), fields.next().unwrap_or("").trim())
        };

        if !wanted.contains(id) {
            continue;
        }

        states
            .entry(JobId::new(id))
            .or_insert_with(|| JobState::from_slurm(state));
    }

    for id in tracked {
        states.entry(id.clone()).or_insert(JobState::Unknown);
    }

    states
}
