//! # 作业协调器
//!
//! 跟踪已提交的作业编号，轮询调度器直到全部作业进入终态。
//!
//! ## 状态
//! ```text
//! Idle ──submit──▶ Polling ──全部终态──▶ Idle
//!                     │
//!                     └──中断──▶ Interrupted ──下一次 wait/poll──▶ Polling
//! ```
//! 调度器不会主动通知，"是否全部结束"每次都重新查询外部状态，
//! 不依赖缓存标志。作业只有在显式调用 `forget_finished` 时才会移出跟踪集合。
//!
//! ## 依赖关系
//! - 被 `commands/submit.rs`, `commands/wait.rs` 使用
//! - 使用 `scheduler/slurm.rs`, `scheduler/interrupt.rs`
//! - 使用 `utils/slurm.rs`, `utils/output.rs`, `utils/progress.rs`

use super::interrupt::{CancelHandle, SigintGuard};
use super::slurm::{parse_job_id, parse_state_table, Scheduler};
use crate::error::{Result, SymmStateError};
use crate::models::{JobId, JobState};
use crate::utils::slurm::{write_batch_script, BatchScriptDescriptor};
use crate::utils::{output, progress};

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

/// 睡眠切片长度，决定中断响应的延迟上限
const SLEEP_SLICE: Duration = Duration::from_millis(200);

/// 协调器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    Idle,
    Polling,
    Interrupted,
}

/// 等待结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// 所有跟踪的作业都已进入终态（不区分成功或失败）
    Finished,
    /// 等待被中断，跟踪集合保持不变
    Interrupted,
}

/// 状态查询的重试策略
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            backoff: Duration::from_secs(5),
        }
    }
}

/// 作业协调器
///
/// 不是线程安全的：`submit` 原地修改跟踪集合，`poll` 读取它。
pub struct JobCoordinator<S: Scheduler> {
    scheduler: S,
    tracked: Vec<JobId>,
    last_states: BTreeMap<JobId, JobState>,
    state: CoordinatorState,
    retry: RetryPolicy,
    cancel: CancelHandle,
    keep_scripts: bool,
}

impl<S: Scheduler> JobCoordinator<S> {
    pub fn new(scheduler: S) -> Self {
        JobCoordinator {
            scheduler,
            tracked: Vec::new(),
            last_states: BTreeMap::new(),
            state: CoordinatorState::Idle,
            retry: RetryPolicy::default(),
            cancel: CancelHandle::new(),
            keep_scripts: true,
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// 提交成功后是否保留 sbatch 脚本
    pub fn keep_scripts(mut self, keep: bool) -> Self {
        self.keep_scripts = keep;
        self
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn state(&self) -> CoordinatorState {
        self.state
    }

    /// 跟踪中的作业（提交顺序）
    pub fn tracked_jobs(&self) -> &[JobId] {
        &self.tracked
    }

    /// 最近一次轮询得到的各作业状态，可用于区分成功与失败
    pub fn job_states(&self) -> &BTreeMap<JobId, JobState> {
        &self.last_states
    }

    /// 取消句柄，调用 `cancel()` 会让正在进行的等待返回
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// 生成脚本并提交；成功后把作业编号加入跟踪集合
    pub fn submit(
        &mut self,
        input_file: &str,
        log_file: &str,
        batch_name: &Path,
        descriptor: &BatchScriptDescriptor,
    ) -> Result<JobId> {
        let script = write_batch_script(input_file, log_file, batch_name, descriptor)?;
        let script_name = script.display().to_string();

        let stdout = self
            .scheduler
            .submit(&script)
            .map_err(|e| SymmStateError::SubmissionError {
                script: script_name.clone(),
                reason: e.to_string(),
            })?;

        let job_id = parse_job_id(&stdout).ok_or_else(|| SymmStateError::SubmissionError {
            script: script_name.clone(),
            reason: format!("no job id in scheduler output: '{}'", stdout.trim()),
        })?;

        self.track(job_id.clone());
        output::print_submitted(&script_name, job_id.as_str());

        if !self.keep_scripts {
            if let Err(e) = fs::remove_file(&script) {
                output::print_warning(&format!("Could not remove '{}': {}", script_name, e));
            }
        }

        Ok(job_id)
    }

    /// 接管一个已经提交的作业
    pub fn track_existing(&mut self, job_id: JobId) {
        self.track(job_id);
    }

    fn track(&mut self, job_id: JobId) {
        if !self.tracked.contains(&job_id) {
            self.tracked.push(job_id);
        }
        if self.state == CoordinatorState::Idle {
            self.state = CoordinatorState::Polling;
        }
    }

    /// 一次批量查询全部跟踪的作业；全部为终态时返回 true
    ///
    /// 查询失败按重试策略重试，用尽后返回 `PollError`，跟踪集合不变。
    /// 已请求取消时不再重试，退避等待也会提前结束。
    pub fn poll(&mut self) -> Result<bool> {
        if self.tracked.is_empty() {
            self.state = CoordinatorState::Idle;
            return Ok(true);
        }
        self.state = CoordinatorState::Polling;

        let attempts = self.retry.max_attempts.max(1);
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            match self.scheduler.query(&self.tracked) {
                Ok(text) => {
                    let snapshot = parse_state_table(&text, &self.tracked);
                    let finished = snapshot.values().all(JobState::is_terminal);
                    self.last_states = snapshot;
                    if finished {
                        self.state = CoordinatorState::Idle;
                    }
                    return Ok(finished);
                }
                Err(e) => {
                    last_error = e.to_string();
                    if attempt == attempts || self.cancel.is_cancelled() {
                        return Err(SymmStateError::PollError {
                            attempts: attempt,
                            reason: last_error,
                        });
                    }
                    output::print_warning(&format!(
                        "Scheduler query failed (attempt {}/{}), retrying: {}",
                        attempt, attempts, last_error
                    ));
                    if self.sleep_interruptible(self.retry.backoff) {
                        return Err(SymmStateError::PollError {
                            attempts: attempt,
                            reason: format!("interrupted during retry backoff: {}", last_error),
                        });
                    }
                }
            }
        }

        Err(SymmStateError::PollError {
            attempts,
            reason: last_error,
        })
    }

    /// 阻塞直到全部作业进入终态
    ///
    /// 在睡眠或两次轮询之间收到中断（SIGINT 或取消句柄）时返回
    /// `WaitOutcome::Interrupted`，不报错，跟踪集合保持原样。
    pub fn wait_until_done(&mut self, poll_interval: Duration) -> Result<WaitOutcome> {
        self.cancel.reset();
        let _guard = SigintGuard::install();

        let spinner = progress::create_spinner(&format!(
            "Waiting for {} job(s)...",
            self.tracked.len()
        ));

        let outcome = loop {
            if self.cancel.is_cancelled() {
                break Ok(WaitOutcome::Interrupted);
            }

            match self.poll() {
                Ok(true) => break Ok(WaitOutcome::Finished),
                Ok(false) => spinner.set_message(self.progress_summary()),
                // Ctrl-C 也会送达 sacct 子进程，使查询失败
                Err(_) if self.cancel.is_cancelled() => break Ok(WaitOutcome::Interrupted),
                Err(e) => break Err(e),
            }

            if self.sleep_interruptible(poll_interval) {
                break Ok(WaitOutcome::Interrupted);
            }
        };

        spinner.finish_and_clear();

        if let Ok(WaitOutcome::Interrupted) = outcome {
            self.state = CoordinatorState::Interrupted;
            output::print_warning(&format!(
                "Stopped waiting; {} job(s) still tracked",
                self.tracked.len()
            ));
        }

        outcome
    }

    /// 移除已进入终态的作业，返回它们的最终状态
    pub fn forget_finished(&mut self) -> Vec<(JobId, JobState)> {
        let mut removed = Vec::new();
        let last_states = &self.last_states;
        self.tracked.retain(|id| match last_states.get(id) {
            Some(state) if state.is_terminal() => {
                removed.push((id.clone(), state.clone()));
                false
            }
            _ => true,
        });
        for (id, _) in &removed {
            self.last_states.remove(id);
        }
        if self.tracked.is_empty() {
            self.state = CoordinatorState::Idle;
        }
        removed
    }

    /// 按切片睡眠；被中断时返回 true
    fn sleep_interruptible(&self, total: Duration) -> bool {
        let deadline = Instant::now() + total;
        loop {
            if self.cancel.is_cancelled() {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            thread::sleep(SLEEP_SLICE.min(deadline - now));
        }
    }

    fn progress_summary(&self) -> String {
        let finished = self
            .last_states
            .values()
            .filter(|s| s.is_terminal())
            .count();
        let running = self
            .last_states
            .values()
            .filter(|s| matches!(s, JobState::Running))
            .count();
        format!(
            "{}/{} finished, {} running",
            finished,
            self.tracked.len(),
            running
        )
    }
}
