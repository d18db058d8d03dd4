//! # wait 命令实现
//!
//! 接管已提交的作业编号，等待全部结束并显示最终状态。
//!
//! ## 依赖关系
//! - 使用 `cli/wait.rs` 定义的参数
//! - 使用 `scheduler/`, `utils/output.rs`
//! - `wait_and_report` 也被 `commands/submit.rs` 使用

use crate::cli::wait::WaitArgs;
use crate::error::{Result, SymmStateError};
use crate::models::{JobId, JobState};
use crate::scheduler::{JobCoordinator, Scheduler, SlurmScheduler, WaitOutcome};
use crate::utils::output;

use std::collections::BTreeMap;
use std::time::Duration;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct StateRow {
    #[tabled(rename = "Job ID")]
    job_id: String,
    #[tabled(rename = "State")]
    state: String,
}

/// 执行 wait 命令
pub fn execute(args: WaitArgs) -> Result<()> {
    let mut coordinator = JobCoordinator::new(SlurmScheduler::default());

    for raw in &args.job_ids {
        let id = raw.trim();
        if id.is_empty() || id.parse::<u64>().is_err() {
            return Err(SymmStateError::InvalidArgument(format!(
                "'{}' is not a Slurm job id",
                raw
            )));
        }
        coordinator.track_existing(JobId::new(id));
    }

    wait_and_report(&mut coordinator, args.poll_interval)
}

/// 等待协调器中的作业并打印状态表
pub(crate) fn wait_and_report<S: Scheduler>(
    coordinator: &mut JobCoordinator<S>,
    poll_interval_secs: u64,
) -> Result<()> {
    output::print_info(&format!(
        "Waiting for {} job(s), polling every {} s (Ctrl-C stops waiting)",
        coordinator.tracked_jobs().len(),
        poll_interval_secs
    ));

    match coordinator.wait_until_done(Duration::from_secs(poll_interval_secs.max(1)))? {
        WaitOutcome::Finished => {
            output::print_header("Final job states");
            print_state_table(coordinator.job_states());

            let failed = coordinator
                .job_states()
                .values()
                .filter(|s| !s.is_success())
                .count();
            if failed == 0 {
                output::print_done("All jobs completed");
            } else {
                output::print_warning(&format!("{} job(s) did not complete successfully", failed));
            }
        }
        WaitOutcome::Interrupted => {
            let ids: Vec<&str> = coordinator.tracked_jobs().iter().map(JobId::as_str).collect();
            output::print_info(&format!("Resume with: symmstate wait {}", ids.join(" ")));
        }
    }

    Ok(())
}

/// 打印作业状态表
pub(crate) fn print_state_table(states: &BTreeMap<JobId, JobState>) {
    let rows: Vec<StateRow> = states
        .iter()
        .map(|(id, state)| StateRow {
            job_id: id.to_string(),
            state: state.to_string(),
        })
        .collect();
    println!("{}", Table::new(&rows));
}
