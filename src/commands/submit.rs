//! # submit 命令实现
//!
//! 为每个 ABINIT 输入文件生成 sbatch 脚本并提交到 Slurm。
//!
//! ## 功能
//! - 脚本与日志文件放在输入文件旁：`<stem>_sbatch.sh`, `<stem>.log`
//! - 可选的 sbatch 头文件（附加指令行）
//! - 可选只生成不提交
//! - 可选等待全部作业结束
//!
//! ## 依赖关系
//! - 使用 `cli/submit.rs` 定义的参数
//! - 使用 `scheduler/`, `utils/slurm.rs`, `utils/output.rs`
//! - 使用 `commands/wait.rs` 的等待与状态表

use super::wait::wait_and_report;
use crate::cli::submit::SubmitArgs;
use crate::error::{Result, SymmStateError};
use crate::parsers::input_file::read_preamble;
use crate::scheduler::{JobCoordinator, Scheduler, SlurmScheduler};
use crate::utils::output;
use crate::utils::slurm::{write_batch_script, BatchScriptDescriptor};

use std::path::{Path, PathBuf};

/// 单个输入文件对应的作业文件
#[derive(Debug, Clone, PartialEq)]
struct JobFiles {
    /// 相对于脚本目录的输入文件名
    input_name: String,
    log_name: String,
    batch_path: PathBuf,
}

/// 执行 submit 命令
pub fn execute(args: SubmitArgs) -> Result<()> {
    output::print_header("Batch Job Submission");

    let extra_directives = match &args.preamble {
        Some(path) => read_preamble(path)?,
        None => Vec::new(),
    };

    let base = BatchScriptDescriptor {
        partition: args.partition.clone(),
        ntasks: args.ntasks,
        time_limit: args.time.clone(),
        extra_directives,
        num_procs: args.nprocs,
        command_template: args.template.clone(),
        ..Default::default()
    };

    let mut coordinator =
        JobCoordinator::new(SlurmScheduler::default()).keep_scripts(!args.remove_scripts);

    let failed = submit_all(&mut coordinator, &args.input_files, &base, args.dry_run)?;

    output::print_separator();
    output::print_done(&format!(
        "Processed {} input(s), submitted {} job(s), {} failure(s)",
        args.input_files.len(),
        coordinator.tracked_jobs().len(),
        failed
    ));

    if args.wait && !coordinator.tracked_jobs().is_empty() {
        wait_and_report(&mut coordinator, args.poll_interval)?;
    }

    if failed > 0 {
        return Err(SymmStateError::Other(format!(
            "{} of {} submission(s) failed",
            failed,
            args.input_files.len()
        )));
    }

    Ok(())
}

/// 逐个生成并提交；单个失败只记录，不影响其余输入。返回失败数
fn submit_all<S: Scheduler>(
    coordinator: &mut JobCoordinator<S>,
    inputs: &[PathBuf],
    base: &BatchScriptDescriptor,
    dry_run: bool,
) -> Result<usize> {
    let mut failed = 0;

    for input in inputs {
        if !input.is_file() {
            output::print_error(&format!("Input '{}' not found, skipping", input.display()));
            failed += 1;
            continue;
        }

        let files = job_files(input)?;
        let descriptor = BatchScriptDescriptor {
            job_name: stem_of(input)?,
            ..base.clone()
        };

        if dry_run {
            match write_batch_script(&files.input_name, &files.log_name, &files.batch_path, &descriptor)
            {
                Ok(path) => output::print_info(&format!("[DRY] Generated '{}'", path.display())),
                Err(e) => {
                    output::print_error(&e.to_string());
                    failed += 1;
                }
            }
            continue;
        }

        if let Err(e) =
            coordinator.submit(&files.input_name, &files.log_name, &files.batch_path, &descriptor)
        {
            output::print_error(&e.to_string());
            failed += 1;
        }
    }

    Ok(failed)
}

fn stem_of(input: &Path) -> Result<String> {
    input
        .file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            SymmStateError::InvalidArgument(format!("cannot derive job name from '{}'", input.display()))
        })
}

fn job_files(input: &Path) -> Result<JobFiles> {
    let stem = stem_of(input)?;
    let input_name = input
        .file_name()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .ok_or_else(|| SymmStateError::InvalidArgument(format!("bad input path '{}'", input.display())))?;
    let dir = input.parent().unwrap_or_else(|| Path::new(""));

    Ok(JobFiles {
        input_name,
        log_name: format!("{}.log", stem),
        batch_path: dir.join(format!("{}_sbatch.sh", stem)),
    })
}
