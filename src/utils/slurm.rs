//! # Slurm 脚本生成工具
//!
//! 由作业描述和命令模板生成 sbatch 提交脚本。输出只取决于输入，
//! 不含时间戳或随机内容。
//!
//! ## 依赖关系
//! - 被 `scheduler/coordinator.rs`, `commands/submit.rs` 使用
//! - 无外部模块依赖

use crate::error::{Result, SymmStateError};

use std::fs;
use std::path::{Path, PathBuf};

/// 命令模板占位符
pub const INPUT_PLACEHOLDER: &str = "{input_file}";
pub const LOG_PLACEHOLDER: &str = "{log_file}";
pub const NPROCS_PLACEHOLDER: &str = "{num_procs}";

/// sbatch 作业描述
#[derive(Debug, Clone, PartialEq)]
pub struct BatchScriptDescriptor {
    pub job_name: String,
    pub partition: String,
    pub ntasks: u32,
    pub time_limit: String,
    /// `#SBATCH --output` 文件名
    pub output_file: String,
    /// 原样追加的附加指令行（来自 sbatch 头文件或命令行）
    pub extra_directives: Vec<String>,
    pub num_procs: u32,
    /// 含 `{input_file}`, `{log_file}`, `{num_procs}` 的命令模板
    pub command_template: String,
}

impl Default for BatchScriptDescriptor {
    fn default() -> Self {
        BatchScriptDescriptor {
            job_name: "abinit".to_string(),
            partition: "debug".to_string(),
            ntasks: 1,
            time_limit: "24:00:00".to_string(),
            output_file: "slurm-%j.out".to_string(),
            extra_directives: vec![],
            num_procs: 1,
            command_template: "mpirun -np {num_procs} abinit < {input_file} > {log_file}"
                .to_string(),
        }
    }
}

impl BatchScriptDescriptor {
    /// 代入占位符得到执行命令
    pub fn render_command(&self, input_file: &str, log_file: &str) -> String {
        self.command_template
            .replace(INPUT_PLACEHOLDER, input_file)
            .replace(LOG_PLACEHOLDER, log_file)
            .replace(NPROCS_PLACEHOLDER, &self.num_procs.to_string())
    }
}

/// 生成 sbatch 脚本内容
pub fn generate_sbatch_script(
    descriptor: &BatchScriptDescriptor,
    input_file: &str,
    log_file: &str,
) -> String {
    let mut script = format!(
        r#"#!/bin/bash
#SBATCH --job-name={}
#SBATCH --partition={}
#SBATCH --ntasks={}
#SBATCH --time={}
#SBATCH --output={}
"#,
        descriptor.job_name,
        descriptor.partition,
        descriptor.ntasks,
        descriptor.time_limit,
        descriptor.output_file,
    );

    for line in &descriptor.extra_directives {
        script.push_str(line);
        script.push('\n');
    }

    script.push('\n');
    script.push_str(&descriptor.render_command(input_file, log_file));
    script.push('\n');
    script
}

/// 写出 sbatch 脚本（覆盖已有文件），返回脚本路径；不提交作业
pub fn write_batch_script(
    input_file: &str,
    log_file: &str,
    batch_name: &Path,
    descriptor: &BatchScriptDescriptor,
) -> Result<PathBuf> {
    if descriptor.command_template.trim().is_empty() {
        return Err(SymmStateError::InvalidArgument(
            "batch command template is empty".to_string(),
        ));
    }

    let content = generate_sbatch_script(descriptor, input_file, log_file);
    fs::write(batch_name, content).map_err(|e| SymmStateError::FileWriteError {
        path: batch_name.display().to_string(),
        source: e,
    })?;

    Ok(batch_name.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_descriptor() -> BatchScriptDescriptor {
        BatchScriptDescriptor {
            job_name: "TestJob".to_string(),
            partition: "debug".to_string(),
            ntasks: 1,
            time_limit: "01:00:00".to_string(),
            num_procs: 1,
            command_template: "mpirun -np {num_procs} dummy < {input_file} > {log_file}"
                .to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_write_batch_script_contents() {
        let dir = tempfile::tempdir().unwrap();
        let batch = dir.path().join("a_sbatch.sh");

        let path = write_batch_script("a.in", "a.log", &batch, &test_descriptor()).unwrap();
        assert_eq!(path, batch);

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert!(lines.contains(&"mpirun -np 1 dummy < a.in > a.log"));
        assert!(lines.iter().any(|l| l.contains("#SBATCH --job-name=TestJob")));
        assert!(lines.contains(&"#SBATCH --partition=debug"));
        assert!(lines.contains(&"#SBATCH --time=01:00:00"));
        assert_eq!(lines[0], "#!/bin/bash");
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let d = test_descriptor();
        assert_eq!(
            generate_sbatch_script(&d, "x.in", "x.log"),
            generate_sbatch_script(&d, "x.in", "x.log")
        );
    }

    #[test]
    fn test_extra_directives_verbatim_before_command() {
        let mut d = test_descriptor();
        d.num_procs = 16;
        d.extra_directives = vec!["#SBATCH --mem=8G".to_string(), "module load abinit".to_string()];
        let script = generate_sbatch_script(&d, "b.in", "b.log");

        let mem = script.find("#SBATCH --mem=8G").unwrap();
        let module = script.find("module load abinit").unwrap();
        let cmd = script.find("mpirun -np 16 dummy < b.in > b.log").unwrap();
        assert!(mem < module && module < cmd);
    }

    #[test]
    fn test_overwrites_existing_script() {
        let dir = tempfile::tempdir().unwrap();
        let batch = dir.path().join("job.sh");
        fs::write(&batch, "stale content").unwrap();

        write_batch_script("a.in", "a.log", &batch, &test_descriptor()).unwrap();
        let content = fs::read_to_string(&batch).unwrap();
        assert!(!content.contains("stale"));
    }

    #[test]
    fn test_empty_template_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut d = test_descriptor();
        d.command_template = "  ".to_string();
        assert!(write_batch_script("a.in", "a.log", &dir.path().join("j.sh"), &d).is_err());
    }
}
