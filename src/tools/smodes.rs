//! # SMODES 对称性适配调用
//!
//! 以 `<program> <structure> <symmetry_input> <irrep>` 形式调用外部对称性
//! 分析程序，收集其输出。程序本身的算法不在本工具范围内。
//!
//! ## 依赖关系
//! - 被 `commands/smodes.rs` 使用
//! - 使用 `scheduler/slurm.rs` 的 `run_command`

use crate::error::{Result, SymmStateError};
use crate::scheduler::slurm::run_command;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// 运行日志文件名
pub const LOG_FILE_NAME: &str = "output.log";

/// 一次对称性适配调用
#[derive(Debug, Clone)]
pub struct SymmetryRequest {
    /// 可执行文件（名称或路径）
    pub program: String,
    pub structure: PathBuf,
    pub symmetry_input: PathBuf,
    /// 不可约表示标签，如 `GM4-`
    pub irrep: String,
    pub workdir: PathBuf,
    /// 是否把输出写入 `<workdir>/output.log`
    pub write_log: bool,
}

impl SymmetryRequest {
    pub fn new(program: &str, structure: PathBuf, symmetry_input: PathBuf, irrep: &str) -> Self {
        SymmetryRequest {
            program: program.to_string(),
            structure,
            symmetry_input,
            irrep: irrep.to_string(),
            workdir: PathBuf::from("."),
            write_log: false,
        }
    }
}

/// 运行程序并返回输出（stdout 在前，stderr 在后）
///
/// 非零退出时返回 `ExternalToolError`，stderr 原样保留。
pub fn run_symmetry_adaptation(request: &SymmetryRequest) -> Result<String> {
    if !request.workdir.is_dir() {
        return Err(SymmStateError::DirectoryNotFound {
            path: request.workdir.display().to_string(),
        });
    }

    // 子进程在 workdir 中运行，相对路径需先按调用方的当前目录解析
    let cwd = env::current_dir().map_err(|e| SymmStateError::FileReadError {
        path: ".".to_string(),
        source: e,
    })?;
    let program = if request.program.contains('/') {
        resolve_against(&cwd, Path::new(&request.program))
            .display()
            .to_string()
    } else {
        request.program.clone()
    };

    let mut cmd = Command::new(&program);
    cmd.arg(resolve_against(&cwd, &request.structure))
        .arg(resolve_against(&cwd, &request.symmetry_input))
        .arg(&request.irrep)
        .current_dir(&request.workdir);

    let out = run_command(&mut cmd, &request.program)?;

    let mut text = String::from_utf8_lossy(&out.stdout).to_string();
    text.push_str(&String::from_utf8_lossy(&out.stderr));

    if request.write_log {
        let log_path = request.workdir.join(LOG_FILE_NAME);
        fs::write(&log_path, &text).map_err(|e| SymmStateError::FileWriteError {
            path: log_path.display().to_string(),
            source: e,
        })?;
    }

    Ok(text)
}

fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 写出一个 sh 脚本作为 structure 参数：`sh <script> <symmetry_input> <irrep>`
    fn shell_request(dir: &Path, body: &str, workdir: PathBuf) -> SymmetryRequest {
        let script = dir.join("fake_smodes.sh");
        let symm = dir.join("smodes.in");
        fs::write(&script, body).unwrap();
        fs::write(&symm, "P4mm\n").unwrap();
        SymmetryRequest {
            workdir,
            ..SymmetryRequest::new("sh", script, symm, "GM4-")
        }
    }

    #[test]
    fn test_missing_program() {
        let req = SymmetryRequest::new(
            "definitely-not-a-real-smodes",
            PathBuf::from("x.cif"),
            PathBuf::from("smodes.in"),
            "GM4-",
        );
        match run_symmetry_adaptation(&req) {
            Err(SymmStateError::ExternalToolError { stderr, .. }) => {
                assert!(stderr.contains("not found"))
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_nonzero_exit_keeps_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let req = shell_request(
            dir.path(),
            "echo 'Irrep not recognized' >&2\nexit 2\n",
            dir.path().to_path_buf(),
        );
        match run_symmetry_adaptation(&req) {
            Err(SymmStateError::ExternalToolError { stderr, .. }) => {
                assert_eq!(stderr.trim(), "Irrep not recognized")
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_output_written_to_log() {
        let dir = tempfile::tempdir().unwrap();
        let mut req = shell_request(dir.path(), "echo \"modes for $2\"\n", dir.path().to_path_buf());
        req.write_log = true;

        let text = run_symmetry_adaptation(&req).unwrap();
        assert_eq!(text.trim(), "modes for GM4-");

        let log = fs::read_to_string(dir.path().join(LOG_FILE_NAME)).unwrap();
        assert_eq!(log, text);
    }

    #[test]
    fn test_relative_inputs_with_separate_workdir() {
        // 输入放在当前目录下，用相对路径传入；workdir 在别处
        let cwd = env::current_dir().unwrap();
        let inputs = tempfile::tempdir_in(&cwd).unwrap();
        let workdir = tempfile::tempdir().unwrap();
        let req = shell_request(inputs.path(), "cat \"$1\"\n", workdir.path().to_path_buf());
        let relative = SymmetryRequest {
            structure: req.structure.strip_prefix(&cwd).unwrap().to_path_buf(),
            symmetry_input: req.symmetry_input.strip_prefix(&cwd).unwrap().to_path_buf(),
            ..req
        };
        assert!(relative.structure.is_relative());

        let text = run_symmetry_adaptation(&relative).unwrap();
        assert_eq!(text.trim(), "P4mm");
    }

    #[test]
    fn test_resolve_against() {
        let base = Path::new("/home/user/project");
        assert_eq!(
            resolve_against(base, Path::new("BTO.cif")),
            PathBuf::from("/home/user/project/BTO.cif")
        );
        assert_eq!(resolve_against(base, Path::new("/abs/x.in")), PathBuf::from("/abs/x.in"));
    }

    #[test]
    fn test_missing_workdir() {
        let dir = tempfile::tempdir().unwrap();
        let req = shell_request(dir.path(), "true\n", dir.path().join("absent"));
        assert!(matches!(
            run_symmetry_adaptation(&req),
            Err(SymmStateError::DirectoryNotFound { .. })
        ));
    }
}
