//! # smodes 命令实现
//!
//! ## 依赖关系
//! - 使用 `cli/smodes.rs` 定义的参数
//! - 使用 `tools/smodes.rs`, `utils/output.rs`

use crate::cli::smodes::SmodesArgs;
use crate::error::Result;
use crate::tools::smodes::LOG_FILE_NAME;
use crate::tools::{run_symmetry_adaptation, SymmetryRequest};
use crate::utils::output;

/// 执行 smodes 命令
pub fn execute(args: SmodesArgs) -> Result<()> {
    let request = SymmetryRequest {
        program: args.program,
        structure: args.structure,
        symmetry_input: args.symmetry_input,
        irrep: args.irrep,
        workdir: args.workdir,
        write_log: !args.no_log,
    };

    output::print_info(&format!(
        "Running {} for irrep {} in '{}'",
        request.program,
        request.irrep,
        request.workdir.display()
    ));

    let text = run_symmetry_adaptation(&request)?;
    print!("{}", text);

    if request.write_log {
        output::print_success(&format!(
            "Output saved to '{}'",
            request.workdir.join(LOG_FILE_NAME).display()
        ));
    }

    Ok(())
}
