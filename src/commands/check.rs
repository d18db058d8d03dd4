//! # check 命令实现
//!
//! 解析 flpz 关键字输入文件，显示配置与振幅网格。
//!
//! ## 依赖关系
//! - 使用 `cli/check.rs` 定义的参数
//! - 使用 `parsers/input_file.rs`, `utils/output.rs`

use crate::cli::check::CheckArgs;
use crate::error::Result;
use crate::models::FlpzInput;
use crate::parsers::input_file::{parse_input_file, read_preamble};
use crate::utils::output;

use std::path::Path;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Keyword")]
    keyword: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

#[derive(Tabled)]
struct AmplitudeRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Amplitude")]
    amplitude: String,
}

/// 执行 check 命令
pub fn execute(args: CheckArgs) -> Result<()> {
    let input = parse_input_file(&args.input)?;

    output::print_header(&format!("Input '{}'", args.input.display()));
    println!("{}", Table::new(field_rows(&input)));

    let amplitudes: Vec<AmplitudeRow> = input
        .amplitudes()
        .into_iter()
        .enumerate()
        .map(|(i, a)| AmplitudeRow {
            index: i,
            amplitude: format!("{:.6}", a),
        })
        .collect();
    output::print_header("Amplitude grid");
    println!("{}", Table::new(&amplitudes));

    // 相对路径按输入文件所在目录解析
    let base = args.input.parent().unwrap_or_else(|| Path::new("."));
    let mut missing = 0;
    for path in referenced_files(&input) {
        let resolved = base.join(path);
        if !resolved.exists() {
            output::print_warning(&format!("Referenced file '{}' does not exist", resolved.display()));
            missing += 1;
        }
    }

    let preamble = base.join(&input.sbatch_preamble);
    if preamble.exists() {
        let lines = read_preamble(&preamble)?;
        output::print_info(&format!("sbatch preamble contributes {} line(s)", lines.len()));
    }

    if missing == 0 {
        output::print_success("Input file is valid");
    } else {
        output::print_done(&format!("Input parsed, {} referenced file(s) missing", missing));
    }

    Ok(())
}

fn field_rows(input: &FlpzInput) -> Vec<FieldRow> {
    let mut rows = vec![
        FieldRow {
            keyword: "name",
            value: input.name.clone(),
        },
        FieldRow {
            keyword: "num_datapoints",
            value: input.num_datapoints.to_string(),
        },
        FieldRow {
            keyword: "genstruc",
            value: input.genstruc.display().to_string(),
        },
        FieldRow {
            keyword: "min",
            value: input.min_amp.to_string(),
        },
        FieldRow {
            keyword: "max",
            value: input.max_amp.to_string(),
        },
        FieldRow {
            keyword: "sbatch_preamble",
            value: input.sbatch_preamble.display().to_string(),
        },
    ];
    if let Some(irrep) = &input.irrep {
        rows.push(FieldRow {
            keyword: "irrep",
            value: irrep.clone(),
        });
    }
    if let Some(smodes) = &input.smodes_input {
        rows.push(FieldRow {
            keyword: "smodes_input",
            value: smodes.display().to_string(),
        });
    }
    rows
}

fn referenced_files(input: &FlpzInput) -> Vec<&Path> {
    let mut files = vec![input.genstruc.as_path(), input.sbatch_preamble.as_path()];
    if let Some(smodes) = &input.smodes_input {
        files.push(smodes.as_path());
    }
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_check_valid_input() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("struct.abi"), "acell 3*7.6\n").unwrap();
        fs::write(dir.path().join("preamble.sh"), "#!/bin/bash\n#SBATCH --mem=4G\n").unwrap();
        let input = dir.path().join("flpz.in");
        fs::write(
            &input,
            "name BTO\nnum_datapoints 3\ngenstruc struct.abi\nmin 0.0\nmax 0.02\nsbatch_preamble preamble.sh\n",
        )
        .unwrap();

        assert!(execute(CheckArgs { input }).is_ok());
    }

    #[test]
    fn test_check_reports_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("flpz.in");
        fs::write(&input, "name BTO\n").unwrap();
        assert!(execute(CheckArgs { input }).is_err());
    }
}
