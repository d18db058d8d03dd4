//! # 关键字输入文件解析器
//!
//! 解析计算任务输入文件。每行形如 `<keyword> <value>`，每个关键字对应一个
//! 固定的正则表达式；`#` 和 `!` 开头的行为注释。
//!
//! ```text
//! name            BaTiO3
//! num_datapoints  11
//! genstruc        BaTiO3.abi
//! min             0.0
//! max             0.5
//! sbatch_preamble slurm_header.sh
//! ```
//!
//! ## 依赖关系
//! - 被 `commands/check.rs`, `commands/submit.rs` 使用
//! - 使用 `models/input.rs`

use crate::error::{Result, SymmStateError};
use crate::models::FlpzInput;

use regex::Regex;
use std::path::{Path, PathBuf};

const FLOAT_RE: &str = r"[-+]?(?:\d+\.?\d*|\.\d+)(?:[eEdD][-+]?\d+)?";

/// 解析输入文件
pub fn parse_input_file(path: &Path) -> Result<FlpzInput> {
    let content = super::read_text_file(path)?;
    parse_input_content(&content)
}

/// 解析输入文件内容
pub fn parse_input_content(content: &str) -> Result<FlpzInput> {
    let lines: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#') && !l.starts_with('!'))
        .collect();

    let name = required_value(&lines, "name", r"(\S+)")?;
    let num_datapoints = required_value(&lines, "num_datapoints", r"(\S+)")?;
    let genstruc = required_value(&lines, "genstruc", r#""?([^"]+?)"?"#)?;
    let min_amp = required_value(&lines, "min", r"(\S+)")?;
    let max_amp = required_value(&lines, "max", r"(\S+)")?;
    let sbatch_preamble = required_value(&lines, "sbatch_preamble", r#""?([^"]+?)"?"#)?;

    let num_datapoints: usize = num_datapoints.parse().map_err(|_| {
        SymmStateError::config(
            "num_datapoints",
            format!("'{}' is not a positive integer", num_datapoints),
        )
    })?;
    let min_amp = parse_amplitude("min", &min_amp)?;
    let max_amp = parse_amplitude("max", &max_amp)?;

    if num_datapoints == 0 {
        return Err(SymmStateError::config("num_datapoints", "must be at least 1"));
    }
    if min_amp > max_amp {
        return Err(SymmStateError::config(
            "min",
            format!("min ({}) is larger than max ({})", min_amp, max_amp),
        ));
    }
    if num_datapoints == 1 && min_amp != max_amp {
        return Err(SymmStateError::config(
            "num_datapoints",
            "a single datapoint requires min == max",
        ));
    }

    Ok(FlpzInput {
        name,
        num_datapoints,
        genstruc: PathBuf::from(genstruc),
        min_amp,
        max_amp,
        sbatch_preamble: PathBuf::from(sbatch_preamble),
        irrep: optional_value(&lines, "irrep", r"(\S+)"),
        smodes_input: optional_value(&lines, "smodes_input", r#""?([^"]+?)"?"#).map(PathBuf::from),
    })
}

/// 读取 sbatch 头文件，返回附加指令行（跳过 shebang 和空行）
pub fn read_preamble(path: &Path) -> Result<Vec<String>> {
    let content = super::read_text_file(path)?;

    Ok(content
        .lines()
        .map(str::trim_end)
        .filter(|l| !l.trim().is_empty() && !l.starts_with("#!"))
        .map(str::to_string)
        .collect())
}

fn keyword_regex(keyword: &str, value_pattern: &str) -> Regex {
    // keyword 与 value_pattern 均为本模块内的常量
    Regex::new(&format!(
        r"^{}\s+{}\s*$",
        regex::escape(keyword),
        value_pattern
    ))
    .expect("keyword regex")
}

fn optional_value(lines: &[&str], keyword: &str, value_pattern: &str) -> Option<String> {
    let re = keyword_regex(keyword, value_pattern);
    lines
        .iter()
        .find_map(|line| re.captures(line).map(|c| c[1].trim().to_string()))
}

fn required_value(lines: &[&str], keyword: &str, value_pattern: &str) -> Result<String> {
    if let Some(value) = optional_value(lines, keyword, value_pattern) {
        return Ok(value);
    }

    // 关键字存在但值无法匹配时给出更具体的原因
    let present = lines
        .iter()
        .any(|l| l.split_whitespace().next() == Some(keyword));
    if present {
        Err(SymmStateError::config(keyword, "value could not be parsed"))
    } else {
        Err(SymmStateError::config(keyword, "required keyword is missing"))
    }
}

fn parse_amplitude(keyword: &str, raw: &str) -> Result<f64> {
    let re = Regex::new(&format!("^{}$", FLOAT_RE)).expect("float regex");
    if !re.is_match(raw) {
        return Err(SymmStateError::config(
            keyword,
            format!("'{}' is not a number", raw),
        ));
    }
    raw.replace(&['d', 'D'][..], "e")
        .parse()
        .map_err(|_| SymmStateError::config(keyword, format!("'{}' is not a number", raw)))
}
