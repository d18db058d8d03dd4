//! # Abinit / anaddb 输出解析器
//!
//! 从 `.abo` 和 anaddb 输出中提取总能量、挠曲电张量和压电张量。
//! 每个提取函数都从头重新扫描，第一个匹配的标签行生效。
//!
//! ## 依赖关系
//! - 被 `commands/extract.rs` 使用
//! - 使用 `parsers/numeric.rs`, `models/tensor.rs`

use super::numeric::{collect_rows, parse_float, RowFormat};
use super::read_text_file;
use crate::error::{Result, SymmStateError};
use crate::models::{PiezoTensors, Tensor, FLEXO_SHAPE, PIEZO_SHAPE};

use regex::Regex;
use std::path::Path;

/// 总能量标签
pub const ENERGY_LABEL: &str = "total_energy";

/// anaddb 挠曲电张量标签
pub const FLEXO_LABEL: &str = "TOTAL flexoelectric tensor (units= nC/m)";

/// anaddb 夹持离子压电张量标签
pub const PIEZO_CLAMPED_LABEL: &str = "Proper piezoelectric constants (clamped ion) (unit:c/m^2)";

/// anaddb 弛豫离子压电张量标签
pub const PIEZO_RELAXED_LABEL: &str = "Proper piezoelectric constants (relaxed ion) (unit:c/m^2)";

// ─────────────────────────────────────────────────────────────
// 能量
// ─────────────────────────────────────────────────────────────

/// 从输出文件提取总能量
pub fn extract_energy(path: &Path) -> Result<f64> {
    let content = read_text_file(path)?;
    extract_energy_from_content(&content, &path.display().to_string())
}

/// 从文本提取总能量
///
/// 第一个含 `total_energy:` 的行生效，其后紧跟的记号必须是浮点数。
pub fn extract_energy_from_content(content: &str, source: &str) -> Result<f64> {
    let pattern = Regex::new(r"total_energy\s*:(.*)$").expect("static regex");

    for line in content.lines() {
        if let Some(caps) = pattern.captures(line) {
            let token = caps[1].split_whitespace().next().ok_or_else(|| {
                SymmStateError::parse(source, format!("no value after '{}:'", ENERGY_LABEL))
            })?;
            return parse_float(token).ok_or_else(|| {
                SymmStateError::parse(
                    source,
                    format!("value after '{}:' is not a number: '{}'", ENERGY_LABEL, token),
                )
            });
        }
    }

    Err(SymmStateError::parse(
        source,
        format!("label '{}:' not found", ENERGY_LABEL),
    ))
}

// ─────────────────────────────────────────────────────────────
// 张量
// ─────────────────────────────────────────────────────────────

/// 在标签行之后按形状提取张量
pub fn extract_tensor_by_label(path: &Path, label: &str, shape: (usize, usize)) -> Result<Tensor> {
    let content = read_text_file(path)?;
    tensor_by_label(&content, label, shape, RowFormat::Plain, &path.display().to_string())
}

/// 从文本按标签提取张量（纯数值行）
pub fn extract_tensor_by_label_from_content(
    content: &str,
    label: &str,
    shape: (usize, usize),
    source: &str,
) -> Result<Tensor> {
    tensor_by_label(content, label, shape, RowFormat::Plain, source)
}

/// 提取 9×6 挠曲电张量
pub fn extract_flexoelectric_tensor(path: &Path) -> Result<Tensor> {
    let content = read_text_file(path)?;
    extract_flexoelectric_tensor_from_content(&content, &path.display().to_string())
}

/// anaddb 在数值前打印分量表头和行标签，这里用带标签的行格式
pub fn extract_flexoelectric_tensor_from_content(content: &str, source: &str) -> Result<Tensor> {
    tensor_by_label(content, FLEXO_LABEL, FLEXO_SHAPE, RowFormat::Labelled, source)
}

/// 提取夹持离子与弛豫离子压电张量
///
/// 标签缺失得到 `None`；标签存在但数值块形状不对仍然是 `ParseError`。
pub fn extract_piezoelectric_tensors(path: &Path) -> Result<PiezoTensors> {
    let content = read_text_file(path)?;
    extract_piezoelectric_tensors_from_content(&content, &path.display().to_string())
}

pub fn extract_piezoelectric_tensors_from_content(
    content: &str,
    source: &str,
) -> Result<PiezoTensors> {
    Ok(PiezoTensors {
        clamped: optional_tensor(content, PIEZO_CLAMPED_LABEL, PIEZO_SHAPE, source)?,
        relaxed: optional_tensor(content, PIEZO_RELAXED_LABEL, PIEZO_SHAPE, source)?,
    })
}

fn optional_tensor(
    content: &str,
    label: &str,
    shape: (usize, usize),
    source: &str,
) -> Result<Option<Tensor>> {
    let lines: Vec<&str> = content.lines().collect();
    match find_label(&lines, label) {
        Some(idx) => tensor_after(&lines, idx, label, shape, RowFormat::Plain, source).map(Some),
        None => Ok(None),
    }
}

fn tensor_by_label(
    content: &str,
    label: &str,
    shape: (usize, usize),
    format: RowFormat,
    source: &str,
) -> Result<Tensor> {
    let lines: Vec<&str> = content.lines().collect();
    let idx = find_label(&lines, label)
        .ok_or_else(|| SymmStateError::parse(source, format!("label '{}' not found", label)))?;
    tensor_after(&lines, idx, label, shape, format, source)
}

/// 第一个包含标签（精确子串）的行号
fn find_label(lines: &[&str], label: &str) -> Option<usize> {
    lines.iter().position(|l| l.contains(label))
}

/// 解析标签行之后的数值块并校验形状
///
/// 标签与数值块之间的空行被跳过；数值块开始后第一个空行即结束。
fn tensor_after(
    lines: &[&str],
    label_idx: usize,
    label: &str,
    shape: (usize, usize),
    format: RowFormat,
    source: &str,
) -> Result<Tensor> {
    let body = lines[label_idx + 1..]
        .iter()
        .copied()
        .skip_while(|l| l.trim().is_empty());

    let rows = collect_rows(body, format, Some(shape.1))
        .map_err(|reason| SymmStateError::parse(source, format!("'{}': {}", label, reason)))?;

    if rows.len() != shape.0 {
        return Err(SymmStateError::parse(
            source,
            format!(
                "'{}': expected {}x{} block, found {} row(s)",
                label,
                shape.0,
                shape.1,
                rows.len()
            ),
        ));
    }

    Ok(Tensor::from_rows(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt::Write as _;

    fn numeric_block(rows: usize, cols: usize, offset: f64) -> String {
        let mut s = String::new();
        for i in 0..rows {
            let row: Vec<String> = (0..cols)
                .map(|j| format!("{:.6}", offset + (i * cols + j) as f64 * 0.5))
                .collect();
            writeln!(s, "   {}", row.join("   ")).unwrap();
        }
        s
    }

    #[test]
    fn test_extract_energy_scientific() {
        let content = "iteration 3\n    total_energy: 6.023e-01\n    total_energy: 9.0\n";
        let e = extract_energy_from_content(content, "test.abo").unwrap();
        assert!((e - 0.6023).abs() < 1e-9);
    }

    #[test]
    fn test_extract_energy_fixed_and_fortran() {
        let e = extract_energy_from_content(" total_energy :  -1.2345D+02\n", "t").unwrap();
        assert!((e + 123.45).abs() < 1e-9);
        let e = extract_energy_from_content("total_energy: -36.5\n", "t").unwrap();
        assert!((e + 36.5).abs() < 1e-12);
    }

    #[test]
    fn test_energy_first_label_without_value() {
        let content = "total_energy:\n  garbage\ntotal_energy: 1.5\n";
        match extract_energy_from_content(content, "t") {
            Err(SymmStateError::ParseError { reason, .. }) => assert!(reason.contains("no value")),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_extract_energy_missing_label() {
        let err = extract_energy_from_content("etotal -36.5\n", "t").unwrap_err();
        assert!(matches!(err, SymmStateError::ParseError { .. }));
    }

    #[test]
    fn test_extract_energy_bad_token() {
        let err = extract_energy_from_content("total_energy: NaN_value\n", "t").unwrap_err();
        assert!(err.to_string().contains("not a number"));
    }

    #[test]
    fn test_flexo_label_9x6_block() {
        let content = format!(
            "header\n {}\n{}\n trailing text\n",
            FLEXO_LABEL,
            numeric_block(9, 6, 1.0)
        );
        let t = extract_tensor_by_label_from_content(&content, FLEXO_LABEL, FLEXO_SHAPE, "t")
            .unwrap();
        assert_eq!(t.shape(), (9, 6));
        assert_eq!(t.get(0, 0), Some(1.0));
        assert_eq!(t.get(0, 1), Some(1.5));
        assert_eq!(t.get(8, 5), Some(1.0 + 53.0 * 0.5));
    }

    #[test]
    fn test_flexo_label_8_rows_fails() {
        let content = format!("{}\n{}\n", FLEXO_LABEL, numeric_block(8, 6, 0.0));
        let err = extract_tensor_by_label_from_content(&content, FLEXO_LABEL, FLEXO_SHAPE, "t")
            .unwrap_err();
        assert!(matches!(err, SymmStateError::ParseError { .. }));
    }

    #[test]
    fn test_tensor_label_not_found() {
        let err = extract_tensor_by_label_from_content("nothing here\n", FLEXO_LABEL, FLEXO_SHAPE, "t")
            .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_block_followed_by_numbers_after_blank_is_not_consumed() {
        let content = format!(
            "{}\n{}\n{}",
            PIEZO_CLAMPED_LABEL,
            numeric_block(3, 6, 0.0),
            numeric_block(3, 6, 100.0)
        );
        let t = extract_tensor_by_label_from_content(&content, PIEZO_CLAMPED_LABEL, PIEZO_SHAPE, "t")
            .unwrap();
        assert_eq!(t.shape(), (3, 6));
        assert_eq!(t.get(2, 5), Some(8.5));
    }

    #[test]
    fn test_anaddb_flexo_layout() {
        let mut content = String::new();
        writeln!(content, " {}", FLEXO_LABEL).unwrap();
        writeln!(content).unwrap();
        writeln!(content, "           xx          yy          zz          yz          xz          xy").unwrap();
        let labels = ["xxx", "yyx", "zzx", "yzx", "xzx", "xyx", "xxy", "yyy", "zzy"];
        for (i, l) in labels.iter().enumerate() {
            let row: Vec<String> = (0..6).map(|j| format!("{:.6}", (i * 6 + j) as f64)).collect();
            writeln!(content, "  {}  {}", l, row.join("  ")).unwrap();
        }
        writeln!(content).unwrap();

        let t = extract_flexoelectric_tensor_from_content(&content, "t").unwrap();
        assert_eq!(t.shape(), FLEXO_SHAPE);
        assert_eq!(t.get(0, 0), Some(0.0));
        assert_eq!(t.get(8, 5), Some(53.0));
    }

    #[test]
    fn test_piezo_only_clamped() {
        let content = format!("{}\n{}\n", PIEZO_CLAMPED_LABEL, numeric_block(3, 6, 0.0));
        let piezo = extract_piezoelectric_tensors_from_content(&content, "t").unwrap();
        assert_eq!(piezo.clamped.map(|t| t.shape()), Some((3, 6)));
        assert!(piezo.relaxed.is_none());
    }

    #[test]
    fn test_piezo_reverse_order() {
        let content = format!(
            "{}\n{}\n some text\n{}\n{}\n",
            PIEZO_RELAXED_LABEL,
            numeric_block(3, 6, 100.0),
            PIEZO_CLAMPED_LABEL,
            numeric_block(3, 6, -5.0)
        );
        let piezo = extract_piezoelectric_tensors_from_content(&content, "t").unwrap();
        let clamped = piezo.clamped.unwrap();
        let relaxed = piezo.relaxed.unwrap();
        assert_eq!(clamped.get(0, 0), Some(-5.0));
        assert_eq!(relaxed.get(0, 0), Some(100.0));
        assert_eq!(relaxed.get(2, 5), Some(108.5));
    }

    #[test]
    fn test_piezo_present_but_malformed_fails() {
        let content = format!("{}\n{}\n", PIEZO_CLAMPED_LABEL, numeric_block(2, 6, 0.0));
        let err = extract_piezoelectric_tensors_from_content(&content, "t").unwrap_err();
        assert!(matches!(err, SymmStateError::ParseError { .. }));
    }

    #[test]
    fn test_piezo_neither_present() {
        let piezo = extract_piezoelectric_tensors_from_content("no tensors\n", "t").unwrap();
        assert!(piezo.is_empty());
    }

    #[test]
    fn test_extract_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run_energy.abo");
        std::fs::write(&path, "  total_energy: -1.5E+01\n").unwrap();
        let e = extract_energy(&path).unwrap();
        assert!((e + 15.0).abs() < 1e-12);

        let missing = dir.path().join("missing.abo");
        assert!(matches!(
            extract_energy(&missing),
            Err(SymmStateError::FileNotFound { .. })
        ));
    }
}
