//! # 数值块解析器
//!
//! 将以空白分隔的数值行解析为二维张量。遇到第一个空行或非数值行即停止，
//! 多读一行就会破坏张量形状。
//!
//! ## 依赖关系
//! - 被 `parsers/abinit_out.rs` 使用
//! - 使用 `models/tensor.rs`

use crate::error::{Result, SymmStateError};
use crate::models::Tensor;

/// 行格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowFormat {
    /// 每行全部是数值
    Plain,
    /// anaddb 风格：可选的一行分量表头 (`xx yy zz ...`)，每行前可带一个文本标签
    Labelled,
}

/// 解析单个浮点数记号，接受 Fortran 的 `D` 指数
pub fn parse_float(token: &str) -> Option<f64> {
    let token = token.trim();
    if token.is_empty()
        || !token
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E' | 'd' | 'D'))
        || !token.chars().any(|c| c.is_ascii_digit())
    {
        return None;
    }
    token.replace(&['d', 'D'][..], "e").parse().ok()
}

/// 把一行解析为数值行；任一记号不是数值则返回 None
fn parse_plain_row(line: &str) -> Option<Vec<f64>> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.is_empty() {
        return None;
    }
    tokens.into_iter().map(parse_float).collect()
}

/// 带标签的行：首记号若不是数值则作为行标签丢弃
fn parse_labelled_row(line: &str) -> Option<Vec<f64>> {
    if let Some(row) = parse_plain_row(line) {
        return Some(row);
    }
    let mut tokens = line.split_whitespace();
    let first = tokens.next()?;
    if parse_float(first).is_some() {
        return None;
    }
    let rest: Vec<&str> = tokens.collect();
    if rest.is_empty() {
        return None;
    }
    rest.into_iter().map(parse_float).collect()
}

/// 表头行：所有记号都不是数值
fn is_header_line(line: &str) -> bool {
    let mut tokens = line.split_whitespace().peekable();
    tokens.peek().is_some() && tokens.all(|t| parse_float(t).is_none())
}

/// 从行序列开头收集数值行
///
/// 失败原因以字符串返回，由调用方补充文件路径。
pub(crate) fn collect_rows<'a, I>(
    lines: I,
    format: RowFormat,
    expected_row_width: Option<usize>,
) -> std::result::Result<Vec<Vec<f64>>, String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut rows: Vec<Vec<f64>> = Vec::new();
    let mut header_allowed = format == RowFormat::Labelled;

    for line in lines {
        if line.trim().is_empty() {
            break;
        }

        let parsed = match format {
            RowFormat::Plain => parse_plain_row(line),
            RowFormat::Labelled => parse_labelled_row(line),
        };

        let row = match parsed {
            Some(row) => row,
            None if header_allowed && is_header_line(line) => {
                header_allowed = false;
                continue;
            }
            None => break,
        };
        header_allowed = false;

        if let Some(width) = expected_row_width {
            if row.len() != width {
                return Err(format!(
                    "row {} has {} column(s), expected {}",
                    rows.len() + 1,
                    row.len(),
                    width
                ));
            }
        } else if let Some(first) = rows.first() {
            if row.len() != first.len() {
                return Err(format!(
                    "ragged block: row {} has {} column(s), row 1 has {}",
                    rows.len() + 1,
                    row.len(),
                    first.len()
                ));
            }
        }

        rows.push(row);
    }

    Ok(rows)
}

/// 解析数值块
///
/// 逐行解析，直到第一个空行或含有非数值记号的行。给定 `expected_row_width`
/// 时每行列数必须与之相同。纯函数，可以对同一文件的不同偏移反复调用。
pub fn parse_numeric_block(text: &str, expected_row_width: Option<usize>) -> Result<Tensor> {
    collect_rows(text.lines(), RowFormat::Plain, expected_row_width)
        .map(Tensor::from_rows)
        .map_err(|reason| SymmStateError::parse("<text>", reason))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_float_forms() {
        assert_eq!(parse_float("6.023e-01"), Some(0.6023));
        assert_eq!(parse_float("-1.5D+02"), Some(-150.0));
        assert_eq!(parse_float("  42 "), Some(42.0));
        assert_eq!(parse_float("xx"), None);
        assert_eq!(parse_float("inf"), None);
        assert_eq!(parse_float("-"), None);
        assert_eq!(parse_float("1.2.3"), None);
    }

    #[test]
    fn test_block_stops_at_blank_line() {
        let text = "1.0 2.0 3.0\n4.0 5.0 6.0\n\n7.0 8.0 9.0\n";
        let t = parse_numeric_block(text, None).unwrap();
        assert_eq!(t.shape(), (2, 3));
        assert_eq!(t.as_slice(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_extra_blank_lines_do_not_change_result() {
        let block = "  0.1  -0.2\n 3.0e-1  4\n";
        let a = parse_numeric_block(&format!("{}\n", block), None).unwrap();
        let b = parse_numeric_block(&format!("{}\n\n\n\n", block), None).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_slice(), &[0.1, -0.2, 0.3, 4.0]);
    }

    #[test]
    fn test_block_stops_at_text_line() {
        let text = "1 2\n3 4\nEnd of block 5 6\n7 8\n";
        let t = parse_numeric_block(text, Some(2)).unwrap();
        assert_eq!(t.shape(), (2, 2));
    }

    #[test]
    fn test_expected_width_mismatch_fails() {
        let text = "1 2 3\n4 5\n";
        let err = parse_numeric_block(text, Some(3)).unwrap_err();
        assert!(matches!(err, SymmStateError::ParseError { .. }));
    }

    #[test]
    fn test_ragged_block_fails_without_width() {
        assert!(parse_numeric_block("1 2 3\n4 5\n", None).is_err());
    }

    #[test]
    fn test_leading_blank_yields_empty_block() {
        let t = parse_numeric_block("\n1 2\n", None).unwrap();
        assert!(t.is_empty());
    }

    #[test]
    fn test_labelled_rows_with_header() {
        let lines = ["     xx     yy", " xxx  1.0  2.0", " yyy  3.0  4.0", "", " zzz 5 6"];
        let rows = collect_rows(lines, RowFormat::Labelled, Some(2)).unwrap();
        assert_eq!(rows, vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
    }

    #[test]
    fn test_plain_format_rejects_labels() {
        let lines = [" xxx  1.0  2.0"];
        let rows = collect_rows(lines, RowFormat::Plain, None).unwrap();
        assert!(rows.is_empty());
    }
}
