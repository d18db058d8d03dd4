//! # 张量数据模型
//!
//! 从输出文件中解析出的二维数值数组（行主序）。
//!
//! ## 依赖关系
//! - 被 `parsers/numeric.rs`, `parsers/abinit_out.rs` 使用
//! - 被 `commands/extract.rs` 使用

use serde::Serialize;
use std::fmt;

/// 挠曲电张量形状 (9 个应变梯度分量 × 6 个 Voigt 指标)
pub const FLEXO_SHAPE: (usize, usize) = (9, 6);

/// 压电张量形状 (3 × 6)
///
/// 注意：anaddb 打印压电常数时是 6 行（Voigt 应变分量）× 3 列（极化方向），
/// 与这里的 3 × 6 互为转置。直接对 anaddb 输出按此形状提取会得到
/// 行数不符的 `ParseError`；需要时先用 `extract_tensor_by_label` 以 (6, 3) 提取。
pub const PIEZO_SHAPE: (usize, usize) = (3, 6);

/// 二维张量，行主序存储
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tensor {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Tensor {
    /// 由逐行数据构造；调用方保证每行长度一致
    pub(crate) fn from_rows(rows: Vec<Vec<f64>>) -> Self {
        let n_rows = rows.len();
        let n_cols = rows.first().map(|r| r.len()).unwrap_or(0);
        let data = rows.into_iter().flatten().collect();
        Tensor {
            rows: n_rows,
            cols: n_cols,
            data,
        }
    }

    /// (行数, 列数)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 获取元素 (i, j)
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        if i < self.rows && j < self.cols {
            Some(self.data[i * self.cols + j])
        } else {
            None
        }
    }

    /// 获取第 i 行
    pub fn row(&self, i: usize) -> Option<&[f64]> {
        if i < self.rows {
            Some(&self.data[i * self.cols..(i + 1) * self.cols])
        } else {
            None
        }
    }

    /// 行迭代器
    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> {
        // cols == 0 时 chunks 会 panic
        self.data.chunks(self.cols.max(1))
    }

    /// 行主序扁平数据
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}

impl fmt::Display for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.iter_rows().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            let cells: Vec<String> = row.iter().map(|v| format!("{:>14.8}", v)).collect();
            write!(f, "{}", cells.join(" "))?;
        }
        Ok(())
    }
}

/// 夹持离子 / 弛豫离子压电张量；两者独立，可能只存在其一
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PiezoTensors {
    pub clamped: Option<Tensor>,
    pub relaxed: Option<Tensor>,
}

impl PiezoTensors {
    pub fn is_empty(&self) -> bool {
        self.clamped.is_none() && self.relaxed.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tensor_row_major_access() {
        let t = Tensor::from_rows(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
        assert_eq!(t.shape(), (2, 3));
        assert_eq!(t.get(1, 0), Some(4.0));
        assert_eq!(t.get(0, 2), Some(3.0));
        assert_eq!(t.get(2, 0), None);
        assert_eq!(t.row(1), Some(&[4.0, 5.0, 6.0][..]));
        assert_eq!(t.as_slice(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_empty_tensor() {
        let t = Tensor::from_rows(vec![]);
        assert!(t.is_empty());
        assert_eq!(t.shape(), (0, 0));
        assert_eq!(t.iter_rows().count(), 0);
    }

    #[test]
    fn test_tensor_display_one_line_per_row() {
        let t = Tensor::from_rows(vec![vec![1.0, -2.0], vec![0.5, 0.25]]);
        let text = t.to_string();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("-2.00000000"));
    }
}
