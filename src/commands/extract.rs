//! # extract 命令实现
//!
//! 从 ABINIT/anaddb 输出中并行提取总能量、挠曲电张量或压电张量。
//!
//! ## 功能
//! - 单文件或目录输入（可递归）
//! - 并行提取，失败文件单独汇报
//! - 终端表格输出，可选 CSV（张量按行优先展开）
//!
//! ## 依赖关系
//! - 使用 `cli/extract.rs` 定义的参数
//! - 使用 `batch/`, `parsers/abinit_out.rs`
//! - 使用 `utils/output.rs`

use crate::batch::{BatchResult, BatchRunner, FileCollector};
use crate::cli::extract::{ExtractArgs, ExtractKind};
use crate::error::{Result, SymmStateError};
use crate::models::{PiezoTensors, Tensor};
use crate::parsers::abinit_out::{
    extract_energy, extract_flexoelectric_tensor, extract_piezoelectric_tensors,
};
use crate::utils::output;

use std::path::{Path, PathBuf};
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct EnergyRow {
    #[tabled(rename = "File")]
    file: String,
    #[tabled(rename = "Total energy (Ha)")]
    energy: String,
}

/// CSV 表：表头与记录
struct CsvTable {
    header: Vec<String>,
    records: Vec<Vec<String>>,
}

/// 执行 extract 命令
pub fn execute(args: ExtractArgs) -> Result<()> {
    let files = FileCollector::new(args.path.clone())
        .with_pattern(&args.pattern)?
        .recursive(args.recursive)
        .collect()?;

    if files.is_empty() {
        return Err(SymmStateError::InvalidArgument(format!(
            "no files matching '{}' under '{}'",
            args.pattern,
            args.path.display()
        )));
    }

    output::print_info(&format!("Extracting {} from {} file(s)", args.kind, files.len()));

    let runner = BatchRunner::new(args.jobs);
    let (extracted, total, failures, csv_table) = match args.kind {
        ExtractKind::Energy => {
            let result = runner.run(&files, extract_energy)?;
            report_energies(&result);
            (
                result.successes.len(),
                result.total(),
                result.failures,
                energy_csv(&result.successes),
            )
        }
        ExtractKind::Flexo => {
            let result = runner.run(&files, extract_flexoelectric_tensor)?;
            for (path, tensor) in &result.successes {
                print_tensor(path, "Flexoelectric tensor (nC/m)", tensor);
            }
            (
                result.successes.len(),
                result.total(),
                result.failures,
                flexo_csv(&result.successes),
            )
        }
        ExtractKind::Piezo => {
            let result = runner.run(&files, extract_piezoelectric_tensors)?;
            for (path, tensors) in &result.successes {
                report_piezo(path, tensors);
            }
            (
                result.successes.len(),
                result.total(),
                result.failures,
                piezo_csv(&result.successes),
            )
        }
    };

    for (path, err) in &failures {
        output::print_warning(&format!("{}: {}", path.display(), err));
    }

    if let Some(csv_path) = &args.output_csv {
        write_csv(csv_path, &csv_table)?;
        output::print_success(&format!("Results saved to '{}'", csv_path.display()));
    }

    output::print_separator();
    output::print_done(&format!(
        "Extracted {} of {} file(s), {} failed",
        extracted,
        total,
        failures.len()
    ));

    if extracted == 0 {
        return Err(SymmStateError::Other(format!("nothing could be extracted ({})", args.kind)));
    }

    Ok(())
}

fn report_energies(result: &BatchResult<f64>) {
    if result.successes.is_empty() {
        return;
    }
    let rows: Vec<EnergyRow> = result
        .successes
        .iter()
        .map(|(path, e)| EnergyRow {
            file: path.display().to_string(),
            energy: format!("{:.10}", e),
        })
        .collect();
    output::print_header("Total energies");
    println!("{}", Table::new(&rows));
}

fn report_piezo(path: &Path, tensors: &PiezoTensors) {
    if tensors.is_empty() {
        output::print_skip(&format!("{}: no piezoelectric block", path.display()));
        return;
    }
    if let Some(t) = &tensors.clamped {
        print_tensor(path, "Piezoelectric tensor, clamped ion (C/m^2)", t);
    }
    if let Some(t) = &tensors.relaxed {
        print_tensor(path, "Piezoelectric tensor, relaxed ion (C/m^2)", t);
    }
}

fn print_tensor(path: &Path, title: &str, tensor: &Tensor) {
    output::print_header(&format!("{}: {}", path.display(), title));
    println!("{}", tensor);
}

fn energy_csv(successes: &[(PathBuf, f64)]) -> CsvTable {
    CsvTable {
        header: vec!["file".to_string(), "total_energy_Ha".to_string()],
        records: successes
            .iter()
            .map(|(p, e)| vec![p.display().to_string(), format!("{:.10}", e)])
            .collect(),
    }
}

fn flexo_csv(successes: &[(PathBuf, Tensor)]) -> CsvTable {
    let shape = successes.first().map(|(_, t)| t.shape()).unwrap_or((0, 0));
    let mut header = vec!["file".to_string()];
    header.extend(component_names(shape));
    CsvTable {
        header,
        records: successes
            .iter()
            .map(|(p, t)| tensor_record(vec![p.display().to_string()], t))
            .collect(),
    }
}

fn piezo_csv(successes: &[(PathBuf, PiezoTensors)]) -> CsvTable {
    let shape = successes
        .iter()
        .flat_map(|(_, t)| t.clamped.iter().chain(t.relaxed.iter()))
        .map(Tensor::shape)
        .next()
        .unwrap_or((0, 0));

    let mut header = vec!["file".to_string(), "condition".to_string()];
    header.extend(component_names(shape));

    let mut records = Vec::new();
    for (path, tensors) in successes {
        for (condition, tensor) in [("clamped", &tensors.clamped), ("relaxed", &tensors.relaxed)] {
            if let Some(t) = tensor {
                records.push(tensor_record(
                    vec![path.display().to_string(), condition.to_string()],
                    t,
                ));
            }
        }
    }

    CsvTable { header, records }
}

/// 分量列名：`t11`, `t12`, ...（从 1 开始计数）
fn component_names((rows, cols): (usize, usize)) -> Vec<String> {
    (1..=rows)
        .flat_map(|i| (1..=cols).map(move |j| format!("t{}{}", i, j)))
        .collect()
}

fn tensor_record(mut prefix: Vec<String>, tensor: &Tensor) -> Vec<String> {
    prefix.extend(tensor.as_slice().iter().map(|v| format!("{:.10}", v)));
    prefix
}

fn write_csv(path: &Path, table: &CsvTable) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(&table.header)?;
    for record in &table.records {
        wtr.write_record(record)?;
    }
    wtr.flush().map_err(|e| SymmStateError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_component_names() {
        let names = component_names((2, 3));
        assert_eq!(names, vec!["t11", "t12", "t13", "t21", "t22", "t23"]);
    }

    #[test]
    fn test_extract_energies_to_csv() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.abo"), " total_energy : -1.5E+01\n").unwrap();
        fs::write(dir.path().join("b.abo"), " etotal nothing here\n").unwrap();
        let csv_path = dir.path().join("energies.csv");

        execute(ExtractArgs {
            path: dir.path().to_path_buf(),
            kind: ExtractKind::Energy,
            pattern: "*.abo".to_string(),
            recursive: false,
            jobs: 2,
            output_csv: Some(csv_path.clone()),
        })
        .unwrap();

        let content = fs::read_to_string(&csv_path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "file,total_energy_Ha");
        assert!(lines[1].ends_with("a.abo,-15.0000000000"));
    }

    #[test]
    fn test_extract_nothing_is_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.abo"), "no energy\n").unwrap();
        let result = execute(ExtractArgs {
            path: dir.path().join("a.abo"),
            kind: ExtractKind::Energy,
            pattern: String::new(),
            recursive: false,
            jobs: 1,
            output_csv: None,
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_piezo_csv_rows_per_condition() {
        let clamped = Tensor::from_rows(vec![vec![1.0; 6]; 3]);
        let successes = vec![(
            PathBuf::from("run.out"),
            PiezoTensors {
                clamped: Some(clamped),
                relaxed: None,
            },
        )];
        let table = piezo_csv(&successes);
        assert_eq!(table.header.len(), 2 + 18);
        assert_eq!(table.records.len(), 1);
        assert_eq!(table.records[0][1], "clamped");
    }
}
