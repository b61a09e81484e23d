//! Results sink
//!
//! Append-mode CSV: one row per algorithm and b value. The header is written
//! only when the file is first created, so successive runs can accumulate
//! into one table.
//!

use crate::util::Weight;
use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

pub struct ResultsWriter {
    file: File,
}

pub struct ResultRow<'a> {
    pub graph: &'a str,
    pub b: u32,
    pub seed: u64,
    pub l: i32,
    pub threshold_global: f64,
    pub algorithm: String,
    pub time: f64,
    pub weight: Weight,
}

impl ResultsWriter {
    pub fn open(path: &Path) -> Result<Self> {
        let is_new = !path.exists();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("could not open results file {}", path.display()))?;
        if is_new {
            writeln!(file, "graph,b,seed,l,threshold_global,algorithm,time,weight")
                .context("could not write results header")?;
        }
        Ok(Self { file })
    }

    pub fn write_row(&mut self, row: &ResultRow) -> Result<()> {
        writeln!(
            self.file,
            "{},{},{},{},{},{},{},{}",
            row.graph, row.b, row.seed, row.l, row.threshold_global, row.algorithm, row.time, row.weight
        )
        .context("could not write results row")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn header_once_then_rows_accumulate() {
        let path = std::env::temp_dir().join(format!("bmatch_results_{}.csv", std::process::id()));
        let _ = fs::remove_file(&path);

        {
            let mut writer = ResultsWriter::open(&path).unwrap();
            writer
                .write_row(&ResultRow {
                    graph: "toy.graph",
                    b: 2,
                    seed: 123,
                    l: -1,
                    threshold_global: -1.0,
                    algorithm: "gpa".into(),
                    time: 0.5,
                    weight: 42,
                })
                .unwrap();
        }
        {
            let mut writer = ResultsWriter::open(&path).unwrap();
            writer
                .write_row(&ResultRow {
                    graph: "toy.graph",
                    b: 2,
                    seed: 123,
                    l: -1,
                    threshold_global: 0.5,
                    algorithm: "NC-SUM+t0.5".into(),
                    time: 0.25,
                    weight: 40,
                })
                .unwrap();
        }

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "graph,b,seed,l,threshold_global,algorithm,time,weight");
        assert_eq!(lines[1], "toy.graph,2,123,-1,-1,gpa,0.5,42");
        assert!(lines[2].starts_with("toy.graph,2,123,-1,0.5,NC-SUM+t0.5,"));
        let _ = fs::remove_file(&path);
    }
}
