//! KONECT-format reader
//!
//! One arc per non-comment line: `tail head weight` as whitespace-separated
//! integers. Comment lines begin with `%`. Vertex ids are dense starting at 1.
//!

use crate::graph::{Snapshot, SnapshotBuilder};
use crate::util::*;
use anyhow::{bail, Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

pub fn read_graph(reader: impl BufRead) -> Result<Snapshot> {
    let mut builder = SnapshotBuilder::new();
    let mut num_arcs = 0usize;
    for (line_no, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("read failed at line {}", line_no + 1))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('%') {
            continue;
        }
        let mut fields = line.split_whitespace();
        let (Some(tail), Some(head), Some(weight)) = (fields.next(), fields.next(), fields.next()) else {
            bail!("line {}: expected `tail head weight`", line_no + 1);
        };
        let tail: VertexIndex = tail
            .parse()
            .with_context(|| format!("line {}: bad tail", line_no + 1))?;
        let head: VertexIndex = head
            .parse()
            .with_context(|| format!("line {}: bad head", line_no + 1))?;
        let weight: Weight = weight
            .parse()
            .with_context(|| format!("line {}: bad weight", line_no + 1))?;
        if tail == 0 || head == 0 {
            bail!("line {}: vertex ids start at 1", line_no + 1);
        }
        builder.add_arc(tail, head, weight);
        num_arcs += 1;
    }
    log::debug!("read {} arcs", num_arcs);
    Ok(builder.build())
}

pub fn read_graph_file(path: &Path) -> Result<Snapshot> {
    let file = File::open(path).with_context(|| format!("could not open file {}", path.display()))?;
    read_graph(BufReader::new(file))
}
