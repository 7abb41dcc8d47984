//! Text input and output formats.
//!
//! - Vertex values: one vertex per line, `<id>[SEP<prior>]`.
//! - Edges: one directed edge per line, `<src>SEP<dst>[SEP<weight>]`.
//! - Assignment output: `<id><delim><partition>`, one vertex per line.
//!
//! SEP is any of `0x01`, tab, or space. Malformed lines are fatal and are
//! reported with their 1-based line number; blank lines are skipped.

use std::io::{BufRead, Write};

use crate::error::PartitionerError;
use crate::graph::{Graph, GraphBuilder};
use crate::metrics::PartitionReport;

/// Default delimiter for assignment output.
pub const DEFAULT_OUTPUT_DELIMITER: &str = " ";

#[inline]
fn is_separator(c: char) -> bool {
    c == '\u{1}' || c == '\t' || c == ' '
}

fn parse_field<T: std::str::FromStr>(
    field: &str,
    line: usize,
    what: &str,
) -> Result<T, PartitionerError> {
    field.parse().map_err(|_| PartitionerError::MalformedInput {
        line,
        reason: format!("invalid {what}: {field:?}"),
    })
}

/// Parse vertex-value lines into `(id, prior partition)` pairs; a missing
/// prior parses as −1.
pub fn read_vertex_values<R: BufRead>(reader: R) -> Result<Vec<(i64, i16)>, PartitionerError> {
    let mut out = Vec::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        let lineno = lineno + 1;
        if line.trim().is_empty() {
            continue;
        }
        let mut fields = line.split(is_separator).filter(|f| !f.is_empty());
        let id = match fields.next() {
            Some(f) => parse_field::<i64>(f, lineno, "vertex id")?,
            None => continue,
        };
        let prior = match fields.next() {
            Some(f) => parse_field::<i16>(f, lineno, "prior partition")?,
            None => -1,
        };
        out.push((id, prior));
    }
    Ok(out)
}

/// Parse edge-list lines into `(src, dst, weight)` triples; a missing weight
/// parses as `None`.
pub fn read_edge_list<R: BufRead>(
    reader: R,
) -> Result<Vec<(i64, i64, Option<u8>)>, PartitionerError> {
    let mut out = Vec::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        let lineno = lineno + 1;
        if line.trim().is_empty() {
            continue;
        }
        let mut fields = line.split(is_separator).filter(|f| !f.is_empty());
        let src = match fields.next() {
            Some(f) => parse_field::<i64>(f, lineno, "source id")?,
            None => continue,
        };
        let dst = match fields.next() {
            Some(f) => parse_field::<i64>(f, lineno, "target id")?,
            None => {
                return Err(PartitionerError::MalformedInput {
                    line: lineno,
                    reason: "missing target id".into(),
                })
            }
        };
        let weight = match fields.next() {
            Some(f) => Some(parse_field::<u8>(f, lineno, "edge weight")?),
            None => None,
        };
        out.push((src, dst, weight));
    }
    Ok(out)
}

/// Build a [`Graph`] from an optional vertex-value reader and an edge-list
/// reader. Edges without an explicit weight get `default_weight`.
pub fn graph_from_readers<V: BufRead, E: BufRead>(
    vertices: Option<V>,
    edges: E,
    default_weight: u8,
) -> Result<Graph, PartitionerError> {
    let mut builder = GraphBuilder::new();
    if let Some(reader) = vertices {
        for (id, prior) in read_vertex_values(reader)? {
            builder.vertex(id, prior);
        }
    }
    for (src, dst, weight) in read_edge_list(edges)? {
        builder.edge(src, dst, weight.unwrap_or(default_weight));
    }
    Ok(builder.build())
}

/// Write the final assignment, one `<id><delim><partition>` line per vertex.
pub fn write_assignment<W: Write>(
    writer: &mut W,
    report: &PartitionReport,
    delimiter: &str,
) -> std::io::Result<()> {
    for (id, partition) in &report.assignment {
        writeln!(writer, "{id}{delimiter}{partition}")?;
    }
    Ok(())
}
