//! Delimited text → [`RawTable`].
//!
//! One header line, one record per line, no quoting.
//! The mapping tables this engine consumes are plain TSV/CSV exports.

use crate::config::TableSpec;
use crate::error::{ReconcileError, Result};
use crate::table::RawTable;
use std::fs;

/// Parse delimited text with a header line. Blank lines are skipped and empty
/// cells become `None`.
pub fn parse_delimited(name: &str, text: &str, delimiter: char) -> Result<RawTable> {
    let mut lines = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    let (_, header_line) = lines.next().ok_or_else(|| ReconcileError::EmptyTable {
        table: name.to_string(),
    })?;
    let header: Vec<String> = header_line
        .split(delimiter)
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (idx, line) in lines {
        let cells: Vec<Option<String>> = line
            .split(delimiter)
            .map(|c| {
                let c = c.trim();
                (!c.is_empty()).then(|| c.to_string())
            })
            .collect();
        if cells.len() != header.len() {
            return Err(ReconcileError::RowWidth {
                table: name.to_string(),
                line: idx + 1,
                expected: header.len(),
                found: cells.len(),
            });
        }
        rows.push(cells);
    }

    Ok(RawTable {
        name: name.to_string(),
        header,
        rows,
    })
}

/// Read and parse the file named by `spec`.
pub fn load_table(spec: &TableSpec) -> Result<RawTable> {
    let text = fs::read_to_string(&spec.path).map_err(|source| ReconcileError::Io {
        path: spec.path.clone(),
        source,
    })?;
    let raw = parse_delimited(&spec.name, &text, spec.delimiter)?;
    tracing::debug!(
        table = %spec.name,
        path = %spec.path.display(),
        rows = raw.rows.len(),
        "loaded source table"
    );
    Ok(raw)
}
