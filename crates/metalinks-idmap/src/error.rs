//! Fatal errors of the reconciliation pipeline.
//!
//! Per-row problems (malformed identifiers, conflicts, unresolvable gaps) are
//! never errors: they degrade to missing values or are counted in the pass
//! report. Only structural problems with the inputs stop the pipeline, and
//! they do so before any pass has run.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, ReconcileError>;

#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("table `{table}` has no column `{column}`")]
    MissingColumn { table: String, column: String },

    #[error("table `{table}` line {line}: expected {expected} fields, found {found}")]
    RowWidth {
        table: String,
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("table `{table}` has no header line")]
    EmptyTable { table: String },

    #[error("expected exactly 3 source tables, got {0}")]
    TableCount(usize),

    #[error("duplicate source table name `{0}`")]
    DuplicateTable(String),

    #[error("invalid trust order: {0}")]
    TrustOrder(String),

    #[error("unknown identifier namespace `{0}`")]
    UnknownNamespace(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
