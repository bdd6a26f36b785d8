//! Metabolite identifier reconciliation for Metalinks
//!
//! Unifies ChEBI, KEGG, HMDB and PubChem identifiers across three partially
//! overlapping mapping tables before they are used as join keys for
//! metabolite → protein edges:
//!
//! ```text
//!  raw tables ─► normalize ─► pass(CHEBI) ─► pass(KEGG) ─► pass(HMDB) ─► pass(PUBCHEM) ─► emit
//!                (per cell)    └──────── anchor merge + conflict resolution ─────────┘    (row key → HMDB)
//! ```
//!
//! - [`normalize`]: canonical string form per namespace, malformed → missing
//! - [`resolve`]: three-slot decision table with conflict accounting
//! - [`merge`]: one pass joined on an anchor namespace
//! - [`propagate`]: the fixed four-pass schedule
//! - [`emit`]: final per-table lookups
//!
//! Per-row problems never fail the pipeline. Only structural input errors do
//! (see [`ReconcileError`]), and they surface before the first pass.

pub mod config;
pub mod emit;
pub mod error;
pub mod loader;
pub mod merge;
pub mod namespace;
pub mod normalize;
pub mod propagate;
pub mod resolve;
pub mod stats;
pub mod table;

pub use config::{ReconcileConfig, TableSpec};
pub use emit::{emit, emit_hmdb, emit_table, EmittedMapping};
pub use error::{ReconcileError, Result};
pub use merge::{anchor_merge, MergeOptions, MergeReport, TargetReport};
pub use namespace::{Namespace, NamespaceMap};
pub use propagate::{propagate, run_pass, PassReport, PropagationReport, ANCHOR_SCHEDULE};
pub use resolve::{resolve, Outcome, OutcomeCounts, Resolution, TrustOrder};
pub use table::{ColumnMap, IdentifierRecord, LoadReport, RawTable, Row, SourceTable, TableSet};

use serde::{Deserialize, Serialize};

/// Everything a run produced, ready for emission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reconciled {
    pub tables: TableSet,
    pub loads: Vec<LoadReport>,
    pub propagation: PropagationReport,
}

impl Reconciled {
    pub fn mappings(&self, namespace: Namespace) -> Vec<EmittedMapping> {
        emit(&self.tables, namespace)
    }
}

/// Normalize three raw tables and run the four passes.
///
/// All column mappings are checked before any pass runs, so a structural
/// error never leaves partial output behind.
pub fn reconcile_raw(
    raw: [(RawTable, ColumnMap); 3],
    options: &MergeOptions,
) -> Result<Reconciled> {
    let mut loads = Vec::with_capacity(3);
    let mut tables = Vec::with_capacity(3);
    for (raw, columns) in &raw {
        let (table, load) = SourceTable::from_raw(raw, columns)?;
        loads.push(load);
        tables.push(table);
    }
    let tables: TableSet = tables
        .try_into()
        .map_err(|v: Vec<SourceTable>| ReconcileError::TableCount(v.len()))?;

    let (tables, propagation) = propagate(tables, options);
    Ok(Reconciled {
        tables,
        loads,
        propagation,
    })
}

/// Load the tables named in `config` and reconcile them.
pub fn reconcile(config: &ReconcileConfig) -> Result<Reconciled> {
    config.validate()?;
    let options = MergeOptions {
        trust: config.trust_order()?,
        parallel: config.parallel,
    };

    let [a, b, c] = [0, 1, 2].map(|i| &config.tables[i]);
    let raw = [
        (loader::load_table(a)?, a.columns.clone()),
        (loader::load_table(b)?, b.columns.clone()),
        (loader::load_table(c)?, c.columns.clone()),
    ];
    reconcile_raw(raw, &options)
}
