//! Before/after statistics for one pass, per table and namespace.

use crate::namespace::Namespace;
use crate::table::{SourceTable, TableSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnStats {
    pub table: String,
    pub namespace: Namespace,
    pub distinct_before: usize,
    pub distinct_after: usize,
    /// Distinct values present after the pass that were absent before.
    pub additional: usize,
    pub present_before: usize,
    pub present_after: usize,
}

fn distinct(table: &SourceTable, ns: Namespace) -> BTreeSet<&str> {
    table.rows.iter().filter_map(|r| r.get(ns)).collect()
}

/// Compare two snapshots of the same table set.
pub fn compare(before: &TableSet, after: &TableSet) -> Vec<ColumnStats> {
    let mut out = Vec::with_capacity(before.len() * Namespace::ALL.len());
    for (b, a) in before.iter().zip(after) {
        for ns in Namespace::ALL {
            let db = distinct(b, ns);
            let da = distinct(a, ns);
            out.push(ColumnStats {
                table: a.name.clone(),
                namespace: ns,
                distinct_before: db.len(),
                distinct_after: da.len(),
                additional: da.difference(&db).count(),
                present_before: b.present_count(ns),
                present_after: a.present_count(ns),
            });
        }
    }
    out
}
