//! Propagation driver: one anchor merge per namespace, in schedule order.
//!
//! Each pass consumes the previous pass's tables, so fills found while
//! anchoring on CHEBI widen the joins of the KEGG, HMDB and PUBCHEM passes.
//! The schedule is fixed at four passes; whatever is still missing afterwards
//! stays missing.

use crate::merge::{anchor_merge, MergeOptions, MergeReport};
use crate::namespace::Namespace;
use crate::stats::{compare, ColumnStats};
use crate::table::TableSet;
use serde::{Deserialize, Serialize};

/// Anchor order of the four passes.
pub const ANCHOR_SCHEDULE: [Namespace; 4] = Namespace::ALL;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassReport {
    pub merge: MergeReport,
    pub stats: Vec<ColumnStats>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropagationReport {
    pub passes: Vec<PassReport>,
}

impl PropagationReport {
    pub fn conflicts(&self) -> usize {
        self.passes.iter().map(|p| p.merge.conflicts()).sum()
    }

    pub fn total_fills(&self) -> usize {
        self.passes.iter().map(|p| p.merge.total_fills()).sum()
    }
}

/// Run a single pass and compute its statistics.
pub fn run_pass(tables: &TableSet, anchor: Namespace, options: &MergeOptions) -> (TableSet, PassReport) {
    let (next, merge) = anchor_merge(tables, anchor, options);
    let stats = compare(tables, &next);

    tracing::info!(
        %anchor,
        anchor_values = merge.anchor_values,
        combined_rows = merge.combined_rows,
        fills = merge.total_fills(),
        conflicts = merge.conflicts(),
        "reconciliation pass"
    );
    for s in &stats {
        tracing::debug!(
            table = %s.table,
            namespace = %s.namespace,
            before = s.distinct_before,
            after = s.distinct_after,
            additional = s.additional,
            "distinct values"
        );
    }

    (next, PassReport { merge, stats })
}

/// Run the full four-pass schedule.
pub fn propagate(tables: TableSet, options: &MergeOptions) -> (TableSet, PropagationReport) {
    let mut report = PropagationReport::default();
    let tables = ANCHOR_SCHEDULE.iter().fold(tables, |tables, &anchor| {
        let (next, pass) = run_pass(&tables, anchor, options);
        report.passes.push(pass);
        next
    });
    (tables, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace::NamespaceMap;
    use crate::table::{Row, SourceTable};

    fn row(key: &str, ids: [Option<&str>; 4]) -> Row {
        Row::new(key, {
            let mut record = NamespaceMap::default();
            for (ns, v) in Namespace::ALL.into_iter().zip(ids) {
                record[ns] = v.map(str::to_string);
            }
            record
        })
    }

    #[test]
    fn test_later_pass_uses_earlier_fill() {
        // CHEBI pass gives table 0 a KEGG id; the KEGG pass then carries the
        // PubChem id of table 2 over to table 0.
        let tables = [
            SourceTable::new("recon", vec![row("r1", [Some("CHEBI:1"), None, None, None])]),
            SourceTable::new("hmdb_mapping", vec![row("h1", [Some("CHEBI:1"), Some("C00001"), None, None])]),
            SourceTable::new("metmap", vec![row("m1", [None, Some("C00001"), None, Some("42")])]),
        ];
        let (out, report) = propagate(tables, &MergeOptions::default());

        assert_eq!(out[0].rows[0].get(Namespace::Kegg), Some("C00001"));
        assert_eq!(out[0].rows[0].get(Namespace::Pubchem), Some("42"));
        assert_eq!(out[2].rows[0].get(Namespace::Chebi), Some("CHEBI:1"));
        assert_eq!(report.passes.len(), 4);
        assert_eq!(report.conflicts(), 0);

        let anchors: Vec<_> = report.passes.iter().map(|p| p.merge.anchor).collect();
        assert_eq!(anchors, ANCHOR_SCHEDULE.to_vec());
    }

    #[test]
    fn test_stats_track_new_values() {
        let tables = [
            SourceTable::new("recon", vec![row("r1", [Some("CHEBI:1"), None, Some("HMDB0000001"), None])]),
            SourceTable::new("hmdb_mapping", vec![row("h1", [Some("CHEBI:1"), None, None, None])]),
            SourceTable::new("metmap", vec![]),
        ];
        let (_, pass) = run_pass(&tables, Namespace::Chebi, &MergeOptions::default());

        let hmdb = pass
            .stats
            .iter()
            .find(|s| s.table == "hmdb_mapping" && s.namespace == Namespace::Hmdb)
            .unwrap();
        assert_eq!(hmdb.distinct_before, 0);
        assert_eq!(hmdb.distinct_after, 1);
        assert_eq!(hmdb.additional, 1);
        assert_eq!(hmdb.present_after, 1);
    }
}
