//! Anchor merge step: one reconciliation pass keyed on a single namespace.
//!
//! ```text
//!   table 0 ─┐                         ┌─► dict(kegg)    ─┐
//!   table 1 ─┼─► join on anchor ─► resolve ─► dict(hmdb)  ─┼─► fill all 3 tables
//!   table 2 ─┘   (combined rows)       └─► dict(pubchem) ─┘
//! ```
//!
//! Rows without an anchor value take no part in the pass. Rows that share an
//! anchor value with rows of other tables are crossed into combined rows, one
//! slot per table; a table with no such row contributes a missing slot. Each
//! combined row is resolved once per non-anchor namespace, and the resolved
//! values become `anchor value → value` dictionaries that are applied to every
//! table, filling only fields that are still missing.

use crate::namespace::Namespace;
use crate::resolve::{resolve, OutcomeCounts, Slots, TrustOrder};
use crate::table::TableSet;
use ahash::{AHashMap, AHashSet};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default)]
pub struct MergeOptions {
    pub trust: TrustOrder,
    /// Resolve combined rows on the rayon pool.
    pub parallel: bool,
}

/// What one non-anchor namespace went through during a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetReport {
    pub target: Namespace,
    pub outcomes: OutcomeCounts,
    pub dictionary_entries: usize,
    /// Anchor values whose combined rows resolved to more than one value.
    /// The first resolved value is kept.
    pub ambiguous_anchors: usize,
    /// Fields filled, per table.
    pub fills: [usize; 3],
}

impl TargetReport {
    pub fn conflicts(&self) -> usize {
        self.outcomes.conflicts()
    }

    pub fn total_fills(&self) -> usize {
        self.fills.iter().sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeReport {
    pub anchor: Namespace,
    pub anchor_values: usize,
    pub combined_rows: usize,
    pub targets: Vec<TargetReport>,
}

impl MergeReport {
    pub fn conflicts(&self) -> usize {
        self.targets.iter().map(TargetReport::conflicts).sum()
    }

    pub fn total_fills(&self) -> usize {
        self.targets.iter().map(TargetReport::total_fills).sum()
    }
}

/// Values of the three non-anchor namespaces of one row.
type Projection<'a> = [Option<&'a str>; 3];

struct CombinedRow<'a> {
    anchor: &'a str,
    cells: [Projection<'a>; 3],
}

/// Run one pass anchored on `anchor`. Returns the filled tables; the input is
/// left untouched.
pub fn anchor_merge(
    tables: &TableSet,
    anchor: Namespace,
    options: &MergeOptions,
) -> (TableSet, MergeReport) {
    let targets: Vec<Namespace> = anchor.others().collect();
    let combined = join_on_anchor(tables, anchor, &targets);
    let anchor_values = combined
        .iter()
        .map(|row| row.anchor)
        .collect::<AHashSet<_>>()
        .len();

    let mut out = tables.clone();
    let mut reports = Vec::with_capacity(targets.len());

    for (k, &target) in targets.iter().enumerate() {
        let (values, outcomes) = resolve_target(&combined, k, &options.trust, options.parallel);

        let mut dictionary: AHashMap<&str, &str> = AHashMap::new();
        let mut ambiguous: AHashSet<&str> = AHashSet::new();
        for (row, value) in combined.iter().zip(&values) {
            let Some(value) = value.as_deref() else {
                continue;
            };
            let kept = *dictionary.entry(row.anchor).or_insert(value);
            if kept != value {
                ambiguous.insert(row.anchor);
            }
        }

        let mut fills = [0usize; 3];
        for (t, table) in out.iter_mut().enumerate() {
            for row in &mut table.rows {
                if row.ids[target].is_some() {
                    continue;
                }
                let Some(key) = row.ids[anchor].as_deref() else {
                    continue;
                };
                if let Some(value) = dictionary.get(key) {
                    row.ids[target] = Some((*value).to_string());
                    fills[t] += 1;
                }
            }
        }

        if outcomes.conflicts() > 0 {
            tracing::warn!(
                %anchor,
                %target,
                conflicts = outcomes.conflicts(),
                "conflicting identifiers"
            );
        }
        if !ambiguous.is_empty() {
            tracing::debug!(
                %anchor,
                %target,
                ambiguous = ambiguous.len(),
                "anchor values resolved to several values, kept the first"
            );
        }

        reports.push(TargetReport {
            target,
            outcomes,
            dictionary_entries: dictionary.len(),
            ambiguous_anchors: ambiguous.len(),
            fills,
        });
    }

    let report = MergeReport {
        anchor,
        anchor_values,
        combined_rows: combined.len(),
        targets: reports,
    };
    (out, report)
}

/// Build combined rows in first-seen anchor order (table 0 first).
fn join_on_anchor<'a>(
    tables: &'a TableSet,
    anchor: Namespace,
    targets: &[Namespace],
) -> Vec<CombinedRow<'a>> {
    let mut index: AHashMap<&'a str, usize> = AHashMap::new();
    let mut groups: Vec<(&'a str, [Vec<Projection<'a>>; 3])> = Vec::new();
    // (group, table, projection) already recorded; the vectors keep first-seen order.
    let mut seen: AHashSet<(usize, usize, Projection<'a>)> = AHashSet::new();

    for (t, table) in tables.iter().enumerate() {
        for row in &table.rows {
            let Some(value) = row.get(anchor) else {
                continue;
            };
            let slot = *index.entry(value).or_insert_with(|| {
                groups.push((value, Default::default()));
                groups.len() - 1
            });
            let projection: Projection<'a> = [0, 1, 2].map(|k| row.get(targets[k]));
            if seen.insert((slot, t, projection)) {
                groups[slot].1[t].push(projection);
            }
        }
    }

    let absent: [Projection<'a>; 1] = [[None; 3]];
    let mut combined = Vec::new();
    for (anchor_value, per_table) in &groups {
        let choices: [&[Projection<'a>]; 3] = [0, 1, 2].map(|t| {
            if per_table[t].is_empty() {
                &absent[..]
            } else {
                per_table[t].as_slice()
            }
        });
        for a in choices[0] {
            for b in choices[1] {
                for c in choices[2] {
                    combined.push(CombinedRow {
                        anchor: *anchor_value,
                        cells: [*a, *b, *c],
                    });
                }
            }
        }
    }
    combined
}

fn resolve_target(
    combined: &[CombinedRow<'_>],
    k: usize,
    trust: &TrustOrder,
    parallel: bool,
) -> (Vec<Option<String>>, OutcomeCounts) {
    let resolve_row = |row: &CombinedRow<'_>| {
        let slots: Slots = row.cells.map(|cell| cell[k].map(str::to_string));
        let resolution = resolve(slots, trust);
        if resolution.outcome.is_conflict() {
            tracing::debug!(
                anchor = row.anchor,
                candidates = ?row.cells.map(|cell| cell[k]),
                chosen = ?resolution.value,
                "conflict"
            );
        }
        (resolution.value, OutcomeCounts::of(resolution.outcome))
    };

    let per_row: Vec<(Option<String>, OutcomeCounts)> = if parallel {
        combined.par_iter().map(resolve_row).collect()
    } else {
        combined.iter().map(resolve_row).collect()
    };

    let counts = per_row
        .iter()
        .fold(OutcomeCounts::default(), |acc, (_, c)| acc + *c);
    let values = per_row.into_iter().map(|(v, _)| v).collect();
    (values, counts)
}
