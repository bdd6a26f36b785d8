//! Source tables: raw loader output, column mapping, normalized rows.

use crate::error::{ReconcileError, Result};
use crate::namespace::{Namespace, NamespaceMap};
use crate::normalize::normalize_opt;
use serde::{Deserialize, Serialize};

// ============================================================================
// Raw input
// ============================================================================

/// A table as handed over by a loader: header plus optional cells.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub name: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    fn column(&self, column: &str) -> Result<usize> {
        self.header
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| ReconcileError::MissingColumn {
                table: self.name.clone(),
                column: column.to_string(),
            })
    }
}

/// Which source columns hold the row key and each namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMap {
    /// Native row key. Tables without one only feed fills and emit nothing.
    #[serde(default)]
    pub key: Option<String>,
    pub chebi: String,
    pub kegg: String,
    pub hmdb: String,
    pub pubchem: String,
}

impl ColumnMap {
    pub fn namespace_column(&self, ns: Namespace) -> &str {
        match ns {
            Namespace::Chebi => &self.chebi,
            Namespace::Kegg => &self.kegg,
            Namespace::Hmdb => &self.hmdb,
            Namespace::Pubchem => &self.pubchem,
        }
    }
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            key: Some("id".to_string()),
            chebi: "chebi_id".to_string(),
            kegg: "kegg_id".to_string(),
            hmdb: "hmdb_id".to_string(),
            pubchem: "pubchem_id".to_string(),
        }
    }
}

// ============================================================================
// Normalized tables
// ============================================================================

/// One identifier record: an optional canonical value per namespace.
pub type IdentifierRecord = NamespaceMap<Option<String>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    /// Native row key of the source table. Keyless rows still join and get
    /// filled, but are never emitted.
    pub key: Option<String>,
    pub ids: IdentifierRecord,
}

impl Row {
    pub fn new(key: impl Into<String>, ids: IdentifierRecord) -> Self {
        Self {
            key: Some(key.into()),
            ids,
        }
    }

    pub fn keyless(ids: IdentifierRecord) -> Self {
        Self { key: None, ids }
    }

    pub fn get(&self, ns: Namespace) -> Option<&str> {
        self.ids[ns].as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceTable {
    pub name: String,
    pub rows: Vec<Row>,
}

/// Row accounting from [`SourceTable::from_raw`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadReport {
    pub table: String,
    pub rows_read: usize,
    pub rows_kept: usize,
    /// Kept rows without a key cell.
    pub keyless: usize,
    pub dropped_no_identifiers: usize,
}

impl SourceTable {
    pub fn new(name: impl Into<String>, rows: Vec<Row>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// Resolve columns, normalize every cell and drop rows that carry no
    /// identifier at all. Rows with an empty key cell are kept.
    ///
    /// Fails if any mapped column is absent from the header.
    pub fn from_raw(raw: &RawTable, columns: &ColumnMap) -> Result<(Self, LoadReport)> {
        let key_col = columns.key.as_deref().map(|k| raw.column(k)).transpose()?;
        let mut ns_cols = NamespaceMap::from_fn(|_| 0usize);
        for ns in Namespace::ALL {
            ns_cols[ns] = raw.column(columns.namespace_column(ns))?;
        }

        let mut report = LoadReport {
            table: raw.name.clone(),
            rows_read: raw.rows.len(),
            ..LoadReport::default()
        };
        let mut rows = Vec::with_capacity(raw.rows.len());

        for cells in &raw.rows {
            let cell = |idx: usize| cells.get(idx).and_then(|c| c.as_deref());

            let ids = NamespaceMap::from_fn(|ns| normalize_opt(ns, cell(ns_cols[ns])));
            if ids.iter().all(|(_, v)| v.is_none()) {
                report.dropped_no_identifiers += 1;
                continue;
            }
            let key = key_col
                .and_then(cell)
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string);
            if key.is_none() {
                report.keyless += 1;
            }
            rows.push(Row { key, ids });
        }

        report.rows_kept = rows.len();
        if report.dropped_no_identifiers > 0 {
            tracing::warn!(
                table = %raw.name,
                no_identifiers = report.dropped_no_identifiers,
                "dropped rows without identifiers"
            );
        }
        if report.keyless > 0 {
            tracing::debug!(table = %raw.name, keyless = report.keyless, "rows without key");
        }

        Ok((Self::new(raw.name.clone(), rows), report))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn present_count(&self, ns: Namespace) -> usize {
        self.rows.iter().filter(|r| r.ids[ns].is_some()).count()
    }

    pub fn missing_count(&self, ns: Namespace) -> usize {
        self.len() - self.present_count(ns)
    }
}

/// The three tables being reconciled. Slot order is the table order of the
/// configuration; it is also the default trust order.
pub type TableSet = [SourceTable; 3];
