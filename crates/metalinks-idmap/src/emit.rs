//! Mapping emission: native row key → canonical identifier, per table.

use crate::namespace::Namespace;
use crate::table::{SourceTable, TableSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lookup handed to edge construction. Rows whose canonical identifier is
/// still missing are not part of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmittedMapping {
    pub table: String,
    pub namespace: Namespace,
    pub entries: BTreeMap<String, String>,
    /// Rows left out: canonical identifier missing, no row key, or a key
    /// already emitted.
    pub dropped: usize,
}

impl EmittedMapping {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn emit_table(table: &SourceTable, namespace: Namespace) -> EmittedMapping {
    let mut entries = BTreeMap::new();
    let mut dropped = 0;
    for row in &table.rows {
        match (row.key.as_deref(), row.get(namespace)) {
            // Duplicate keys keep their first row, the others count as dropped.
            (Some(key), Some(id)) if !entries.contains_key(key) => {
                entries.insert(key.to_string(), id.to_string());
            }
            _ => dropped += 1,
        }
    }
    EmittedMapping {
        table: table.name.clone(),
        namespace,
        entries,
        dropped,
    }
}

/// Emit the HMDB lookup of every table.
pub fn emit_hmdb(tables: &TableSet) -> Vec<EmittedMapping> {
    emit(tables, Namespace::Hmdb)
}

pub fn emit(tables: &TableSet, namespace: Namespace) -> Vec<EmittedMapping> {
    tables.iter().map(|t| emit_table(t, namespace)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace::NamespaceMap;
    use crate::table::Row;

    fn hmdb_row(key: &str, hmdb: Option<&str>) -> Row {
        let mut ids = NamespaceMap::default();
        ids[Namespace::Hmdb] = hmdb.map(str::to_string);
        ids[Namespace::Pubchem] = Some("1".to_string());
        Row::new(key, ids)
    }

    #[test]
    fn test_rows_without_hmdb_dropped() {
        let table = SourceTable::new(
            "recon",
            vec![
                hmdb_row("glc_D[c]", Some("HMDB0000122")),
                hmdb_row("h2o[c]", None),
                hmdb_row("glc_D[e]", Some("HMDB0000122")),
            ],
        );
        let mapping = emit_table(&table, Namespace::Hmdb);

        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.dropped, 1);
        assert_eq!(mapping.get("glc_D[e]"), Some("HMDB0000122"));
        assert_eq!(mapping.get("h2o[c]"), None);
    }

    #[test]
    fn test_keyless_rows_not_emitted() {
        let mut ids = NamespaceMap::default();
        ids[Namespace::Hmdb] = Some("HMDB0000122".to_string());
        let table = SourceTable::new(
            "metmap",
            vec![Row::keyless(ids), hmdb_row("5793", Some("HMDB0000122"))],
        );
        let mapping = emit_table(&table, Namespace::Hmdb);

        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping.dropped, 1);
    }

    #[test]
    fn test_duplicate_key_keeps_first() {
        let table = SourceTable::new(
            "metmap",
            vec![
                hmdb_row("5793", Some("HMDB0000122")),
                hmdb_row("5793", Some("HMDB0000143")),
            ],
        );
        let mapping = emit_table(&table, Namespace::Hmdb);
        assert_eq!(mapping.get("5793"), Some("HMDB0000122"));
        assert_eq!(mapping.dropped, 1);
    }
}
