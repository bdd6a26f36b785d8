//! Reconciliation configuration (JSON).
//!
//! ```json
//! {
//!   "tables": [
//!     { "name": "recon", "path": "data/recon_mets.tsv",
//!       "columns": { "key": "mets", "chebi": "metCHEBIID", "kegg": "metKEGGID",
//!                    "hmdb": "metHMDBID", "pubchem": "metPubChemID" } },
//!     { "name": "hmdb_mapping", "path": "data/hmdb_mapping.csv", "delimiter": ",",
//!       "columns": { "key": "accession", "chebi": "chebi_id", "kegg": "kegg_id",
//!                    "hmdb": "accession", "pubchem": "pubchem_id" } },
//!     { "name": "metmap", "path": "data/metmap_curated.tsv",
//!       "columns": { "key": "CID", "chebi": "ChEBI", "kegg": "KEGG",
//!                    "hmdb": "HMDB", "pubchem": "CID" } }
//!   ],
//!   "trust_order": ["recon", "hmdb_mapping", "metmap"],
//!   "parallel": false,
//!   "canonical": "hmdb"
//! }
//! ```

use crate::error::{ReconcileError, Result};
use crate::namespace::Namespace;
use crate::resolve::TrustOrder;
use crate::table::ColumnMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

fn default_delimiter() -> char {
    '\t'
}

fn default_canonical() -> Namespace {
    Namespace::Hmdb
}

/// Where one source table lives and how its columns are named.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSpec {
    pub name: String,
    pub path: PathBuf,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    #[serde(default)]
    pub columns: ColumnMap,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileConfig {
    pub tables: Vec<TableSpec>,
    /// Table names, most trusted first. Defaults to table order.
    #[serde(default)]
    pub trust_order: Option<Vec<String>>,
    /// Resolve combined rows on the rayon pool.
    #[serde(default)]
    pub parallel: bool,
    /// Namespace used as the emitted join key.
    #[serde(default = "default_canonical")]
    pub canonical: Namespace,
}

impl ReconcileConfig {
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| ReconcileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ReconcileError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tables.len() != 3 {
            return Err(ReconcileError::TableCount(self.tables.len()));
        }
        let mut seen = HashSet::new();
        for table in &self.tables {
            if !seen.insert(table.name.as_str()) {
                return Err(ReconcileError::DuplicateTable(table.name.clone()));
            }
        }
        self.trust_order().map(|_| ())
    }

    /// Resolve the configured trust order (by table name) into slot indices.
    pub fn trust_order(&self) -> Result<TrustOrder> {
        let Some(names) = &self.trust_order else {
            return Ok(TrustOrder::default());
        };
        if names.len() != 3 {
            return Err(ReconcileError::TrustOrder(format!(
                "expected 3 table names, got {}",
                names.len()
            )));
        }

        let mut slots = [0usize; 3];
        for (rank, name) in names.iter().enumerate() {
            slots[rank] = self
                .tables
                .iter()
                .position(|t| &t.name == name)
                .ok_or_else(|| ReconcileError::TrustOrder(format!("unknown table `{name}`")))?;
        }
        TrustOrder::new(slots)
    }
}
