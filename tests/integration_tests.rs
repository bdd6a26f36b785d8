//! Integration tests for the complete Metalinks reconciliation pipeline
//!
//! These tests go through files on disk, the way the CLI does:
//! - config JSON → loader → normalization
//! - four anchor passes → emitted HMDB lookups
//! - structural errors abort before anything is produced
//!
//! Run with: cargo test --test integration_tests

use metalinks_idmap::{reconcile, Namespace, ReconcileConfig, ReconcileError};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const RECON_TSV: &str = "\
mets\tmetCHEBIID\tmetKEGGID\tmetHMDBID\tmetPubChemID
glc_D[c]\t4167\tC00031\t\t5793
h2o[c]\t15377\t\tHMDB02111\t
pyr[m]\t\tcpd:C00022\t\t
atp[c]\t\t\t\t
";

const HMDB_CSV: &str = "\
accession,chebi_id,kegg_id,pubchem_id
HMDB0000122,4167,C00031,5793
HMDB0000243,15361,C00022,1060
";

const METMAP_TSV: &str = "\
CID\tKEGG\tHMDB\tChEBI
962\t\t\t15377
1060\tC00022\t\t
5950\tC00041\tnan\t
";

fn write_fixture(dir: &Path, hmdb_columns: &str) -> std::path::PathBuf {
    fs::write(dir.join("recon.tsv"), RECON_TSV).unwrap();
    fs::write(dir.join("hmdb.csv"), HMDB_CSV).unwrap();
    fs::write(dir.join("metmap.tsv"), METMAP_TSV).unwrap();

    let config = serde_json::json!({
        "tables": [
            {
                "name": "recon",
                "path": dir.join("recon.tsv"),
                "columns": {
                    "key": "mets", "chebi": "metCHEBIID", "kegg": "metKEGGID",
                    "hmdb": "metHMDBID", "pubchem": "metPubChemID"
                }
            },
            {
                "name": "hmdb_mapping",
                "path": dir.join("hmdb.csv"),
                "delimiter": ",",
                "columns": serde_json::from_str::<serde_json::Value>(hmdb_columns).unwrap()
            },
            {
                "name": "metmap",
                "path": dir.join("metmap.tsv"),
                "columns": {
                    "key": "CID", "chebi": "ChEBI", "kegg": "KEGG",
                    "hmdb": "HMDB", "pubchem": "CID"
                }
            }
        ],
        "trust_order": ["recon", "hmdb_mapping", "metmap"]
    });
    let path = dir.join("config.json");
    fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
    path
}

const HMDB_COLUMNS: &str = r#"{
    "key": "accession", "chebi": "chebi_id", "kegg": "kegg_id",
    "hmdb": "accession", "pubchem": "pubchem_id"
}"#;

// ============================================================================
// Files → mappings
// ============================================================================

#[test]
fn test_reconcile_from_config_files() {
    let dir = tempdir().unwrap();
    let config_path = write_fixture(dir.path(), HMDB_COLUMNS);

    let config = ReconcileConfig::from_path(&config_path).unwrap();
    let reconciled = reconcile(&config).unwrap();

    // `atp[c]` has no identifiers at all and never enters the engine.
    assert_eq!(reconciled.loads[0].rows_read, 4);
    assert_eq!(reconciled.loads[0].dropped_no_identifiers, 1);
    assert_eq!(reconciled.tables[0].len(), 3);

    let mappings = reconciled.mappings(config.canonical);
    let recon = &mappings[0];
    assert_eq!(recon.get("glc_D[c]"), Some("HMDB0000122"));
    assert_eq!(recon.get("h2o[c]"), Some("HMDB0002111"));
    assert_eq!(recon.get("pyr[m]"), Some("HMDB0000243"));

    let metmap = &mappings[2];
    assert_eq!(metmap.get("962"), Some("HMDB0002111"));
    assert_eq!(metmap.get("1060"), Some("HMDB0000243"));
    assert_eq!(metmap.get("5950"), None);
    assert_eq!(metmap.dropped, 1);

    assert_eq!(reconciled.propagation.passes.len(), 4);
    assert_eq!(reconciled.propagation.conflicts(), 0);
}

#[test]
fn test_report_serializes() {
    let dir = tempdir().unwrap();
    let config_path = write_fixture(dir.path(), HMDB_COLUMNS);
    let config = ReconcileConfig::from_path(&config_path).unwrap();
    let reconciled = reconcile(&config).unwrap();

    let json = serde_json::to_value(&reconciled).unwrap();
    let passes = json["propagation"]["passes"].as_array().unwrap();
    assert_eq!(passes.len(), 4);
    assert_eq!(passes[0]["merge"]["anchor"], "chebi");
    assert_eq!(passes[3]["merge"]["anchor"], "pubchem");

    let mappings = serde_json::to_value(reconciled.mappings(Namespace::Hmdb)).unwrap();
    assert_eq!(mappings[1]["table"], "hmdb_mapping");
    assert_eq!(mappings[1]["entries"]["HMDB0000122"], "HMDB0000122");
}

// ============================================================================
// Structural errors
// ============================================================================

#[test]
fn test_missing_namespace_column_aborts() {
    let dir = tempdir().unwrap();
    let columns = r#"{
        "key": "accession", "chebi": "chebi_id", "kegg": "kegg_id",
        "hmdb": "accession", "pubchem": "cid"
    }"#;
    let config_path = write_fixture(dir.path(), columns);
    let config = ReconcileConfig::from_path(&config_path).unwrap();

    match reconcile(&config) {
        Err(ReconcileError::MissingColumn { table, column }) => {
            assert_eq!(table, "hmdb_mapping");
            assert_eq!(column, "cid");
        }
        other => panic!("expected a missing column error, got {other:?}"),
    }
}

#[test]
fn test_missing_table_file() {
    let dir = tempdir().unwrap();
    let config_path = write_fixture(dir.path(), HMDB_COLUMNS);
    fs::remove_file(dir.path().join("metmap.tsv")).unwrap();
    let config = ReconcileConfig::from_path(&config_path).unwrap();

    assert!(matches!(reconcile(&config), Err(ReconcileError::Io { .. })));
}
