//! Per-namespace canonicalization of raw identifier strings.
//!
//! Normalization is total: anything that cannot be brought into canonical form
//! becomes `None`. Missing is always `None`, never a sentinel string.
//!
//! | namespace | canonical form            | example in → out              |
//! |-----------|---------------------------|-------------------------------|
//! | CHEBI     | `CHEBI:<id>`              | `15377` → `CHEBI:15377`       |
//! | KEGG      | `C#####`                  | `cpd:C00031` → `C00031`       |
//! | HMDB      | `HMDB` + 7 digits         | `HMDB00122` → `HMDB0000122`   |
//! | PUBCHEM   | unchanged                 | `5793` → `5793`               |

use crate::namespace::Namespace;

pub const CHEBI_PREFIX: &str = "CHEBI:";
pub const HMDB_PREFIX: &str = "HMDB";
pub const HMDB_WIDTH: usize = 11;
pub const KEGG_WIDTH: usize = 6;

const MISSING_MARKERS: &[&str] = &["nan", "na", "n/a", "none", "null"];

/// Canonicalize `raw` for `namespace`. Returns `None` for missing or malformed input.
pub fn normalize(namespace: Namespace, raw: &str) -> Option<String> {
    let raw = present(raw)?;
    match namespace {
        Namespace::Chebi => normalize_chebi(raw),
        Namespace::Kegg => normalize_kegg(raw),
        Namespace::Hmdb => normalize_hmdb(raw),
        Namespace::Pubchem => Some(raw.to_string()),
    }
}

/// Like [`normalize`] but for an optional cell.
pub fn normalize_opt(namespace: Namespace, raw: Option<&str>) -> Option<String> {
    raw.and_then(|r| normalize(namespace, r))
}

fn present(raw: &str) -> Option<&str> {
    let raw = raw.trim();
    if raw.is_empty()
        || MISSING_MARKERS
            .iter()
            .any(|m| raw.eq_ignore_ascii_case(m))
    {
        None
    } else {
        Some(raw)
    }
}

fn normalize_chebi(raw: &str) -> Option<String> {
    let id = match raw.get(..CHEBI_PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(CHEBI_PREFIX) => {
            raw[CHEBI_PREFIX.len()..].trim()
        }
        _ => raw,
    };
    if id.is_empty() {
        return None;
    }
    Some(format!("{CHEBI_PREFIX}{id}"))
}

fn normalize_kegg(raw: &str) -> Option<String> {
    let start = raw.find('C')?;
    let candidate = raw.get(start..start + KEGG_WIDTH)?;
    if candidate[1..].bytes().all(|b| b.is_ascii_digit()) {
        Some(candidate.to_string())
    } else {
        None
    }
}

fn normalize_hmdb(raw: &str) -> Option<String> {
    let digits = if raw.bytes().all(|b| b.is_ascii_digit()) {
        raw
    } else {
        raw.strip_prefix(HMDB_PREFIX)?
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let width = HMDB_WIDTH - HMDB_PREFIX.len();
    Some(format!("{HMDB_PREFIX}{digits:0>width$}"))
}
