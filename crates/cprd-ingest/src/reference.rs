//! Medication reference loading.
//!
//! The study's medication reference arrives as one delimited file per drug
//! class (class name = file stem), each with a header row followed by one
//! annotation row which is skipped. Columns hold the canonical drug name
//! and a comma-separated list of brand-name synonyms.

use std::path::Path;

use tracing::info;

use cprd_model::MedicationRef;

use crate::error::{IngestError, Result};
use crate::table::{detect_delimiter, read_table};

/// Header names accepted for the canonical-name column.
const DRUG_HEADERS: [&str; 3] = ["drug name", "drug", "name"];
/// Header names accepted for the brand-synonym column.
const BRAND_HEADERS: [&str; 3] = ["brand names", "brands", "brand"];

/// Number of annotation rows after the header in each reference file.
const SKIP_ROWS: usize = 1;

/// Load one drug-class reference file; the drug class is taken from the
/// file stem.
pub fn load_reference_file(path: &Path) -> Result<Vec<MedicationRef>> {
    let drug_class = path
        .file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.replace('_', " "));
    let delimiter = detect_delimiter(path)?;
    let table = read_table(path, delimiter, SKIP_ROWS)?;

    let normalized: Vec<String> = table
        .headers
        .iter()
        .map(|h| h.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase())
        .collect();
    let drug_idx = find_column(&normalized, &DRUG_HEADERS).ok_or_else(|| {
        IngestError::MissingColumn {
            column: DRUG_HEADERS[0].to_string(),
            path: path.to_path_buf(),
        }
    })?;
    let brand_idx = find_column(&normalized, &BRAND_HEADERS).ok_or_else(|| {
        IngestError::MissingColumn {
            column: BRAND_HEADERS[0].to_string(),
            path: path.to_path_buf(),
        }
    })?;

    let mut rows = Vec::new();
    for row in &table.rows {
        let keyword = table.value(row, drug_idx).trim().to_lowercase();
        if keyword.is_empty() {
            continue;
        }
        let brands: Vec<String> = table
            .value(row, brand_idx)
            .split(',')
            .map(|b| b.trim().to_lowercase())
            .filter(|b| !b.is_empty())
            .collect();
        rows.push(MedicationRef {
            keyword,
            brands,
            drug_class: drug_class.clone(),
        });
    }
    Ok(rows)
}

/// Load every reference file in a directory, sorted by file name for
/// reproducible keyword order.
pub fn load_reference_dir(dir: &Path) -> Result<Vec<MedicationRef>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }
    let mut paths = Vec::new();
    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;
    for entry in entries {
        let entry = entry.map_err(|e| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    let mut all = Vec::new();
    for path in paths {
        let mut rows = load_reference_file(&path)?;
        all.append(&mut rows);
    }
    info!(rows = all.len(), dir = %dir.display(), "loaded medication reference");
    Ok(all)
}

fn find_column(normalized_headers: &[String], candidates: &[&str]) -> Option<usize> {
    candidates
        .iter()
        .find_map(|name| normalized_headers.iter().position(|h| h == name))
}
