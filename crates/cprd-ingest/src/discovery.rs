//! Patient-record extract discovery.
//!
//! CPRD delivers extracts segmented by database, record kind and numbered
//! file part (e.g. `gold_clinical_part7.txt`). Discovery lists a delivery
//! directory and returns the parts for one (database, kind) pair in part
//! order, so extraction can stream them one at a time.

use std::path::{Path, PathBuf};

use cprd_model::{RecordKind, SourceDatabase};

use crate::error::{IngestError, Result};

/// File-stem tokens that identify a record kind, per database naming.
fn kind_tokens(kind: RecordKind) -> &'static [&'static str] {
    match kind {
        RecordKind::Diagnosis => &["clinical", "observation", "diagnosis"],
        RecordKind::Medication => &["therapy", "drugissue", "medication"],
    }
}

/// Parse the numeric suffix of a `part<N>` token in a file stem.
pub fn part_number(stem: &str) -> Option<u32> {
    let lower = stem.to_lowercase();
    let idx = lower.rfind("part")?;
    let digits: String = lower[idx + 4..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// List the extract part files for one (database, kind) pair, ordered by
/// part number (files without a part token sort last, by name).
pub fn discover_part_files(
    dir: &Path,
    database: SourceDatabase,
    kind: RecordKind,
) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let db_token = database.as_str().to_lowercase();
    let tokens = kind_tokens(kind);

    let mut matched: Vec<(Option<u32>, PathBuf)> = Vec::new();
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
        if !path.is_file() {
            continue;
        }
        let is_delimited = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("txt") || ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);
        if !is_delimited {
            continue;
        }
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase();
        if !stem.contains(&db_token) {
            continue;
        }
        if !tokens.iter().any(|t| stem.contains(t)) {
            continue;
        }
        matched.push((part_number(&stem), path));
    }

    matched.sort_by(|a, b| match (a.0, b.0) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.1.cmp(&b.1)),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.1.cmp(&b.1),
    });

    Ok(matched.into_iter().map(|(_, path)| path).collect())
}
