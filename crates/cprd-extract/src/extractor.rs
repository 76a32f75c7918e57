//! Code-list-driven streaming extraction of patient-record files.
//!
//! Extract files can be arbitrarily large, so each file is streamed
//! row-by-row and only matching rows are kept; peak memory is one record
//! plus the accumulating result. Files are processed strictly one at a
//! time, so a failed run can simply be re-run: extraction is idempotent on
//! identical inputs.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use cprd_ingest::{IngestError, detect_delimiter};
use cprd_model::{CodeList, PatientId, RecordKind, SourceColumns, SourceDatabase, source_columns};

use crate::error::Result;

/// One matching extract row before date reconciliation. Dates stay textual
/// here; parsing and validation belong to the reconciler.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawEvent {
    pub patient_id: PatientId,
    pub code_id: String,
    pub event_date: String,
    pub entry_date: String,
    pub database: SourceDatabase,
    pub kind: RecordKind,
}

/// Stream the given extract files, retaining rows whose code is in the
/// code list (inner join, many-to-many: one code may match many rows and
/// one patient may contribute many rows).
pub fn extract_events(
    files: &[PathBuf],
    code_list: &CodeList,
    database: SourceDatabase,
    kind: RecordKind,
) -> Result<Vec<RawEvent>> {
    let columns = source_columns(database, kind);
    let codes: HashSet<&str> = code_list.code_ids().collect();

    let bar = ProgressBar::new(files.len() as u64).with_style(
        ProgressStyle::with_template("{msg} [{bar:30}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar.set_message(format!("{database} {kind}"));

    let mut events = Vec::new();
    for (index, path) in files.iter().enumerate() {
        let before = events.len();
        extract_file(path, &codes, columns, database, kind, &mut events)?;
        info!(
            file = index + 1,
            total = files.len(),
            path = %path.display(),
            matched = events.len() - before,
            "extracted file"
        );
        bar.inc(1);
    }
    bar.finish_and_clear();
    Ok(events)
}

/// Parse the database/kind tags, then extract. Unrecognized tags abort
/// before any file is opened.
pub fn extract_events_tagged(
    files: &[PathBuf],
    code_list: &CodeList,
    database_tag: &str,
    kind_tag: &str,
) -> Result<Vec<RawEvent>> {
    let database: SourceDatabase = database_tag.parse()?;
    let kind: RecordKind = kind_tag.parse()?;
    extract_events(files, code_list, database, kind)
}

fn extract_file(
    path: &Path,
    codes: &HashSet<&str>,
    columns: SourceColumns,
    database: SourceDatabase,
    kind: RecordKind,
    events: &mut Vec<RawEvent>,
) -> Result<()> {
    let delimiter = detect_delimiter(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)
        .map_err(|e| IngestError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;

    let headers = reader
        .headers()
        .map_err(|e| IngestError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?
        .clone();
    let find = |name: &str| -> Result<usize> {
        headers
            .iter()
            .position(|h| h.trim().trim_matches('\u{feff}').eq_ignore_ascii_case(name))
            .ok_or_else(|| {
                IngestError::MissingColumn {
                    column: name.to_string(),
                    path: path.to_path_buf(),
                }
                .into()
            })
    };
    let patient_idx = find(columns.patient)?;
    let code_idx = find(columns.code)?;
    let event_date_idx = find(columns.event_date)?;
    let entry_date_idx = find(columns.entry_date)?;

    for record in reader.records() {
        let record = record.map_err(|e| IngestError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        let code = record.get(code_idx).unwrap_or("").trim();
        if !codes.contains(code) {
            continue;
        }
        let raw_patient = record.get(patient_idx).unwrap_or("").trim();
        if raw_patient.is_empty() {
            continue;
        }
        events.push(RawEvent {
            patient_id: PatientId::new(raw_patient, database),
            code_id: code.to_string(),
            event_date: record.get(event_date_idx).unwrap_or("").trim().to_string(),
            entry_date: record.get(entry_date_idx).unwrap_or("").trim().to_string(),
            database,
            kind,
        });
    }
    Ok(())
}
