//! Generic delimited-table reading.
//!
//! CPRD master dictionaries and look-up tables arrive as tab- or
//! semicolon-delimited text. Everything here is schema-agnostic; column
//! interpretation lives with the callers.

use std::io::{BufRead, BufReader};
use std::path::Path;

use csv::ReaderBuilder;

use crate::error::{IngestError, Result};

/// A fully loaded delimited table with normalized headers and cells.
#[derive(Debug, Clone)]
pub struct DelimTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl DelimTable {
    /// Case-insensitive lookup of a column index by header name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
    }

    /// Like [`column_index`](Self::column_index), but fatal when absent.
    pub fn require_column(&self, name: &str, path: &Path) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| IngestError::MissingColumn {
                column: name.to_string(),
                path: path.to_path_buf(),
            })
    }

    /// Cell value at (row, column), empty string when the row is short.
    pub fn value<'a>(&'a self, row: &'a [String], idx: usize) -> &'a str {
        row.get(idx).map(String::as_str).unwrap_or("")
    }

    /// Cell value with empty-after-trim mapped to `None`.
    pub fn optional_value(&self, row: &[String], idx: usize) -> Option<String> {
        let value = self.value(row, idx).trim();
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    }
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

/// Guess the delimiter of a file from its header line.
///
/// CPRD extracts are tab-delimited; some dictionary releases ship
/// semicolon-delimited. A header containing tabs wins; otherwise a
/// semicolon promotes `;`.
pub fn detect_delimiter(path: &Path) -> Result<u8> {
    let file = std::fs::File::open(path).map_err(|e| IngestError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut first_line = String::new();
    BufReader::new(file)
        .read_line(&mut first_line)
        .map_err(|e| IngestError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
    if first_line.contains('\t') {
        Ok(b'\t')
    } else if first_line.contains(';') {
        Ok(b';')
    } else {
        Ok(b'\t')
    }
}

/// Read a delimited file into memory with normalized headers and cells.
///
/// Handles BOM characters and trims whitespace. `skip_rows` drops that many
/// data rows directly after the header (annotation rows in reference
/// tables).
pub fn read_table(path: &Path, delimiter: u8, skip_rows: usize) -> Result<DelimTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)
        .map_err(|e| IngestError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| IngestError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?
        .iter()
        .map(normalize_cell)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records().skip(skip_rows) {
        let record = record.map_err(|e| IngestError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        let row: Vec<String> = record.iter().map(normalize_cell).collect();
        if row.iter().all(|v| v.is_empty()) {
            continue;
        }
        rows.push(row);
    }

    Ok(DelimTable { headers, rows })
}

/// Convenience wrapper: sniff the delimiter, then read.
pub fn read_table_auto(path: &Path) -> Result<DelimTable> {
    let delimiter = detect_delimiter(path)?;
    read_table(path, delimiter, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn reads_tab_delimited_with_bom() {
        let file = write_temp("\u{feff}medcode\tdesc\n1\tschizophrenia\n");
        let table = read_table_auto(file.path()).unwrap();
        assert_eq!(table.headers, vec!["medcode", "desc"]);
        assert_eq!(table.rows, vec![vec!["1".to_string(), "schizophrenia".to_string()]]);
    }

    #[test]
    fn detects_semicolon_delimiter() {
        let file = write_temp("medcodeid;term\n10;bipolar disorder\n");
        assert_eq!(detect_delimiter(file.path()).unwrap(), b';');
        let table = read_table_auto(file.path()).unwrap();
        assert_eq!(table.headers, vec!["medcodeid", "term"]);
    }

    #[test]
    fn require_column_is_case_insensitive_and_fatal() {
        let file = write_temp("MedCode\tDesc\n1\tx\n");
        let table = read_table_auto(file.path()).unwrap();
        assert_eq!(table.require_column("medcode", file.path()).unwrap(), 0);
        let err = table.require_column("prodcode", file.path()).unwrap_err();
        assert!(matches!(err, IngestError::MissingColumn { .. }));
    }

    #[test]
    fn skip_rows_drops_annotation_rows() {
        let file = write_temp("drug\tbrands\nsee protocol appendix\t\nmetformin\tGlucophage\n");
        let table = read_table(file.path(), b'\t', 1).unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0][0], "metformin");
    }

    #[test]
    fn short_rows_read_as_empty_cells() {
        let file = write_temp("a\tb\tc\n1\t2\n");
        let table = read_table_auto(file.path()).unwrap();
        let row = &table.rows[0];
        assert_eq!(table.value(row, 2), "");
        assert_eq!(table.optional_value(row, 2), None);
    }
}
