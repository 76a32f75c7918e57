//! Tab-delimited code-list output and re-loading.
//!
//! Code lists are written only after classification has fully succeeded,
//! so a fatal rule or schema error never leaves a partial list behind.

use std::path::Path;

use csv::WriterBuilder;

use cprd_model::{CodeList, ProductEntry};

use crate::error::{CodelistError, Result};

fn tab_writer(path: &Path) -> Result<csv::Writer<std::fs::File>> {
    WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(path)
        .map_err(|e| CodelistError::Write {
            path: path.to_path_buf(),
            source: e,
        })
}

/// Write a code list: one row per code with the classification columns
/// appended.
pub fn write_code_list(path: &Path, list: &CodeList) -> Result<()> {
    let mut writer = tab_writer(path)?;
    let wrap = |e: csv::Error| CodelistError::Write {
        path: path.to_path_buf(),
        source: e,
    };
    writer
        .write_record(["code", "description", "category", "primary_only"])
        .map_err(wrap)?;
    for entry in list.entries() {
        writer
            .write_record([
                entry.code_id.as_str(),
                entry.description.as_str(),
                entry.category.as_deref().unwrap_or(""),
                if entry.primary_only { "1" } else { "0" },
            ])
            .map_err(wrap)?;
    }
    writer.flush().map_err(|e| CodelistError::Write {
        path: path.to_path_buf(),
        source: csv::Error::from(e),
    })?;
    Ok(())
}

/// Write the products rejected by the medication precision filter, for
/// review. This is an audit artifact, not an error channel.
pub fn write_excluded_products(path: &Path, excluded: &[ProductEntry]) -> Result<()> {
    let mut writer = tab_writer(path)?;
    let wrap = |e: csv::Error| CodelistError::Write {
        path: path.to_path_buf(),
        source: e,
    };
    writer
        .write_record(["code", "product_name", "term", "ingredient"])
        .map_err(wrap)?;
    for product in excluded {
        writer
            .write_record([
                product.code_id.as_str(),
                product.product_name.as_str(),
                product.term.as_deref().unwrap_or(""),
                product.ingredient.as_deref().unwrap_or(""),
            ])
            .map_err(wrap)?;
    }
    writer.flush().map_err(|e| CodelistError::Write {
        path: path.to_path_buf(),
        source: csv::Error::from(e),
    })?;
    Ok(())
}

/// Load the code ids of a previously written code list, for differencing.
pub fn read_code_list_ids(path: &Path) -> Result<Vec<String>> {
    let table = cprd_ingest::read_table_auto(path)?;
    let code_idx = table.require_column("code", path)?;
    Ok(table
        .rows
        .iter()
        .map(|row| table.value(row, code_idx).to_string())
        .filter(|code| !code.is_empty())
        .collect())
}
