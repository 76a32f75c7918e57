//! Master-dictionary loading.
//!
//! Each CPRD database ships its own diagnosis and product dictionaries with
//! different column names. The schemas below name the columns we read; a
//! missing schema column is fatal (wrong file, or the wrong database tag),
//! while empty cell values in nullable columns simply load as `None`.

use std::path::Path;

use tracing::info;

use cprd_model::{ProductEntry, ProductVocabulary, SourceDatabase, VocabEntry, Vocabulary};

use crate::error::Result;
use crate::table::{DelimTable, read_table_auto};

/// Column names of a diagnosis dictionary.
#[derive(Debug, Clone, Copy)]
pub struct DiagnosisSchema {
    pub code: &'static str,
    pub description: &'static str,
}

/// Column names of a product dictionary. `term` is Aurum-only.
#[derive(Debug, Clone, Copy)]
pub struct ProductSchema {
    pub code: &'static str,
    pub product_name: &'static str,
    pub term: Option<&'static str>,
    pub ingredient: &'static str,
    pub formulation: &'static str,
    pub route: &'static str,
    pub strength: &'static str,
    pub bnf_chapter: &'static str,
}

pub fn diagnosis_schema(database: SourceDatabase) -> DiagnosisSchema {
    match database {
        SourceDatabase::Gold => DiagnosisSchema {
            code: "medcode",
            description: "desc",
        },
        SourceDatabase::Aurum => DiagnosisSchema {
            code: "medcodeid",
            description: "term",
        },
    }
}

pub fn product_schema(database: SourceDatabase) -> ProductSchema {
    match database {
        SourceDatabase::Gold => ProductSchema {
            code: "prodcode",
            product_name: "productname",
            term: None,
            ingredient: "drugsubstance",
            formulation: "formulation",
            route: "route",
            strength: "strength",
            bnf_chapter: "bnfchapter",
        },
        SourceDatabase::Aurum => ProductSchema {
            code: "prodcodeid",
            product_name: "productname",
            term: Some("termfromemis"),
            ingredient: "drugsubstancename",
            formulation: "formulation",
            route: "routeofadministration",
            strength: "substancestrength",
            bnf_chapter: "bnfchapter",
        },
    }
}

/// Load a diagnosis dictionary into a normalized vocabulary.
///
/// Descriptions are lowercased for pattern matching; the original casing is
/// retained on each entry for review output.
pub fn load_diagnosis_dictionary(path: &Path, database: SourceDatabase) -> Result<Vocabulary> {
    let schema = diagnosis_schema(database);
    let table = read_table_auto(path)?;
    let code_idx = table.require_column(schema.code, path)?;
    let desc_idx = table.require_column(schema.description, path)?;

    let mut vocab = Vocabulary::new(database);
    for row in &table.rows {
        let code = table.value(row, code_idx).trim();
        if code.is_empty() {
            continue;
        }
        let description = table.value(row, desc_idx);
        vocab
            .entries
            .push(VocabEntry::new(code, description, database));
    }
    info!(
        database = %database,
        entries = vocab.len(),
        path = %path.display(),
        "loaded diagnosis dictionary"
    );
    Ok(vocab)
}

/// Load a product dictionary into a normalized product vocabulary.
pub fn load_product_dictionary(path: &Path, database: SourceDatabase) -> Result<ProductVocabulary> {
    let schema = product_schema(database);
    let table = read_table_auto(path)?;
    let code_idx = table.require_column(schema.code, path)?;
    let name_idx = table.require_column(schema.product_name, path)?;
    let term_idx = match schema.term {
        Some(term) => Some(table.require_column(term, path)?),
        None => None,
    };
    let ingredient_idx = table.require_column(schema.ingredient, path)?;
    let formulation_idx = table.require_column(schema.formulation, path)?;
    let route_idx = table.require_column(schema.route, path)?;
    let strength_idx = table.require_column(schema.strength, path)?;
    let bnf_idx = table.require_column(schema.bnf_chapter, path)?;

    let mut vocab = ProductVocabulary::new(database);
    for row in &table.rows {
        let code = table.value(row, code_idx).trim();
        if code.is_empty() {
            continue;
        }
        vocab.entries.push(ProductEntry {
            code_id: code.to_string(),
            database,
            product_name: table.value(row, name_idx).to_string(),
            term: term_idx.and_then(|idx| read_optional(&table, row, idx)),
            ingredient: read_optional(&table, row, ingredient_idx),
            formulation: read_optional(&table, row, formulation_idx),
            route: read_optional(&table, row, route_idx),
            strength: read_optional(&table, row, strength_idx),
            bnf_chapter: read_optional(&table, row, bnf_idx),
        });
    }
    info!(
        database = %database,
        entries = vocab.len(),
        path = %path.display(),
        "loaded product dictionary"
    );
    Ok(vocab)
}

fn read_optional(table: &DelimTable, row: &[String], idx: usize) -> Option<String> {
    table.optional_value(row, idx)
}
