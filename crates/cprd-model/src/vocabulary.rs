use serde::{Deserialize, Serialize};

use crate::database::SourceDatabase;

/// One entry of a diagnosis code dictionary.
///
/// `description` is lowercased at load time for pattern matching;
/// `original_description` preserves the dictionary casing for display and
/// code-list output. Entries are immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabEntry {
    /// Opaque stable code identifier (medcode / medcodeid).
    pub code_id: String,
    /// Lowercased free-text description used for matching.
    pub description: String,
    /// Description with original casing preserved.
    pub original_description: String,
    pub database: SourceDatabase,
}

impl VocabEntry {
    pub fn new(code_id: impl Into<String>, description: &str, database: SourceDatabase) -> Self {
        Self {
            code_id: code_id.into(),
            description: description.to_lowercase(),
            original_description: description.to_string(),
            database,
        }
    }
}

/// One entry of a product (medication) dictionary.
///
/// Formulation and route are frequently absent in the master dictionaries;
/// the medication matcher infers them from free text but never overwrites a
/// value that is already present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductEntry {
    /// Opaque stable code identifier (prodcode / prodcodeid).
    pub code_id: String,
    pub database: SourceDatabase,
    pub product_name: String,
    /// Free-text term (Aurum "term from EMIS"; absent in GOLD).
    pub term: Option<String>,
    /// Active drug substance(s).
    pub ingredient: Option<String>,
    pub formulation: Option<String>,
    pub route: Option<String>,
    pub strength: Option<String>,
    /// BNF chapter classification, where the dictionary provides one.
    pub bnf_chapter: Option<String>,
}

/// A loaded diagnosis dictionary for one source database.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    pub database: SourceDatabase,
    pub entries: Vec<VocabEntry>,
}

impl Vocabulary {
    pub fn new(database: SourceDatabase) -> Self {
        Self {
            database,
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VocabEntry> {
        self.entries.iter()
    }

    /// True if the dictionary still carries the given code.
    pub fn contains_code(&self, code_id: &str) -> bool {
        self.entries.iter().any(|e| e.code_id == code_id)
    }
}

/// A loaded product dictionary for one source database.
#[derive(Debug, Clone)]
pub struct ProductVocabulary {
    pub database: SourceDatabase,
    pub entries: Vec<ProductEntry>,
}

impl ProductVocabulary {
    pub fn new(database: SourceDatabase) -> Self {
        Self {
            database,
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ProductEntry> {
        self.entries.iter()
    }
}

/// One row of the medication reference table: a canonical active-ingredient
/// keyword plus its brand-name synonyms, optionally tagged with a drug class
/// (e.g. "Sulfonylurea").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicationRef {
    /// Lowercased canonical drug name searched as a whole word.
    pub keyword: String,
    /// Lowercased brand synonyms, split from a comma-separated source field.
    pub brands: Vec<String>,
    pub drug_class: Option<String>,
}

impl MedicationRef {
    pub fn new(keyword: &str, brands: &[&str], drug_class: Option<&str>) -> Self {
        Self {
            keyword: keyword.trim().to_lowercase(),
            brands: brands
                .iter()
                .map(|b| b.trim().to_lowercase())
                .filter(|b| !b.is_empty())
                .collect(),
            drug_class: drug_class.map(str::to_string),
        }
    }
}
