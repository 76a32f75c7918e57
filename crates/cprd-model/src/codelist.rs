use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::database::{RecordKind, SourceDatabase};

/// One code retained in a curated code list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeListEntry {
    pub code_id: String,
    /// Original-case description (or product name) for review output.
    pub description: String,
    /// Diagnosis lists only: the code counts solely as a primary diagnosis.
    pub primary_only: bool,
    /// Disease subtype or "/"-joined drug families, where classified.
    pub category: Option<String>,
}

/// A curated, ordered code list for one (database, kind) pair.
///
/// `code_id` is unique within the list; insertion order is preserved for
/// stable review output. Lists are partitioned per source database, so no
/// cross-database code overlap is assumed or checked.
#[derive(Debug, Clone)]
pub struct CodeList {
    pub database: SourceDatabase,
    pub kind: RecordKind,
    entries: Vec<CodeListEntry>,
    seen: HashSet<String>,
}

impl CodeList {
    pub fn new(database: SourceDatabase, kind: RecordKind) -> Self {
        Self {
            database,
            kind,
            entries: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Append an entry, returning false (and dropping it) if the code is
    /// already present.
    pub fn push(&mut self, entry: CodeListEntry) -> bool {
        if !self.seen.insert(entry.code_id.clone()) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    /// Remove a code from the list, returning whether it was present.
    pub fn remove(&mut self, code_id: &str) -> bool {
        if !self.seen.remove(code_id) {
            return false;
        }
        self.entries.retain(|e| e.code_id != code_id);
        true
    }

    pub fn contains(&self, code_id: &str) -> bool {
        self.seen.contains(code_id)
    }

    pub fn entries(&self) -> &[CodeListEntry] {
        &self.entries
    }

    pub fn code_ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.code_id.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
