//! Core types for the CPRD code-list curation and cohort-extraction
//! pipeline: source-database handling, vocabularies, code lists and
//! patient events.

pub mod codelist;
pub mod database;
pub mod error;
pub mod event;
pub mod vocabulary;

pub use codelist::{CodeList, CodeListEntry};
pub use database::{
    PatientId, RecordKind, SourceColumns, SourceDatabase, source_columns,
};
pub use error::{ModelError, Result};
pub use event::PatientEvent;
pub use vocabulary::{
    MedicationRef, ProductEntry, ProductVocabulary, VocabEntry, Vocabulary,
};
