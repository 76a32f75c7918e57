use std::path::PathBuf;
use thiserror::Error;

/// Errors raised during code-list curation.
#[derive(Debug, Error)]
pub enum CodelistError {
    /// A classification rule is not a valid regular expression. Fatal: no
    /// partial code list is written.
    #[error("failed to compile pattern '{pattern}': {source}")]
    PatternCompile {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Failed to read a rules file.
    #[error("failed to read rules file {path}: {source}")]
    RulesRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A rules file is not valid TOML.
    #[error("failed to parse rules file {path}: {source}")]
    RulesParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Failed to write a code-list output file.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error(transparent)]
    Ingest(#[from] cprd_ingest::IngestError),
}

pub type Result<T> = std::result::Result<T, CodelistError>;
