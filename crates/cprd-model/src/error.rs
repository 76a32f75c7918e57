use thiserror::Error;

/// Errors raised by the core model types.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A source-database tag was neither GOLD nor Aurum.
    #[error("unknown source database: {tag} (expected \"gold\" or \"aurum\")")]
    UnknownDatabase { tag: String },

    /// A record-kind tag was neither diagnosis nor medication.
    #[error("unknown record kind: {tag} (expected \"diagnosis\" or \"medication\")")]
    UnknownRecordKind { tag: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;
