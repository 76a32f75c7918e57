use thiserror::Error;

/// Errors raised during cohort extraction.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Unrecognized source-database or record-kind tag. Fail fast before
    /// touching any file.
    #[error(transparent)]
    Model(#[from] cprd_model::ModelError),

    /// File or schema failure while streaming an extract.
    #[error(transparent)]
    Ingest(#[from] cprd_ingest::IngestError),
}

pub type Result<T> = std::result::Result<T, ExtractError>;
