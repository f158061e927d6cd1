use fertiscan_core::NormalizeError;
use thiserror::Error;

/// Error type collaborators report through.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("document is empty")]
    EmptyDocument,
    #[error("unrecognised document format")]
    UnknownFormat,
    #[error("text extraction failed: {0}")]
    Extraction(#[source] BoxError),
    #[error("text extraction returned no text")]
    EmptyText,
    #[error("form generation failed: {0}")]
    Generation(#[source] BoxError),
    #[error("generated form is not valid JSON: {0}")]
    InvalidForm(#[from] serde_json::Error),
    #[error("generated form could not be normalized: {0}")]
    Normalize(#[from] NormalizeError),
}
