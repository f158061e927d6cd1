//! Collaborator seam: OCR and language-model traits plus the analysis pipeline.

pub mod document;
pub mod error;
pub mod pipeline;

pub use document::{Document, DocumentFormat};
pub use error::{BoxError, PipelineError};
pub use pipeline::{
    Analysis, FormGenerator, INSPECTION_REQUIREMENTS, TextExtractor, analyze, parse_form,
};
