//! Label analysis: OCR, form generation, normalization.
//!
//! The OCR service and the language model sit behind [`TextExtractor`] and
//! [`FormGenerator`]. This module only sequences them and turns the model's
//! loose output into an [`Inspection`].

use async_trait::async_trait;
use fertiscan_core::{Inspection, NormalizeOptions, normalize};
use serde_json::Value as Json;
use tracing::{debug, info};

use crate::document::Document;
use crate::error::{BoxError, PipelineError};

/// Instructions sent with every form-generation request.
pub const INSPECTION_REQUIREMENTS: &str = r#"Keys:
"organizations" (array of objects with "name", "address", "website", "phone_number")
"fertiliser_name"
"registration_number" (array of objects with "identifier", seven digits then one letter, and "type", either "fertilizer_product" or "ingredient_component")
"lot_number"
"weight" (array of objects with "value" and "unit")
"density" (object with "value" and "unit")
"volume" (object with "value" and "unit")
"npk" (format: number-number-number)
"guaranteed_analysis_en" (object with "title" and "nutrients", an array of objects with "nutrient", "value" and "unit")
"guaranteed_analysis_fr" (same shape as guaranteed_analysis_en)
"cautions_en" (array of strings)
"cautions_fr" (array of strings)
"instructions_en" (array of strings)
"instructions_fr" (array of strings)
"ingredients_en" (array of objects with "nutrient", "value" and "unit")
"ingredients_fr" (array of objects with "nutrient", "value" and "unit")

Requirements:
Content of keys ending in _en must be in English.
Content of keys ending in _fr must be in French.
Do not translate the label text.
Use null for information that is not on the label.
Respond with the JSON object only, using exclusively the keys listed above.
"#;

/// OCR collaborator.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_text(&self, document: &Document) -> Result<String, BoxError>;
}

/// Language-model collaborator: turns label text into a raw inspection form.
#[async_trait]
pub trait FormGenerator: Send + Sync {
    async fn generate_form(&self, text: &str, requirements: &str) -> Result<Json, BoxError>;
}

/// Result of analyzing one label.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    /// Text returned by the OCR collaborator.
    pub text: String,
    pub inspection: Inspection,
}

/// Run a document through OCR and form generation, then normalize the form.
pub async fn analyze(
    document: &Document,
    ocr: &dyn TextExtractor,
    generator: &dyn FormGenerator,
    options: &NormalizeOptions,
) -> Result<Analysis, PipelineError> {
    if document.is_empty() {
        return Err(PipelineError::EmptyDocument);
    }

    info!(
        bytes = document.len(),
        format = document.format.as_str(),
        "extracting label text"
    );
    let text = ocr
        .extract_text(document)
        .await
        .map_err(PipelineError::Extraction)?;
    if text.trim().is_empty() {
        return Err(PipelineError::EmptyText);
    }

    info!(chars = text.chars().count(), "generating inspection form");
    let raw = generator
        .generate_form(&text, INSPECTION_REQUIREMENTS)
        .await
        .map_err(PipelineError::Generation)?;

    let inspection = normalize(&raw, options)?;
    debug!(
        organizations = inspection.organizations.len(),
        "normalized generated form"
    );
    Ok(Analysis { text, inspection })
}

/// Parse a model reply into JSON, tolerating a surrounding Markdown code fence.
pub fn parse_form(reply: &str) -> Result<Json, PipelineError> {
    let body = strip_code_fence(reply.trim());
    Ok(serde_json::from_str(body)?)
}

fn strip_code_fence(reply: &str) -> &str {
    let Some(rest) = reply.strip_prefix("```") else {
        return reply;
    };
    // Drop the info string (`json`) on the opening line.
    let rest = rest.split_once('\n').map_or("", |(_, body)| body);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}
