use crate::error::PipelineError;

const PDF_MAGIC: &[u8] = b"%PDF-";
const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Png,
}

impl DocumentFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Png => "png",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Png => "image/png",
        }
    }

    /// Recognise a format from its leading bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(PDF_MAGIC) {
            Some(Self::Pdf)
        } else if bytes.starts_with(PNG_MAGIC) {
            Some(Self::Png)
        } else {
            None
        }
    }
}

/// One label, already composed into a single document by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub bytes: Vec<u8>,
    pub format: DocumentFormat,
}

impl Document {
    pub fn new(bytes: Vec<u8>, format: DocumentFormat) -> Self {
        Self { bytes, format }
    }

    /// Build a document, detecting the format from the content.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, PipelineError> {
        if bytes.is_empty() {
            return Err(PipelineError::EmptyDocument);
        }
        let format = DocumentFormat::sniff(&bytes).ok_or(PipelineError::UnknownFormat)?;
        Ok(Self { bytes, format })
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffs_formats() {
        let pdf = Document::from_bytes(b"%PDF-1.7\n...".to_vec()).unwrap();
        assert_eq!(pdf.format, DocumentFormat::Pdf);
        assert_eq!(pdf.format.mime_type(), "application/pdf");

        let mut png = PNG_MAGIC.to_vec();
        png.extend_from_slice(b"IHDR");
        assert_eq!(Document::from_bytes(png).unwrap().format, DocumentFormat::Png);
    }

    #[test]
    fn rejects_empty_and_unknown() {
        assert!(matches!(
            Document::from_bytes(Vec::new()),
            Err(PipelineError::EmptyDocument)
        ));
        assert!(matches!(
            Document::from_bytes(b"GIF89a".to_vec()),
            Err(PipelineError::UnknownFormat)
        ));
    }
}
