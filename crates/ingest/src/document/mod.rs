//! Text extraction for uploaded documents.
//!
//! Every supported format reduces to one plain-text string; paragraph and
//! page boundaries survive as newlines so the chunker can treat them as
//! ordinary whitespace.

mod docx;
mod pdf;
mod txt;

use papier_core::FileType;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),
    #[error("PDF extraction failed: {0}")]
    PdfError(String),
    #[error("DOCX extraction failed: {0}")]
    DocxError(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of extracting text from an uploaded file.
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    /// Original filename.
    pub filename: String,
    pub file_type: FileType,
    /// Full plain text of the document.
    pub text: String,
}

impl ExtractedDocument {
    /// Character count of the extracted text.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// True when extraction produced no usable text (blank or scanned files).
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Extract plain text from file bytes based on the filename extension.
pub fn extract_text(bytes: &[u8], filename: &str) -> Result<ExtractedDocument, ExtractionError> {
    let file_type = FileType::from_filename(filename).ok_or_else(|| {
        let ext = filename.rsplit('.').next().unwrap_or("").to_lowercase();
        ExtractionError::UnsupportedType(ext)
    })?;

    let text = match file_type {
        FileType::Pdf => pdf::extract_pdf(bytes)?,
        FileType::Docx => docx::extract_docx(bytes)?,
        FileType::Txt | FileType::Md => txt::extract_txt(bytes),
    };

    tracing::debug!(
        filename,
        file_type = %file_type,
        chars = text.chars().count(),
        "extracted document text"
    );

    Ok(ExtractedDocument {
        filename: filename.to_string(),
        file_type,
        text,
    })
}
