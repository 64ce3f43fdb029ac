use super::ExtractionError;

/// Extract plain text from PDF bytes.
///
/// `pdf-extract` returns the whole document as one string with form feeds
/// between pages; those become newlines so page breaks read as paragraph
/// breaks. Scanned PDFs without a text layer come back empty, which the
/// ingest pipeline reports as a document with no extractable content.
pub fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractionError> {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| ExtractionError::PdfError(e.to_string()))?;

    Ok(text.replace('\x0C', "\n").trim().to_string())
}
