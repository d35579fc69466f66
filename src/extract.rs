//! Plain-text extraction from uploaded resume files.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("PDF parsing error: {0}")]
    Parse(String),

    #[error("text extraction unsupported: {0}")]
    Unsupported(String),
}

/// Extracts the text of a PDF held in memory.
///
/// Pages are trimmed, blank pages dropped and the rest joined with a single
/// newline. A PDF without any text layer yields an empty string.
#[cfg(feature = "pdf")]
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let text =
        pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractError::Parse(e.to_string()))?;
    Ok(join_pages(&text))
}

#[cfg(not(feature = "pdf"))]
pub fn extract_pdf_text(_bytes: &[u8]) -> Result<String, ExtractError> {
    Err(ExtractError::Unsupported(
        "built without the `pdf` feature".into(),
    ))
}

// pdf-extract separates pages with form feeds.
fn join_pages(text: &str) -> String {
    text.split('\x0C')
        .map(str::trim)
        .filter(|page| !page.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
