pub mod pdftotext;

use crate::error::CurascanError;

/// Below this many characters of trimmed text a document is probably image-only.
pub const MIN_TEXT_CHARS: usize = 120;

/// Trait for document-to-text backends.
pub trait TextExtractor: Send + Sync {
    /// Extract the full text of a document, pages separated by newlines.
    fn extract_text(&self, bytes: &[u8]) -> Result<String, CurascanError>;

    /// Name of this extraction backend (for diagnostics).
    fn backend_name(&self) -> &str;
}

/// Pull report text out of a saved extraction result.
///
/// Accepts `{"extracted_text": ...}`, `{"extractedText": ...}`,
/// `{"extracted": ...}` or a bare JSON string.
pub fn text_from_extracted_json(json: &str) -> Result<String, CurascanError> {
    const TEXT_KEYS: &[&str] = &["extracted_text", "extractedText", "extracted"];

    let doc: serde_json::Value = serde_json::from_str(json)?;
    if let Some(text) = doc.as_str() {
        return Ok(text.to_string());
    }
    doc.as_object()
        .and_then(|obj| TEXT_KEYS.iter().find_map(|k| obj.get(*k)?.as_str()))
        .map(str::to_string)
        .ok_or_else(|| {
            CurascanError::UnsupportedInput(
                "expected a JSON string or an object with extracted_text".into(),
            )
        })
}
