pub mod classify;
pub mod parse;
pub mod ranges;

use curascan_core::error::CurascanError;
use curascan_core::extraction::pdftotext::PdftotextExtractor;
use curascan_core::extraction::{text_from_extracted_json, TextExtractor};
use curascan_core::model::ExtractedValue;
use curascan_core::parsing::values_from_json;
use std::path::Path;

/// What an input file turned out to hold.
pub enum ReportInput {
    /// Report text, from a PDF, an extraction result or a plain text file.
    Text(String),
    /// Records parsed earlier, ready to classify.
    Values(Vec<ExtractedValue>),
}

/// Read an input file, dispatching on its extension.
pub fn load_input(path: &Path) -> Result<ReportInput, CurascanError> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "pdf" => {
            let bytes = std::fs::read(path)?;
            let extractor = PdftotextExtractor::new();
            Ok(ReportInput::Text(extractor.extract_text(&bytes)?))
        }
        "json" => {
            let json = std::fs::read_to_string(path)?;
            match text_from_extracted_json(&json) {
                Ok(text) => Ok(ReportInput::Text(text)),
                Err(CurascanError::UnsupportedInput(_)) => {
                    Ok(ReportInput::Values(values_from_json(&json)?))
                }
                Err(e) => Err(e),
            }
        }
        _ => Ok(ReportInput::Text(std::fs::read_to_string(path)?)),
    }
}
