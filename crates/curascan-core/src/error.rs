use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CurascanError {
    #[error("text extraction failed: {0}")]
    Extraction(String),

    #[error("pdftotext not found. Install poppler: brew install poppler (macOS) or apt install poppler-utils (Linux)")]
    PdftotextNotFound,

    #[error("pdftotext failed with exit code {code}: {stderr}")]
    PdftotextFailed { code: i32, stderr: String },

    #[error("unsupported report input: {0}")]
    UnsupportedInput(String),

    #[error("failed to load reference table from {path}: {reason}")]
    TableLoad { path: PathBuf, reason: String },

    #[error("invalid reference table: {0}")]
    TableInvalid(String),

    #[error("{path}: {source}")]
    TableFile {
        path: PathBuf,
        source: Box<CurascanError>,
    },

    #[error("unknown preset '{name}'. Available: {available}")]
    UnknownPreset { name: String, available: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
