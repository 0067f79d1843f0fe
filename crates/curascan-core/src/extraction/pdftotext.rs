use crate::error::CurascanError;
use crate::extraction::{TextExtractor, MIN_TEXT_CHARS};
use std::io::Write;
use std::process::Command;
use tracing::{debug, warn};

/// PDF extraction backend using pdftotext (from poppler-utils).
///
/// Uses `pdftotext -layout` so that each result row stays on one line.
pub struct PdftotextExtractor;

impl PdftotextExtractor {
    pub fn new() -> Self {
        PdftotextExtractor
    }
}

impl Default for PdftotextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for PdftotextExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, CurascanError> {
        let mut tmpfile =
            tempfile::NamedTempFile::new().map_err(|e| CurascanError::Extraction(e.to_string()))?;
        tmpfile
            .write_all(bytes)
            .map_err(|e| CurascanError::Extraction(e.to_string()))?;

        let output = Command::new("pdftotext")
            .arg("-layout")
            .arg(tmpfile.path())
            .arg("-") // output to stdout
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    CurascanError::PdftotextNotFound
                } else {
                    CurascanError::Extraction(format!("pdftotext failed: {}", e))
                }
            })?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            return Err(CurascanError::PdftotextFailed { code, stderr });
        }

        let text = join_pages(&String::from_utf8_lossy(&output.stdout));
        debug!(chars = text.len(), "pdftotext extracted text");
        check_text_length(&text);
        Ok(text)
    }

    fn backend_name(&self) -> &str {
        "pdftotext"
    }
}

/// pdftotext separates pages with form feeds.
fn join_pages(raw: &str) -> String {
    raw.split('\x0c')
        .map(|page| page.trim_end_matches('\n'))
        .filter(|page| !page.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn check_text_length(text: &str) -> bool {
    let chars = text.trim().chars().count();
    if chars < MIN_TEXT_CHARS {
        warn!(
            chars,
            "very little text extracted; the PDF may be a scanned image"
        );
        return false;
    }
    true
}
