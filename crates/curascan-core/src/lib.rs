pub mod classify;
pub mod error;
pub mod extraction;
pub mod model;
pub mod parsing;
pub mod ranges;
pub mod recommend;

use classify::outcome::AnalysisResult;
use error::CurascanError;
use extraction::TextExtractor;
use model::{ExtractedValue, ParsedReport, Sex};
use ranges::ReferenceTable;
use tracing::info;

/// Main API entry point: parse report text and classify its values.
///
/// `sex` wins over the sex printed in the report header; with neither, male
/// bounds are used.
pub fn analyze_text(text: &str, table: &ReferenceTable, sex: Option<Sex>) -> AnalysisResult {
    let report = parsing::parse_report(Some(text));
    analyze_parsed(report, table, sex)
}

/// Extract text from a document and classify it.
pub fn analyze_report(
    bytes: &[u8],
    extractor: &dyn TextExtractor,
    table: &ReferenceTable,
    sex: Option<Sex>,
) -> Result<AnalysisResult, CurascanError> {
    let text = extractor.extract_text(bytes)?;
    info!(
        backend = extractor.backend_name(),
        chars = text.len(),
        "extracted report text"
    );
    Ok(analyze_text(&text, table, sex))
}

/// Extract text from a document and parse it without classifying.
pub fn parse_document(
    bytes: &[u8],
    extractor: &dyn TextExtractor,
) -> Result<ParsedReport, CurascanError> {
    let text = extractor.extract_text(bytes)?;
    Ok(parsing::parse_report(Some(&text)))
}

/// Classify records parsed or predicted earlier.
pub fn analyze_values(
    values: &[ExtractedValue],
    table: &ReferenceTable,
    sex: Option<Sex>,
) -> AnalysisResult {
    summarize_analysis(values, table, sex.unwrap_or(Sex::M), None)
}

fn analyze_parsed(report: ParsedReport, table: &ReferenceTable, sex: Option<Sex>) -> AnalysisResult {
    let sex = sex.or(report.header.sex).unwrap_or(Sex::M);
    summarize_analysis(&report.values, table, sex, Some(report.header))
}

fn summarize_analysis(
    values: &[ExtractedValue],
    table: &ReferenceTable,
    sex: Sex,
    header: Option<model::ReportHeader>,
) -> AnalysisResult {
    let sex = sex.patient();
    let results = classify::classify(values, table, sex);
    let (flagged, summary) = classify::summarize(&results);
    info!(
        tests = results.len(),
        flagged = flagged.len(),
        %sex,
        "classified report"
    );

    AnalysisResult {
        sex,
        header,
        results,
        flagged,
        summary,
    }
}
