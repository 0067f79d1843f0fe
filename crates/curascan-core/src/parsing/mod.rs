pub mod header;
pub mod registry;
pub mod values;

use crate::error::CurascanError;
use crate::model::{ExtractedValue, ParsedReport};
use serde::Deserialize;
use header::parse_header;
use registry::REGISTRY;
use std::collections::HashSet;
use tracing::debug;
use values::{inline_range, number_tokens};

/// Parse raw report text into header metadata and extracted test values.
pub fn parse_report(text: Option<&str>) -> ParsedReport {
    let normalized = text.map(normalize_text).unwrap_or_default();
    let lines = split_lines(&normalized);

    ParsedReport {
        header: parse_header(&lines),
        values: scan_lines(&lines),
    }
}

/// Parse raw report text into one record per recognised test.
///
/// Empty or absent text yields an empty list. Records keep the order in
/// which each test was first seen.
pub fn parse_values(text: Option<&str>) -> Vec<ExtractedValue> {
    let normalized = text.map(normalize_text).unwrap_or_default();
    scan_lines(&split_lines(&normalized))
}

/// CRLF to LF, non-breaking spaces to plain spaces.
pub fn normalize_text(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\u{a0}', " ")
}

/// Non-empty trimmed lines.
fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect()
}

fn scan_lines(lines: &[&str]) -> Vec<ExtractedValue> {
    let mut found = Vec::new();

    for line in lines {
        for test in REGISTRY.iter() {
            // First matching surface form per entry per line; then the next entry.
            if let Some(pattern_idx) = test.first_match(line) {
                let record = extract_record(test.key, line);
                debug!(
                    test = test.key,
                    pattern = pattern_idx,
                    value = ?record.value,
                    "matched test line"
                );
                found.push(record);
            }
        }
    }

    dedup_by_test(found)
}

/// Build a record for a matched line.
///
/// The value is the first number on the line, wherever it sits relative to
/// the test name. A layout that prints the reference range before the result
/// will therefore report the lower bound as the value.
fn extract_record(key: &str, line: &str) -> ExtractedValue {
    let tokens = number_tokens(line);
    let range = inline_range(line, &tokens);

    ExtractedValue {
        test: key.to_string(),
        line: line.to_string(),
        value: tokens.first().map(|t| t.value),
        ref_lower: range.map(|(lower, _)| lower),
        ref_upper: range.map(|(_, upper)| upper),
    }
}

/// Keep the first record per canonical key.
fn dedup_by_test(records: Vec<ExtractedValue>) -> Vec<ExtractedValue> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|r| seen.insert(r.test.clone()))
        .collect()
}

/// Decode previously extracted or predicted items.
///
/// Accepts a bare list, or an object holding the list under `mlPredictions`,
/// `extractedValues`, `items` or `tests`, optionally wrapped in
/// `{"report": {...}}`. Failing those, the first list field holding objects
/// is used (`{"ok": true, "predictions": [...]}`). Entries that are not
/// objects are skipped.
pub fn values_from_json(json: &str) -> Result<Vec<ExtractedValue>, CurascanError> {
    let doc: serde_json::Value = serde_json::from_str(json)?;
    let list = find_item_list(&doc).ok_or_else(|| {
        CurascanError::UnsupportedInput(
            "expected a list of items or an object with items/tests/extractedValues/mlPredictions"
                .into(),
        )
    })?;

    let mut values = Vec::with_capacity(list.len());
    for item in list {
        if !item.is_object() {
            debug!(item = %item, "skipping non-object item");
            continue;
        }
        values.push(ExtractedValue::deserialize(item)?);
    }
    Ok(values)
}

fn find_item_list(doc: &serde_json::Value) -> Option<&Vec<serde_json::Value>> {
    const LIST_KEYS: &[&str] = &["mlPredictions", "extractedValues", "items", "tests"];

    if let Some(list) = doc.as_array() {
        return Some(list);
    }
    let obj = doc.as_object()?;
    if let Some(list) = LIST_KEYS.iter().find_map(|k| obj.get(*k)?.as_array()) {
        return Some(list);
    }
    if let Some(list) = obj.get("report").and_then(find_item_list) {
        return Some(list);
    }
    obj.values()
        .filter_map(serde_json::Value::as_array)
        .find(|list| list.iter().any(serde_json::Value::is_object))
}
