use crate::model::{ReportHeader, Sex};

/// Extract patient and report metadata from text lines.
pub fn parse_header(lines: &[&str]) -> ReportHeader {
    let mut header = ReportHeader::default();

    for line in lines {
        let line = line.trim();

        if header.report_id.is_none() {
            header.report_id = extract_after_label(line, "report id")
                .or_else(|| extract_after_label(line, "report no"))
                .or_else(|| extract_after_label(line, "sample id"));
        }

        if header.patient_name.is_none() {
            header.patient_name = extract_after_label(line, "patient name")
                .or_else(|| extract_after_label(line, "patient"));
        }

        if header.physician.is_none() {
            header.physician = extract_after_label(line, "physician")
                .or_else(|| extract_after_label(line, "referred by"));
        }

        if header.report_date.is_none() {
            header.report_date = extract_after_label(line, "report date")
                .or_else(|| extract_after_label(line, "collection date"));
        }

        if header.sex.is_none() {
            header.sex = extract_after_label(line, "sex")
                .or_else(|| extract_after_label(line, "gender"))
                .and_then(|v| v.split_whitespace().next().and_then(Sex::from_str_loose));
        }

        if header.age.is_none() {
            header.age = extract_after_label(line, "age").and_then(|v| {
                let digits: String = v.chars().take_while(|c| c.is_ascii_digit()).collect();
                digits.parse().ok()
            });
        }
    }

    header
}

/// Extract a value appearing after a label (ASCII case-insensitive).
///
/// The label must start the line or follow a non-alphanumeric character, and
/// must be followed by a colon or whitespace. The value is truncated at the
/// next wide whitespace gap (3+ spaces) so that a second field on the same
/// layout line is not captured.
fn extract_after_label(line: &str, label: &str) -> Option<String> {
    let lower = line.to_ascii_lowercase();
    let mut search_from = 0;

    while let Some(rel) = lower[search_from..].find(label) {
        let idx = search_from + rel;
        let end = idx + label.len();
        search_from = end;

        let starts_word = lower[..idx]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let after = &line[end..];
        let delimited = after.starts_with(':') || after.starts_with(char::is_whitespace);
        if !starts_word || !delimited {
            continue;
        }

        let trimmed = after.trim_start_matches(|c: char| c == ':' || c.is_whitespace());
        let value = match trimmed.find("   ") {
            Some(gap_pos) => trimmed[..gap_pos].trim(),
            None => trimmed.trim(),
        };
        if !value.is_empty() {
            return Some(value.to_string());
        }
    }

    None
}
