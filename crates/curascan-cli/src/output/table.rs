use curascan_core::classify::outcome::{AnalysisResult, ClassifiedResult};
use curascan_core::model::{ExtractedValue, ParsedReport, ReportHeader};
use curascan_core::ranges::schema::ReferenceRange;
use curascan_core::recommend::Recommendation;
use std::fmt::Write;

pub fn print(result: &AnalysisResult, recommendation: Option<&Recommendation>, show_all: bool) {
    if let Some(ref header) = result.header {
        let header_text = format_header(header);
        if !header_text.is_empty() {
            println!("{header_text}");
        }
    }
    println!("  Sex used for ranges: {}\n", result.sex);
    println!("  {}\n", result.summary);

    let shown: Vec<&ClassifiedResult> = if show_all {
        result.results.iter().collect()
    } else {
        result.results.iter().filter(|r| r.is_flagged()).collect()
    };

    if !shown.is_empty() {
        if !show_all {
            println!("  Flagged tests:");
        }
        let max_name = shown
            .iter()
            .map(|r| r.record.test.len())
            .max()
            .unwrap_or(10);

        for r in &shown {
            let value = r
                .record
                .value
                .map(|v| v.to_string())
                .unwrap_or_else(|| "-".into());
            let unit = r.unit.as_deref().unwrap_or("");
            let bounds = match (r.applied_lower, r.applied_upper) {
                (Some(lo), Some(hi)) => format!("({lo}-{hi})"),
                _ => String::new(),
            };
            let status = match (r.prediction, r.unclassified) {
                (Some(p), _) => p.to_string().to_uppercase(),
                (None, Some(why)) => why.to_string(),
                (None, None) => "unknown".into(),
            };
            let override_marker = if r.rule_overridden { " *" } else { "" };
            println!(
                "    {:<width$}  {:>8} {:<8} {:<14} -> {}{}",
                r.record.test,
                value,
                unit,
                bounds,
                status,
                override_marker,
                width = max_name
            );
        }
        if shown.iter().any(|r| r.rule_overridden) {
            println!("\n    * fixed hemoglobin bounds applied");
        }
        println!();
    }

    let unknown = result
        .results
        .iter()
        .filter(|r| r.prediction.is_none())
        .count();
    if unknown > 0 && !show_all {
        println!("  {unknown} test(s) could not be classified (use --show-all)\n");
    }

    if let Some(rec) = recommendation {
        print_recommendation(rec);
    }
}

fn print_recommendation(rec: &Recommendation) {
    println!("  Overall risk: {}\n", rec.overall_risk);

    if !rec.suggestions.is_empty() {
        println!("  Suggestions:");
        for s in &rec.suggestions {
            println!("    - {s}");
        }
        println!();
    }

    if !rec.referrals.is_empty() {
        println!("  Referrals:");
        for r in &rec.referrals {
            println!("    {} -> {} ({})", r.test, r.specialist, r.urgency);
        }
        println!();
    }

    println!("  These suggestions are informational and not a diagnosis.");
}

pub fn format_header(header: &ReportHeader) -> String {
    let mut out = String::new();
    let fields = [
        ("Patient", header.patient_name.clone()),
        ("Sex", header.sex.map(|s| s.to_string())),
        ("Age", header.age.map(|a| a.to_string())),
        ("Report ID", header.report_id.clone()),
        ("Date", header.report_date.clone()),
        ("Physician", header.physician.clone()),
    ];
    for (label, value) in fields {
        if let Some(v) = value {
            let _ = writeln!(out, "  {:<10} {}", format!("{label}:"), v);
        }
    }
    out
}

pub fn format_parsed(parsed: &ParsedReport) -> String {
    let mut out = format_header(&parsed.header);
    if !out.is_empty() {
        out.push('\n');
    }

    if parsed.values.is_empty() {
        out.push_str("  No recognised tests found.");
        return out;
    }

    let max_name = parsed
        .values
        .iter()
        .map(|v| v.test.len())
        .max()
        .unwrap_or(10);

    let _ = writeln!(
        out,
        "  {:<width$}  {:>8}  {}",
        "Test",
        "Value",
        "Range",
        width = max_name
    );
    for v in &parsed.values {
        let _ = writeln!(out, "{}", format_value_row(v, max_name));
    }
    out.trim_end().to_string()
}

fn format_value_row(v: &ExtractedValue, width: usize) -> String {
    let value = v
        .value
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".into());
    let range = match v.inline_range() {
        Some((lo, hi)) => format!("{lo}-{hi}"),
        None => String::new(),
    };
    format!("  {:<width$}  {:>8}  {}", v.test, value, range, width = width)
}

pub fn format_ranges(ranges: &[ReferenceRange]) -> String {
    let max_name = ranges
        .iter()
        .map(|r| r.test_name.len())
        .max()
        .unwrap_or(20);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "  {:<width$}  {:<4} {:>8} {:>8}  {:<10} {}",
        "Test",
        "Sex",
        "Lower",
        "Upper",
        "Unit",
        "Flags",
        width = max_name
    );
    for r in ranges {
        let flags = format!(
            "{}/{}",
            if r.flag_low { "low" } else { "-" },
            if r.flag_high { "high" } else { "-" }
        );
        let _ = writeln!(
            out,
            "  {:<width$}  {:<4} {:>8} {:>8}  {:<10} {}",
            r.test_name,
            r.sex.to_string(),
            r.lower_ref.to_string(),
            r.upper_ref.to_string(),
            r.unit,
            flags,
            width = max_name
        );
    }
    out
}
