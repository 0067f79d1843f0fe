//! Integration tests for the analyze_report() end-to-end pipeline.
//!
//! Uses a MockExtractor that returns fixed text without invoking pdftotext,
//! so these tests run without poppler-utils.

use curascan_core::classify::outcome::{BoundsSource, Prediction, Unclassified};
use curascan_core::error::CurascanError;
use curascan_core::extraction::TextExtractor;
use curascan_core::model::Sex;
use curascan_core::ranges::builtin::load_preset;
use curascan_core::ranges::{parse_reference_csv, ReferenceTable};
use curascan_core::recommend::{FallbackRecommender, OverallRisk, Recommender, Urgency};
use curascan_core::{analyze_report, analyze_text, parse_document};
use rust_decimal_macros::dec;

struct MockExtractor {
    text: String,
}

impl TextExtractor for MockExtractor {
    fn extract_text(&self, _bytes: &[u8]) -> Result<String, CurascanError> {
        Ok(self.text.clone())
    }

    fn backend_name(&self) -> &str {
        "mock"
    }
}

struct FailingExtractor;

impl TextExtractor for FailingExtractor {
    fn extract_text(&self, _bytes: &[u8]) -> Result<String, CurascanError> {
        Err(CurascanError::PdftotextNotFound)
    }

    fn backend_name(&self) -> &str {
        "failing"
    }
}

fn mock(lines: &[&str]) -> MockExtractor {
    MockExtractor {
        text: lines.join("\r\n"),
    }
}

fn who() -> ReferenceTable {
    ReferenceTable::from_defs([&load_preset("who").unwrap()])
}

// ---------------------------------------------------------------------------
// Hemoglobin override beats the printed range
// ---------------------------------------------------------------------------
#[test]
fn hemoglobin_override_ignores_inline_range() {
    let result = analyze_text("Hemoglobin (g/dL): 11.2  (13.0-17.0)", &who(), Some(Sex::M));

    assert_eq!(result.results.len(), 1);
    let hb = &result.results[0];
    assert_eq!(hb.record.test, "Hemoglobin");
    assert_eq!(hb.record.value, Some(dec!(11.2)));
    assert_eq!(hb.record.ref_lower, Some(dec!(13.0)));
    assert_eq!(hb.record.ref_upper, Some(dec!(17.0)));
    assert_eq!(hb.prediction, Some(Prediction::Low));
    assert!(hb.rule_overridden);
    assert_eq!(hb.applied_upper, Some(dec!(17.5)));
}

// ---------------------------------------------------------------------------
// An A1c row is not read as hemoglobin
// ---------------------------------------------------------------------------
#[test]
fn hemoglobin_a1c_row_does_not_shadow_hemoglobin() {
    let text = "Hemoglobin A1c 6.1 % 4.0-5.6\nHemoglobin 14.2 g/dL";
    let result = analyze_text(text, &who(), Some(Sex::M));

    assert_eq!(result.results.len(), 2);
    let a1c = &result.results[0];
    assert_eq!(a1c.record.test, "HbA1c");
    assert_eq!(a1c.prediction, Some(Prediction::High));
    assert!(!a1c.rule_overridden);

    let hb = &result.results[1];
    assert_eq!(hb.record.test, "Hemoglobin");
    assert_eq!(hb.record.value, Some(dec!(14.2)));
    assert_eq!(hb.prediction, Some(Prediction::Normal));
    assert!(hb.rule_overridden);
    assert_eq!(result.flagged, vec!["HbA1c".to_string()]);
}

// ---------------------------------------------------------------------------
// Inline range classifies a test without an override
// ---------------------------------------------------------------------------
#[test]
fn fasting_glucose_high_against_inline_range() {
    let result = analyze_text("Fasting Glucose 105 mg/dL (70-99)", &who(), Some(Sex::M));

    let glucose = &result.results[0];
    assert_eq!(glucose.record.test, "Fasting Glucose");
    assert_eq!(glucose.record.value, Some(dec!(105)));
    assert_eq!(glucose.record.ref_lower, Some(dec!(70)));
    assert_eq!(glucose.record.ref_upper, Some(dec!(99)));
    assert_eq!(glucose.prediction, Some(Prediction::High));
    assert!(!glucose.rule_overridden);
    assert_eq!(glucose.bounds_source, Some(BoundsSource::Inline));
    assert_eq!(result.summary, "WARNING: 1 abnormal value(s) detected.");
}

// ---------------------------------------------------------------------------
// Full report through a mock extractor, sex taken from the header
// ---------------------------------------------------------------------------
#[test]
fn full_report_uses_header_sex_and_table() {
    let extractor = mock(&[
        "CITY DIAGNOSTICS LAB",
        "Patient Name: Jane Roe        Age: 42 Years",
        "Sex: Female                   Report ID: R-1009",
        "Referred By: Dr. A. Smith",
        "",
        "Test                      Result     Unit",
        "Hemoglobin                12.4       g/dL",
        "HbA1c                     5.4        %",
        "Creatinine                1.2        mg/dL",
        "Total Cholesterol         180        mg/dL",
        "HDL Cholesterol           110        mg/dL",
        "Vitamin B12               ----       pg/mL",
    ]);

    let result = analyze_report(b"%PDF", &extractor, &who(), None).unwrap();

    assert_eq!(result.sex, Sex::F);
    let header = result.header.as_ref().unwrap();
    assert_eq!(header.patient_name.as_deref(), Some("Jane Roe"));
    assert_eq!(header.report_id.as_deref(), Some("R-1009"));
    assert_eq!(header.age, Some(42));

    let tests: Vec<_> = result.results.iter().map(|r| r.record.test.as_str()).collect();
    assert_eq!(
        tests,
        vec![
            "Hemoglobin",
            "HbA1c",
            "Creatinine",
            "Total Cholesterol",
            "HDL Cholesterol",
            "Vitamin B12"
        ]
    );

    let by_test = |name: &str| {
        result
            .results
            .iter()
            .find(|r| r.record.test == name)
            .unwrap()
    };

    // 12.4 is within the female override bounds.
    assert_eq!(by_test("Hemoglobin").prediction, Some(Prediction::Normal));
    assert!(by_test("Hemoglobin").rule_overridden);
    assert_eq!(by_test("HbA1c").record.value, Some(dec!(5.4)));
    assert_eq!(by_test("Creatinine").prediction, Some(Prediction::High));
    assert_eq!(by_test("Creatinine").bounds_source, Some(BoundsSource::Table));
    assert_eq!(by_test("Creatinine").unit.as_deref(), Some("mg/dL"));
    assert_eq!(by_test("Total Cholesterol").prediction, Some(Prediction::Normal));
    // High HDL is not flagged.
    assert_eq!(by_test("HDL Cholesterol").prediction, Some(Prediction::Normal));
    assert_eq!(by_test("Vitamin B12").prediction, None);
    assert_eq!(
        by_test("Vitamin B12").unclassified,
        Some(Unclassified::MissingValue)
    );

    assert_eq!(result.flagged, vec!["Creatinine"]);
}

// ---------------------------------------------------------------------------
// Tests missing from the reference table stay unclassified
// ---------------------------------------------------------------------------
#[test]
fn custom_csv_table_leaves_unlisted_tests_unclassified() {
    let csv = "test,range,unit,sex\nFasting Glucose,70 - 99,mg/dL,All\n";
    let table = ReferenceTable::from_defs([&parse_reference_csv(csv, "custom").unwrap()]);

    let result = analyze_text("Fasting Glucose 85\nPlatelets 250", &table, Some(Sex::M));

    assert_eq!(result.results[0].prediction, Some(Prediction::Normal));
    assert_eq!(result.results[1].prediction, None);
    assert_eq!(
        result.results[1].unclassified,
        Some(Unclassified::NoReferenceRange)
    );
    assert_eq!(result.summary, "OK: All values are within normal range.");
}

// ---------------------------------------------------------------------------
// Recommendations from a classified report
// ---------------------------------------------------------------------------
#[test]
fn fallback_recommendations_for_report() {
    let result = analyze_text(
        "Fasting Glucose 250 mg/dL\nTriglycerides 180 mg/dL\nPlatelets 250",
        &who(),
        Some(Sex::M),
    );
    let rec = FallbackRecommender.recommend(&result.results).unwrap();

    assert_eq!(rec.overall_risk, OverallRisk::High);
    assert_eq!(rec.referrals.len(), 2);
    assert_eq!(rec.referrals[0].specialist, "Endocrinologist");
    assert_eq!(rec.referrals[0].urgency, Urgency::Urgent);
    assert_eq!(rec.referrals[1].specialist, "Cardiologist / Dietitian");
    assert_eq!(rec.referrals[1].urgency, Urgency::Routine);
}

// ---------------------------------------------------------------------------
// Empty text and extractor errors
// ---------------------------------------------------------------------------
#[test]
fn empty_text_yields_empty_result() {
    let result = analyze_report(b"", &mock(&[]), &who(), None).unwrap();
    assert!(result.results.is_empty());
    assert!(result.flagged.is_empty());
}

#[test]
fn extractor_error_propagates() {
    let err = analyze_report(b"%PDF", &FailingExtractor, &who(), None).unwrap_err();
    assert!(matches!(err, CurascanError::PdftotextNotFound));
}

#[test]
fn parse_document_returns_header_and_values() {
    let report = parse_document(
        b"%PDF",
        &mock(&["Gender: M", "Hb 15.1 g/dL 13.5 - 17.5", "Hemoglobin 14.0"]),
    )
    .unwrap();
    assert_eq!(report.header.sex, Some(Sex::M));
    // First occurrence per test wins.
    assert_eq!(report.values.len(), 1);
    assert_eq!(report.values[0].value, Some(dec!(15.1)));
    assert_eq!(report.values[0].ref_lower, Some(dec!(13.5)));
}
