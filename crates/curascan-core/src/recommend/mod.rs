//! Follow-up suggestions and specialist referrals for classified results.

use crate::classify::outcome::ClassifiedResult;
use crate::error::CurascanError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Trait for recommendation backends.
pub trait Recommender: Send + Sync {
    fn recommend(&self, results: &[ClassifiedResult]) -> Result<Recommendation, CurascanError>;

    /// Name of this backend (for diagnostics).
    fn backend_name(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Normal,
    Abnormal,
    CriticalLow,
    CriticalHigh,
}

impl Severity {
    pub fn is_critical(self) -> bool {
        matches!(self, Severity::CriticalLow | Severity::CriticalHigh)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallRisk {
    Low,
    Moderate,
    High,
    Unknown,
}

impl fmt::Display for OverallRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverallRisk::Low => write!(f, "low"),
            OverallRisk::Moderate => write!(f, "moderate"),
            OverallRisk::High => write!(f, "high"),
            OverallRisk::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Routine,
    Urgent,
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Urgency::Routine => write!(f, "routine"),
            Urgency::Urgent => write!(f, "urgent"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Referral {
    pub test: String,
    pub specialist: String,
    pub urgency: Urgency,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub overall_risk: OverallRisk,
    pub suggestions: Vec<String>,
    #[serde(rename = "specialist_referrals")]
    pub referrals: Vec<Referral>,
}

struct Specialty {
    fragments: &'static [&'static str],
    specialist: &'static str,
    tips: &'static [&'static str],
}

/// Checked in order; the first entry with a fragment in the test name wins.
const SPECIALTIES: &[Specialty] = &[
    Specialty {
        fragments: &["glucose"],
        specialist: "Endocrinologist",
        tips: &["Reduce sugar intake; check HbA1c if persistently high."],
    },
    Specialty {
        fragments: &["hba1c"],
        specialist: "Endocrinologist",
        tips: &[
            "Review long-term glucose control with your doctor.",
            "Reduce refined carbohydrates.",
        ],
    },
    Specialty {
        fragments: &["creatinine"],
        specialist: "Nephrologist",
        tips: &["Check kidney function, ensure hydration."],
    },
    Specialty {
        fragments: &["hemoglobin", "haemoglobin"],
        specialist: "Physician",
        tips: &["If low, consider iron studies; do not self-supplement."],
    },
    Specialty {
        fragments: &["triglyceride", "cholesterol"],
        specialist: "Cardiologist / Dietitian",
        tips: &["Reduce simple carbs/saturated fats; increase activity."],
    },
];

const DEFAULT_SPECIALIST: &str = "General Physician";
const DEFAULT_TIPS: &[&str] = &["Please review this result with your doctor."];

/// Rule-based recommender that needs no external service.
#[derive(Debug, Default, Clone, Copy)]
pub struct FallbackRecommender;

impl FallbackRecommender {
    pub fn new() -> Self {
        FallbackRecommender
    }
}

impl Recommender for FallbackRecommender {
    fn recommend(&self, results: &[ClassifiedResult]) -> Result<Recommendation, CurascanError> {
        Ok(fallback_recommendation(results))
    }

    fn backend_name(&self) -> &str {
        "fallback"
    }
}

/// Severity of one result from its prediction and applied bounds.
///
/// Critical when the value is at least twice the upper bound or at most half
/// the lower bound.
pub fn severity(result: &ClassifiedResult) -> Severity {
    if !result.is_flagged() {
        return Severity::Normal;
    }
    let Some(value) = result.record.value else {
        return Severity::Abnormal;
    };
    let two = Decimal::from(2);
    if result.applied_upper.is_some_and(|upper| value >= upper * two) {
        return Severity::CriticalHigh;
    }
    if result.applied_lower.is_some_and(|lower| value * two <= lower) {
        return Severity::CriticalLow;
    }
    Severity::Abnormal
}

fn fallback_recommendation(results: &[ClassifiedResult]) -> Recommendation {
    let mut suggestions = Vec::new();
    let mut referrals = Vec::new();
    let mut worst = Severity::Normal;

    for result in results {
        let level = severity(result);
        worst = worst.max(level);
        if level == Severity::Normal {
            continue;
        }

        let test = &result.record.test;
        let name = test.to_lowercase();
        let (specialist, tips) = SPECIALTIES
            .iter()
            .find(|s| s.fragments.iter().any(|f| name.contains(f)))
            .map(|s| (s.specialist, s.tips))
            .unwrap_or((DEFAULT_SPECIALIST, DEFAULT_TIPS));

        suggestions.extend(tips.iter().map(|tip| format!("{test}: {tip}")));
        referrals.push(Referral {
            test: test.clone(),
            specialist: specialist.to_string(),
            urgency: if level.is_critical() {
                Urgency::Urgent
            } else {
                Urgency::Routine
            },
        });
    }

    let overall_risk = if results.is_empty() {
        OverallRisk::Unknown
    } else if worst.is_critical() {
        OverallRisk::High
    } else if worst == Severity::Abnormal {
        OverallRisk::Moderate
    } else {
        OverallRisk::Low
    };

    let mut seen = HashSet::new();
    suggestions.retain(|s| seen.insert(s.clone()));
    let mut seen = HashSet::new();
    referrals.retain(|r| seen.insert((r.test.clone(), r.specialist.clone())));

    Recommendation {
        overall_risk,
        suggestions,
        referrals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::model::{ExtractedValue, Sex};
    use crate::ranges::schema::ReferenceRange;
    use crate::ranges::ReferenceTable;
    use rust_decimal_macros::dec;

    fn table() -> ReferenceTable {
        let range = |name: &str, lower, upper| ReferenceRange {
            test_name: name.into(),
            category: String::new(),
            unit: String::new(),
            sex: Sex::Any,
            lower_ref: lower,
            upper_ref: upper,
            flag_low: true,
            flag_high: true,
        };
        ReferenceTable::new(vec![
            range("Fasting Glucose", dec!(70), dec!(99)),
            range("Creatinine", dec!(0.7), dec!(1.3)),
            range("Triglycerides", dec!(0), dec!(150)),
            range("Total Cholesterol", dec!(0), dec!(200)),
            range("Ferritin", dec!(30), dec!(400)),
        ])
    }

    fn results(values: &[(&str, Decimal)]) -> Vec<ClassifiedResult> {
        let values: Vec<_> = values
            .iter()
            .map(|(t, v)| ExtractedValue::candidate(*t, Some(*v)))
            .collect();
        classify(&values, &table(), Sex::M)
    }

    fn recommend(results: &[ClassifiedResult]) -> Recommendation {
        FallbackRecommender.recommend(results).unwrap()
    }

    #[test]
    fn test_severity_thresholds() {
        let r = results(&[
            ("Fasting Glucose", dec!(198)),
            ("Fasting Glucose", dec!(197)),
            ("Creatinine", dec!(0.35)),
            ("Creatinine", dec!(0.5)),
            ("Creatinine", dec!(1.0)),
        ]);
        let got: Vec<_> = r.iter().map(severity).collect();
        assert_eq!(
            got,
            vec![
                Severity::CriticalHigh,
                Severity::Abnormal,
                Severity::CriticalLow,
                Severity::Abnormal,
                Severity::Normal,
            ]
        );
    }

    #[test]
    fn test_all_normal_is_low_risk() {
        let rec = recommend(&results(&[("Fasting Glucose", dec!(85))]));
        assert_eq!(rec.overall_risk, OverallRisk::Low);
        assert!(rec.suggestions.is_empty());
        assert!(rec.referrals.is_empty());
    }

    #[test]
    fn test_no_results_is_unknown_risk() {
        assert_eq!(recommend(&[]).overall_risk, OverallRisk::Unknown);
    }

    #[test]
    fn test_abnormal_gets_routine_referral() {
        let rec = recommend(&results(&[("Fasting Glucose", dec!(105))]));
        assert_eq!(rec.overall_risk, OverallRisk::Moderate);
        assert_eq!(
            rec.suggestions,
            vec!["Fasting Glucose: Reduce sugar intake; check HbA1c if persistently high."]
        );
        assert_eq!(
            rec.referrals,
            vec![Referral {
                test: "Fasting Glucose".into(),
                specialist: "Endocrinologist".into(),
                urgency: Urgency::Routine,
            }]
        );
    }

    #[test]
    fn test_critical_gets_urgent_referral_and_high_risk() {
        let rec = recommend(&results(&[
            ("Fasting Glucose", dec!(105)),
            ("Creatinine", dec!(3.0)),
        ]));
        assert_eq!(rec.overall_risk, OverallRisk::High);
        assert_eq!(rec.referrals[1].specialist, "Nephrologist");
        assert_eq!(rec.referrals[1].urgency, Urgency::Urgent);
    }

    #[test]
    fn test_lipids_share_specialist_and_unknown_tests_use_default() {
        let rec = recommend(&results(&[
            ("Triglycerides", dec!(200)),
            ("Total Cholesterol", dec!(240)),
            ("Ferritin", dec!(20)),
        ]));
        let specialists: Vec<_> = rec.referrals.iter().map(|r| r.specialist.as_str()).collect();
        assert_eq!(
            specialists,
            vec!["Cardiologist / Dietitian", "Cardiologist / Dietitian", "General Physician"]
        );
        assert_eq!(
            rec.suggestions.last().map(String::as_str),
            Some("Ferritin: Please review this result with your doctor.")
        );
    }

    #[test]
    fn test_duplicates_removed() {
        let rec = recommend(&results(&[
            ("Fasting Glucose", dec!(120)),
            ("Fasting Glucose", dec!(130)),
        ]));
        assert_eq!(rec.suggestions.len(), 1);
        assert_eq!(rec.referrals.len(), 1);
    }

    #[test]
    fn test_unclassified_results_are_ignored() {
        let values = vec![ExtractedValue::candidate("Fasting Glucose", None)];
        let rec = recommend(&classify(&values, &table(), Sex::M));
        assert_eq!(rec.overall_risk, OverallRisk::Low);
    }

    #[test]
    fn test_json_shape() {
        let rec = recommend(&results(&[("Creatinine", dec!(3.0))]));
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["overall_risk"], "high");
        assert_eq!(json["specialist_referrals"][0]["urgency"], "urgent");
    }
}
