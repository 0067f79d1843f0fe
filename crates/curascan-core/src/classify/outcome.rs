use crate::model::{ExtractedValue, ReportHeader, Sex};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Prediction {
    Low,
    Normal,
    High,
}

impl Prediction {
    /// True for `low` and `high`.
    pub fn is_flagged(self) -> bool {
        !matches!(self, Prediction::Normal)
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prediction::Low => write!(f, "low"),
            Prediction::Normal => write!(f, "normal"),
            Prediction::High => write!(f, "high"),
        }
    }
}

/// Where the bounds used for a classification came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundsSource {
    /// A fixed override rule for the test.
    Override,
    /// The reference range printed on the report line.
    Inline,
    /// The external reference table.
    Table,
}

/// Why a record carries no prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unclassified {
    MissingValue,
    NoReferenceRange,
}

impl fmt::Display for Unclassified {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unclassified::MissingValue => write!(f, "no value"),
            Unclassified::NoReferenceRange => write!(f, "no reference range available"),
        }
    }
}

/// An extracted value annotated with its classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifiedResult {
    #[serde(flatten)]
    pub record: ExtractedValue,
    /// Absent when the record could not be classified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction: Option<Prediction>,
    /// True when a fixed override rule supplied the bounds.
    pub rule_overridden: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds_source: Option<BoundsSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied_lower: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied_upper: Option<Decimal>,
    /// Unit from the reference table, if the test is listed there.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unclassified: Option<Unclassified>,
    /// Human-readable explanation of the classification.
    pub reason: String,
}

impl ClassifiedResult {
    pub fn is_flagged(&self) -> bool {
        self.prediction.is_some_and(Prediction::is_flagged)
    }
}

/// Classification of a whole report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Sex the classification was run for.
    pub sex: Sex,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<ReportHeader>,
    pub results: Vec<ClassifiedResult>,
    /// Tests predicted low or high.
    pub flagged: Vec<String>,
    pub summary: String,
}
