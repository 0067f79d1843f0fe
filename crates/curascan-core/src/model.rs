use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Patient sex, or the applicability of a reference range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    #[serde(alias = "m", alias = "Male", alias = "male")]
    M,
    #[serde(alias = "f", alias = "Female", alias = "female")]
    F,
    #[default]
    #[serde(alias = "any", alias = "All", alias = "all", alias = "")]
    Any,
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sex::M => write!(f, "M"),
            Sex::F => write!(f, "F"),
            Sex::Any => write!(f, "Any"),
        }
    }
}

impl Sex {
    /// Recognise `M`/`F`/`Male`/`Female` (any case). Anything else is `None`.
    pub fn from_str_loose(s: &str) -> Option<Sex> {
        match s.trim().to_lowercase().as_str() {
            "m" | "male" => Some(Sex::M),
            "f" | "female" => Some(Sex::F),
            _ => None,
        }
    }

    /// Like `from_str_loose`, but maps blank/"all"/"any" to `Any` (reference table usage).
    pub fn from_table_str(s: &str) -> Option<Sex> {
        match s.trim().to_lowercase().as_str() {
            "" | "any" | "all" | "both" => Some(Sex::Any),
            other => Sex::from_str_loose(other),
        }
    }

    /// The sex used for patient-specific rules; unspecified falls back to `M`.
    pub fn patient(self) -> Sex {
        match self {
            Sex::F => Sex::F,
            Sex::M | Sex::Any => Sex::M,
        }
    }
}

/// One recognised test mention in the report text.
///
/// `test` is the canonical registry key. `value` is `None` when the line held
/// no number. The inline range, when both bounds are present, was parsed from
/// the same line.
///
/// When decoded from JSON, numbers may arrive as strings; anything that does
/// not read as a number becomes `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedValue {
    #[serde(alias = "name", alias = "test_name", alias = "Test")]
    pub test: String,
    #[serde(default)]
    pub line: String,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub value: Option<Decimal>,
    #[serde(
        default,
        alias = "lower",
        alias = "reference_lower",
        deserialize_with = "lenient_decimal"
    )]
    pub ref_lower: Option<Decimal>,
    #[serde(
        default,
        alias = "upper",
        alias = "reference_upper",
        deserialize_with = "lenient_decimal"
    )]
    pub ref_upper: Option<Decimal>,
}

fn lenient_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    Ok(match raw {
        serde_json::Value::Number(n) => {
            let text = n.to_string();
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .ok()
        }
        serde_json::Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    })
}

impl ExtractedValue {
    /// A bare candidate with a name and value, no source line or inline range.
    pub fn candidate(test: impl Into<String>, value: Option<Decimal>) -> Self {
        ExtractedValue {
            test: test.into(),
            line: String::new(),
            value,
            ref_lower: None,
            ref_upper: None,
        }
    }

    pub fn inline_range(&self) -> Option<(Decimal, Decimal)> {
        match (self.ref_lower, self.ref_upper) {
            (Some(lower), Some(upper)) => Some((lower, upper)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportHeader {
    pub report_id: Option<String>,
    pub patient_name: Option<String>,
    pub physician: Option<String>,
    pub report_date: Option<String>,
    pub sex: Option<Sex>,
    pub age: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedReport {
    pub header: ReportHeader,
    pub values: Vec<ExtractedValue>,
}
