use crate::model::Sex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A named set of population reference ranges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceTableDef {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub version: String,
    pub ranges: Vec<ReferenceRange>,
}

/// Reference range for one test and sex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRange {
    pub test_name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub unit: String,
    /// `M`, `F` or `Any`.
    #[serde(default)]
    pub sex: Sex,
    pub lower_ref: Decimal,
    pub upper_ref: Decimal,
    /// Whether a value below `lower_ref` is flagged `low`.
    #[serde(default = "default_flag")]
    pub flag_low: bool,
    /// Whether a value above `upper_ref` is flagged `high`.
    #[serde(default = "default_flag")]
    pub flag_high: bool,
}

fn default_flag() -> bool {
    true
}
