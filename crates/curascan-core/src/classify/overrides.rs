use crate::model::Sex;
use rust_decimal::Decimal;

/// Fixed, sex-dependent bounds that replace any table or inline range for a test.
#[derive(Debug)]
pub struct OverrideRule {
    pub name: &'static str,
    /// Lower-case fragments; the rule applies when any occurs in the test name.
    pub fragments: &'static [&'static str],
    pub bounds: fn(Sex) -> (Decimal, Decimal),
}

pub const OVERRIDES: &[OverrideRule] = &[OverrideRule {
    name: "Hemoglobin",
    fragments: &["hemoglobin", "haemoglobin"],
    bounds: hemoglobin_bounds,
}];

/// g/dL. Unspecified sex uses the male bounds.
fn hemoglobin_bounds(sex: Sex) -> (Decimal, Decimal) {
    match sex.patient() {
        Sex::F => (Decimal::new(120, 1), Decimal::new(160, 1)),
        _ => (Decimal::new(130, 1), Decimal::new(175, 1)),
    }
}

/// The first override rule whose fragment occurs in the (case-folded) test name.
pub fn find_override(test: &str) -> Option<&'static OverrideRule> {
    let name = test.to_lowercase();
    OVERRIDES
        .iter()
        .find(|rule| rule.fragments.iter().any(|f| name.contains(f)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_hemoglobin_matched_case_insensitively() {
        assert!(find_override("Hemoglobin").is_some());
        assert!(find_override("HAEMOGLOBIN (g/dL)").is_some());
        assert!(find_override("Fasting Glucose").is_none());
    }

    #[test]
    fn test_hemoglobin_bounds_by_sex() {
        let rule = find_override("hemoglobin").unwrap();
        assert_eq!((rule.bounds)(Sex::F), (dec!(12.0), dec!(16.0)));
        assert_eq!((rule.bounds)(Sex::M), (dec!(13.0), dec!(17.5)));
        assert_eq!((rule.bounds)(Sex::Any), (dec!(13.0), dec!(17.5)));
    }
}
