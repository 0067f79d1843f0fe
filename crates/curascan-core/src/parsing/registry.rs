use regex::Regex;
use std::sync::LazyLock;

/// A recognised lab test: its canonical key and the surface forms that name it.
#[derive(Debug)]
pub struct TestPattern {
    pub key: &'static str,
    pub patterns: Vec<Regex>,
    /// Lines matching any of these never belong to this test.
    pub exclusions: Vec<Regex>,
}

impl TestPattern {
    /// Index of the first surface pattern found anywhere in the line.
    pub fn first_match(&self, line: &str) -> Option<usize> {
        if self.exclusions.iter().any(|x| x.is_match(line)) {
            return None;
        }
        self.patterns.iter().position(|p| p.is_match(line))
    }
}

/// Canonical key -> surface patterns, in scan order. Patterns are matched
/// case-insensitively against a trimmed line.
///
/// Hemoglobin is anchored to the start of the line so that "Glycated
/// Hemoglobin" and "Mean Corpuscular Hemoglobin" rows do not claim it. Rows
/// such as "Hemoglobin A1c" are excluded separately.
const SURFACE_FORMS: &[(&str, &[&str])] = &[
    ("Hemoglobin", &[r"^h(a)?emoglobin\b", r"^hgb\b", r"^hb\b"]),
    ("HbA1c", &[r"\bhba1c\b", r"glycated\s+h(a)?emoglobin", r"\ba1c\b"]),
    (
        "Fasting Glucose",
        &[r"fasting\s+(blood\s+)?(glucose|sugar)", r"\bfbs\b", r"glucose[,\s]*\(?fasting"],
    ),
    (
        "Total Cholesterol",
        &[r"total\s+cholesterol", r"cholesterol,?\s+total", r"^cholesterol\b"],
    ),
    ("LDL Cholesterol", &[r"\bldl\b"]),
    ("HDL Cholesterol", &[r"\bhdl\b"]),
    ("Triglycerides", &[r"triglycerides?"]),
    ("Creatinine", &[r"\bcreatinine\b"]),
    ("Blood Urea Nitrogen", &[r"blood\s+urea\s+nitrogen", r"\bbun\b"]),
    (
        "White Blood Cells",
        &[r"\bwbc\b", r"white\s+blood\s+cells?", r"\bleu[ck]ocytes?\b", r"total\s+leu[ck]ocyte\s+count"],
    ),
    ("Red Blood Cells", &[r"\brbc\b", r"red\s+blood\s+cells?", r"\berythrocytes?\b"]),
    ("Platelets", &[r"\bplatelets?\b", r"\bplt\b"]),
    ("Hematocrit", &[r"h(a)?ematocrit", r"\bhct\b", r"packed\s+cell\s+volume", r"\bpcv\b"]),
    ("TSH", &[r"\btsh\b", r"thyroid\s+stimulating\s+hormone"]),
    ("Vitamin D", &[r"vitamin\s*d3?\b"]),
    ("Vitamin B12", &[r"vitamin\s*b\s*12", r"\bcobalamin\b"]),
    ("ALT", &[r"\balt\b", r"\bsgpt\b", r"alanine\s+aminotransferase"]),
    ("AST", &[r"\bast\b", r"\bsgot\b", r"aspartate\s+aminotransferase"]),
    ("Sodium", &[r"\bsodium\b", r"^na\b"]),
    ("Potassium", &[r"\bpotassium\b", r"^k\b"]),
    ("Uric Acid", &[r"uric\s+acid"]),
    ("Ferritin", &[r"\bferritin\b"]),
];

/// Line patterns that veto an entry even when one of its surface forms matches.
const EXCLUSIONS: &[(&str, &[&str])] = &[("Hemoglobin", &[r"^(h(a)?emoglobin|hgb|hb)\s*a1c\b"])];

fn compile(forms: &[&str]) -> Vec<Regex> {
    forms
        .iter()
        .map(|f| Regex::new(&format!("(?i){f}")).expect("registry pattern is valid"))
        .collect()
}

/// The compiled test registry, in scan order.
pub static REGISTRY: LazyLock<Vec<TestPattern>> = LazyLock::new(|| {
    SURFACE_FORMS
        .iter()
        .map(|&(key, forms)| TestPattern {
            key,
            patterns: compile(forms),
            exclusions: EXCLUSIONS
                .iter()
                .filter(|(k, _)| *k == key)
                .flat_map(|&(_, xs)| compile(xs))
                .collect(),
        })
        .collect()
});

/// Look up a registry entry by canonical key (case-insensitive).
pub fn find_test(key: &str) -> Option<&'static TestPattern> {
    REGISTRY.iter().find(|t| t.key.eq_ignore_ascii_case(key.trim()))
}
