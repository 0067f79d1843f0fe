pub mod builtin;
pub mod schema;

use crate::error::CurascanError;
use crate::model::Sex;
use crate::parsing::values::parse_range_text;
use rust_decimal::Decimal;
use schema::{ReferenceRange, ReferenceTableDef};
use std::path::Path;
use std::str::FromStr;
use tracing::{info, warn};

/// Read-only lookup over one or more reference tables.
///
/// Earlier ranges win when several entries fit the same test and sex.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTable {
    ranges: Vec<ReferenceRange>,
}

impl ReferenceTable {
    pub fn new(ranges: Vec<ReferenceRange>) -> Self {
        ReferenceTable { ranges }
    }

    /// Merge table definitions in order of precedence.
    pub fn from_defs<'a>(defs: impl IntoIterator<Item = &'a ReferenceTableDef>) -> Self {
        ReferenceTable {
            ranges: defs
                .into_iter()
                .flat_map(|d| d.ranges.iter().cloned())
                .collect(),
        }
    }

    /// Find the range for a test name and sex.
    ///
    /// Exact (case-insensitive) name matches are tried first, then table
    /// entries whose name contains the requested name. Within each pass an
    /// entry for `sex` is preferred over an `Any` entry.
    pub fn lookup(&self, test: &str, sex: Sex) -> Option<&ReferenceRange> {
        let wanted = test.trim().to_lowercase();
        if wanted.is_empty() {
            return None;
        }

        self.find(sex, |name| name == wanted)
            .or_else(|| self.find(sex, |name| name.contains(&wanted)))
    }

    fn find(&self, sex: Sex, name_matches: impl Fn(&str) -> bool) -> Option<&ReferenceRange> {
        let matches = |r: &&ReferenceRange| name_matches(&r.test_name.trim().to_lowercase());
        self.ranges
            .iter()
            .filter(matches)
            .find(|r| r.sex == sex)
            .or_else(|| self.ranges.iter().filter(matches).find(|r| r.sex == Sex::Any))
    }
}

/// Load a reference table from a JSON or CSV file (by extension).
pub fn load_reference_table(path: &Path) -> Result<ReferenceTableDef, CurascanError> {
    let content = std::fs::read_to_string(path).map_err(|e| CurascanError::TableLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let is_csv = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);

    let parsed = if is_csv {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "custom".into());
        parse_reference_csv(&content, &name)
    } else {
        parse_table(&content, path)
    };
    let table = parsed.map_err(|e| match e {
        CurascanError::TableLoad { .. } => e,
        other => CurascanError::TableFile {
            path: path.to_path_buf(),
            source: Box::new(other),
        },
    })?;

    info!(
        path = %path.display(),
        ranges = table.ranges.len(),
        "loaded reference table"
    );
    Ok(table)
}

/// Parse a reference table from a JSON string.
pub fn parse_table(json: &str, source: &Path) -> Result<ReferenceTableDef, CurascanError> {
    let table: ReferenceTableDef =
        serde_json::from_str(json).map_err(|e| CurascanError::TableLoad {
            path: source.to_path_buf(),
            reason: e.to_string(),
        })?;
    validate_table(&table)?;
    Ok(table)
}

/// Column positions resolved from a CSV header row.
struct CsvColumns {
    test: usize,
    lower: Option<usize>,
    upper: Option<usize>,
    range: Option<usize>,
    unit: Option<usize>,
    sex: Option<usize>,
    category: Option<usize>,
    flag_low: Option<usize>,
    flag_high: Option<usize>,
}

impl CsvColumns {
    fn resolve(headers: &csv::StringRecord) -> Result<Self, CurascanError> {
        let names: Vec<String> = headers
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_lowercase())
            .collect();

        let test = find_column(&names, &["test_name", "test", "name"]).ok_or_else(|| {
            CurascanError::TableInvalid(format!(
                "CSV must contain a test name column (test_name / test / name). Found: {}",
                names.join(", ")
            ))
        })?;

        Ok(CsvColumns {
            test,
            lower: find_column(&names, &["lower", "lower_ref", "min", "reference_low", "ref_low"]),
            upper: find_column(&names, &["upper", "upper_ref", "max", "reference_high", "ref_high"]),
            range: find_column(&names, &["range", "ref_range", "reference_range", "normal_range"]),
            unit: find_column(&names, &["unit", "units"]),
            sex: find_column(&names, &["sex"]),
            category: find_column(&names, &["category"]),
            flag_low: find_column(&names, &["flag_low"]),
            flag_high: find_column(&names, &["flag_high"]),
        })
    }
}

fn find_column(names: &[String], aliases: &[&str]) -> Option<usize> {
    aliases
        .iter()
        .find_map(|a| names.iter().position(|n| n == a))
}

/// Parse a reference table from CSV text.
///
/// Bounds come from separate lower/upper columns when both exist, otherwise
/// from a single range column such as `"13.5 - 17.5"`. Rows without usable
/// bounds are skipped.
pub fn parse_reference_csv(content: &str, name: &str) -> Result<ReferenceTableDef, CurascanError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(content.as_bytes());
    let cols = CsvColumns::resolve(reader.headers()?)?;

    let mut ranges = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        let record = result?;
        let get = |idx: Option<usize>| idx.and_then(|i| record.get(i)).unwrap_or("");

        let test_name = get(Some(cols.test)).to_string();
        if test_name.is_empty() {
            continue;
        }

        let bounds = match (cols.lower, cols.upper) {
            (Some(_), Some(_)) => parse_decimal(get(cols.lower)).zip(parse_decimal(get(cols.upper))),
            _ => parse_range_text(get(cols.range)),
        };
        let Some((lower_ref, upper_ref)) = bounds else {
            warn!(row = row_idx + 2, test = %test_name, "skipping reference row without numeric bounds");
            continue;
        };

        let sex_raw = get(cols.sex);
        let Some(sex) = Sex::from_table_str(sex_raw) else {
            warn!(row = row_idx + 2, test = %test_name, sex = sex_raw, "skipping reference row with unknown sex");
            continue;
        };

        ranges.push(ReferenceRange {
            test_name,
            category: get(cols.category).to_string(),
            unit: get(cols.unit).to_string(),
            sex,
            lower_ref,
            upper_ref,
            flag_low: parse_flag(get(cols.flag_low)),
            flag_high: parse_flag(get(cols.flag_high)),
        });
    }

    let table = ReferenceTableDef {
        name: name.to_string(),
        description: None,
        version: "csv".to_string(),
        ranges,
    };
    validate_table(&table)?;
    Ok(table)
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    Decimal::from_str(s.trim()).ok()
}

/// Blank means "flag"; only an explicit negative suppresses.
fn parse_flag(s: &str) -> bool {
    !matches!(
        s.trim().to_lowercase().as_str(),
        "false" | "0" | "no" | "n"
    )
}

/// Validate that a reference table is well-formed.
pub fn validate_table(table: &ReferenceTableDef) -> Result<(), CurascanError> {
    if table.ranges.is_empty() {
        return Err(CurascanError::TableInvalid("ranges must not be empty".into()));
    }

    for range in &table.ranges {
        if range.test_name.trim().is_empty() {
            return Err(CurascanError::TableInvalid(
                "test_name must not be empty".into(),
            ));
        }

        if range.lower_ref > range.upper_ref {
            return Err(CurascanError::TableInvalid(format!(
                "test '{}' ({}) has lower_ref {} above upper_ref {}",
                range.test_name, range.sex, range.lower_ref, range.upper_ref
            )));
        }
    }

    Ok(())
}
