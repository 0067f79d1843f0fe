use crate::classify::outcome::{BoundsSource, ClassifiedResult, Prediction, Unclassified};
use crate::classify::overrides::find_override;
use crate::model::{ExtractedValue, Sex};
use crate::ranges::schema::ReferenceRange;
use crate::ranges::ReferenceTable;
use rust_decimal::Decimal;
use tracing::{debug, warn};

/// Bounds resolved for one record, with the directions allowed to flag.
struct Bounds {
    lower: Decimal,
    upper: Decimal,
    flag_low: bool,
    flag_high: bool,
    source: BoundsSource,
    label: String,
}

/// Classify extracted values against a reference table for one patient.
///
/// `sex` of `Any` is treated as `M`. Records are returned in input order.
pub fn classify(
    values: &[ExtractedValue],
    table: &ReferenceTable,
    sex: Sex,
) -> Vec<ClassifiedResult> {
    let sex = sex.patient();
    values
        .iter()
        .map(|v| classify_value(v, table, sex))
        .collect()
}

/// Classify a single record.
///
/// Bounds precedence: override rule, then the record's inline range, then the
/// reference table. Records without a value or without any bounds are left
/// unclassified.
pub fn classify_value(value: &ExtractedValue, table: &ReferenceTable, sex: Sex) -> ClassifiedResult {
    let sex = sex.patient();
    let reference = table.lookup(&value.test, sex);
    let unit = reference
        .map(|r| r.unit.clone())
        .filter(|u| !u.is_empty());

    let Some(measured) = value.value else {
        debug!(test = %value.test, "no value; leaving unclassified");
        return unclassified(value, unit, Unclassified::MissingValue);
    };

    let Some(bounds) = resolve_bounds(value, reference, sex) else {
        debug!(test = %value.test, "no reference range; leaving unclassified");
        return unclassified(value, unit, Unclassified::NoReferenceRange);
    };

    let prediction = compare(measured, &bounds);
    let reason = explain(&value.test, measured, unit.as_deref(), &bounds, prediction);
    debug!(test = %value.test, %prediction, source = ?bounds.source, "classified");

    ClassifiedResult {
        record: value.clone(),
        prediction: Some(prediction),
        rule_overridden: bounds.source == BoundsSource::Override,
        bounds_source: Some(bounds.source),
        applied_lower: Some(bounds.lower),
        applied_upper: Some(bounds.upper),
        unit,
        unclassified: None,
        reason,
    }
}

fn resolve_bounds(value: &ExtractedValue, reference: Option<&ReferenceRange>, sex: Sex) -> Option<Bounds> {
    if let Some(rule) = find_override(&value.test) {
        let (lower, upper) = (rule.bounds)(sex);
        return Some(Bounds {
            lower,
            upper,
            flag_low: true,
            flag_high: true,
            source: BoundsSource::Override,
            label: format!("{} override for {}", rule.name, sex),
        });
    }

    if let Some((lower, upper)) = value.inline_range() {
        if lower <= upper {
            return Some(Bounds {
                lower,
                upper,
                flag_low: true,
                flag_high: true,
                source: BoundsSource::Inline,
                label: "report range".to_string(),
            });
        }
        warn!(
            test = %value.test,
            %lower,
            %upper,
            "ignoring inverted inline range"
        );
    }

    reference.map(|r| Bounds {
        lower: r.lower_ref,
        upper: r.upper_ref,
        flag_low: r.flag_low,
        flag_high: r.flag_high,
        source: BoundsSource::Table,
        label: format!("reference {}", r.sex),
    })
}

/// Three-way comparison; a suppressed direction collapses into `normal`.
fn compare(value: Decimal, bounds: &Bounds) -> Prediction {
    if value < bounds.lower {
        if bounds.flag_low {
            Prediction::Low
        } else {
            Prediction::Normal
        }
    } else if value > bounds.upper {
        if bounds.flag_high {
            Prediction::High
        } else {
            Prediction::Normal
        }
    } else {
        Prediction::Normal
    }
}

fn explain(
    test: &str,
    value: Decimal,
    unit: Option<&str>,
    bounds: &Bounds,
    prediction: Prediction,
) -> String {
    let unit = unit.map(|u| format!(" {u}")).unwrap_or_default();
    let relation = if value < bounds.lower {
        format!("< {}", bounds.lower)
    } else if value > bounds.upper {
        format!("> {}", bounds.upper)
    } else {
        format!("within {}-{}", bounds.lower, bounds.upper)
    };
    let suppressed = match prediction {
        Prediction::Normal if value < bounds.lower || value > bounds.upper => " (not flagged)",
        _ => "",
    };
    format!(
        "{}: {}{} {} ({} {}-{}) -> {}{}",
        test, value, unit, relation, bounds.label, bounds.lower, bounds.upper, prediction, suppressed
    )
}

fn unclassified(value: &ExtractedValue, unit: Option<String>, why: Unclassified) -> ClassifiedResult {
    ClassifiedResult {
        record: value.clone(),
        prediction: None,
        rule_overridden: false,
        bounds_source: None,
        applied_lower: None,
        applied_upper: None,
        unit,
        unclassified: Some(why),
        reason: format!("{}: {}", value.test, why),
    }
}

/// Names of flagged tests and a one-line summary.
pub fn summarize(results: &[ClassifiedResult]) -> (Vec<String>, String) {
    let flagged: Vec<String> = results
        .iter()
        .filter(|r| r.is_flagged())
        .map(|r| r.record.test.clone())
        .collect();

    let summary = if flagged.is_empty() {
        "OK: All values are within normal range.".to_string()
    } else {
        format!("WARNING: {} abnormal value(s) detected.", flagged.len())
    };

    (flagged, summary)
}
