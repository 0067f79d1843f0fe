use curascan_core::error::CurascanError;
use curascan_core::parsing::registry::find_test;
use curascan_core::ranges::{builtin, load_reference_table};
use std::path::Path;

use crate::output::table::format_ranges;

pub fn list() -> Result<(), CurascanError> {
    println!("Available predefined reference tables:\n");
    for name in builtin::PRESETS {
        let table = builtin::load_preset(name)?;
        println!(
            "  {:<8} {} (v{}), {} ranges",
            name,
            table.name,
            table.version,
            table.ranges.len()
        );
        if let Some(ref desc) = table.description {
            println!("           {}", desc);
        }
        println!();
    }
    Ok(())
}

pub fn show(preset: &str) -> Result<(), CurascanError> {
    let table = builtin::load_preset(preset)?;

    println!("{} (version {})\n", table.name, table.version);
    if let Some(ref desc) = table.description {
        println!("{}\n", desc);
    }
    println!("{}", format_ranges(&table.ranges));
    println!("Values below the lower or above the upper bound are flagged low/high");
    println!("unless the direction is marked \"-\". Hemoglobin always uses fixed");
    println!("bounds: 12.0-16.0 g/dL (F), 13.0-17.5 g/dL (M).");

    Ok(())
}

pub fn schema() -> Result<(), CurascanError> {
    print!(
        r#"Reference Table Format
======================

A reference table lists the normal range of each test. When you run
`curascan classify`, each extracted value without a printed range (and
without a fixed override) is compared against the matching entry.

JSON top-level fields:
  name          (string, required)  Human-readable name of the table
  description   (string, optional)  What population the ranges describe
  version       (string, required)  Version identifier (e.g., "2024.1")
  ranges        (array, required)   List of ranges (see below)

Each entry in the "ranges" array:
  test_name     (string, required)  Test name. Matched case-insensitively
                                    against the canonical names listed by
                                    `curascan tests`.
  lower_ref     (number, required)  Lower bound (inclusive)
  upper_ref     (number, required)  Upper bound (inclusive)
  sex           (string, optional)  "M", "F" or "All". Default: "All".
                                    An entry for the patient's sex wins over
                                    an "All" entry.
  unit          (string, optional)  Unit for display
  category      (string, optional)  Grouping, e.g. "Lipids"
  flag_low      (bool, optional)    Flag values below lower_ref. Default: true
  flag_high     (bool, optional)    Flag values above upper_ref. Default: true

Example:
{{
  "name": "Clinic ranges",
  "version": "1.0",
  "ranges": [
    {{
      "test_name": "Fasting Glucose",
      "lower_ref": 70,
      "upper_ref": 99,
      "unit": "mg/dL"
    }},
    {{
      "test_name": "HDL Cholesterol",
      "sex": "F",
      "lower_ref": 50,
      "upper_ref": 100,
      "flag_high": false
    }}
  ]
}}

CSV files need a header row. Recognised columns:
  test_name | test | name                         (required)
  lower | lower_ref | min | reference_low | ref_low
  upper | upper_ref | max | reference_high | ref_high
  range | ref_range | reference_range | normal_range   ("70 - 99")
  unit | units, sex, category, flag_low, flag_high
Rows without both bounds are skipped.
"#
    );
    Ok(())
}

pub fn validate(file: &Path) -> Result<(), CurascanError> {
    let table = load_reference_table(file)?;

    println!("Reference table '{}' (v{}) is valid.", table.name, table.version);
    println!("  Ranges: {}", table.ranges.len());

    // Potential issues (warnings, not errors)
    let warnings: Vec<String> = table
        .ranges
        .iter()
        .filter(|r| find_test(&r.test_name).is_none())
        .map(|r| {
            format!(
                "'{}' is not a recognised test name and will only match by substring",
                r.test_name
            )
        })
        .collect();

    if !warnings.is_empty() {
        println!("\nWarnings:");
        for w in &warnings {
            println!("  - {}", w);
        }
    }

    Ok(())
}
