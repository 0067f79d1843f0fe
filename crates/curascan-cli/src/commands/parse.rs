use curascan_core::model::ParsedReport;
use curascan_core::parsing::parse_report;
use std::path::PathBuf;

use crate::commands::{load_input, ReportInput};
use crate::output;

pub fn run(
    input_file: PathBuf,
    output_format: &str,
    output_file: Option<PathBuf>,
) -> Result<(), curascan_core::error::CurascanError> {
    let parsed = match load_input(&input_file)? {
        ReportInput::Text(text) => parse_report(Some(&text)),
        ReportInput::Values(values) => ParsedReport {
            header: Default::default(),
            values,
        },
    };

    match output_file {
        Some(path) => {
            // Always write JSON when saving to file
            let json = serde_json::to_string_pretty(&parsed)?;
            std::fs::write(&path, json)?;
            let missing = parsed.values.iter().filter(|v| v.value.is_none()).count();
            eprintln!(
                "Parsed {} test(s), written to {}",
                parsed.values.len(),
                path.display()
            );
            if missing > 0 {
                eprintln!("  {missing} test(s) without a numeric value");
            }
        }
        None => match output_format {
            "json" => output::json::print(&parsed)?,
            _ => println!("{}", output::table::format_parsed(&parsed)),
        },
    }

    Ok(())
}
