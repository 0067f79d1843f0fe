use curascan_core::classify::outcome::AnalysisResult;
use curascan_core::error::CurascanError;
use curascan_core::model::Sex;
use curascan_core::ranges::schema::ReferenceTableDef;
use curascan_core::ranges::{builtin, load_reference_table, ReferenceTable};
use curascan_core::recommend::{FallbackRecommender, Recommendation, Recommender};
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;

use crate::commands::{load_input, ReportInput};
use crate::output;

pub struct ClassifyArgs {
    pub input_file: PathBuf,
    pub sex: Option<Sex>,
    pub range_files: Vec<PathBuf>,
    pub presets: Vec<String>,
    pub output_format: String,
    pub show_all: bool,
    pub recommend: bool,
}

/// JSON output of `classify`.
#[derive(Serialize)]
pub struct ClassifyOutput<'a> {
    #[serde(flatten)]
    pub analysis: &'a AnalysisResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<&'a Recommendation>,
}

pub fn run(args: ClassifyArgs) -> Result<(), CurascanError> {
    let table = load_tables(&args.presets, &args.range_files)?;

    let analysis = match load_input(&args.input_file)? {
        ReportInput::Text(text) => curascan_core::analyze_text(&text, &table, args.sex),
        ReportInput::Values(values) => curascan_core::analyze_values(&values, &table, args.sex),
    };

    let recommendation = if args.recommend {
        let recommender = FallbackRecommender::new();
        debug!(backend = recommender.backend_name(), "building recommendations");
        Some(recommender.recommend(&analysis.results)?)
    } else {
        None
    };

    match args.output_format.as_str() {
        "json" => output::json::print(&ClassifyOutput {
            analysis: &analysis,
            recommendations: recommendation.as_ref(),
        })?,
        _ => output::table::print(&analysis, recommendation.as_ref(), args.show_all),
    }

    Ok(())
}

/// Merge presets and custom files into one lookup table.
///
/// With neither given, the `who` preset is used. Custom files are searched
/// before presets.
fn load_tables(presets: &[String], range_files: &[PathBuf]) -> Result<ReferenceTable, CurascanError> {
    let mut defs: Vec<ReferenceTableDef> = Vec::new();

    for path in range_files {
        defs.push(load_reference_table(path)?);
    }

    let effective_presets: Vec<String> = if presets.is_empty() && range_files.is_empty() {
        vec!["who".to_string()]
    } else {
        presets.to_vec()
    };
    for preset in &effective_presets {
        defs.push(builtin::load_preset(preset)?);
    }

    Ok(ReferenceTable::from_defs(&defs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn table_file(suffix: &str, body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_custom_table_searched_before_presets() {
        let file = table_file(".csv", "test_name,lower,upper\nTSH,1.0,2.0\n");
        let table = load_tables(&["who".to_string()], &[file.path().to_path_buf()]).unwrap();
        assert_eq!(table.lookup("TSH", Sex::M).unwrap().upper_ref.to_string(), "2.0");
    }

    #[test]
    fn test_invalid_custom_table_reports_file() {
        let file = table_file(".json", r#"{"name": "x", "version": "1", "ranges": []}"#);
        let err = load_tables(&[], &[file.path().to_path_buf()]).unwrap_err();
        assert!(matches!(err, CurascanError::TableFile { .. }));
        assert!(err.to_string().contains("ranges must not be empty"));
    }
}
