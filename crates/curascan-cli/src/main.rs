mod commands;
mod output;

use clap::{Parser, Subcommand};
use curascan_core::model::Sex;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "curascan",
    version,
    about = "Extract blood-test values from lab reports and check them against reference ranges"
)]
struct Cli {
    /// Log debug output to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a lab report (PDF, extracted-text JSON or plain text) without classifying
    Parse {
        /// Path to PDF, JSON or text file
        input_file: PathBuf,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Write parsed output to a JSON file
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Classify a lab report against reference ranges
    Classify {
        /// Path to PDF, JSON or text file
        input_file: PathBuf,

        /// Patient sex: M or F (default: from the report header, else M)
        #[arg(short, long, env = "CURASCAN_SEX", value_parser = parse_sex)]
        sex: Option<Sex>,

        /// Custom reference table file(s), JSON or CSV
        #[arg(short, long = "ranges", value_name = "FILE", env = "CURASCAN_RANGES", value_delimiter = ',')]
        ranges: Vec<PathBuf>,

        /// Predefined reference table(s) (default: who if no --ranges/--preset given)
        #[arg(short, long = "preset", value_name = "NAME", env = "CURASCAN_PRESET", value_delimiter = ',')]
        preset: Vec<String>,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Show all tests, not just flagged ones
        #[arg(long)]
        show_all: bool,

        /// Add follow-up suggestions and specialist referrals
        #[arg(long)]
        recommend: bool,
    },
    /// Inspect and validate reference tables
    Ranges {
        #[command(subcommand)]
        action: RangesAction,
    },
    /// List the recognised tests and their name patterns
    Tests,
}

#[derive(Subcommand)]
enum RangesAction {
    /// List predefined reference tables
    List,
    /// Print the ranges of a predefined table
    Show {
        /// Preset name (e.g., "who")
        preset: String,
    },
    /// Print the JSON format with field descriptions and example
    Schema,
    /// Validate a custom reference table file
    Validate {
        /// Path to JSON or CSV file
        file: PathBuf,
    },
}

fn parse_sex(s: &str) -> Result<Sex, String> {
    Sex::from_str_loose(s).ok_or_else(|| format!("expected M or F, got '{s}'"))
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Parse {
            input_file,
            output,
            out,
        } => commands::parse::run(input_file, &output, out),
        Commands::Classify {
            input_file,
            sex,
            ranges,
            preset,
            output,
            show_all,
            recommend,
        } => commands::classify::run(commands::classify::ClassifyArgs {
            input_file,
            sex,
            range_files: ranges,
            presets: preset,
            output_format: output,
            show_all,
            recommend,
        }),
        Commands::Ranges { action } => match action {
            RangesAction::List => commands::ranges::list(),
            RangesAction::Show { preset } => commands::ranges::show(&preset),
            RangesAction::Schema => commands::ranges::schema(),
            RangesAction::Validate { file } => commands::ranges::validate(&file),
        },
        Commands::Tests => commands::tests::list(),
    };

    if let Err(e) = result {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}
