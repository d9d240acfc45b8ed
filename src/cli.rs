mod assignment;

pub use assignment::Assignment;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Filter structured log records and translate the same criteria into SQL
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// TOML configuration file
    #[arg(long, global = true, env = "LOG_CRITERIA_CONFIG")]
    pub config: Option<PathBuf>,

    /// When to use colored output
    #[arg(long, global = true, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,

    /// Output format
    #[arg(short = 'F', long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only print results, no summaries or warnings
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Where the criteria come from
#[derive(Args, Debug, Clone)]
pub struct CriteriaArgs {
    /// Criteria file in transport form (JSON or JSON5)
    #[arg(short, long)]
    pub criteria: Option<PathBuf>,

    /// Set one criterion, applied after the file (e.g. "severity.in=E F")
    #[arg(short, long = "set", value_name = "FIELD.OP=VALUE")]
    pub set: Vec<Assignment>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the records of a JSON-lines stream that pass the criteria
    Filter {
        #[command(flatten)]
        criteria: CriteriaArgs,

        /// JSON-lines input; stdin when omitted
        input: Option<PathBuf>,

        /// Stop after this many matching records
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Show the SQL generated for the criteria without running it
    Query {
        #[command(flatten)]
        criteria: CriteriaArgs,

        /// Number of rows to fetch (defaults to the configured limit)
        #[arg(short = 'n', long)]
        limit: Option<u32>,
    },
    /// Print the minimal transport form of the criteria
    Export {
        #[command(flatten)]
        criteria: CriteriaArgs,
    },
}

pub fn cli_parse() -> Cli {
    Cli::parse()
}
