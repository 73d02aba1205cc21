use clap::{Parser, Subcommand};
use colored::Colorize;
use schedlag::cli;
use schedlag::error::REQUIRED_COLUMNS_HINT;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schedlag")]
#[command(about = "Scheduling lag report generator: counts, running totals and weekly summary in Excel.")]
#[command(long_about = "schedlag - Scheduling Lag Calculation

Reads a 'Scheduling Lag (Planned Date - Created Date)' export (CSV, TSV or
Excel), finds the header row automatically and writes a two-sheet report:

  Raw_Data  - the validated input rows
  Analysis  - Count by Schedule Lag and Flag
              Running Total & Cumulative Percentage
              % of Total: Within 1 Week

COMMANDS:
  analyze   - Build the Excel report
  inspect   - Show header detection and column mapping
  config    - Print the configuration as YAML

EXAMPLES:
  schedlag analyze export.csv                   # Report next to the input
  schedlag analyze export.xlsx -o report.xlsx
  schedlag inspect export.csv                   # Which row is the header?
  schedlag config > schedlag.yaml               # Start a custom config")]
#[command(version)]
struct Cli {
    /// Log pipeline details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Build the scheduling lag report.

The input must contain columns recognisable as scheduling lag, evenflow flag
and active appointment count (names are matched by keywords, so
'Scheduling Lag (Days)' or 'EvenFlow Flag' work). Extra columns and title rows
above the header are fine.

Rows with an unparseable lag or count, or without a flag, are dropped.
Counts may use thousands separators ('1,234').

Default output: Scheduling_Lag_Calculation_Output_<name>.xlsx next to the input.")]
    /// Build the Excel report from an export
    Analyze {
        /// Input file (.csv, .tsv, .txt, .xlsx, .xlsm, .xlsb, .xls, .ods)
        file: PathBuf,

        /// Output Excel file path (.xlsx)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// YAML configuration overriding keywords, thresholds and cutoff
        #[arg(short, long, env = "SCHEDLAG_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Show header detection and column mapping without writing a report
    Inspect {
        /// Input file
        file: PathBuf,

        /// YAML configuration file
        #[arg(short, long, env = "SCHEDLAG_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Print the effective configuration as YAML
    Config {
        /// YAML configuration file to merge over the defaults
        #[arg(short, long, env = "SCHEDLAG_CONFIG")]
        config: Option<PathBuf>,
    },
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "schedlag=info" } else { "schedlag=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Analyze {
            file,
            output,
            config,
        } => cli::analyze(file, output, config, cli.verbose),

        Commands::Inspect { file, config } => cli::inspect(file, config),

        Commands::Config { config } => cli::show_config(config),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "❌ Error:".bold().red(), e);
        if e.is_input_error() {
            eprintln!("   {}", REQUIRED_COLUMNS_HINT.yellow());
        }
        std::process::exit(1);
    }
}
