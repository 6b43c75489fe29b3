use clap::{Parser, Subcommand};
use colored::Colorize;
use mpesa_analyzer::cli;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mpesa-analyzer")]
#[command(about = "Merge statement sheets that carry the required columns, then pivot the amounts by month")]
#[command(long_about = "Mpesa Analyzer - statement workbook merge and month pivot

Reads a multi-sheet .xlsx statement export, keeps every sheet that contains
all of the required columns, concatenates them into one table, and sums the
Paid In / Withdrawn amounts per calendar month.

COMMANDS:
  analyze - merge qualifying sheets, pivot by month, write export artifacts
  sheets  - list a workbook's sheets and their columns

EXAMPLES:
  mpesa-analyzer analyze statement.xlsx
  mpesa-analyzer analyze statement.xlsx -r \"Paid In, Withdrawn, Balance\"
  mpesa-analyzer analyze statement.xlsx --date-column \"Completion Time\" -o reports/
  mpesa-analyzer sheets statement.xlsx")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Merge qualifying sheets and pivot the amounts by month.

Every sheet whose columns include all required columns (exact name match,
case-insensitive unless --case-sensitive is given) is concatenated into one
merged table. The merged table is then grouped by the calendar month of the
date column and the Paid In / Withdrawn amounts are summed per month.

ARTIFACTS (written to --out-dir):
  merged_mpesa_statement.xlsx / .csv
  pivot_mpesa.xlsx / .csv
  pivot_mpesa.html (printable report)

The CSV exports are written even when the spreadsheet writer fails. Sheets
that miss required columns, or fail to read, are reported with the reason;
they never abort the run.")]
    /// Merge qualifying sheets and pivot Paid In / Withdrawn by month
    Analyze {
        /// Path to the workbook (.xlsx)
        file: PathBuf,

        /// Required columns, comma-separated
        #[arg(short, long, default_value = "Paid In, Withdrawn, Balance")]
        required: String,

        /// Match required column names case-sensitively
        #[arg(long)]
        case_sensitive: bool,

        /// Date/time column for month grouping (default: first detected candidate)
        #[arg(short, long)]
        date_column: Option<String>,

        /// Directory the export artifacts are written to
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,

        /// Emit the skipped-sheet report as JSON
        #[arg(long)]
        json: bool,

        /// Show verbose steps
        #[arg(short, long)]
        verbose: bool,
    },

    /// List a workbook's sheets and their columns
    Sheets {
        /// Path to the workbook (.xlsx)
        file: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    // Every failure surfaces as a single error line; the process never panics.
    if let Err(err) = run(cli) {
        eprintln!("{} {err}", "An error occurred:".red().bold());
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Analyze {
            file,
            required,
            case_sensitive,
            date_column,
            out_dir,
            json,
            verbose,
        } => cli::analyze(file, required, case_sensitive, date_column, out_dir, json, verbose)?,

        Commands::Sheets { file } => cli::sheets(file)?,
    }
    Ok(())
}
