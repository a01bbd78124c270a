mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use commands::ratios::{ComputeArgs, SnapshotArgs};
use commands::statements::{AnalyzeArgs, HistoryArgs};

/// Valuation ratios from company financial snapshots
#[derive(Parser)]
#[command(
    name = "vratio",
    version,
    about = "Valuation ratios from company financial snapshots",
    long_about = "Computes ROE, ROIC, P/E, EV/EBIT, EV/EBITDA and EV/FCF with decimal \
                  precision, either from a single snapshot or from locally stored \
                  statement datasets. Ratios whose inputs are missing or zero are \
                  reported as undefined with the reason."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log verbosity (RUST_LOG takes precedence)
    #[arg(long, default_value = "warn", global = true)]
    log_level: LogLevel,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute valuation ratios for one snapshot
    Compute(ComputeArgs),
    /// Enterprise value (market cap + debt - cash)
    EnterpriseValue(SnapshotArgs),
    /// Effective tax rate (tax provision / pretax income)
    TaxRate(SnapshotArgs),
    /// Compute ratios for tickers from a directory of statement datasets
    Analyze(AnalyzeArgs),
    /// Per-period ROE and ROIC for one ticker
    History(HistoryArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

fn init_logging(level: LogLevel) {
    let level: Level = level.into();
    // stdout carries the report, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_ascii_lowercase())),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Compute(args) => commands::ratios::run_compute(args),
        Commands::EnterpriseValue(args) => commands::ratios::run_enterprise_value(args),
        Commands::TaxRate(args) => commands::ratios::run_tax_rate(args),
        Commands::Analyze(args) => commands::statements::run_analyze(args),
        Commands::History(args) => commands::statements::run_history(args),
        Commands::Version => {
            println!("vratio {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
