mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::normalize::{NormalizeEarningsArgs, NormalizeRevenueArgs};
use commands::projection::ProjectArgs;

/// Monthly revenue projection and P/E valuation
#[derive(Parser)]
#[command(
    name = "revproj",
    version,
    about = "Monthly revenue projection and P/E valuation",
    long_about = "Projects a full year of monthly revenue from reported months using \
                  year-over-year and month-over-month growth, rolls it into quarterly \
                  income under margin and tax assumptions, and values the share on \
                  annual EPS times a P/E multiple."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log verbosity on stderr (RUST_LOG takes precedence)
    #[arg(long, default_value = "warn", global = true)]
    log_level: LogLevel,
}

#[derive(Subcommand)]
enum Commands {
    /// Project a year of revenue, quarterly EPS and the estimated price
    Project(ProjectArgs),
    /// Normalize a raw monthly revenue feed into sorted month records
    NormalizeRevenue(NormalizeRevenueArgs),
    /// Normalize a raw quarterly earnings feed into disclosed quarters
    NormalizeEarnings(NormalizeEarningsArgs),
    /// List built-in sample companies
    Samples,
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

impl LogLevel {
    fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

fn init_logging(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_directive()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Project(args) => commands::projection::run_project(args),
        Commands::NormalizeRevenue(args) => commands::normalize::run_normalize_revenue(args),
        Commands::NormalizeEarnings(args) => commands::normalize::run_normalize_earnings(args),
        Commands::Samples => commands::samples::run_samples(),
        Commands::Version => {
            println!("revproj {}", env!("CARGO_PKG_VERSION"));
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
