mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::allowances::{MealAllowanceArgs, VehicleArgs};
use commands::position::PositionArgs;
use commands::safety_check::SafetyCheckArgs;
use commands::wfh::{WfhArgs, WfhHoursArgs};

/// Personal tax position and deduction risk calculations
#[derive(Parser)]
#[command(
    name = "taxpos",
    version,
    about = "Personal tax position and deduction risk calculations",
    long_about = "A CLI for estimating a personal income tax position with decimal \
                  precision. Aggregates income and deduction records, applies a \
                  bracket schedule, computes work-from-home and car deductions, and \
                  rates deduction claims against occupation benchmarks."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log progress to stderr. Repeat for more detail (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the tax position for a period from income and deduction records
    Position(PositionArgs),
    /// Calculate the work-from-home deduction (fixed rate or actual cost)
    Wfh(WfhArgs),
    /// Check a WFH hours figure for plausibility
    WfhHours(WfhHoursArgs),
    /// Rate deduction claims against occupation benchmarks
    SafetyCheck(SafetyCheckArgs),
    /// Cents-per-km car expense deduction
    Vehicle(VehicleArgs),
    /// Compare overtime meal claims with the reasonable amount
    MealAllowance(MealAllowanceArgs),
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

fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Position(args) => commands::position::run_position(args),
        Commands::Wfh(args) => commands::wfh::run_wfh(args),
        Commands::WfhHours(args) => commands::wfh::run_wfh_hours(args),
        Commands::SafetyCheck(args) => commands::safety_check::run_safety_check(args),
        Commands::Vehicle(args) => commands::allowances::run_vehicle(args),
        Commands::MealAllowance(args) => commands::allowances::run_meal_allowance(args),
        Commands::Version => {
            println!("taxpos {}", env!("CARGO_PKG_VERSION"));
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
