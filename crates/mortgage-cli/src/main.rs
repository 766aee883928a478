mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commands::mortgage::{LoanArgs, ScenarioArgs};

/// Fixed-rate mortgage amortization
#[derive(Parser)]
#[command(
    name = "mortgage",
    version,
    about = "Fixed-rate mortgage amortization",
    long_about = "Builds full amortization schedules with decimal precision. Supports \
                  monthly and biweekly payments, PMI, recurring extra payments, one-time \
                  lump payments, current balance estimates and extra-payment scenarios."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Path to a JSON scenario configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Full calculation: summary figures plus the schedule
    Amortize(LoanArgs),
    /// Period-by-period schedule only
    Schedule(LoanArgs),
    /// Outstanding principal today for a loan bought in the past
    CurrentBalance(LoanArgs),
    /// Compare recurring extra payments against the no-extra baseline
    Scenarios(ScenarioArgs),
    /// Periodic and monthly payment only
    Payment(LoanArgs),
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

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Amortize(args) => commands::mortgage::run_amortize(args),
        Commands::Schedule(args) => commands::mortgage::run_schedule(args),
        Commands::CurrentBalance(args) => commands::mortgage::run_current_balance(args),
        Commands::Scenarios(args) => commands::mortgage::run_scenarios(args, cli.config.as_deref()),
        Commands::Payment(args) => commands::mortgage::run_payment(args),
        Commands::Version => {
            println!("mortgage {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
