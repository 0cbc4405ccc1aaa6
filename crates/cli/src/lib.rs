pub mod commands;
pub mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use restock_core::config::{AppConfig, ConfigOverrides, LoadOptions};

#[derive(Debug, Parser)]
#[command(
    name = "restock",
    about = "Household restock forecasting CLI",
    long_about = "Forecast when households will next buy each product, list due restocks, and roll forecasts up into warehouse demand.",
    after_help = "Examples:\n  restock predict\n  restock due --household H1 --as-of 2022-02-01\n  restock rollup\n  restock doctor --json"
)]
pub struct Cli {
    #[arg(long, global = true, value_name = "PATH", help = "Config file (default: restock.toml, then config/restock.toml)")]
    config: Option<PathBuf>,
    #[arg(long, global = true, value_name = "LEVEL", help = "Log level: trace|debug|info|warn|error")]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Build the forecast table from the transaction history and reference table")]
    Predict {
        #[arg(long, value_name = "PATH", help = "Transaction history CSV")]
        transactions: Option<PathBuf>,
        #[arg(long, value_name = "PATH", help = "Consumption reference CSV")]
        reference: Option<PathBuf>,
        #[arg(long, value_name = "PATH", help = "Forecast table to write")]
        output: Option<PathBuf>,
    },
    #[command(about = "List products a household is due or overdue to restock")]
    Due {
        #[arg(long, help = "Household id to query")]
        household: String,
        #[arg(long, value_name = "YYYY-MM-DD", help = "Reference date (default: today)")]
        as_of: Option<NaiveDate>,
    },
    #[command(about = "Aggregate forecasts into monthly demand per shipping location")]
    Rollup {
        #[arg(long, value_name = "PATH", help = "Rollup table to write")]
        output: Option<PathBuf>,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config, input files, and output location")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

impl Cli {
    fn load_options(&self, overrides: ConfigOverrides) -> LoadOptions {
        LoadOptions {
            config_path: self.config.clone(),
            require_file: self.config.is_some(),
            overrides: ConfigOverrides { log_level: self.log_level.clone(), ..overrides },
        }
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let overrides = match &cli.command {
        Command::Predict { transactions, reference, output } => ConfigOverrides {
            transactions_path: transactions.clone(),
            reference_path: reference.clone(),
            forecast_path: output.clone(),
            ..ConfigOverrides::default()
        },
        Command::Rollup { output } => {
            ConfigOverrides { rollup_path: output.clone(), ..ConfigOverrides::default() }
        }
        _ => ConfigOverrides::default(),
    };
    let options = cli.load_options(overrides);

    // Config errors surface through the command payload; logging falls back
    // to defaults until then.
    let logging_config = AppConfig::load(options.clone()).unwrap_or_default();
    if let Err(error) = logging::init(&logging_config) {
        eprintln!("{error:#}");
    }

    let result = match cli.command {
        Command::Predict { .. } => commands::predict::run(options),
        Command::Due { household, as_of } => {
            let reference_date = as_of.unwrap_or_else(|| Local::now().date_naive());
            commands::due::run(options, &household, reference_date)
        }
        Command::Rollup { .. } => commands::rollup::run(options),
        Command::Config => commands::config::run(options),
        Command::Doctor { json } => commands::doctor::run(options, json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
