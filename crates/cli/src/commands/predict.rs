use restock_core::config::{AppConfig, LoadOptions};
use restock_core::errors::ApplicationError;
use restock_core::pipeline::{ForecastPipeline, RunSummary};
use restock_store::{read_reference_table, read_transactions, write_forecast_table};
use serde::Serialize;

use crate::commands::{load_config, CommandResult};

const COMMAND: &str = "predict";

#[derive(Debug, Serialize)]
struct PredictReport {
    command: &'static str,
    status: &'static str,
    forecast_path: String,
    forecasts_written: usize,
    summary: RunSummary,
}

pub fn run(options: LoadOptions) -> CommandResult {
    let config = match load_config(COMMAND, options) {
        Ok(config) => config,
        Err(result) => return result,
    };

    match execute(&config) {
        Ok(summary) => CommandResult::report(
            COMMAND,
            &PredictReport {
                command: COMMAND,
                status: "ok",
                forecast_path: config.data.forecast_path.display().to_string(),
                forecasts_written: summary.patterns,
                summary,
            },
        ),
        Err(error) => CommandResult::from_error(COMMAND, &error),
    }
}

/// Reads both inputs before anything is written, so a malformed file never
/// replaces the previous forecast table.
fn execute(config: &AppConfig) -> Result<RunSummary, ApplicationError> {
    let transactions =
        read_transactions(&config.data.transactions_path, &config.input.date_format)?;
    let reference = read_reference_table(&config.data.reference_path)?;

    let run = ForecastPipeline::new(&reference).run(&transactions)?;
    write_forecast_table(&config.data.forecast_path, &run.table)?;

    Ok(run.summary)
}
