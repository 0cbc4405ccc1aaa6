use restock_core::config::{AppConfig, LoadOptions};
use restock_core::errors::ApplicationError;
use restock_core::rollup::monthly_rollup;
use restock_store::{read_forecast_table, read_transactions, write_rollup};

use crate::commands::{load_config, CommandResult};

const COMMAND: &str = "rollup";

pub fn run(options: LoadOptions) -> CommandResult {
    let config = match load_config(COMMAND, options) {
        Ok(config) => config,
        Err(result) => return result,
    };

    match execute(&config) {
        Ok(groups) => CommandResult::success(
            COMMAND,
            format!(
                "wrote {groups} warehouse demand rows to `{}`",
                config.data.rollup_path.display()
            ),
        ),
        Err(error) => CommandResult::from_error(COMMAND, &error),
    }
}

fn execute(config: &AppConfig) -> Result<usize, ApplicationError> {
    let table = read_forecast_table(&config.data.forecast_path)?;
    let transactions =
        read_transactions(&config.data.transactions_path, &config.input.date_format)?;

    let rows = monthly_rollup(&table, &transactions);
    write_rollup(&config.data.rollup_path, &rows)?;
    Ok(rows.len())
}
