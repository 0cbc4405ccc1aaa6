use chrono::NaiveDate;
use restock_core::config::LoadOptions;
use restock_core::errors::ApplicationError;
use restock_core::restock::{RestockItem, RestockQuery};
use restock_store::read_forecast_table;
use serde::Serialize;

use crate::commands::{load_config, CommandResult};

const COMMAND: &str = "due";

#[derive(Debug, Serialize)]
struct DueReport<'a> {
    command: &'static str,
    status: &'static str,
    household_id: &'a str,
    reference_date: NaiveDate,
    items: Vec<RestockItem>,
}

/// Lists products the household is due or overdue to restock as of
/// `reference_date`.
pub fn run(options: LoadOptions, household_id: &str, reference_date: NaiveDate) -> CommandResult {
    let config = match load_config(COMMAND, options) {
        Ok(config) => config,
        Err(result) => return result,
    };

    let table = match read_forecast_table(&config.data.forecast_path) {
        Ok(table) => table,
        Err(error) => return CommandResult::from_error(COMMAND, &ApplicationError::from(error)),
    };

    let items = RestockQuery::new(&table).due_items(household_id, reference_date);
    CommandResult::report(
        COMMAND,
        &DueReport {
            command: COMMAND,
            status: "ok",
            household_id: household_id.trim(),
            reference_date,
            items,
        },
    )
}
