//! Forecast table persistence.
//!
//! One row per (household, product). Dates are ISO `YYYY-MM-DD`, an unmatched
//! product leaves `estimated_household_size` empty, and `forecast_status`
//! trails the canonical columns.

use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;
use restock_core::domain::forecast::{ForecastRecord, ForecastStatus, ForecastTable};
use restock_core::domain::reference::HouseholdSize;
use restock_core::domain::transaction::{HouseholdId, ProductName};
use tracing::info;

use crate::atomic::replace_file;
use crate::columns::{self, Column};
use crate::error::StoreError;
use crate::transactions::{headers, open};

pub const FORECAST_COLUMNS: [&str; 8] = [
    "household_id",
    "product_name",
    "estimated_household_size",
    "avg_days_between_orders",
    "consumption_days",
    "last_purchase_date",
    "predicted_next_date",
    "forecast_status",
];

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn write_forecast_table(path: &Path, table: &ForecastTable) -> Result<(), StoreError> {
    let csv_error = |source| StoreError::Csv { path: path.to_path_buf(), source };

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(FORECAST_COLUMNS).map_err(csv_error)?;
    for record in table.records() {
        let avg_days = format_days(record.avg_days_between_orders);
        let consumption_days = format_days(record.consumption_days);
        let last_purchase = record.last_purchase_date.format(DATE_FORMAT).to_string();
        let predicted_next = record.predicted_next_date.format(DATE_FORMAT).to_string();
        writer
            .write_record([
                record.household_id.as_str(),
                record.product_name.as_str(),
                record.estimated_household_size.map_or("", HouseholdSize::label),
                avg_days.as_str(),
                consumption_days.as_str(),
                last_purchase.as_str(),
                predicted_next.as_str(),
                record.status.as_str(),
            ])
            .map_err(csv_error)?;
    }
    let contents = writer.into_inner().map_err(|error| StoreError::Persist {
        path: path.to_path_buf(),
        source: error.into_error(),
    })?;

    replace_file(path, &contents)?;
    info!(
        event_name = "store.forecast.persisted",
        path = %path.display(),
        rows = table.len(),
        "forecast table written"
    );
    Ok(())
}

/// Reads a table written by [`write_forecast_table`]. Files without a
/// `forecast_status` column are accepted; their status is inferred from
/// whether a household size was estimated and whether the average interval
/// is zero.
pub fn read_forecast_table(path: &Path) -> Result<ForecastTable, StoreError> {
    let mut reader = open(path)?;
    let layout = ForecastLayout::resolve(headers(&mut reader, path)?, path)?;

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|source| StoreError::Csv { path: path.to_path_buf(), source })?;
        records.push(layout.record(&record, path)?);
    }

    let table = ForecastTable::from_records(records)?;
    info!(
        event_name = "store.forecast.loaded",
        path = %path.display(),
        rows = table.len(),
        "forecast table loaded"
    );
    Ok(table)
}

/// `{:?}` keeps a decimal point on whole numbers (`10.0`) and prints the
/// shortest round-tripping form otherwise.
fn format_days(value: f64) -> String {
    format!("{value:?}")
}

const HOUSEHOLD_SIZE: Column = Column { name: "estimated_household_size", aliases: &[] };
const AVG_DAYS: Column = Column { name: "avg_days_between_orders", aliases: &[] };
const CONSUMPTION_DAYS: Column = Column { name: "consumption_days", aliases: &[] };
const LAST_PURCHASE: Column = Column { name: "last_purchase_date", aliases: &[] };
const PREDICTED_NEXT: Column = Column { name: "predicted_next_date", aliases: &[] };
const STATUS: Column = Column { name: "forecast_status", aliases: &[] };

struct ForecastLayout {
    household_id: usize,
    product_name: usize,
    household_size: usize,
    avg_days: usize,
    consumption_days: usize,
    last_purchase: usize,
    predicted_next: usize,
    status: Option<usize>,
}

impl ForecastLayout {
    fn resolve(headers: StringRecord, path: &Path) -> Result<Self, StoreError> {
        Ok(Self {
            household_id: columns::require(&headers, columns::HOUSEHOLD_ID, path)?,
            product_name: columns::require(&headers, columns::PRODUCT_NAME, path)?,
            household_size: columns::require(&headers, HOUSEHOLD_SIZE, path)?,
            avg_days: columns::require(&headers, AVG_DAYS, path)?,
            consumption_days: columns::require(&headers, CONSUMPTION_DAYS, path)?,
            last_purchase: columns::require(&headers, LAST_PURCHASE, path)?,
            predicted_next: columns::require(&headers, PREDICTED_NEXT, path)?,
            status: columns::position(&headers, STATUS),
        })
    }

    fn record(&self, record: &StringRecord, path: &Path) -> Result<ForecastRecord, StoreError> {
        let line = columns::line_of(record);
        let text = |index: usize, column: Column| {
            let value = columns::cell(record, index);
            if value.is_empty() {
                Err(StoreError::MissingField { path: path.to_path_buf(), line, column: column.name })
            } else {
                Ok(value)
            }
        };
        let invalid_number = |column: Column, value: &str| StoreError::InvalidNumber {
            path: path.to_path_buf(),
            line,
            column: column.name.to_string(),
            value: value.to_string(),
        };
        let number = |index: usize, column: Column| {
            let value = text(index, column)?;
            value.parse::<f64>().map_err(|_| invalid_number(column, value))
        };
        let date = |index: usize, column: Column| {
            let value = text(index, column)?;
            NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| StoreError::InvalidDate {
                path: path.to_path_buf(),
                line,
                value: value.to_string(),
                format: DATE_FORMAT.to_string(),
            })
        };

        let invalid_value = |column: Column, value: &str| StoreError::InvalidValue {
            path: path.to_path_buf(),
            line,
            column: column.name.to_string(),
            value: value.to_string(),
        };

        let raw_size = columns::cell(record, self.household_size);
        let estimated_household_size = if raw_size.is_empty() {
            None
        } else {
            let size = raw_size
                .parse::<HouseholdSize>()
                .map_err(|_| invalid_value(HOUSEHOLD_SIZE, raw_size))?;
            Some(size)
        };
        let avg_days_between_orders = number(self.avg_days, AVG_DAYS)?;

        // Tables written before the status column existed carry no label.
        let status = match columns::optional_cell(record, self.status) {
            Some(raw) => ForecastStatus::parse(raw).ok_or_else(|| invalid_value(STATUS, raw))?,
            None if estimated_household_size.is_none() => ForecastStatus::NoReferenceData,
            None if avg_days_between_orders == 0.0 => ForecastStatus::InsufficientHistory,
            None => ForecastStatus::Matched,
        };

        Ok(ForecastRecord {
            household_id: HouseholdId(text(self.household_id, columns::HOUSEHOLD_ID)?.to_string()),
            product_name: ProductName(text(self.product_name, columns::PRODUCT_NAME)?.to_string()),
            estimated_household_size,
            avg_days_between_orders,
            consumption_days: number(self.consumption_days, CONSUMPTION_DAYS)?,
            last_purchase_date: date(self.last_purchase, LAST_PURCHASE)?,
            predicted_next_date: date(self.predicted_next, PREDICTED_NEXT)?,
            status,
        })
    }
}
