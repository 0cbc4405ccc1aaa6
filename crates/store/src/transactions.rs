use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use chrono::{NaiveDate, NaiveTime};
use csv::StringRecord;
use restock_core::domain::transaction::Transaction;
use tracing::info;

use crate::columns::{self, Column};
use crate::error::StoreError;

const TIME_FORMATS: [&str; 3] = ["%H:%M:%S%.f", "%H:%M:%S", "%H:%M"];

/// Loads the purchase history.
///
/// An empty date cell yields an undated transaction. Any other cell that does
/// not parse aborts the whole read.
pub fn read_transactions(path: &Path, date_format: &str) -> Result<Vec<Transaction>, StoreError> {
    let mut reader = open(path)?;
    let layout = TransactionLayout::resolve(headers(&mut reader, path)?, path)?;

    let mut transactions = Vec::new();
    let mut undated = 0usize;
    for result in reader.records() {
        let record = result.map_err(|source| StoreError::Csv { path: path.to_path_buf(), source })?;
        let transaction = layout.transaction(&record, path, date_format)?;
        if transaction.purchased_on.is_none() {
            undated += 1;
        }
        transactions.push(transaction);
    }

    info!(
        event_name = "store.transactions.loaded",
        path = %path.display(),
        rows = transactions.len(),
        undated_rows = undated,
        "transaction history loaded"
    );
    Ok(transactions)
}

/// Opens the history and checks the required columns without reading rows.
pub fn inspect_transaction_headers(path: &Path) -> Result<(), StoreError> {
    let mut reader = open(path)?;
    TransactionLayout::resolve(headers(&mut reader, path)?, path).map(drop)
}

/// Parses a purchase date with `date_format`, also accepting a trailing time
/// of day (`2022-01-21 14:05:00`, `2022-01-21T14:05`) which is discarded.
pub fn parse_purchase_date(value: &str, date_format: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(value, date_format) {
        return Some(date);
    }
    let (date, remainder) = NaiveDate::parse_and_remainder(value, date_format).ok()?;
    let time = remainder.strip_prefix(|c: char| c == ' ' || c == 'T')?;
    TIME_FORMATS
        .iter()
        .any(|format| NaiveTime::parse_from_str(time.trim(), format).is_ok())
        .then_some(date)
}

struct TransactionLayout {
    household_id: usize,
    product_name: usize,
    transaction_date: usize,
    shipping_location: Option<usize>,
    category: Option<usize>,
    brand: Option<usize>,
    price: Option<usize>,
}

impl TransactionLayout {
    fn resolve(headers: StringRecord, path: &Path) -> Result<Self, StoreError> {
        Ok(Self {
            household_id: columns::require(&headers, columns::HOUSEHOLD_ID, path)?,
            product_name: columns::require(&headers, columns::PRODUCT_NAME, path)?,
            transaction_date: columns::require(&headers, columns::TRANSACTION_DATE, path)?,
            shipping_location: columns::position(&headers, columns::SHIPPING_LOCATION),
            category: columns::position(&headers, columns::CATEGORY),
            brand: columns::position(&headers, columns::BRAND),
            price: columns::position(&headers, columns::PRICE),
        })
    }

    fn transaction(
        &self,
        record: &StringRecord,
        path: &Path,
        date_format: &str,
    ) -> Result<Transaction, StoreError> {
        let line = columns::line_of(record);
        let household_id = required(record, self.household_id, columns::HOUSEHOLD_ID, path, line)?;
        let product_name = required(record, self.product_name, columns::PRODUCT_NAME, path, line)?;

        let raw_date = columns::cell(record, self.transaction_date);
        let purchased_on = if raw_date.is_empty() {
            None
        } else {
            let date = parse_purchase_date(raw_date, date_format).ok_or_else(|| {
                StoreError::InvalidDate {
                    path: path.to_path_buf(),
                    line,
                    value: raw_date.to_string(),
                    format: date_format.to_string(),
                }
            })?;
            Some(date)
        };

        let price = columns::optional_cell(record, self.price)
            .map(|raw| {
                raw.parse::<f64>().map_err(|_| StoreError::InvalidNumber {
                    path: path.to_path_buf(),
                    line,
                    column: columns::PRICE.name.to_string(),
                    value: raw.to_string(),
                })
            })
            .transpose()?;

        let mut transaction = Transaction::new(household_id, product_name, purchased_on);
        transaction.price = price;
        transaction.category = columns::optional_cell(record, self.category).map(str::to_string);
        transaction.brand = columns::optional_cell(record, self.brand).map(str::to_string);
        transaction.shipping_location =
            columns::optional_cell(record, self.shipping_location).map(str::to_string);
        Ok(transaction)
    }
}

fn required<'r>(
    record: &'r StringRecord,
    index: usize,
    column: Column,
    path: &Path,
    line: u64,
) -> Result<&'r str, StoreError> {
    let value = columns::cell(record, index);
    if value.is_empty() {
        return Err(StoreError::MissingField { path: path.to_path_buf(), line, column: column.name });
    }
    Ok(value)
}

pub(crate) fn open(path: &Path) -> Result<csv::Reader<BufReader<File>>, StoreError> {
    let file =
        File::open(path).map_err(|source| StoreError::Io { path: path.to_path_buf(), source })?;
    Ok(csv::ReaderBuilder::new().flexible(true).from_reader(BufReader::new(file)))
}

pub(crate) fn headers(
    reader: &mut csv::Reader<BufReader<File>>,
    path: &Path,
) -> Result<StringRecord, StoreError> {
    reader
        .headers()
        .cloned()
        .map_err(|source| StoreError::Csv { path: path.to_path_buf(), source })
}
