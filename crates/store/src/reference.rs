use std::path::Path;

use restock_core::domain::reference::{ConsumptionRow, HouseholdSize, ReferenceTable};
use restock_core::errors::DomainError;
use tracing::info;

use crate::columns;
use crate::error::StoreError;
use crate::transactions::{headers, open};

/// Loads the per-product consumption table. Every bucket column
/// (`1` through `6` and `6+`) is required and must hold a finite,
/// non-negative number of days.
pub fn read_reference_table(path: &Path) -> Result<ReferenceTable, StoreError> {
    let mut reader = open(path)?;
    let header_row = headers(&mut reader, path)?;

    let product_column = columns::require(&header_row, columns::PRODUCT_NAME, path)?;
    let mut bucket_columns = [0usize; 7];
    for size in HouseholdSize::ALL {
        let label = size.label();
        bucket_columns[size.index()] = columns::require(
            &header_row,
            columns::Column { name: label, aliases: &[] },
            path,
        )?;
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|source| StoreError::Csv { path: path.to_path_buf(), source })?;
        let line = columns::line_of(&record);

        let product_name = columns::cell(&record, product_column);
        if product_name.is_empty() {
            return Err(StoreError::MissingField {
                path: path.to_path_buf(),
                line,
                column: columns::PRODUCT_NAME.name,
            });
        }

        let mut intervals = [0.0f64; 7];
        for size in HouseholdSize::ALL {
            let raw = columns::cell(&record, bucket_columns[size.index()]);
            intervals[size.index()] = raw.parse::<f64>().map_err(|_| StoreError::InvalidNumber {
                path: path.to_path_buf(),
                line,
                column: size.label().to_string(),
                value: raw.to_string(),
            })?;
        }

        let row = ConsumptionRow::new(product_name, intervals).map_err(|error| match error {
            DomainError::InvalidConsumptionInterval { bucket, value, .. } => {
                StoreError::InvalidNumber {
                    path: path.to_path_buf(),
                    line,
                    column: bucket,
                    value: value.to_string(),
                }
            }
            other => StoreError::Domain(other),
        })?;
        rows.push(row);
    }

    let rows_read = rows.len();
    let table = ReferenceTable::from_rows(rows);
    info!(
        event_name = "store.reference.loaded",
        path = %path.display(),
        rows = rows_read,
        products = table.len(),
        "reference consumption table loaded"
    );
    Ok(table)
}
