use std::path::Path;

use restock_core::rollup::MonthlyDemand;
use tracing::info;

use crate::atomic::replace_file;
use crate::error::StoreError;

pub const ROLLUP_COLUMNS: [&str; 4] =
    ["shipping_location", "product_name", "month", "expected_units"];

pub fn write_rollup(path: &Path, rows: &[MonthlyDemand]) -> Result<(), StoreError> {
    let csv_error = |source| StoreError::Csv { path: path.to_path_buf(), source };

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(ROLLUP_COLUMNS).map_err(csv_error)?;
    for row in rows {
        let units = row.expected_units.to_string();
        writer
            .write_record([
                row.shipping_location.as_str(),
                row.product_name.as_str(),
                row.month.as_str(),
                units.as_str(),
            ])
            .map_err(csv_error)?;
    }
    let contents = writer.into_inner().map_err(|error| StoreError::Persist {
        path: path.to_path_buf(),
        source: error.into_error(),
    })?;

    replace_file(path, &contents)?;
    info!(
        event_name = "store.rollup.persisted",
        path = %path.display(),
        rows = rows.len(),
        "warehouse rollup written"
    );
    Ok(())
}
