pub mod atomic;
pub mod columns;
pub mod error;
pub mod forecast;
pub mod reference;
pub mod rollup;
pub mod transactions;

pub use atomic::check_writable;
pub use error::StoreError;
pub use forecast::{read_forecast_table, write_forecast_table, FORECAST_COLUMNS};
pub use reference::read_reference_table;
pub use rollup::{write_rollup, ROLLUP_COLUMNS};
pub use transactions::{inspect_transaction_headers, parse_purchase_date, read_transactions};
