//! Header resolution shared by the CSV readers.
//!
//! Matching ignores ASCII case and surrounding whitespace, and a leading byte
//! order mark on the first header is dropped. Each column also answers to the
//! names used by the retail exports the history files come from.

use std::path::Path;

use csv::StringRecord;

use crate::error::StoreError;

#[derive(Clone, Copy, Debug)]
pub struct Column {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
}

pub const HOUSEHOLD_ID: Column = Column { name: "household_id", aliases: &["tid"] };
pub const PRODUCT_NAME: Column = Column { name: "product_name", aliases: &["product"] };
pub const TRANSACTION_DATE: Column = Column { name: "transaction_date", aliases: &["rundate"] };
pub const SHIPPING_LOCATION: Column = Column { name: "shipping_location", aliases: &[] };
pub const CATEGORY: Column = Column { name: "category", aliases: &[] };
pub const BRAND: Column = Column { name: "brand", aliases: &[] };
pub const PRICE: Column = Column { name: "price", aliases: &["price_current"] };

/// Index of `column` in `headers`. The canonical name beats an alias when a
/// file carries both.
pub fn position(headers: &StringRecord, column: Column) -> Option<usize> {
    find(headers, column.name)
        .or_else(|| column.aliases.iter().find_map(|alias| find(headers, alias)))
}

pub fn require(headers: &StringRecord, column: Column, path: &Path) -> Result<usize, StoreError> {
    position(headers, column)
        .ok_or_else(|| StoreError::MissingColumn { path: path.to_path_buf(), column: column.name })
}

fn find(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|header| normalize(header).eq_ignore_ascii_case(name))
}

fn normalize(header: &str) -> &str {
    header.trim_start_matches('\u{feff}').trim()
}

/// Trimmed cell content; cells past the end of a short row read as empty.
pub fn cell(record: &StringRecord, index: usize) -> &str {
    record.get(index).map_or("", str::trim)
}

pub fn optional_cell(record: &StringRecord, index: Option<usize>) -> Option<&str> {
    index.map(|index| cell(record, index)).filter(|value| !value.is_empty())
}

pub fn line_of(record: &StringRecord) -> u64 {
    record.position().map_or(0, csv::Position::line)
}

#[cfg(test)]
mod tests {
    use csv::StringRecord;

    use super::{position, HOUSEHOLD_ID, PRICE, PRODUCT_NAME, TRANSACTION_DATE};

    #[test]
    fn original_export_headers_resolve() {
        let headers = StringRecord::from(vec!["tid", "PRODUCT_NAME", "RunDate", "PRICE_CURRENT"]);

        assert_eq!(position(&headers, HOUSEHOLD_ID), Some(0));
        assert_eq!(position(&headers, PRODUCT_NAME), Some(1));
        assert_eq!(position(&headers, TRANSACTION_DATE), Some(2));
        assert_eq!(position(&headers, PRICE), Some(3));
    }

    #[test]
    fn canonical_name_wins_over_alias() {
        let headers = StringRecord::from(vec!["Product", "Product_Name"]);

        assert_eq!(position(&headers, PRODUCT_NAME), Some(1));
    }

    #[test]
    fn byte_order_mark_and_padding_are_ignored() {
        let headers = StringRecord::from(vec!["\u{feff}household_id", " product_name "]);

        assert_eq!(position(&headers, HOUSEHOLD_ID), Some(0));
        assert_eq!(position(&headers, PRODUCT_NAME), Some(1));
        assert_eq!(position(&headers, TRANSACTION_DATE), None);
    }
}
