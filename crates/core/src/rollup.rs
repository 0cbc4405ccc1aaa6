//! Warehouse monthly rollup: expected restock units per shipping location,
//! product and month of predicted purchase.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::forecast::ForecastTable;
use crate::domain::transaction::Transaction;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyDemand {
    pub shipping_location: String,
    pub product_name: String,
    /// `YYYY-MM` of the predicted purchase date.
    pub month: String,
    pub expected_units: u32,
}

#[derive(Clone, Copy)]
struct LatestShipment<'a> {
    purchased_on: NaiveDate,
    shipping_location: Option<&'a str>,
}

/// Counts forecasts per (location, product, month).
///
/// Each forecast takes the shipping location of the household's latest dated
/// purchase of that product; on equal dates the later input row wins. Forecasts
/// with no known location are left out.
pub fn monthly_rollup(table: &ForecastTable, transactions: &[Transaction]) -> Vec<MonthlyDemand> {
    let mut latest: HashMap<(&str, &str), LatestShipment<'_>> = HashMap::new();
    for transaction in transactions {
        let Some(purchased_on) = transaction.purchased_on else {
            continue;
        };
        let key = (transaction.household_id.as_str(), transaction.product_name.as_str());
        let candidate = LatestShipment {
            purchased_on,
            shipping_location: transaction.shipping_location.as_deref(),
        };
        latest
            .entry(key)
            .and_modify(|current| {
                if candidate.purchased_on >= current.purchased_on {
                    *current = candidate;
                }
            })
            .or_insert(candidate);
    }

    let mut counts: BTreeMap<(String, String, String), u32> = BTreeMap::new();
    let mut unlocated = 0usize;
    for record in table.records() {
        let location = latest
            .get(&(record.household_id.as_str(), record.product_name.as_str()))
            .and_then(|shipment| shipment.shipping_location)
            .map(str::trim)
            .filter(|location| !location.is_empty());
        let Some(location) = location else {
            unlocated += 1;
            continue;
        };

        let month = record.predicted_next_date.format("%Y-%m").to_string();
        *counts
            .entry((location.to_string(), record.product_name.0.clone(), month))
            .or_insert(0) += 1;
    }

    let mut rollup: Vec<MonthlyDemand> = counts
        .into_iter()
        .map(|((shipping_location, product_name, month), expected_units)| MonthlyDemand {
            shipping_location,
            product_name,
            month,
            expected_units,
        })
        .collect();

    rollup.sort_by(|left, right| {
        left.month
            .cmp(&right.month)
            .then_with(|| left.shipping_location.cmp(&right.shipping_location))
            .then_with(|| right.expected_units.cmp(&left.expected_units))
            .then_with(|| left.product_name.cmp(&right.product_name))
    });

    info!(
        event_name = "rollup.monthly.completed",
        forecasts = table.len(),
        groups = rollup.len(),
        unlocated_forecasts = unlocated,
        "warehouse monthly rollup computed"
    );

    rollup
}
