//! Due/overdue restock list for a single household.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::forecast::{ForecastStatus, ForecastTable};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestockItem {
    pub product_name: String,
    pub predicted_date: NaiveDate,
    pub days_overdue: i64,
    /// Lets consumers tell a real due date from a degenerate forecast.
    pub status: ForecastStatus,
}

pub struct RestockQuery<'a> {
    table: &'a ForecastTable,
}

impl<'a> RestockQuery<'a> {
    pub fn new(table: &'a ForecastTable) -> Self {
        Self { table }
    }

    /// Products of `household_id` predicted on or before `reference_date`,
    /// earliest first. The caller supplies the reference date; nothing here
    /// reads the clock.
    ///
    /// Unknown or blank household ids produce an empty list.
    pub fn due_items(&self, household_id: &str, reference_date: NaiveDate) -> Vec<RestockItem> {
        let household_id = household_id.trim();
        if household_id.is_empty() {
            return Vec::new();
        }

        let mut items: Vec<RestockItem> = self
            .table
            .for_household(household_id)
            .filter(|record| record.predicted_next_date <= reference_date)
            .map(|record| RestockItem {
                product_name: record.product_name.0.clone(),
                predicted_date: record.predicted_next_date,
                days_overdue: (reference_date - record.predicted_next_date).num_days(),
                status: record.status,
            })
            .collect();

        items.sort_by(|left, right| {
            left.predicted_date
                .cmp(&right.predicted_date)
                .then_with(|| left.product_name.cmp(&right.product_name))
        });
        items
    }
}
