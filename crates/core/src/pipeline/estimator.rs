//! Household-size estimation by nearest reference interval.

use serde::{Deserialize, Serialize};

use crate::domain::reference::{ConsumptionLookup, ConsumptionRow, HouseholdSize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HouseholdSizeEstimate {
    pub household_size: HouseholdSize,
    pub consumption_days: f64,
}

/// Matches observed purchase intervals against a reference lookup.
pub struct HouseholdSizeEstimator<'a, L: ConsumptionLookup + ?Sized> {
    lookup: &'a L,
}

impl<'a, L: ConsumptionLookup + ?Sized> HouseholdSizeEstimator<'a, L> {
    pub fn new(lookup: &'a L) -> Self {
        Self { lookup }
    }

    /// Returns `None` when the product has no reference row. Otherwise a
    /// bucket is always chosen, however poor the fit.
    pub fn estimate(
        &self,
        product_name: &str,
        avg_days_between_orders: f64,
    ) -> Option<HouseholdSizeEstimate> {
        self.lookup.lookup(product_name).map(|row| nearest_bucket(row, avg_days_between_orders))
    }
}

/// Bucket whose reference interval is closest to `observed_days`.
///
/// Exact ties resolve to the lowest bucket index (1 before 2 … before 6+).
pub fn nearest_bucket(row: &ConsumptionRow, observed_days: f64) -> HouseholdSizeEstimate {
    let mut best = HouseholdSize::One;
    let mut best_distance = (observed_days - row.interval(best)).abs();

    for size in HouseholdSize::ALL.into_iter().skip(1) {
        let distance = (observed_days - row.interval(size)).abs();
        if distance < best_distance {
            best = size;
            best_distance = distance;
        }
    }

    HouseholdSizeEstimate { household_size: best, consumption_days: row.interval(best) }
}
