use chrono::{Days, NaiveDate};

use crate::domain::forecast::{ForecastRecord, ForecastStatus};
use crate::domain::pattern::PurchasePattern;
use crate::pipeline::estimator::HouseholdSizeEstimate;

/// Projects the next purchase for a pattern. Total: every pattern yields a
/// record, and an unmatched product collapses onto its last purchase date.
pub fn forecast(
    pattern: &PurchasePattern,
    estimate: Option<HouseholdSizeEstimate>,
) -> ForecastRecord {
    let status = match estimate {
        None => ForecastStatus::NoReferenceData,
        Some(_) if !pattern.has_observed_interval() => ForecastStatus::InsufficientHistory,
        Some(_) => ForecastStatus::Matched,
    };
    let consumption_days = estimate.map_or(0.0, |estimate| estimate.consumption_days);

    ForecastRecord {
        household_id: pattern.household_id.clone(),
        product_name: pattern.product_name.clone(),
        estimated_household_size: estimate.map(|estimate| estimate.household_size),
        avg_days_between_orders: pattern.avg_days_between_orders,
        consumption_days,
        last_purchase_date: pattern.last_purchase_date,
        predicted_next_date: project_next_date(pattern.last_purchase_date, consumption_days),
        status,
    }
}

/// `last + consumption_days`, keeping whole days only. Fractional intervals
/// (e.g. 1.5 days for milk) land on the calendar day they fall within.
pub fn project_next_date(last_purchase_date: NaiveDate, consumption_days: f64) -> NaiveDate {
    if !consumption_days.is_finite() || consumption_days <= 0.0 {
        return last_purchase_date;
    }
    let whole_days = consumption_days.floor() as u64;
    last_purchase_date.checked_add_days(Days::new(whole_days)).unwrap_or(NaiveDate::MAX)
}
