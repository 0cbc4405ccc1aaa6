use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::transaction::{HouseholdId, ProductName};
use crate::errors::DomainError;

/// Observed buying rhythm for one (household, product) pair.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PurchasePattern {
    pub household_id: HouseholdId,
    pub product_name: ProductName,
    pub first_purchase_date: NaiveDate,
    pub last_purchase_date: NaiveDate,
    pub purchase_count: u32,
    /// Purchases that carried a date. Undated rows add to `purchase_count`
    /// only.
    pub dated_purchases: u32,
    /// Zero when only one purchase was seen. Read zero as "no observed
    /// interval", never as "bought continuously".
    pub avg_days_between_orders: f64,
}

impl PurchasePattern {
    pub fn new(
        household_id: HouseholdId,
        product_name: ProductName,
        first_purchase_date: NaiveDate,
        last_purchase_date: NaiveDate,
        purchase_count: u32,
    ) -> Result<Self, DomainError> {
        if purchase_count == 0 {
            return Err(DomainError::InvariantViolation(format!(
                "purchase pattern ({household_id}, {product_name}) needs at least one purchase"
            )));
        }
        if last_purchase_date < first_purchase_date {
            return Err(DomainError::InvariantViolation(format!(
                "purchase pattern ({household_id}, {product_name}) ends on {last_purchase_date} \
                 before it starts on {first_purchase_date}"
            )));
        }

        Ok(Self {
            avg_days_between_orders: average_interval_days(
                first_purchase_date,
                last_purchase_date,
                purchase_count,
            ),
            household_id,
            product_name,
            first_purchase_date,
            last_purchase_date,
            purchase_count,
            dated_purchases: purchase_count,
        })
    }

    /// Whether the pattern carries a real inter-purchase interval. It takes
    /// two dated purchases; undated rows never open a span.
    pub fn has_observed_interval(&self) -> bool {
        self.dated_purchases > 1
    }
}

/// Mean gap between consecutive purchases, spread evenly over the span.
/// A single purchase has no gap and yields 0.
pub fn average_interval_days(first: NaiveDate, last: NaiveDate, purchase_count: u32) -> f64 {
    if purchase_count <= 1 {
        return 0.0;
    }
    let span_days = (last - first).num_days().max(0) as f64;
    span_days / f64::from(purchase_count - 1)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::domain::transaction::{HouseholdId, ProductName};
    use crate::errors::DomainError;

    use super::{average_interval_days, PurchasePattern};

    fn date(value: &str) -> NaiveDate {
        value.parse().expect("valid test date")
    }

    #[test]
    fn single_purchase_has_zero_interval() {
        assert_eq!(average_interval_days(date("2022-03-01"), date("2022-03-01"), 1), 0.0);
    }

    #[test]
    fn interval_spreads_span_over_gaps() {
        assert_eq!(average_interval_days(date("2022-01-01"), date("2022-01-21"), 3), 10.0);
        assert_eq!(average_interval_days(date("2022-01-01"), date("2022-01-08"), 3), 3.5);
    }

    #[test]
    fn repeated_same_day_purchases_average_to_zero() {
        assert_eq!(average_interval_days(date("2022-05-05"), date("2022-05-05"), 4), 0.0);
    }

    #[test]
    fn new_rejects_reversed_dates() {
        let error = PurchasePattern::new(
            HouseholdId("H1".to_string()),
            ProductName("Chips".to_string()),
            date("2022-02-01"),
            date("2022-01-01"),
            2,
        )
        .expect_err("reversed dates should fail");

        assert!(matches!(error, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn new_rejects_zero_purchases() {
        let result = PurchasePattern::new(
            HouseholdId("H1".to_string()),
            ProductName("Chips".to_string()),
            date("2022-01-01"),
            date("2022-01-01"),
            0,
        );

        assert!(result.is_err());
    }

    #[test]
    fn new_derives_average_interval() {
        let pattern = PurchasePattern::new(
            HouseholdId("H1".to_string()),
            ProductName("ProductX".to_string()),
            date("2022-01-01"),
            date("2022-01-21"),
            3,
        )
        .expect("valid pattern");

        assert_eq!(pattern.avg_days_between_orders, 10.0);
        assert_eq!(pattern.dated_purchases, 3);
        assert!(pattern.has_observed_interval());
    }

    #[test]
    fn one_dated_purchase_has_no_observed_interval() {
        let mut pattern = PurchasePattern::new(
            HouseholdId("H1".to_string()),
            ProductName("ProductX".to_string()),
            date("2022-03-01"),
            date("2022-03-01"),
            2,
        )
        .expect("valid pattern");
        pattern.dated_purchases = 1;

        assert_eq!(pattern.avg_days_between_orders, 0.0);
        assert!(!pattern.has_observed_interval());
    }
}
