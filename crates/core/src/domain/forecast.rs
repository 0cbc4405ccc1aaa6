use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::reference::HouseholdSize;
use crate::domain::transaction::{HouseholdId, ProductName};
use crate::errors::DomainError;

/// How a forecast's consumption interval was obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastStatus {
    /// Observed interval matched against a reference row.
    Matched,
    /// Product absent from the reference table; consumption days default to 0
    /// and the predicted date equals the last purchase.
    NoReferenceData,
    /// Fewer than two dated purchases. The reference match ran against an
    /// interval of 0, so the estimate carries no real signal.
    InsufficientHistory,
}

impl ForecastStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Matched => "matched",
            Self::NoReferenceData => "no_reference_data",
            Self::InsufficientHistory => "insufficient_history",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "matched" => Some(Self::Matched),
            "no_reference_data" => Some(Self::NoReferenceData),
            "insufficient_history" => Some(Self::InsufficientHistory),
            _ => None,
        }
    }
}

impl std::fmt::Display for ForecastStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    pub household_id: HouseholdId,
    pub product_name: ProductName,
    pub estimated_household_size: Option<HouseholdSize>,
    pub avg_days_between_orders: f64,
    pub consumption_days: f64,
    pub last_purchase_date: NaiveDate,
    pub predicted_next_date: NaiveDate,
    pub status: ForecastStatus,
}

impl ForecastRecord {
    /// True when the record has no step to project with and its predicted
    /// date is only a copy of the last purchase.
    pub fn is_degenerate(&self) -> bool {
        self.status == ForecastStatus::NoReferenceData || self.consumption_days <= 0.0
    }
}

/// Materialised output of one pipeline run, keyed by (household, product).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ForecastTable {
    records: Vec<ForecastRecord>,
}

impl ForecastTable {
    pub fn from_records(records: Vec<ForecastRecord>) -> Result<Self, DomainError> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if !seen.insert((record.household_id.as_str(), record.product_name.as_str())) {
                return Err(DomainError::DuplicateForecastKey {
                    household_id: record.household_id.0.clone(),
                    product_name: record.product_name.0.clone(),
                });
            }
        }
        Ok(Self { records })
    }

    pub fn records(&self) -> &[ForecastRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn for_household<'a>(
        &'a self,
        household_id: &'a str,
    ) -> impl Iterator<Item = &'a ForecastRecord> + 'a {
        self.records.iter().filter(move |record| record.household_id.as_str() == household_id)
    }

    pub fn count_by_status(&self, status: ForecastStatus) -> usize {
        self.records.iter().filter(|record| record.status == status).count()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::domain::reference::HouseholdSize;
    use crate::domain::transaction::{HouseholdId, ProductName};
    use crate::errors::DomainError;

    use super::{ForecastRecord, ForecastStatus, ForecastTable};

    fn record(household: &str, product: &str, status: ForecastStatus) -> ForecastRecord {
        let day = NaiveDate::from_ymd_opt(2022, 1, 21).expect("valid date");
        ForecastRecord {
            household_id: HouseholdId(household.to_string()),
            product_name: ProductName(product.to_string()),
            estimated_household_size: Some(HouseholdSize::Two),
            avg_days_between_orders: 10.0,
            consumption_days: 10.0,
            last_purchase_date: day,
            predicted_next_date: day,
            status,
        }
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let error = ForecastTable::from_records(vec![
            record("H1", "Chips", ForecastStatus::Matched),
            record("H1", "Chips", ForecastStatus::Matched),
        ])
        .expect_err("duplicate key should fail");

        assert!(matches!(error, DomainError::DuplicateForecastKey { .. }));
    }

    #[test]
    fn same_product_for_different_households_is_allowed() {
        let table = ForecastTable::from_records(vec![
            record("H1", "Chips", ForecastStatus::Matched),
            record("H2", "Chips", ForecastStatus::NoReferenceData),
        ])
        .expect("distinct keys");

        assert_eq!(table.len(), 2);
        assert_eq!(table.for_household("H2").count(), 1);
        assert_eq!(table.count_by_status(ForecastStatus::NoReferenceData), 1);
    }

    #[test]
    fn missing_reference_is_degenerate() {
        let mut unmatched = record("H2", "ProductY", ForecastStatus::NoReferenceData);
        unmatched.consumption_days = 0.0;
        unmatched.estimated_household_size = None;

        assert!(unmatched.is_degenerate());
        assert!(!record("H1", "ProductX", ForecastStatus::Matched).is_degenerate());
    }

    #[test]
    fn status_labels_are_snake_case() {
        assert_eq!(ForecastStatus::NoReferenceData.to_string(), "no_reference_data");
        assert_eq!(ForecastStatus::InsufficientHistory.as_str(), "insufficient_history");
    }
}
