//! Reference consumption table: expected days per purchase cycle for each
//! product, broken down by household size.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::DomainError;

/// Household-size bucket. Declaration order is the tie-break order used when
/// two buckets fit an observed interval equally well.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HouseholdSize {
    #[serde(rename = "1")]
    One,
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "4")]
    Four,
    #[serde(rename = "5")]
    Five,
    #[serde(rename = "6")]
    Six,
    #[serde(rename = "6+")]
    SixPlus,
}

impl HouseholdSize {
    pub const ALL: [HouseholdSize; 7] = [
        HouseholdSize::One,
        HouseholdSize::Two,
        HouseholdSize::Three,
        HouseholdSize::Four,
        HouseholdSize::Five,
        HouseholdSize::Six,
        HouseholdSize::SixPlus,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::One => "1",
            Self::Two => "2",
            Self::Three => "3",
            Self::Four => "4",
            Self::Five => "5",
            Self::Six => "6",
            Self::SixPlus => "6+",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for HouseholdSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for HouseholdSize {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|size| size.label() == trimmed)
            .ok_or_else(|| DomainError::UnknownHouseholdSize(trimmed.to_string()))
    }
}

/// Expected consumption intervals for one product, indexed by
/// [`HouseholdSize::index`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionRow {
    pub product_name: String,
    intervals: [f64; 7],
}

impl ConsumptionRow {
    pub fn new(product_name: impl Into<String>, intervals: [f64; 7]) -> Result<Self, DomainError> {
        let product_name = product_name.into();
        for size in HouseholdSize::ALL {
            let value = intervals[size.index()];
            if !value.is_finite() || value < 0.0 {
                return Err(DomainError::InvalidConsumptionInterval {
                    product_name,
                    bucket: size.label().to_string(),
                    value,
                });
            }
        }
        Ok(Self { product_name, intervals })
    }

    pub fn interval(&self, size: HouseholdSize) -> f64 {
        self.intervals[size.index()]
    }
}

/// Resolves a product name to its reference row.
///
/// The estimator only talks to this trait, so a normalising or fuzzy matcher
/// can replace the exact lookup without touching estimation logic.
pub trait ConsumptionLookup {
    fn lookup(&self, product_name: &str) -> Option<&ConsumptionRow>;
}

/// Exact, case-sensitive product lookup. `"Cola 500ml "` and `"cola 500ml"`
/// do not match `"Cola 500ml"`.
#[derive(Clone, Debug, Default)]
pub struct ReferenceTable {
    rows: HashMap<String, ConsumptionRow>,
}

impl ReferenceTable {
    /// Builds the table keeping the first row seen for each product name.
    pub fn from_rows(rows: impl IntoIterator<Item = ConsumptionRow>) -> Self {
        let mut table = Self::default();
        for row in rows {
            if table.rows.contains_key(&row.product_name) {
                warn!(
                    event_name = "reference.duplicate_product",
                    product_name = %row.product_name,
                    "duplicate reference row ignored; first occurrence wins"
                );
                continue;
            }
            table.rows.insert(row.product_name.clone(), row);
        }
        table
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl ConsumptionLookup for ReferenceTable {
    fn lookup(&self, product_name: &str) -> Option<&ConsumptionRow> {
        self.rows.get(product_name)
    }
}
