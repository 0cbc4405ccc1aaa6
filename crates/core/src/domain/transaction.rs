use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HouseholdId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProductName(pub String);

impl HouseholdId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ProductName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for HouseholdId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for ProductName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One purchase line from the retail history.
///
/// `purchased_on` is `None` when the source row had an empty date cell. Such
/// rows still count as purchases but cannot anchor first/last dates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub household_id: HouseholdId,
    pub product_name: ProductName,
    pub purchased_on: Option<NaiveDate>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub shipping_location: Option<String>,
}

impl Transaction {
    pub fn new(
        household_id: impl Into<String>,
        product_name: impl Into<String>,
        purchased_on: Option<NaiveDate>,
    ) -> Self {
        Self {
            household_id: HouseholdId(household_id.into()),
            product_name: ProductName(product_name.into()),
            purchased_on,
            price: None,
            category: None,
            brand: None,
            shipping_location: None,
        }
    }

    pub fn with_shipping_location(mut self, location: impl Into<String>) -> Self {
        self.shipping_location = Some(location.into());
        self
    }
}
