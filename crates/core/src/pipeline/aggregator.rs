//! Groups raw transactions into one purchase pattern per (household, product).

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::domain::pattern::{average_interval_days, PurchasePattern};
use crate::domain::transaction::{HouseholdId, ProductName, Transaction};

#[derive(Clone, Debug, PartialEq)]
pub struct Aggregation {
    /// Patterns ordered by (household, product).
    pub patterns: Vec<PurchasePattern>,
    /// Groups whose rows all lacked a date; they produce no pattern.
    pub undated_groups: Vec<(HouseholdId, ProductName)>,
}

#[derive(Default)]
struct GroupAccumulator {
    first: Option<NaiveDate>,
    last: Option<NaiveDate>,
    count: u32,
    dated: u32,
}

impl GroupAccumulator {
    fn observe(&mut self, date: Option<NaiveDate>) {
        self.count = self.count.saturating_add(1);
        let Some(date) = date else {
            return;
        };
        self.dated = self.dated.saturating_add(1);
        self.first = Some(self.first.map_or(date, |first| first.min(date)));
        self.last = Some(self.last.map_or(date, |last| last.max(date)));
    }
}

/// Builds purchase patterns from the full transaction history.
///
/// Rows without a date are counted toward `purchase_count` but ignored for
/// first/last dates and never make up an observed interval on their own.
pub fn aggregate(transactions: &[Transaction]) -> Aggregation {
    let mut groups: BTreeMap<(&HouseholdId, &ProductName), GroupAccumulator> = BTreeMap::new();
    for transaction in transactions {
        groups
            .entry((&transaction.household_id, &transaction.product_name))
            .or_default()
            .observe(transaction.purchased_on);
    }

    let mut patterns = Vec::with_capacity(groups.len());
    let mut undated_groups = Vec::new();

    for ((household_id, product_name), group) in groups {
        let (Some(first), Some(last)) = (group.first, group.last) else {
            debug!(
                event_name = "pipeline.aggregate.undated_group",
                household_id = %household_id,
                product_name = %product_name,
                purchase_count = group.count,
                "group has no dated purchase; skipped"
            );
            undated_groups.push((household_id.clone(), product_name.clone()));
            continue;
        };

        patterns.push(PurchasePattern {
            household_id: household_id.clone(),
            product_name: product_name.clone(),
            first_purchase_date: first,
            last_purchase_date: last,
            purchase_count: group.count,
            dated_purchases: group.dated,
            avg_days_between_orders: average_interval_days(first, last, group.count),
        });
    }

    info!(
        event_name = "pipeline.aggregate.completed",
        transactions = transactions.len(),
        patterns = patterns.len(),
        undated_groups = undated_groups.len(),
        "purchase history aggregated"
    );

    Aggregation { patterns, undated_groups }
}
