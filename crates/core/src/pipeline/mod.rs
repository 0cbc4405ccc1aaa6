//! Batch forecast pipeline.
//!
//! transactions → purchase patterns → household-size estimates → forecast
//! table. Each run starts from scratch and owns nothing beyond its inputs; the
//! reference table is borrowed and never mutated.

pub mod aggregator;
pub mod estimator;
pub mod forecaster;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::forecast::{ForecastStatus, ForecastTable};
use crate::domain::reference::ConsumptionLookup;
use crate::domain::transaction::Transaction;
use crate::errors::DomainError;

pub use aggregator::{aggregate, Aggregation};
pub use estimator::{nearest_bucket, HouseholdSizeEstimate, HouseholdSizeEstimator};
pub use forecaster::{forecast, project_next_date};

/// Counters describing one pipeline run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub transactions_read: usize,
    pub patterns: usize,
    pub undated_groups_skipped: usize,
    pub matched: usize,
    pub no_reference_data: usize,
    pub insufficient_history: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PipelineRun {
    pub table: ForecastTable,
    pub summary: RunSummary,
}

pub struct ForecastPipeline<'a, L: ConsumptionLookup + ?Sized> {
    estimator: HouseholdSizeEstimator<'a, L>,
}

impl<'a, L: ConsumptionLookup + ?Sized> ForecastPipeline<'a, L> {
    pub fn new(reference: &'a L) -> Self {
        Self { estimator: HouseholdSizeEstimator::new(reference) }
    }

    pub fn run(&self, transactions: &[Transaction]) -> Result<PipelineRun, DomainError> {
        let aggregation = aggregate(transactions);

        let mut records = Vec::with_capacity(aggregation.patterns.len());
        for pattern in &aggregation.patterns {
            let estimate = self
                .estimator
                .estimate(pattern.product_name.as_str(), pattern.avg_days_between_orders);
            if estimate.is_none() {
                info!(
                    event_name = "pipeline.estimate.missing_reference",
                    household_id = %pattern.household_id,
                    product_name = %pattern.product_name,
                    "product has no reference row; consumption days default to 0"
                );
            }
            records.push(forecast(pattern, estimate));
        }

        let table = ForecastTable::from_records(records)?;
        let summary = RunSummary {
            transactions_read: transactions.len(),
            patterns: aggregation.patterns.len(),
            undated_groups_skipped: aggregation.undated_groups.len(),
            matched: table.count_by_status(ForecastStatus::Matched),
            no_reference_data: table.count_by_status(ForecastStatus::NoReferenceData),
            insufficient_history: table.count_by_status(ForecastStatus::InsufficientHistory),
        };

        info!(
            event_name = "pipeline.run.completed",
            transactions = summary.transactions_read,
            forecasts = table.len(),
            matched = summary.matched,
            no_reference_data = summary.no_reference_data,
            insufficient_history = summary.insufficient_history,
            "forecast pipeline completed"
        );

        Ok(PipelineRun { table, summary })
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::domain::forecast::ForecastStatus;
    use crate::domain::reference::{ConsumptionLookup, ConsumptionRow, HouseholdSize, ReferenceTable};
    use crate::domain::transaction::Transaction;

    use super::ForecastPipeline;

    fn date(value: &str) -> Option<NaiveDate> {
        Some(value.parse().expect("valid test date"))
    }

    fn reference() -> ReferenceTable {
        ReferenceTable::from_rows([ConsumptionRow::new(
            "ProductX",
            [20.0, 10.0, 8.0, 6.0, 5.0, 4.0, 3.0],
        )
        .expect("valid row")])
    }

    fn history() -> Vec<Transaction> {
        vec![
            Transaction::new("H1", "ProductX", date("2022-01-01")),
            Transaction::new("H1", "ProductX", date("2022-01-11")),
            Transaction::new("H1", "ProductX", date("2022-01-21")),
            Transaction::new("H2", "ProductY", date("2022-03-01")),
            Transaction::new("H3", "ProductX", date("2022-02-10")),
        ]
    }

    #[test]
    fn every_pattern_becomes_exactly_one_forecast() {
        let reference = reference();
        let run = ForecastPipeline::new(&reference).run(&history()).expect("pipeline run");

        assert_eq!(run.table.len(), run.summary.patterns);
        assert_eq!(run.summary.patterns, 3);
        assert_eq!(run.summary.transactions_read, 5);
        assert_eq!(run.summary.matched, 1);
        assert_eq!(run.summary.no_reference_data, 1);
        assert_eq!(run.summary.insufficient_history, 1);
    }

    #[test]
    fn matched_and_unmatched_rows_follow_the_documented_defaults() {
        let reference = reference();
        let run = ForecastPipeline::new(&reference).run(&history()).expect("pipeline run");

        let h1 = run.table.for_household("H1").next().expect("H1 forecast");
        assert_eq!(h1.estimated_household_size, Some(HouseholdSize::Two));
        assert_eq!(h1.consumption_days, 10.0);
        assert_eq!(h1.predicted_next_date, date("2022-01-31").expect("date"));

        let h2 = run.table.for_household("H2").next().expect("H2 forecast");
        assert_eq!(h2.status, ForecastStatus::NoReferenceData);
        assert_eq!(h2.estimated_household_size, None);
        assert_eq!(h2.avg_days_between_orders, 0.0);
        assert_eq!(h2.predicted_next_date, date("2022-03-01").expect("date"));
    }

    #[test]
    fn predictions_never_precede_last_purchase() {
        let reference = reference();
        let run = ForecastPipeline::new(&reference).run(&history()).expect("pipeline run");

        assert!(run
            .table
            .records()
            .iter()
            .all(|record| record.predicted_next_date >= record.last_purchase_date));
    }

    #[test]
    fn undated_row_beside_one_dated_purchase_is_insufficient_history() {
        let reference = reference();
        let transactions = vec![
            Transaction::new("H1", "ProductX", date("2022-03-01")),
            Transaction::new("H1", "ProductX", None),
        ];

        let run = ForecastPipeline::new(&reference).run(&transactions).expect("pipeline run");
        let record = &run.table.records()[0];

        assert_eq!(record.status, ForecastStatus::InsufficientHistory);
        assert_eq!(record.avg_days_between_orders, 0.0);
        assert_eq!(run.summary.matched, 0);
        assert_eq!(run.summary.insufficient_history, 1);
    }

    #[test]
    fn rerunning_is_idempotent() {
        let reference = reference();
        let pipeline = ForecastPipeline::new(&reference);

        let first = pipeline.run(&history()).expect("first run");
        let second = pipeline.run(&history()).expect("second run");

        assert_eq!(first, second);
    }

    struct TrimmingLookup(ReferenceTable);

    impl ConsumptionLookup for TrimmingLookup {
        fn lookup(&self, product_name: &str) -> Option<&ConsumptionRow> {
            self.0.lookup(product_name.trim())
        }
    }

    #[test]
    fn lookup_strategy_can_be_swapped() {
        let lookup = TrimmingLookup(reference());
        let transactions = vec![
            Transaction::new("H1", "ProductX ", date("2022-01-01")),
            Transaction::new("H1", "ProductX ", date("2022-01-11")),
        ];

        let run = ForecastPipeline::new(&lookup).run(&transactions).expect("pipeline run");

        assert_eq!(run.summary.matched, 1);
    }
}
