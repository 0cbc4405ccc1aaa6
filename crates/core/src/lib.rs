pub mod config;
pub mod domain;
pub mod errors;
pub mod pipeline;
pub mod restock;
pub mod rollup;

pub use config::{AppConfig, ConfigOverrides, LoadOptions, LogFormat};
pub use domain::forecast::{ForecastRecord, ForecastStatus, ForecastTable};
pub use domain::pattern::PurchasePattern;
pub use domain::reference::{ConsumptionLookup, ConsumptionRow, HouseholdSize, ReferenceTable};
pub use domain::transaction::{HouseholdId, ProductName, Transaction};
pub use errors::{ApplicationError, DomainError};
pub use pipeline::{ForecastPipeline, PipelineRun, RunSummary};
pub use restock::{RestockItem, RestockQuery};
pub use rollup::{monthly_rollup, MonthlyDemand};
