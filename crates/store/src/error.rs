use std::path::PathBuf;

use restock_core::errors::{ApplicationError, DomainError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not read `{path}`: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("invalid CSV in `{path}`: {source}")]
    Csv { path: PathBuf, source: csv::Error },
    #[error("`{path}` is missing required column `{column}`")]
    MissingColumn { path: PathBuf, column: &'static str },
    #[error("`{path}` line {line}: cannot parse date `{value}` with format `{format}`")]
    InvalidDate { path: PathBuf, line: u64, value: String, format: String },
    #[error("`{path}` line {line}: column `{column}` holds invalid number `{value}`")]
    InvalidNumber { path: PathBuf, line: u64, column: String, value: String },
    #[error("`{path}` line {line}: column `{column}` holds unrecognised value `{value}`")]
    InvalidValue { path: PathBuf, line: u64, column: String, value: String },
    #[error("`{path}` line {line}: column `{column}` is empty")]
    MissingField { path: PathBuf, line: u64, column: &'static str },
    #[error("could not write `{path}`: {source}")]
    Persist { path: PathBuf, source: std::io::Error },
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl From<StoreError> for ApplicationError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Domain(error) => Self::Domain(error),
            StoreError::Persist { .. } => Self::Storage(value.to_string()),
            other => Self::MalformedInput(other.to_string()),
        }
    }
}
