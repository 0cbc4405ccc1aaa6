use thiserror::Error;

use crate::config::ConfigError;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum DomainError {
    #[error("unknown household size bucket `{0}` (expected 1|2|3|4|5|6|6+)")]
    UnknownHouseholdSize(String),
    #[error("invalid consumption interval {value} for `{product_name}` bucket {bucket}")]
    InvalidConsumptionInterval { product_name: String, bucket: String, value: f64 },
    #[error("duplicate forecast key ({household_id}, {product_name})")]
    DuplicateForecastKey { household_id: String, product_name: String },
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("malformed input: {0}")]
    MalformedInput(String),
    #[error("storage failure: {0}")]
    Storage(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

impl ApplicationError {
    /// Stable machine-readable label used in command payloads.
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Domain(_) => "domain_invariant",
            Self::MalformedInput(_) => "malformed_input",
            Self::Storage(_) => "storage",
            Self::Configuration(_) => "config_validation",
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Configuration(_) => 2,
            Self::MalformedInput(_) => 3,
            Self::Storage(_) => 4,
            Self::Domain(_) => 5,
        }
    }
}

impl From<ConfigError> for ApplicationError {
    fn from(value: ConfigError) -> Self {
        Self::Configuration(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::config::ConfigError;
    use crate::errors::{ApplicationError, DomainError};

    #[test]
    fn domain_error_keeps_its_message_through_application_error() {
        let error = ApplicationError::from(DomainError::DuplicateForecastKey {
            household_id: "H1".to_owned(),
            product_name: "Cola 500ml".to_owned(),
        });

        assert_eq!(error.to_string(), "duplicate forecast key (H1, Cola 500ml)");
        assert_eq!(error.error_class(), "domain_invariant");
        assert_eq!(error.exit_code(), 5);
    }

    #[test]
    fn malformed_input_maps_to_its_own_exit_code() {
        let error = ApplicationError::MalformedInput("missing column `tid`".to_owned());

        assert_eq!(error.error_class(), "malformed_input");
        assert_eq!(error.exit_code(), 3);
        assert!(error.to_string().contains("missing column"));
    }

    #[test]
    fn config_error_maps_to_configuration() {
        let error =
            ApplicationError::from(ConfigError::MissingConfigFile(PathBuf::from("restock.toml")));

        assert!(matches!(error, ApplicationError::Configuration(_)));
        assert_eq!(error.error_class(), "config_validation");
        assert_eq!(error.exit_code(), 2);
    }

    #[test]
    fn storage_error_is_distinct_from_input_problems() {
        let error = ApplicationError::Storage("disk full".to_owned());

        assert_eq!(error.error_class(), "storage");
        assert_eq!(error.exit_code(), 4);
    }
}
