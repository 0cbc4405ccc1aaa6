use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "restock.toml";
pub const NESTED_CONFIG_FILE: &str = "config/restock.toml";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub data: DataConfig,
    pub input: InputConfig,
    pub logging: LoggingConfig,
}

/// Locations of the flat files a pipeline run reads and replaces.
#[derive(Clone, Debug)]
pub struct DataConfig {
    pub transactions_path: PathBuf,
    pub reference_path: PathBuf,
    pub forecast_path: PathBuf,
    pub rollup_path: PathBuf,
}

#[derive(Clone, Debug)]
pub struct InputConfig {
    /// strftime pattern for transaction dates. Values carrying a time part
    /// are accepted as well and truncated to the calendar date.
    pub date_format: String,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub transactions_path: Option<PathBuf>,
    pub reference_path: Option<PathBuf>,
    pub forecast_path: Option<PathBuf>,
    pub rollup_path: Option<PathBuf>,
    pub date_format: Option<String>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: DataConfig {
                transactions_path: PathBuf::from("data/transactions.csv"),
                reference_path: PathBuf::from("data/consumption_table.csv"),
                forecast_path: PathBuf::from("output/predicted_purchases.csv"),
                rollup_path: PathBuf::from("output/warehouse_forecast.csv"),
            },
            input: InputConfig { date_format: "%Y-%m-%d".to_string() },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(data) = patch.data {
            if let Some(transactions_path) = data.transactions_path {
                self.data.transactions_path = transactions_path;
            }
            if let Some(reference_path) = data.reference_path {
                self.data.reference_path = reference_path;
            }
            if let Some(forecast_path) = data.forecast_path {
                self.data.forecast_path = forecast_path;
            }
            if let Some(rollup_path) = data.rollup_path {
                self.data.rollup_path = rollup_path;
            }
        }

        if let Some(input) = patch.input {
            if let Some(date_format) = input.date_format {
                self.input.date_format = date_format;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("RESTOCK_DATA_TRANSACTIONS_PATH") {
            self.data.transactions_path = PathBuf::from(value);
        }
        if let Some(value) = read_env("RESTOCK_DATA_REFERENCE_PATH") {
            self.data.reference_path = PathBuf::from(value);
        }
        if let Some(value) = read_env("RESTOCK_DATA_FORECAST_PATH") {
            self.data.forecast_path = PathBuf::from(value);
        }
        if let Some(value) = read_env("RESTOCK_DATA_ROLLUP_PATH") {
            self.data.rollup_path = PathBuf::from(value);
        }

        if let Some(value) = read_env("RESTOCK_INPUT_DATE_FORMAT") {
            self.input.date_format = value;
        }

        let log_level =
            read_env("RESTOCK_LOGGING_LEVEL").or_else(|| read_env("RESTOCK_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("RESTOCK_LOGGING_FORMAT").or_else(|| read_env("RESTOCK_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(transactions_path) = overrides.transactions_path {
            self.data.transactions_path = transactions_path;
        }
        if let Some(reference_path) = overrides.reference_path {
            self.data.reference_path = reference_path;
        }
        if let Some(forecast_path) = overrides.forecast_path {
            self.data.forecast_path = forecast_path;
        }
        if let Some(rollup_path) = overrides.rollup_path {
            self.data.rollup_path = rollup_path;
        }
        if let Some(date_format) = overrides.date_format {
            self.input.date_format = date_format;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_data(&self.data)?;
        validate_input(&self.input)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

/// Config file that `load` would read for the given explicit path, if any.
pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from(NESTED_CONFIG_FILE)]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_data(data: &DataConfig) -> Result<(), ConfigError> {
    let paths = [
        ("data.transactions_path", &data.transactions_path),
        ("data.reference_path", &data.reference_path),
        ("data.forecast_path", &data.forecast_path),
        ("data.rollup_path", &data.rollup_path),
    ];
    for (key, path) in paths {
        if path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(format!("{key} must not be empty")));
        }
    }

    if data.forecast_path == data.transactions_path || data.forecast_path == data.reference_path {
        return Err(ConfigError::Validation(
            "data.forecast_path must not overwrite an input file".to_string(),
        ));
    }
    if data.rollup_path == data.forecast_path {
        return Err(ConfigError::Validation(
            "data.rollup_path must differ from data.forecast_path".to_string(),
        ));
    }

    Ok(())
}

fn validate_input(input: &InputConfig) -> Result<(), ConfigError> {
    let format = input.date_format.trim();
    if format.is_empty() {
        return Err(ConfigError::Validation("input.date_format must not be empty".to_string()));
    }

    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(ConfigError::Validation(format!(
            "input.date_format `{format}` is not a valid strftime pattern"
        )));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    data: Option<DataPatch>,
    input: Option<InputPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DataPatch {
    transactions_path: Option<PathBuf>,
    reference_path: Option<PathBuf>,
    forecast_path: Option<PathBuf>,
    rollup_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct InputPatch {
    date_format: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};

    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    const ENV_KEYS: [&str; 10] = [
        "RESTOCK_DATA_TRANSACTIONS_PATH",
        "RESTOCK_DATA_REFERENCE_PATH",
        "RESTOCK_DATA_FORECAST_PATH",
        "RESTOCK_DATA_ROLLUP_PATH",
        "RESTOCK_INPUT_DATE_FORMAT",
        "RESTOCK_LOGGING_LEVEL",
        "RESTOCK_LOGGING_FORMAT",
        "RESTOCK_LOG_LEVEL",
        "RESTOCK_LOG_FORMAT",
        "TEST_RESTOCK_DATA_DIR",
    ];

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars() {
        for var in ENV_KEYS {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn defaults_are_valid() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars();

        let config = AppConfig::load(LoadOptions::default())
            .map_err(|err| format!("config load failed: {err}"))?;

        ensure(config.input.date_format == "%Y-%m-%d", "default date format should be ISO")?;
        ensure(
            matches!(config.logging.format, LogFormat::Compact),
            "default logging format should be compact",
        )
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars();

        env::set_var("TEST_RESTOCK_DATA_DIR", "/srv/restock");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("restock.toml");
            fs::write(
                &path,
                r#"
[data]
transactions_path = "${TEST_RESTOCK_DATA_DIR}/orders.csv"
reference_path = "${TEST_RESTOCK_DATA_DIR}/consumption.csv"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.data.transactions_path == PathBuf::from("/srv/restock/orders.csv"),
                "transactions path should be interpolated from environment",
            )?;
            ensure(
                config.data.reference_path == PathBuf::from("/srv/restock/consumption.csv"),
                "reference path should be interpolated from environment",
            )
        })();

        clear_vars();
        result
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars();

        env::set_var("RESTOCK_LOG_LEVEL", "warn");
        env::set_var("RESTOCK_LOG_FORMAT", "json");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Json),
                "json logging format should be set from env var",
            )
        })();

        clear_vars();
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars();

        env::set_var("RESTOCK_DATA_FORECAST_PATH", "from-env/forecast.csv");
        env::set_var("RESTOCK_INPUT_DATE_FORMAT", "%d/%m/%Y");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("restock.toml");
            fs::write(
                &path,
                r#"
[data]
transactions_path = "from-file/transactions.csv"
forecast_path = "from-file/forecast.csv"

[input]
date_format = "%Y/%m/%d"

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    transactions_path: Some(PathBuf::from("from-override/transactions.csv")),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.data.transactions_path == PathBuf::from("from-override/transactions.csv"),
                "override transactions path should win",
            )?;
            ensure(
                config.data.forecast_path == PathBuf::from("from-env/forecast.csv"),
                "env forecast path should win over file",
            )?;
            ensure(config.input.date_format == "%d/%m/%Y", "env date format should win")?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")
        })();

        clear_vars();
        result
    }

    #[test]
    fn missing_required_file_is_reported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars();

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let missing = dir.path().join("absent.toml");
        let result = AppConfig::load(LoadOptions {
            config_path: Some(missing),
            require_file: true,
            ..LoadOptions::default()
        });

        ensure(
            matches!(result, Err(ConfigError::MissingConfigFile(_))),
            "a required but absent config file should fail",
        )
    }

    #[test]
    fn invalid_date_format_fails_validation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars();

        let result = AppConfig::load(LoadOptions {
            overrides: ConfigOverrides {
                date_format: Some("%Y-%Q".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        });

        let has_message = matches!(
            result,
            Err(ConfigError::Validation(ref message)) if message.contains("input.date_format")
        );
        ensure(has_message, "validation failure should mention input.date_format")
    }

    #[test]
    fn forecast_path_cannot_replace_an_input() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars();

        let result = AppConfig::load(LoadOptions {
            overrides: ConfigOverrides {
                transactions_path: Some(PathBuf::from("same.csv")),
                forecast_path: Some(PathBuf::from("same.csv")),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        });

        let has_message = matches!(
            result,
            Err(ConfigError::Validation(ref message)) if message.contains("data.forecast_path")
        );
        ensure(has_message, "overlapping output path should be rejected")
    }

    #[test]
    fn invalid_log_level_is_rejected() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars();

        env::set_var("RESTOCK_LOGGING_LEVEL", "verbose");
        let result = AppConfig::load(LoadOptions::default());
        clear_vars();

        let has_message = matches!(
            result,
            Err(ConfigError::Validation(ref message)) if message.contains("logging.level")
        );
        ensure(has_message, "unknown log level should be rejected")
    }
}
