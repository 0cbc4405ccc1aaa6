use std::env;
use std::fs;
use std::path::Path;

use restock_core::config::{resolve_config_path, LoadOptions};
use toml::Value;

use crate::commands::{load_config, CommandResult};

const COMMAND: &str = "config";

struct Field {
    key_path: &'static str,
    value: String,
    env_keys: &'static [&'static str],
    overridden: bool,
}

pub fn run(options: LoadOptions) -> CommandResult {
    let config_file_path = resolve_config_path(options.config_path.as_deref());
    let overrides = options.overrides.clone();
    let config = match load_config(COMMAND, options) {
        Ok(config) => config,
        Err(result) => return result,
    };

    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let fields = [
        Field {
            key_path: "data.transactions_path",
            value: config.data.transactions_path.display().to_string(),
            env_keys: &["RESTOCK_DATA_TRANSACTIONS_PATH"],
            overridden: overrides.transactions_path.is_some(),
        },
        Field {
            key_path: "data.reference_path",
            value: config.data.reference_path.display().to_string(),
            env_keys: &["RESTOCK_DATA_REFERENCE_PATH"],
            overridden: overrides.reference_path.is_some(),
        },
        Field {
            key_path: "data.forecast_path",
            value: config.data.forecast_path.display().to_string(),
            env_keys: &["RESTOCK_DATA_FORECAST_PATH"],
            overridden: overrides.forecast_path.is_some(),
        },
        Field {
            key_path: "data.rollup_path",
            value: config.data.rollup_path.display().to_string(),
            env_keys: &["RESTOCK_DATA_ROLLUP_PATH"],
            overridden: overrides.rollup_path.is_some(),
        },
        Field {
            key_path: "input.date_format",
            value: config.input.date_format.clone(),
            env_keys: &["RESTOCK_INPUT_DATE_FORMAT"],
            overridden: overrides.date_format.is_some(),
        },
        Field {
            key_path: "logging.level",
            value: config.logging.level.clone(),
            env_keys: &["RESTOCK_LOGGING_LEVEL", "RESTOCK_LOG_LEVEL"],
            overridden: overrides.log_level.is_some(),
        },
        Field {
            key_path: "logging.format",
            value: format!("{:?}", config.logging.format).to_lowercase(),
            env_keys: &["RESTOCK_LOGGING_FORMAT", "RESTOCK_LOG_FORMAT"],
            overridden: false,
        },
    ];

    let mut lines =
        vec!["effective config (source precedence: flag > env > file > default):".to_string()];
    lines.extend(fields.iter().map(|field| {
        let source =
            field_source(field, config_file_doc.as_ref(), config_file_path.as_deref());
        render_line(field, &source)
    }));

    CommandResult { exit_code: 0, output: lines.join("\n") }
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(field: &Field, file_doc: Option<&Value>, file_path: Option<&Path>) -> String {
    if field.overridden {
        return "flag".to_string();
    }

    if let Some(env_key) = field.env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = file_doc {
        if contains_path(doc, field.key_path) {
            let file_path = file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(field: &Field, source: &str) -> String {
    format!("- {} = {} (source: {source})", field.key_path, field.value)
}
