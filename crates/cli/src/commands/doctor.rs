use restock_core::config::{AppConfig, LoadOptions};
use restock_store::{inspect_transaction_headers, check_writable, read_reference_table};
use serde::Serialize;

use crate::commands::CommandResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

const DEPENDENT_CHECKS: [&str; 3] =
    ["transactions_readable", "reference_table_readable", "forecast_output_writable"];

/// Readiness report. Exits 1 when any check does not pass.
pub fn run(options: LoadOptions, json_output: bool) -> CommandResult {
    let report = build_report(options);
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { 1 };

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report(options: LoadOptions) -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(options) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_transactions(&config));
            checks.push(check_reference_table(&config));
            checks.push(check_forecast_output(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.extend(DEPENDENT_CHECKS.into_iter().map(|name| DoctorCheck {
                name,
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            }));
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_transactions(config: &AppConfig) -> DoctorCheck {
    let path = &config.data.transactions_path;
    match inspect_transaction_headers(path) {
        Ok(()) => DoctorCheck {
            name: "transactions_readable",
            status: CheckStatus::Pass,
            details: format!("`{}` has the required columns", path.display()),
        },
        Err(error) => DoctorCheck {
            name: "transactions_readable",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

fn check_reference_table(config: &AppConfig) -> DoctorCheck {
    let path = &config.data.reference_path;
    match read_reference_table(path) {
        Ok(table) if table.is_empty() => DoctorCheck {
            name: "reference_table_readable",
            status: CheckStatus::Fail,
            details: format!(
                "`{}` has no reference products; every forecast would lack a match",
                path.display()
            ),
        },
        Ok(table) => DoctorCheck {
            name: "reference_table_readable",
            status: CheckStatus::Pass,
            details: format!("{} reference products loaded", table.len()),
        },
        Err(error) => DoctorCheck {
            name: "reference_table_readable",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

fn check_forecast_output(config: &AppConfig) -> DoctorCheck {
    let path = &config.data.forecast_path;
    match check_writable(path) {
        Ok(()) => DoctorCheck {
            name: "forecast_output_writable",
            status: CheckStatus::Pass,
            details: format!("`{}` can be replaced", path.display()),
        },
        Err(error) => DoctorCheck {
            name: "forecast_output_writable",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
