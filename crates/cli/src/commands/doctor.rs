use serde::Serialize;
use storefront_core::config::{AppConfig, LoadOptions};
use storefront_core::store::{DocumentStore, PRODUCTS_COLLECTION};
use storefront_db::StoreHandles;

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

impl DoctorCheck {
    fn skipped(name: &'static str, reason: &str) -> Self {
        Self { name, status: CheckStatus::Skipped, details: format!("skipped because {reason}") }
    }
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

const DEPENDENT_CHECKS: [&str; 3] = ["store_connectivity", "catalog_readable", "preferences_readable"];

pub fn run(options: &LoadOptions, json_output: bool) -> String {
    let report = build_report(options);

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
    }

    render_human(&report)
}

fn build_report(options: &LoadOptions) -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(options.clone()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: format!(
                    "configuration loaded and validated (backend `{}`)",
                    config.store.backend.as_str()
                ),
            });
            checks.extend(check_store(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.extend(
                DEPENDENT_CHECKS
                    .into_iter()
                    .map(|name| DoctorCheck::skipped(name, "configuration did not load")),
            );
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

fn check_store(config: &AppConfig) -> Vec<DoctorCheck> {
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            let mut checks = vec![DoctorCheck {
                name: "store_connectivity",
                status: CheckStatus::Fail,
                details: format!("failed to initialize async runtime: {error}"),
            }];
            checks.extend(
                DEPENDENT_CHECKS[1..]
                    .iter()
                    .copied()
                    .map(|name| DoctorCheck::skipped(name, "the store did not open")),
            );
            return checks;
        }
    };

    runtime.block_on(async {
        let handles = match storefront_db::open(config).await {
            Ok(handles) => handles,
            Err(error) => {
                let mut checks = vec![DoctorCheck {
                    name: "store_connectivity",
                    status: CheckStatus::Fail,
                    details: error.to_string(),
                }];
                checks.extend(
                    DEPENDENT_CHECKS[1..]
                        .iter()
                        .copied()
                        .map(|name| DoctorCheck::skipped(name, "the store did not open")),
                );
                return checks;
            }
        };

        let checks = vec![
            DoctorCheck {
                name: "store_connectivity",
                status: CheckStatus::Pass,
                details: format!("opened `{}` backend", config.store.backend.as_str()),
            },
            check_catalog(&handles).await,
            check_preferences(&handles).await,
        ];
        if let Some(pool) = handles.pool {
            pool.close().await;
        }
        checks
    })
}

async fn check_catalog(handles: &StoreHandles) -> DoctorCheck {
    match handles.documents.list_documents(PRODUCTS_COLLECTION).await {
        Ok(documents) => DoctorCheck {
            name: "catalog_readable",
            status: CheckStatus::Pass,
            details: format!("`{PRODUCTS_COLLECTION}` holds {} documents", documents.len()),
        },
        Err(error) => DoctorCheck {
            name: "catalog_readable",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

async fn check_preferences(handles: &StoreHandles) -> DoctorCheck {
    match handles.preferences.load_theme().await {
        Ok(theme) => DoctorCheck {
            name: "preferences_readable",
            status: CheckStatus::Pass,
            details: format!(
                "saved theme: {}",
                theme.map_or("<none>", |theme| theme.as_str())
            ),
        },
        Err(error) => DoctorCheck {
            name: "preferences_readable",
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

#[cfg(test)]
mod tests {
    use super::{render_human, CheckStatus, DoctorCheck, DoctorReport};

    #[test]
    fn human_report_marks_each_check() {
        let report = DoctorReport {
            overall_status: CheckStatus::Fail,
            summary: "doctor: one or more readiness checks failed".to_string(),
            checks: vec![
                DoctorCheck {
                    name: "config_validation",
                    status: CheckStatus::Fail,
                    details: "bad backend".to_string(),
                },
                DoctorCheck::skipped("store_connectivity", "configuration did not load"),
            ],
        };

        let output = render_human(&report);

        assert!(output.contains("- [fail] config_validation: bad backend"));
        assert!(output.contains(
            "- [skip] store_connectivity: skipped because configuration did not load"
        ));
    }
}
