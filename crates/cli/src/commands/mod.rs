//! Subcommands. Each returns a [`CommandResult`]: an exit code plus the text printed to
//! stdout, a JSON payload unless the command renders a human view.
//!
//! | exit | error_class |
//! |------|-------------|
//! | 2    | `config_validation` |
//! | 3    | `runtime_init` |
//! | 4    | `db_connectivity` |
//! | 5    | `migration`, `seed_execution` |
//! | 6    | `seed_verification` |
//! | 7    | `catalog_unavailable` |
//! | 8    | `not_found`, `invalid_link` |
//! | 9    | `validation` |
//! | 10   | `order_failed` |
//! | 11   | `flow`, `store` |

pub mod catalog;
pub mod config;
pub mod doctor;
pub mod migrate;
pub mod order;
pub mod seed;
pub mod share;
pub mod show;
pub mod theme;

use serde::Serialize;
use serde_json::Value;
use storefront_core::errors::ApplicationError;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

/// `(error_class, message, exit_code)`
pub type Failure = (&'static str, String, u8);

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        Self::success_with_data(command, message, None::<Value>)
    }

    pub fn success_with_data(
        command: &str,
        message: impl Into<String>,
        data: impl Into<Option<Value>>,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            data: data.into(),
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    /// Human-readable output for an interactive terminal.
    pub fn rendered(output: String) -> Self {
        Self { exit_code: 0, output }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub fn from_failure(command: &str, (error_class, message, exit_code): Failure) -> Self {
        Self::failure(command, error_class, message, exit_code)
    }
}

pub(crate) fn application_failure(error: ApplicationError) -> Failure {
    (error.class(), error.to_string(), 11)
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::CommandResult;

    fn parse(output: &str) -> Value {
        serde_json::from_str(output).expect("payload should be JSON")
    }

    #[test]
    fn success_payload_omits_missing_data() {
        let result = CommandResult::success("migrate", "applied pending migrations");
        let payload = parse(&result.output);

        assert_eq!(result.exit_code, 0);
        assert_eq!(payload["status"], "ok");
        assert_eq!(payload["error_class"], Value::Null);
        assert!(payload.get("data").is_none());
    }

    #[test]
    fn failure_payload_carries_class_and_exit_code() {
        let result = CommandResult::from_failure("order", ("validation", "bad phone".into(), 9));
        let payload = parse(&result.output);

        assert_eq!(result.exit_code, 9);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "validation");
        assert_eq!(payload["message"], "bad phone");
    }

    #[test]
    fn success_payload_embeds_data() {
        let result = CommandResult::success_with_data("catalog", "2 products", json!({"total": 2}));
        assert_eq!(parse(&result.output)["data"]["total"], 2);
    }
}
