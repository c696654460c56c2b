use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use storefront_core::config::{AppConfig, LoadOptions};
use toml::Value;

struct ConfigLine {
    key: &'static str,
    value: String,
    env_keys: &'static [&'static str],
    overridden: bool,
}

pub fn run(options: &LoadOptions) -> String {
    let config = match AppConfig::load(options.clone()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path(options.config_path.as_deref());
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let overrides = &options.overrides;

    let entries = [
        ConfigLine {
            key: "store.backend",
            value: config.store.backend.as_str().to_string(),
            env_keys: &["STOREFRONT_STORE_BACKEND"],
            overridden: overrides.backend.is_some(),
        },
        ConfigLine {
            key: "store.database_url",
            value: config.store.database_url.clone(),
            env_keys: &["STOREFRONT_STORE_DATABASE_URL", "STOREFRONT_DATABASE_URL"],
            overridden: overrides.database_url.is_some(),
        },
        ConfigLine {
            key: "store.max_connections",
            value: config.store.max_connections.to_string(),
            env_keys: &["STOREFRONT_STORE_MAX_CONNECTIONS"],
            overridden: false,
        },
        ConfigLine {
            key: "store.timeout_secs",
            value: config.store.timeout_secs.to_string(),
            env_keys: &["STOREFRONT_STORE_TIMEOUT_SECS"],
            overridden: false,
        },
        ConfigLine {
            key: "firestore.project_id",
            value: or_unset(&config.firestore.project_id),
            env_keys: &["STOREFRONT_FIRESTORE_PROJECT_ID"],
            overridden: overrides.firestore_project_id.is_some(),
        },
        ConfigLine {
            key: "firestore.api_key",
            value: redact_secret(config.firestore.api_key.as_ref()),
            env_keys: &["STOREFRONT_FIRESTORE_API_KEY"],
            overridden: false,
        },
        ConfigLine {
            key: "firestore.base_url",
            value: config.firestore.base_url.clone(),
            env_keys: &["STOREFRONT_FIRESTORE_BASE_URL"],
            overridden: false,
        },
        ConfigLine {
            key: "firestore.database",
            value: config.firestore.database.clone(),
            env_keys: &["STOREFRONT_FIRESTORE_DATABASE"],
            overridden: false,
        },
        ConfigLine {
            key: "storefront.base_url",
            value: config.storefront.base_url.clone(),
            env_keys: &["STOREFRONT_BASE_URL"],
            overridden: overrides.base_url.is_some(),
        },
        ConfigLine {
            key: "storefront.currency_label",
            value: config.storefront.currency_label.clone(),
            env_keys: &["STOREFRONT_CURRENCY_LABEL"],
            overridden: false,
        },
        ConfigLine {
            key: "storefront.notice_ttl_secs",
            value: config.storefront.notice_ttl_secs.to_string(),
            env_keys: &["STOREFRONT_NOTICE_TTL_SECS"],
            overridden: false,
        },
        ConfigLine {
            key: "logging.level",
            value: config.logging.level.clone(),
            env_keys: &["STOREFRONT_LOGGING_LEVEL", "STOREFRONT_LOG_LEVEL"],
            overridden: overrides.log_level.is_some(),
        },
        ConfigLine {
            key: "logging.format",
            value: format!("{:?}", config.logging.format).to_lowercase(),
            env_keys: &["STOREFRONT_LOGGING_FORMAT", "STOREFRONT_LOG_FORMAT"],
            overridden: false,
        },
    ];

    let mut lines = vec![
        "effective config (source precedence: override > env > file > default):".to_string(),
    ];
    lines.extend(entries.iter().map(|entry| {
        let source = if entry.overridden {
            "override (command line)".to_string()
        } else {
            field_source(
                entry.key,
                entry.env_keys,
                config_file_doc.as_ref(),
                config_file_path.as_deref(),
            )
        };
        render_line(entry.key, &entry.value, source)
    }));

    lines.join("\n")
}

fn detect_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    ["storefront.toml", "config/storefront.toml"].into_iter().map(PathBuf::from).find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
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

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

fn or_unset(value: &str) -> String {
    if value.trim().is_empty() {
        "<unset>".to_string()
    } else {
        value.to_string()
    }
}

fn redact_secret(secret: Option<&SecretString>) -> String {
    let Some(secret) = secret else {
        return "<unset>".to_string();
    };
    let exposed = secret.expose_secret().trim();
    if exposed.chars().count() <= 8 {
        return "<redacted>".to_string();
    }
    let tail: String = exposed.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
    format!("***{tail}")
}
