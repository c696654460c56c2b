use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Duration;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::flows::FlowContext;

const CONFIG_FILE_NAME: &str = "storefront.toml";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub firestore: FirestoreConfig,
    pub storefront: StorefrontConfig,
    pub logging: LoggingConfig,
}

/// Document store selection. `database_url` also backs the local preference store.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub database_url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct FirestoreConfig {
    pub project_id: String,
    pub api_key: Option<SecretString>,
    pub base_url: String,
    pub database: String,
}

#[derive(Clone, Debug)]
pub struct StorefrontConfig {
    /// Origin used for shared product links.
    pub base_url: String,
    pub currency_label: String,
    pub notice_ttl_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    Sqlite,
    Firestore,
    Memory,
}

impl StoreBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::Firestore => "firestore",
            Self::Memory => "memory",
        }
    }
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
    pub backend: Option<StoreBackend>,
    pub database_url: Option<String>,
    pub firestore_project_id: Option<String>,
    pub base_url: Option<String>,
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
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig {
                backend: StoreBackend::Sqlite,
                database_url: "sqlite://storefront.db?mode=rwc".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            firestore: FirestoreConfig {
                project_id: String::new(),
                api_key: None,
                base_url: "https://firestore.googleapis.com".to_string(),
                database: "(default)".to_string(),
            },
            storefront: StorefrontConfig {
                base_url: "http://localhost:8080".to_string(),
                currency_label: "MAD".to_string(),
                notice_ttl_secs: 3,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "firestore" => Ok(Self::Firestore),
            "memory" => Ok(Self::Memory),
            other => Err(ConfigError::Validation(format!(
                "unsupported store backend `{other}` (expected sqlite|firestore|memory)"
            ))),
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

        if let Some(path) = resolve_config_path(options.config_path.as_deref()) {
            config.apply_patch(read_patch(&path)?);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    /// Deep-link origin and notice lifetime for the view flow.
    pub fn flow_context(&self) -> Result<FlowContext, ConfigError> {
        let origin = parse_http_url("storefront.base_url", &self.storefront.base_url)?;
        let ttl = i64::try_from(self.storefront.notice_ttl_secs).map_err(|_| {
            ConfigError::Validation("storefront.notice_ttl_secs is out of range".to_string())
        })?;
        Ok(FlowContext::new(origin).with_notice_ttl(Duration::seconds(ttl)))
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(store) = patch.store {
            if let Some(backend) = store.backend {
                self.store.backend = backend;
            }
            if let Some(database_url) = store.database_url {
                self.store.database_url = database_url;
            }
            if let Some(max_connections) = store.max_connections {
                self.store.max_connections = max_connections;
            }
            if let Some(timeout_secs) = store.timeout_secs {
                self.store.timeout_secs = timeout_secs;
            }
        }

        if let Some(firestore) = patch.firestore {
            if let Some(project_id) = firestore.project_id {
                self.firestore.project_id = project_id;
            }
            if let Some(api_key) = firestore.api_key {
                self.firestore.api_key = Some(api_key.into());
            }
            if let Some(base_url) = firestore.base_url {
                self.firestore.base_url = base_url;
            }
            if let Some(database) = firestore.database {
                self.firestore.database = database;
            }
        }

        if let Some(storefront) = patch.storefront {
            if let Some(base_url) = storefront.base_url {
                self.storefront.base_url = base_url;
            }
            if let Some(currency_label) = storefront.currency_label {
                self.storefront.currency_label = currency_label;
            }
            if let Some(notice_ttl_secs) = storefront.notice_ttl_secs {
                self.storefront.notice_ttl_secs = notice_ttl_secs;
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
        if let Some(value) = read_env("STOREFRONT_STORE_BACKEND") {
            self.store.backend = value.parse()?;
        }
        let database_url =
            read_env("STOREFRONT_STORE_DATABASE_URL").or_else(|| read_env("STOREFRONT_DATABASE_URL"));
        if let Some(value) = database_url {
            self.store.database_url = value;
        }
        if let Some(value) = read_env("STOREFRONT_STORE_MAX_CONNECTIONS") {
            self.store.max_connections = parse_u32("STOREFRONT_STORE_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("STOREFRONT_STORE_TIMEOUT_SECS") {
            self.store.timeout_secs = parse_u64("STOREFRONT_STORE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("STOREFRONT_FIRESTORE_PROJECT_ID") {
            self.firestore.project_id = value;
        }
        if let Some(value) = read_env("STOREFRONT_FIRESTORE_API_KEY") {
            self.firestore.api_key = Some(value.into());
        }
        if let Some(value) = read_env("STOREFRONT_FIRESTORE_BASE_URL") {
            self.firestore.base_url = value;
        }
        if let Some(value) = read_env("STOREFRONT_FIRESTORE_DATABASE") {
            self.firestore.database = value;
        }

        if let Some(value) = read_env("STOREFRONT_BASE_URL") {
            self.storefront.base_url = value;
        }
        if let Some(value) = read_env("STOREFRONT_CURRENCY_LABEL") {
            self.storefront.currency_label = value;
        }
        if let Some(value) = read_env("STOREFRONT_NOTICE_TTL_SECS") {
            self.storefront.notice_ttl_secs = parse_u64("STOREFRONT_NOTICE_TTL_SECS", &value)?;
        }

        let log_level =
            read_env("STOREFRONT_LOGGING_LEVEL").or_else(|| read_env("STOREFRONT_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("STOREFRONT_LOGGING_FORMAT").or_else(|| read_env("STOREFRONT_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(backend) = overrides.backend {
            self.store.backend = backend;
        }
        if let Some(database_url) = overrides.database_url {
            self.store.database_url = database_url;
        }
        if let Some(project_id) = overrides.firestore_project_id {
            self.firestore.project_id = project_id;
        }
        if let Some(base_url) = overrides.base_url {
            self.storefront.base_url = base_url;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_store(&self.store)?;
        if self.store.backend == StoreBackend::Firestore {
            validate_firestore(&self.firestore)?;
        }
        validate_storefront(&self.storefront)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from(CONFIG_FILE_NAME), Path::new("config").join(CONFIG_FILE_NAME)]
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
        if ch != '$' || chars.peek() != Some(&'{') {
            output.push(ch);
            continue;
        }
        chars.next();

        let mut key = String::new();
        loop {
            match chars.next() {
                Some('}') => break,
                Some(next) => key.push(next),
                None => return Err(ConfigError::UnterminatedInterpolation),
            }
        }

        let value =
            env::var(&key).map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
        output.push_str(&value);
    }

    Ok(output)
}

fn validate_store(store: &StoreConfig) -> Result<(), ConfigError> {
    let url = store.database_url.trim();
    let sqlite_url = url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:";
    if !sqlite_url {
        return Err(ConfigError::Validation(
            "store.database_url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)"
                .to_string(),
        ));
    }

    if store.max_connections == 0 {
        return Err(ConfigError::Validation(
            "store.max_connections must be greater than zero".to_string(),
        ));
    }

    if store.timeout_secs == 0 || store.timeout_secs > 300 {
        return Err(ConfigError::Validation("store.timeout_secs must be in range 1..=300".to_string()));
    }

    Ok(())
}

fn validate_firestore(firestore: &FirestoreConfig) -> Result<(), ConfigError> {
    if firestore.project_id.trim().is_empty() {
        return Err(ConfigError::Validation(
            "firestore.project_id is required when store.backend is `firestore`".to_string(),
        ));
    }
    if firestore.database.trim().is_empty() {
        return Err(ConfigError::Validation("firestore.database must not be empty".to_string()));
    }
    if let Some(api_key) = &firestore.api_key {
        if api_key.expose_secret().trim().is_empty() {
            return Err(ConfigError::Validation(
                "firestore.api_key must not be blank when set".to_string(),
            ));
        }
    }
    parse_http_url("firestore.base_url", &firestore.base_url)?;
    Ok(())
}

fn validate_storefront(storefront: &StorefrontConfig) -> Result<(), ConfigError> {
    parse_http_url("storefront.base_url", &storefront.base_url)?;

    if storefront.notice_ttl_secs == 0 || storefront.notice_ttl_secs > 60 {
        return Err(ConfigError::Validation(
            "storefront.notice_ttl_secs must be in range 1..=60".to_string(),
        ));
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

fn parse_http_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value.trim())
        .map_err(|error| ConfigError::Validation(format!("{key} is not a valid URL: {error}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(ConfigError::Validation(format!("{key} must start with http:// or https://"))),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    store: Option<StorePatch>,
    firestore: Option<FirestorePatch>,
    storefront: Option<StorefrontPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct StorePatch {
    backend: Option<StoreBackend>,
    database_url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct FirestorePatch {
    project_id: Option<String>,
    api_key: Option<String>,
    base_url: Option<String>,
    database: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct StorefrontPatch {
    base_url: Option<String>,
    currency_label: Option<String>,
    notice_ttl_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
