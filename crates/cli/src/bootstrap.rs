use std::sync::Arc;

use storefront_core::config::{AppConfig, LoadOptions, LogFormat};
use storefront_core::flows::NavigationQuery;
use storefront_core::session::Storefront;
use storefront_db::{BackendError, ConfiguredStore, DbPool};
use tokio::runtime::Runtime;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::clipboard::Osc52Clipboard;
use crate::commands::{application_failure, CommandResult, Failure};

/// Installs the stderr subscriber. A second call is a no-op.
pub fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let _ = match config.logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

/// Loads configuration and a current-thread runtime for one command.
pub fn prepare(command: &str, options: &LoadOptions) -> Result<(AppConfig, Runtime), CommandResult> {
    let config = AppConfig::load(options.clone()).map_err(|error| {
        CommandResult::failure(
            command,
            "config_validation",
            format!("configuration issue: {error}"),
            2,
        )
    })?;

    let runtime =
        tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(|error| {
            CommandResult::failure(
                command,
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            )
        })?;

    Ok((config, runtime))
}

pub struct OpenStorefront {
    pub storefront: Storefront<ConfiguredStore>,
    pool: Option<DbPool>,
}

impl OpenStorefront {
    /// Activates the session and fails when the catalog could not be loaded.
    pub async fn activate(&mut self, query: NavigationQuery) -> Result<(), Failure> {
        let state = self.storefront.activate(query).await.map_err(application_failure)?;
        match &state.error {
            Some(message) => Err(("catalog_unavailable", message.clone(), 7)),
            None => Ok(()),
        }
    }

    pub async fn close(self) {
        if let Some(pool) = self.pool {
            pool.close().await;
        }
    }
}

pub async fn open_storefront(config: &AppConfig) -> Result<OpenStorefront, Failure> {
    let context = config
        .flow_context()
        .map_err(|error| ("config_validation", format!("configuration issue: {error}"), 2))?;

    let handles = storefront_db::open(config).await.map_err(|error| match error {
        BackendError::Migration(_) => ("migration", error.to_string(), 5),
        other => ("db_connectivity", other.to_string(), 4),
    })?;
    info!(
        event_name = "storefront.cli.session_opened",
        backend = config.store.backend.as_str(),
        "storefront session opened"
    );

    let storefront = Storefront::new(handles.documents, context)
        .with_preferences(handles.preferences)
        .with_clipboard(Arc::new(Osc52Clipboard));
    Ok(OpenStorefront { storefront, pool: handles.pool })
}
