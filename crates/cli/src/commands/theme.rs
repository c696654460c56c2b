use clap::Args;
use serde_json::json;
use storefront_core::config::LoadOptions;
use storefront_core::flows::NavigationQuery;

use crate::bootstrap::{open_storefront, prepare};
use crate::commands::{application_failure, CommandResult, Failure};

#[derive(Debug, Clone, Default, Args)]
pub struct ThemeArgs {
    #[arg(long, help = "Switch between light and dark and save the choice")]
    pub toggle: bool,
}

pub fn run(options: &LoadOptions, args: ThemeArgs) -> CommandResult {
    let (config, runtime) = match prepare("theme", options) {
        Ok(prepared) => prepared,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let mut session = open_storefront(&config).await?;
        let outcome = async {
            tolerate_catalog_outage(session.activate(NavigationQuery::default()).await)?;
            if args.toggle {
                session.storefront.toggle_theme().await.map_err(application_failure)?;
            }
            Ok::<_, Failure>(session.storefront.state().theme)
        }
        .await;
        session.close().await;
        outcome
    });

    match result {
        Ok(theme) => CommandResult::success_with_data(
            "theme",
            format!("theme is {}", theme.as_str()),
            json!({ "theme": theme, "dark_mode": theme.is_dark() }),
        ),
        Err(failure) => CommandResult::from_failure("theme", failure),
    }
}

/// The saved theme is restored on activation even when the catalog is unreachable.
fn tolerate_catalog_outage(activation: Result<(), Failure>) -> Result<(), Failure> {
    match activation {
        Err(("catalog_unavailable", ..)) => Ok(()),
        other => other,
    }
}
