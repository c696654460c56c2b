use chrono::Utc;
use clap::Args;
use serde_json::json;
use storefront_core::config::LoadOptions;
use storefront_core::flows::{NavigationQuery, NoticeTone};
use storefront_core::share::product_link;

use crate::bootstrap::{open_storefront, prepare};
use crate::commands::show::open_product;
use crate::commands::{application_failure, CommandResult, Failure};

#[derive(Debug, Clone, Default, Args)]
pub struct ShareArgs {
    #[arg(help = "Product identifier")]
    pub product: String,
}

/// Copies the product's deep link to the terminal clipboard.
///
/// A failed copy still succeeds as a command: the payload carries the link for copying
/// by hand.
pub fn run(options: &LoadOptions, args: ShareArgs) -> CommandResult {
    let (config, runtime) = match prepare("share", options) {
        Ok(prepared) => prepared,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let mut session = open_storefront(&config).await?;
        let outcome = async {
            open_product(&mut session, NavigationQuery::product(args.product.as_str())).await?;
            let state =
                session.storefront.share_selected(Utc::now()).await.map_err(application_failure)?;
            Ok::<_, Failure>(state.clone())
        }
        .await;
        session.close().await;
        outcome
    });

    let state = match result {
        Ok(state) => state,
        Err(failure) => return CommandResult::from_failure("share", failure),
    };
    let Some(notice) = state.notice else {
        return CommandResult::failure("share", "flow", "share did not complete", 11);
    };
    let link = state
        .selected
        .as_ref()
        .and_then(|product_id| {
            config.flow_context().ok().map(|context| product_link(&context.origin, product_id))
        })
        .map(|link| link.to_string());

    CommandResult::success_with_data(
        "share",
        notice.message,
        json!({
            "link": link,
            "copied": notice.tone == NoticeTone::Success,
            "manual_copy": notice.manual_copy,
        }),
    )
}
