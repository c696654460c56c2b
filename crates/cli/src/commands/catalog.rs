use clap::Args;
use serde_json::json;
use storefront_core::config::LoadOptions;
use storefront_core::flows::NavigationQuery;

use crate::bootstrap::{open_storefront, prepare};
use crate::commands::{application_failure, CommandResult, Failure};
use crate::render::{render_catalog, ProductSummary};

#[derive(Debug, Clone, Default, Args)]
pub struct CatalogArgs {
    #[arg(long, help = "Case-insensitive filter on product names")]
    pub search: Option<String>,
    #[arg(long, help = "Emit machine-readable JSON output")]
    pub json: bool,
}

pub fn run(options: &LoadOptions, args: CatalogArgs) -> CommandResult {
    let (config, runtime) = match prepare("catalog", options) {
        Ok(prepared) => prepared,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let mut session = open_storefront(&config).await?;
        let outcome = async {
            session.activate(NavigationQuery::default()).await?;
            if let Some(term) = &args.search {
                session.storefront.search(term.as_str()).await.map_err(application_failure)?;
            }
            Ok::<_, Failure>(session.storefront.state().clone())
        }
        .await;
        session.close().await;
        outcome
    });

    let state = match result {
        Ok(state) => state,
        Err(failure) => return CommandResult::from_failure("catalog", failure),
    };

    if !args.json {
        return CommandResult::rendered(render_catalog(&state, &config.storefront.currency_label));
    }

    let products: Vec<ProductSummary> =
        state.filtered_products().into_iter().map(ProductSummary::from_product).collect();
    CommandResult::success_with_data(
        "catalog",
        format!("{} of {} products", products.len(), state.catalog.len()),
        json!({
            "search": state.search_term,
            "total": state.catalog.len(),
            "currency": config.storefront.currency_label,
            "products": products,
        }),
    )
}
