use clap::Args;
use serde_json::to_value;
use storefront_core::config::LoadOptions;
use storefront_core::flows::{NavigationQuery, ViewState};
use url::Url;

use crate::bootstrap::{open_storefront, prepare, OpenStorefront};
use crate::commands::{application_failure, CommandResult, Failure};
use crate::render::{render_catalog, render_detail, ProductView};

#[derive(Debug, Clone, Default, Args)]
pub struct ShowArgs {
    #[arg(required_unless_present = "link", help = "Product identifier")]
    pub product: Option<String>,
    #[arg(long, conflicts_with = "product", help = "Shared product link, e.g. https://shop/?product=ID")]
    pub link: Option<String>,
    #[arg(long, help = "Gallery image to select")]
    pub image: Option<String>,
    #[arg(long, help = "Emit machine-readable JSON output")]
    pub json: bool,
}

/// Resolves the navigational query from a product id or a shared link.
pub fn navigation_query(args: &ShowArgs) -> Result<NavigationQuery, Failure> {
    match (&args.product, &args.link) {
        (_, Some(link)) => Url::parse(link)
            .map(|url| NavigationQuery::from_url(&url))
            .map_err(|error| ("invalid_link", format!("`{link}` is not a valid link: {error}"), 8)),
        (Some(product), None) => Ok(NavigationQuery::product(product.as_str())),
        (None, None) => Ok(NavigationQuery::default()),
    }
}

/// Opens the session on the deep link and requires it to land on a product.
pub async fn open_product(
    session: &mut OpenStorefront,
    query: NavigationQuery,
) -> Result<(), Failure> {
    let requested = query.product.clone();
    session.activate(query).await?;
    if session.storefront.state().selected.is_none() {
        let message = match requested {
            Some(product_id) => format!("product `{product_id}` is not in the catalog"),
            None => "the link does not name a product".to_string(),
        };
        return Err(("not_found", message, 8));
    }
    Ok(())
}

pub fn run(options: &LoadOptions, args: ShowArgs) -> CommandResult {
    let query = match navigation_query(&args) {
        Ok(query) => query,
        Err(failure) => return CommandResult::from_failure("show", failure),
    };
    let (config, runtime) = match prepare("show", options) {
        Ok(prepared) => prepared,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let mut session = open_storefront(&config).await?;
        let outcome = async {
            open_product(&mut session, query).await?;
            if let Some(image) = &args.image {
                session.storefront.select_image(image.as_str()).await.map_err(application_failure)?;
            }
            Ok::<_, Failure>(session.storefront.state().clone())
        }
        .await;
        session.close().await;
        outcome
    });

    let state: ViewState = match result {
        Ok(state) => state,
        Err(failure) => return CommandResult::from_failure("show", failure),
    };
    let Some(product) = state.selected_product() else {
        return CommandResult::rendered(render_catalog(&state, &config.storefront.currency_label));
    };
    let view = ProductView::new(product, state.selected_image.as_deref());

    if !args.json {
        return CommandResult::rendered(render_detail(
            &view,
            &state,
            &config.storefront.currency_label,
        ));
    }

    match to_value(&view) {
        Ok(data) => CommandResult::success_with_data("show", view.summary.name.clone(), data),
        Err(error) => CommandResult::failure("show", "serialization", error.to_string(), 1),
    }
}
