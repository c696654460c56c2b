use clap::Args;
use serde_json::json;
use storefront_core::config::LoadOptions;
use storefront_core::domain::order::DraftField;
use storefront_core::flows::{NavigationQuery, NoticeSource, NoticeTone, ViewState};
use tracing::info;

use crate::bootstrap::{open_storefront, prepare};
use crate::commands::show::open_product;
use crate::commands::{application_failure, CommandResult, Failure};

#[derive(Debug, Clone, Default, Args)]
pub struct OrderArgs {
    #[arg(help = "Product identifier")]
    pub product: String,
    #[arg(long, default_value = "")]
    pub full_name: String,
    #[arg(long, default_value = "")]
    pub phone: String,
    #[arg(long, default_value = "")]
    pub address: String,
    #[arg(long, default_value = "")]
    pub city: String,
    #[arg(long, default_value = "")]
    pub notes: String,
}

impl OrderArgs {
    fn fields(&self) -> [(DraftField, &str); 5] {
        [
            (DraftField::FullName, self.full_name.as_str()),
            (DraftField::Phone, self.phone.as_str()),
            (DraftField::Address, self.address.as_str()),
            (DraftField::City, self.city.as_str()),
            (DraftField::Notes, self.notes.as_str()),
        ]
    }
}

/// Places a cash-on-delivery order for one product through the checkout flow.
pub fn run(options: &LoadOptions, args: OrderArgs) -> CommandResult {
    let (config, runtime) = match prepare("order", options) {
        Ok(prepared) => prepared,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let mut session = open_storefront(&config).await?;
        let outcome = async {
            open_product(&mut session, NavigationQuery::product(args.product.as_str())).await?;
            let storefront = &mut session.storefront;
            storefront.buy_now().await.map_err(application_failure)?;
            for (field, value) in args.fields() {
                storefront.edit_draft(field, value).await.map_err(application_failure)?;
            }
            storefront.submit_order().await.map_err(application_failure)?;
            Ok::<_, Failure>(storefront.state().clone())
        }
        .await;
        session.close().await;
        outcome
    });

    match result.and_then(|state| order_outcome(&state)) {
        Ok(message) => {
            info!(event_name = "storefront.cli.order_placed", product_id = %args.product, "order placed");
            CommandResult::success_with_data(
                "order",
                message,
                json!({ "product_id": args.product, "status": "pending" }),
            )
        }
        Err(failure) => CommandResult::from_failure("order", failure),
    }
}

/// Reads the submission result from the notice the flow left behind.
pub fn order_outcome(state: &ViewState) -> Result<String, Failure> {
    match &state.notice {
        Some(notice) if notice.source == NoticeSource::Order && notice.tone == NoticeTone::Success => {
            Ok(notice.message.clone())
        }
        Some(notice) if notice.source == NoticeSource::Validation => {
            Err(("validation", notice.message.clone(), 9))
        }
        Some(notice) if notice.source == NoticeSource::Order => {
            Err(("order_failed", notice.message.clone(), 10))
        }
        _ => Err(("order_failed", "the order was not submitted".to_string(), 10)),
    }
}
