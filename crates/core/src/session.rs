//! Session runtime that owns the view state and performs the flow's side effects.
//!
//! Every operation takes `&mut self`, so at most one store call is in flight at a time.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::catalog::normalize_products;
use crate::domain::order::{DraftField, Order};
use crate::domain::product::ProductId;
use crate::errors::ApplicationError;
use crate::flows::{FlowContext, FlowEngine, NavigationQuery, ViewAction, ViewEvent, ViewState};
use crate::share::{share_product, Clipboard, NativeShare, UnavailableClipboard};
use crate::store::{DocumentStore, PreferenceStore, ORDERS_COLLECTION, PRODUCTS_COLLECTION};

pub struct Storefront<S: ?Sized> {
    store: Arc<S>,
    engine: FlowEngine,
    state: ViewState,
    preferences: Option<Arc<dyn PreferenceStore>>,
    native_share: Option<Arc<dyn NativeShare>>,
    clipboard: Arc<dyn Clipboard>,
}

impl<S> Storefront<S>
where
    S: DocumentStore + ?Sized,
{
    pub fn new(store: Arc<S>, context: FlowContext) -> Self {
        let engine = FlowEngine::new(context);
        let state = engine.initial_state();
        Self {
            store,
            engine,
            state,
            preferences: None,
            native_share: None,
            clipboard: Arc::new(UnavailableClipboard),
        }
    }

    pub fn with_preferences(mut self, preferences: Arc<dyn PreferenceStore>) -> Self {
        self.preferences = Some(preferences);
        self
    }

    pub fn with_native_share(mut self, native_share: Arc<dyn NativeShare>) -> Self {
        self.native_share = Some(native_share);
        self
    }

    pub fn with_clipboard(mut self, clipboard: Arc<dyn Clipboard>) -> Self {
        self.clipboard = clipboard;
        self
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub async fn dispatch(&mut self, event: ViewEvent) -> Result<&ViewState, ApplicationError> {
        self.dispatch_at(event, Utc::now()).await
    }

    /// Applies `event` and every follow-up event produced by the actions it triggers.
    /// `now` stamps share results so notice expiry stays reproducible.
    pub async fn dispatch_at(
        &mut self,
        event: ViewEvent,
        now: DateTime<Utc>,
    ) -> Result<&ViewState, ApplicationError> {
        let mut pending = VecDeque::from([event]);

        while let Some(event) = pending.pop_front() {
            let outcome = self.engine.apply(&self.state, &event)?;
            debug!(
                event_name = "storefront.flow.transition",
                event = event.name(),
                from = ?outcome.from,
                to = ?outcome.to,
                actions = outcome.actions.len(),
                "view transition applied"
            );
            self.state = outcome.state;

            for action in outcome.actions {
                if let Some(follow_up) = self.perform(action, now).await {
                    pending.push_back(follow_up);
                }
            }
        }

        Ok(&self.state)
    }

    /// Restores the saved theme, then loads the catalog and applies any deep link.
    pub async fn activate(
        &mut self,
        query: NavigationQuery,
    ) -> Result<&ViewState, ApplicationError> {
        if let Some(preferences) = self.preferences.clone() {
            match preferences.load_theme().await {
                Ok(Some(theme)) => {
                    self.dispatch(ViewEvent::ThemeLoaded(theme)).await?;
                }
                Ok(None) => {}
                Err(error) => {
                    warn!(
                        event_name = "storefront.theme.load_failed",
                        error = %error,
                        "theme preference could not be read"
                    );
                }
            }
        }
        self.dispatch(ViewEvent::Activated { query }).await
    }

    pub async fn search(&mut self, term: impl Into<String>) -> Result<&ViewState, ApplicationError> {
        self.dispatch(ViewEvent::SearchChanged(term.into())).await
    }

    pub async fn select_product(
        &mut self,
        product_id: ProductId,
    ) -> Result<&ViewState, ApplicationError> {
        self.dispatch(ViewEvent::ProductSelected(product_id)).await
    }

    pub async fn select_image(
        &mut self,
        image: impl Into<String>,
    ) -> Result<&ViewState, ApplicationError> {
        self.dispatch(ViewEvent::ImageSelected(image.into())).await
    }

    pub async fn buy_now(&mut self) -> Result<&ViewState, ApplicationError> {
        self.dispatch(ViewEvent::BuyNow).await
    }

    pub async fn back(&mut self) -> Result<&ViewState, ApplicationError> {
        self.dispatch(ViewEvent::Back).await
    }

    pub async fn edit_draft(
        &mut self,
        field: DraftField,
        value: impl Into<String>,
    ) -> Result<&ViewState, ApplicationError> {
        self.dispatch(ViewEvent::DraftEdited { field, value: value.into() }).await
    }

    pub async fn submit_order(&mut self) -> Result<&ViewState, ApplicationError> {
        self.dispatch(ViewEvent::SubmitRequested).await
    }

    pub async fn share_selected(
        &mut self,
        now: DateTime<Utc>,
    ) -> Result<&ViewState, ApplicationError> {
        self.dispatch_at(ViewEvent::ShareRequested, now).await
    }

    pub async fn toggle_theme(&mut self) -> Result<&ViewState, ApplicationError> {
        self.dispatch(ViewEvent::ThemeToggled).await
    }

    pub async fn tick(&mut self, now: DateTime<Utc>) -> Result<&ViewState, ApplicationError> {
        self.dispatch_at(ViewEvent::Tick { now }, now).await
    }

    pub async fn dismiss_notice(&mut self) -> Result<&ViewState, ApplicationError> {
        self.dispatch(ViewEvent::NoticeDismissed).await
    }

    async fn perform(&self, action: ViewAction, now: DateTime<Utc>) -> Option<ViewEvent> {
        match action {
            ViewAction::FetchCatalog => Some(self.fetch_catalog().await),
            ViewAction::WriteOrder(order) => Some(self.write_order(order).await),
            ViewAction::ShareProduct(request) => {
                let outcome =
                    share_product(&request, self.native_share.as_deref(), self.clipboard.as_ref())
                        .await;
                info!(
                    event_name = "storefront.share.completed",
                    url = %request.url,
                    success = outcome.is_success(),
                    "share finished"
                );
                Some(ViewEvent::ShareFinished { outcome, at: now })
            }
            ViewAction::PersistTheme(theme) => {
                if let Some(preferences) = &self.preferences {
                    if let Err(error) = preferences.save_theme(theme).await {
                        warn!(
                            event_name = "storefront.theme.save_failed",
                            error = %error,
                            theme = theme.as_str(),
                            "theme preference could not be saved"
                        );
                    }
                }
                None
            }
        }
    }

    async fn fetch_catalog(&self) -> ViewEvent {
        match self.store.list_documents(PRODUCTS_COLLECTION).await {
            Ok(documents) => {
                let products = normalize_products(&documents);
                info!(
                    event_name = "storefront.catalog.loaded",
                    products = products.len(),
                    "catalog loaded"
                );
                ViewEvent::CatalogLoaded { products }
            }
            Err(error) => {
                error!(
                    event_name = "storefront.catalog.load_failed",
                    error = %error,
                    "catalog could not be loaded"
                );
                ViewEvent::CatalogFailed { reason: error.to_string() }
            }
        }
    }

    async fn write_order(&self, order: Order) -> ViewEvent {
        let appended = match order.to_document() {
            Ok(document) => self.store.append_document(ORDERS_COLLECTION, document).await,
            Err(error) => Err(error),
        };

        match appended {
            Ok(order_id) => {
                info!(
                    event_name = "storefront.order.submitted",
                    order_id = %order_id,
                    product_id = %order.product_id,
                    "order submitted"
                );
                ViewEvent::OrderPlaced { order_id }
            }
            Err(error) => {
                error!(
                    event_name = "storefront.order.submit_failed",
                    error = %error,
                    product_id = %order.product_id,
                    "order could not be submitted"
                );
                ViewEvent::OrderFailed { reason: error.to_string() }
            }
        }
    }
}
