use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use url::Url;

use crate::catalog::{filter_products, Catalog};
use crate::domain::order::{DraftField, Order, OrderDetails};
use crate::domain::preference::ThemePreference;
use crate::domain::product::{Product, ProductId};
use crate::share::{ShareOutcome, ShareRequest, PRODUCT_QUERY_KEY};

const DEFAULT_NOTICE_TTL_SECS: i64 = 3;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    #[default]
    Catalog,
    Detail,
    Checkout,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeTone {
    Success,
    Failure,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeSource {
    Validation,
    Order,
    Share,
}

/// Message shown to the shopper.
///
/// Validation and order notices stay until dismissed. Share notices carry an expiry and
/// are cleared by the first `Tick` at or after it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub tone: NoticeTone,
    pub source: NoticeSource,
    pub message: String,
    pub expires_at: Option<DateTime<Utc>>,
    /// Link to copy by hand after an automatic copy failed.
    pub manual_copy: Option<String>,
}

impl Notice {
    pub fn blocking(tone: NoticeTone, source: NoticeSource, message: impl Into<String>) -> Self {
        Self { tone, source, message: message.into(), expires_at: None, manual_copy: None }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}

/// Navigational query read once when the storefront is activated.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NavigationQuery {
    pub product: Option<ProductId>,
}

impl NavigationQuery {
    /// Parses `product=<id>` out of a query string, with or without the leading `?`.
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let product = url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, value)| key == PRODUCT_QUERY_KEY && !value.is_empty())
            .map(|(_, value)| ProductId::new(value.into_owned()));
        Self { product }
    }

    pub fn from_url(url: &Url) -> Self {
        Self::parse(url.query().unwrap_or_default())
    }

    pub fn product(product_id: impl Into<String>) -> Self {
        Self { product: Some(ProductId::new(product_id)) }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ViewEvent {
    Activated { query: NavigationQuery },
    CatalogLoaded { products: Vec<Product> },
    CatalogFailed { reason: String },
    SearchChanged(String),
    ProductSelected(ProductId),
    ImageSelected(String),
    BuyNow,
    Back,
    DraftEdited { field: DraftField, value: String },
    SubmitRequested,
    OrderPlaced { order_id: String },
    OrderFailed { reason: String },
    ShareRequested,
    ShareFinished { outcome: ShareOutcome, at: DateTime<Utc> },
    Tick { now: DateTime<Utc> },
    NoticeDismissed,
    ThemeLoaded(ThemePreference),
    ThemeToggled,
}

impl ViewEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Activated { .. } => "activated",
            Self::CatalogLoaded { .. } => "catalog_loaded",
            Self::CatalogFailed { .. } => "catalog_failed",
            Self::SearchChanged(_) => "search_changed",
            Self::ProductSelected(_) => "product_selected",
            Self::ImageSelected(_) => "image_selected",
            Self::BuyNow => "buy_now",
            Self::Back => "back",
            Self::DraftEdited { .. } => "draft_edited",
            Self::SubmitRequested => "submit_requested",
            Self::OrderPlaced { .. } => "order_placed",
            Self::OrderFailed { .. } => "order_failed",
            Self::ShareRequested => "share_requested",
            Self::ShareFinished { .. } => "share_finished",
            Self::Tick { .. } => "tick",
            Self::NoticeDismissed => "notice_dismissed",
            Self::ThemeLoaded(_) => "theme_loaded",
            Self::ThemeToggled => "theme_toggled",
        }
    }
}

/// Side effect requested by a transition. The session runtime performs it and feeds the
/// result back as another event.
#[derive(Clone, Debug, PartialEq)]
pub enum ViewAction {
    FetchCatalog,
    WriteOrder(Order),
    ShareProduct(ShareRequest),
    PersistTheme(ThemePreference),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlowContext {
    /// Origin used to build product deep links.
    pub origin: Url,
    pub notice_ttl: Duration,
}

impl FlowContext {
    pub fn new(origin: Url) -> Self {
        Self { origin, notice_ttl: Duration::seconds(DEFAULT_NOTICE_TTL_SECS) }
    }

    pub fn with_notice_ttl(mut self, notice_ttl: Duration) -> Self {
        self.notice_ttl = notice_ttl;
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ViewState {
    pub screen: Screen,
    pub catalog: Catalog,
    pub loading: bool,
    pub activated: bool,
    pub error: Option<String>,
    /// Product named by the navigational query, applied once the catalog has loaded.
    pub deep_link: Option<ProductId>,
    pub search_term: String,
    pub selected: Option<ProductId>,
    pub selected_image: Option<String>,
    pub draft: OrderDetails,
    pub submitting: bool,
    pub notice: Option<Notice>,
    pub theme: ThemePreference,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            screen: Screen::Catalog,
            catalog: Catalog::default(),
            loading: true,
            activated: false,
            error: None,
            deep_link: None,
            search_term: String::new(),
            selected: None,
            selected_image: None,
            draft: OrderDetails::default(),
            submitting: false,
            notice: None,
            theme: ThemePreference::default(),
        }
    }
}

impl ViewState {
    pub fn filtered_products(&self) -> Vec<&Product> {
        filter_products(self.catalog.products(), &self.search_term)
    }

    pub fn selected_product(&self) -> Option<&Product> {
        self.selected.as_ref().and_then(|product_id| self.catalog.find(product_id))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TransitionOutcome {
    pub from: Screen,
    pub to: Screen,
    pub event: ViewEvent,
    pub state: ViewState,
    pub actions: Vec<ViewAction>,
}
