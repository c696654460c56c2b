pub mod catalog;
pub mod checkout;
pub mod config;
pub mod domain;
pub mod errors;
pub mod flows;
pub mod messages;
pub mod reviews;
pub mod session;
pub mod share;
pub mod store;

pub use catalog::{filter_products, normalize_product, normalize_products, Catalog};
pub use checkout::{validate, ValidationError};
pub use domain::order::{DraftField, Order, OrderDetails, OrderStatus};
pub use domain::preference::ThemePreference;
pub use domain::product::{Price, Product, ProductId};
pub use domain::review::{Rating, Review};
pub use errors::ApplicationError;
pub use flows::{FlowContext, FlowEngine, NavigationQuery, Screen, ViewEvent, ViewState};
pub use session::Storefront;
pub use share::{product_link, share_product, Clipboard, NativeShare, ShareOutcome, ShareRequest};
pub use store::{DocumentStore, NewDocument, PreferenceStore, StoreError, StoredDocument};
