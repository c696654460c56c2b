//! Deep links and best-effort product sharing.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

use crate::domain::product::{Product, ProductId};
use crate::messages;

/// Query key carrying the product identifier in a deep link.
pub const PRODUCT_QUERY_KEY: &str = "product";

/// `<origin>/?product=<id>`. Any path, query or fragment on `origin` is dropped.
pub fn product_link(origin: &Url, product_id: &ProductId) -> Url {
    let mut link = origin.clone();
    link.set_path("/");
    link.set_fragment(None);
    link.set_query(None);
    link.query_pairs_mut().append_pair(PRODUCT_QUERY_KEY, product_id.as_str());
    link
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ShareRequest {
    pub title: String,
    pub text: String,
    pub url: String,
}

impl ShareRequest {
    pub fn for_product(product: &Product, origin: &Url) -> Self {
        Self {
            title: product.name.clone(),
            text: format!("Check out this product: {} - {}", product.name, product.description),
            url: product_link(origin, &product.id).to_string(),
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ShareError {
    #[error("capability is not available on this platform")]
    Unsupported,
    #[error("share failed: {0}")]
    Failed(String),
}

/// Platform share sheet.
#[async_trait]
pub trait NativeShare: Send + Sync {
    fn can_share(&self, request: &ShareRequest) -> bool;
    async fn share(&self, request: &ShareRequest) -> Result<(), ShareError>;
}

#[async_trait]
pub trait Clipboard: Send + Sync {
    async fn write_text(&self, text: &str) -> Result<(), ShareError>;
}

/// Clipboard for platforms without one; every copy fails.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnavailableClipboard;

#[async_trait]
impl Clipboard for UnavailableClipboard {
    async fn write_text(&self, _text: &str) -> Result<(), ShareError> {
        Err(ShareError::Unsupported)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ShareOutcome {
    Shared,
    ShareFailed,
    Copied,
    /// Automatic copy failed; the link is kept so it can be copied by hand.
    CopyFailed { link: String },
}

impl ShareOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Shared => messages::SHARE_SUCCEEDED,
            Self::ShareFailed => messages::SHARE_FAILED,
            Self::Copied => messages::LINK_COPIED,
            Self::CopyFailed { .. } => messages::COPY_FAILED,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Shared | Self::Copied)
    }

    pub fn manual_copy_link(&self) -> Option<&str> {
        match self {
            Self::CopyFailed { link } => Some(link),
            _ => None,
        }
    }
}

/// Shares natively when the platform can, otherwise copies the link.
pub async fn share_product(
    request: &ShareRequest,
    native: Option<&dyn NativeShare>,
    clipboard: &dyn Clipboard,
) -> ShareOutcome {
    if let Some(native) = native.filter(|native| native.can_share(request)) {
        return match native.share(request).await {
            Ok(()) => {
                info!(event_name = "storefront.share.native", url = %request.url, "product shared");
                ShareOutcome::Shared
            }
            Err(error) => {
                warn!(event_name = "storefront.share.native_failed", error = %error, "native share failed");
                ShareOutcome::ShareFailed
            }
        };
    }

    match clipboard.write_text(&request.url).await {
        Ok(()) => {
            info!(event_name = "storefront.share.copied", url = %request.url, "product link copied");
            ShareOutcome::Copied
        }
        Err(error) => {
            warn!(event_name = "storefront.share.copy_failed", error = %error, "clipboard copy failed");
            ShareOutcome::CopyFailed { link: request.url.clone() }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use url::Url;

    use super::{
        product_link, share_product, Clipboard, NativeShare, ShareError, ShareOutcome,
        ShareRequest, UnavailableClipboard,
    };
    use crate::domain::product::{Price, Product, ProductId};

    struct FakeNative {
        capable: bool,
        result: Result<(), ShareError>,
        shared: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl NativeShare for FakeNative {
        fn can_share(&self, _request: &ShareRequest) -> bool {
            self.capable
        }

        async fn share(&self, request: &ShareRequest) -> Result<(), ShareError> {
            self.shared.lock().expect("lock").push(request.url.clone());
            self.result.clone()
        }
    }

    #[derive(Default)]
    struct RecordingClipboard {
        copied: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Clipboard for RecordingClipboard {
        async fn write_text(&self, text: &str) -> Result<(), ShareError> {
            self.copied.lock().expect("lock").push(text.to_string());
            Ok(())
        }
    }

    fn origin() -> Url {
        Url::parse("https://shop.example/catalog?ref=home#top").expect("origin")
    }

    fn ring() -> Product {
        Product {
            id: ProductId::new("p1"),
            name: "Ring".to_string(),
            price: Price::Number(19.9),
            image_url: String::new(),
            description: "Silver ring".to_string(),
            additional_images: Vec::new(),
            details: Vec::new(),
            specifications: Vec::new(),
        }
    }

    #[test]
    fn deep_link_uses_origin_root_and_product_query() {
        let link = product_link(&origin(), &ProductId::new("p1"));
        assert_eq!(link.as_str(), "https://shop.example/?product=p1");
    }

    #[test]
    fn deep_link_encodes_identifier() {
        let link = product_link(&origin(), &ProductId::new("a b&c"));
        assert_eq!(link.as_str(), "https://shop.example/?product=a+b%26c");
    }

    #[test]
    fn share_request_describes_product() {
        let request = ShareRequest::for_product(&ring(), &origin());

        assert_eq!(request.title, "Ring");
        assert_eq!(request.text, "Check out this product: Ring - Silver ring");
        assert_eq!(request.url, "https://shop.example/?product=p1");
    }

    #[tokio::test]
    async fn capable_native_share_is_preferred() {
        let native = FakeNative { capable: true, result: Ok(()), shared: Mutex::default() };
        let clipboard = RecordingClipboard::default();
        let request = ShareRequest::for_product(&ring(), &origin());

        let outcome = share_product(&request, Some(&native), &clipboard).await;

        assert_eq!(outcome, ShareOutcome::Shared);
        assert_eq!(native.shared.lock().expect("lock").len(), 1);
        assert!(clipboard.copied.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn failed_native_share_does_not_fall_back_to_clipboard() {
        let native = FakeNative {
            capable: true,
            result: Err(ShareError::Failed("dismissed".to_string())),
            shared: Mutex::default(),
        };
        let clipboard = RecordingClipboard::default();
        let request = ShareRequest::for_product(&ring(), &origin());

        let outcome = share_product(&request, Some(&native), &clipboard).await;

        assert_eq!(outcome, ShareOutcome::ShareFailed);
        assert!(!outcome.is_success());
        assert!(clipboard.copied.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn incapable_native_share_falls_back_to_clipboard() {
        let native = FakeNative { capable: false, result: Ok(()), shared: Mutex::default() };
        let clipboard = RecordingClipboard::default();
        let request = ShareRequest::for_product(&ring(), &origin());

        let outcome = share_product(&request, Some(&native), &clipboard).await;

        assert_eq!(outcome, ShareOutcome::Copied);
        assert!(native.shared.lock().expect("lock").is_empty());
        assert_eq!(
            clipboard.copied.lock().expect("lock").as_slice(),
            ["https://shop.example/?product=p1".to_string()]
        );
    }

    #[tokio::test]
    async fn failed_copy_offers_manual_link() {
        let request = ShareRequest::for_product(&ring(), &origin());

        let outcome = share_product(&request, None, &UnavailableClipboard).await;

        assert_eq!(outcome.manual_copy_link(), Some("https://shop.example/?product=p1"));
        assert!(!outcome.is_success());
    }
}
