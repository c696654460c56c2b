//! User-facing copy surfaced by the view state.

pub const CATALOG_LOAD_FAILED: &str = "Failed to load products. Please try again later.";

pub const INVALID_PHONE: &str = "Please enter a valid phone number.";
pub const MISSING_REQUIRED_FIELDS: &str = "Please fill in all required fields.";

pub const ORDER_PLACED: &str =
    "Your order has been received! We will call you soon to confirm it.";
pub const ORDER_FAILED: &str =
    "Sorry, something went wrong while placing your order. Please try again.";

pub const SHARE_SUCCEEDED: &str = "Shared successfully!";
pub const SHARE_FAILED: &str = "Sharing failed, please try again.";
pub const LINK_COPIED: &str = "Product link copied!";
pub const COPY_FAILED: &str = "Could not copy the link, please try again.";
