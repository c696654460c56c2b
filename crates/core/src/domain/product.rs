use std::fmt;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub String);

impl ProductId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Price exactly as the store holds it.
///
/// Catalog editors enter prices both as numbers and as text, so the raw value is kept
/// and only interpreted when an amount is needed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Price {
    Number(f64),
    Text(String),
}

impl Default for Price {
    fn default() -> Self {
        Self::Number(0.0)
    }
}

impl Price {
    /// Numeric amount, or `None` when the stored value does not parse or is beyond the
    /// range of `Decimal`.
    ///
    /// Text is read up to the end of its leading numeric prefix, so `"19.9 MAD"` is 19.9
    /// while `"MAD 19.9"` does not parse. Non-finite values never parse.
    pub fn amount(&self) -> Option<Decimal> {
        self.parsed().and_then(Decimal::from_f64)
    }

    /// Two-decimal display form. Unparseable prices render as `0.00`.
    ///
    /// Rounding is half away from zero on the decimal value, so `1.005` shows as `1.01`
    /// rather than following the binary float.
    pub fn formatted(&self) -> String {
        let Some(value) = self.parsed() else {
            return "0.00".to_string();
        };
        let Some(amount) = Decimal::from_f64(value) else {
            return format!("{value:.2}");
        };

        let mut amount = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        if amount.is_zero() {
            amount = Decimal::ZERO;
        }
        amount.rescale(2);
        amount.to_string()
    }

    fn parsed(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value).filter(|value| value.is_finite()),
            Self::Text(text) => leading_number(text),
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formatted())
    }
}

fn leading_number(text: &str) -> Option<f64> {
    let trimmed = text.trim_start();
    let bytes = trimmed.as_bytes();

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }

    let integer_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - integer_start;

    if bytes.get(end) == Some(&b'.') {
        let fraction_start = end + 1;
        let mut fraction_end = fraction_start;
        while bytes.get(fraction_end).is_some_and(u8::is_ascii_digit) {
            fraction_end += 1;
        }
        if digits > 0 || fraction_end > fraction_start {
            digits += fraction_end - fraction_start;
            end = fraction_end;
        }
    }

    if digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exponent_end = end + 1;
        if matches!(bytes.get(exponent_end), Some(b'+' | b'-')) {
            exponent_end += 1;
        }
        let exponent_digits = exponent_end;
        while bytes.get(exponent_end).is_some_and(u8::is_ascii_digit) {
            exponent_end += 1;
        }
        if exponent_end > exponent_digits {
            end = exponent_end;
        }
    }

    trimmed.get(..end)?.parse::<f64>().ok().filter(|value| value.is_finite())
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub image_url: String,
    pub description: String,
    pub additional_images: Vec<String>,
    pub details: Vec<String>,
    pub specifications: Vec<String>,
}

impl Product {
    /// Primary image followed by the additional images, in display order. Blank entries
    /// are skipped.
    pub fn gallery(&self) -> Vec<&str> {
        std::iter::once(self.image_url.as_str())
            .chain(self.additional_images.iter().map(String::as_str))
            .filter(|image| !image.trim().is_empty())
            .collect()
    }

    pub fn display_price(&self) -> String {
        self.price.formatted()
    }
}
