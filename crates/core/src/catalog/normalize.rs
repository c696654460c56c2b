//! Turns raw `products` documents into [`Product`]s.
//!
//! Every field is optional in the store. A field counts as absent when it is missing,
//! `null`, `false`, `0` or an empty string, and absent fields take these defaults:
//!
//! | field              | default                      |
//! |--------------------|------------------------------|
//! | `name`             | `""`                         |
//! | `price`            | `0`                          |
//! | `imageUrl`         | `""`                         |
//! | `description`      | [`PLACEHOLDER_DESCRIPTION`]  |
//! | `additionalImages` | `[]`                         |
//! | `details`          | `[]`                         |
//! | `specifications`   | `[]`                         |
//!
//! List fields that hold anything other than an array also become `[]`, and non-string
//! entries inside a list are skipped.

use serde_json::{Map, Value};

use crate::domain::product::{Price, Product, ProductId};
use crate::store::StoredDocument;

pub const PLACEHOLDER_DESCRIPTION: &str =
    "A high-quality product made from the finest materials.";

pub fn normalize_product(document: &StoredDocument) -> Product {
    let fields = &document.fields;
    Product {
        id: ProductId(document.id.clone()),
        name: text_field(fields, "name").unwrap_or_default(),
        price: price_field(fields, "price").unwrap_or_default(),
        image_url: text_field(fields, "imageUrl").unwrap_or_default(),
        description: text_field(fields, "description")
            .unwrap_or_else(|| PLACEHOLDER_DESCRIPTION.to_string()),
        additional_images: list_field(fields, "additionalImages"),
        details: list_field(fields, "details"),
        specifications: list_field(fields, "specifications"),
    }
}

pub fn normalize_products(documents: &[StoredDocument]) -> Vec<Product> {
    documents.iter().map(normalize_product).collect()
}

fn present<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    fields.get(key).filter(|value| !is_falsy(value))
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

fn text_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    match present(fields, key)? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn price_field(fields: &Map<String, Value>, key: &str) -> Option<Price> {
    match present(fields, key)? {
        Value::Number(number) => number.as_f64().map(Price::Number),
        Value::String(text) => Some(Price::Text(text.clone())),
        _ => None,
    }
}

fn list_field(fields: &Map<String, Value>, key: &str) -> Vec<String> {
    match fields.get(key) {
        Some(Value::Array(items)) => {
            items.iter().filter_map(|item| item.as_str().map(str::to_string)).collect()
        }
        _ => Vec::new(),
    }
}
