use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::product::{Price, Product, ProductId};
use crate::store::{NewDocument, StoreError};

/// Field the store fills with its own clock when an order is appended.
pub const ORDER_CREATED_AT_FIELD: &str = "createdAt";

/// Customer details collected by the checkout form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetails {
    pub full_name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub notes: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DraftField {
    FullName,
    Phone,
    Address,
    City,
    Notes,
}

impl DraftField {
    pub fn key(self) -> &'static str {
        match self {
            Self::FullName => "fullName",
            Self::Phone => "phone",
            Self::Address => "address",
            Self::City => "city",
            Self::Notes => "notes",
        }
    }
}

impl OrderDetails {
    pub fn set(&mut self, field: DraftField, value: impl Into<String>) {
        let value = value.into();
        match field {
            DraftField::FullName => self.full_name = value,
            DraftField::Phone => self.phone = value,
            DraftField::Address => self.address = value,
            DraftField::City => self.city = value,
            DraftField::Notes => self.notes = value,
        }
    }

    pub fn get(&self, field: DraftField) -> &str {
        match field {
            DraftField::FullName => &self.full_name,
            DraftField::Phone => &self.phone,
            DraftField::Address => &self.address,
            DraftField::City => &self.city,
            DraftField::Notes => &self.notes,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of a purchase as written to the `orders` collection.
///
/// The creation timestamp is not part of the snapshot: it is assigned by the store under
/// [`ORDER_CREATED_AT_FIELD`] when the document is appended.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub product_id: ProductId,
    pub product_name: String,
    pub product_price: Price,
    pub customer_details: OrderDetails,
    pub status: OrderStatus,
}

impl Order {
    pub fn pending(product: &Product, customer_details: OrderDetails) -> Self {
        Self {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            product_price: product.price.clone(),
            customer_details,
            status: OrderStatus::Pending,
        }
    }

    pub fn to_document(&self) -> Result<NewDocument, StoreError> {
        let value =
            serde_json::to_value(self).map_err(|error| StoreError::Decode(error.to_string()))?;
        let serde_json::Value::Object(fields) = value else {
            return Err(StoreError::Decode("order did not serialize to an object".to_string()));
        };
        Ok(NewDocument::new(fields).with_server_timestamp(ORDER_CREATED_AT_FIELD))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{DraftField, Order, OrderDetails, OrderStatus, ORDER_CREATED_AT_FIELD};
    use crate::domain::product::{Price, Product, ProductId};

    fn ring() -> Product {
        Product {
            id: ProductId::new("p1"),
            name: "Ring".to_string(),
            price: Price::Text("19.9".to_string()),
            image_url: "ring.jpg".to_string(),
            description: "Silver ring".to_string(),
            additional_images: Vec::new(),
            details: Vec::new(),
            specifications: Vec::new(),
        }
    }

    #[test]
    fn draft_fields_are_addressable_by_key() {
        let mut details = OrderDetails::default();
        assert!(details.is_empty());

        details.set(DraftField::City, "Tetouan");
        details.set(DraftField::Phone, "+212600000000");

        assert_eq!(details.get(DraftField::City), "Tetouan");
        assert_eq!(details.get(DraftField::Phone), "+212600000000");
        assert_eq!(DraftField::FullName.key(), "fullName");
        assert!(!details.is_empty());
    }

    #[test]
    fn pending_order_snapshots_product_and_requests_server_timestamp() {
        let details = OrderDetails {
            full_name: "Salma B".to_string(),
            phone: "+212600000000".to_string(),
            address: "12 Rue Mohammed V".to_string(),
            city: "Tetouan".to_string(),
            notes: String::new(),
        };
        let order = Order::pending(&ring(), details);
        assert_eq!(order.status, OrderStatus::Pending);

        let document = order.to_document().expect("order document");
        assert_eq!(document.server_timestamp_field.as_deref(), Some(ORDER_CREATED_AT_FIELD));
        assert_eq!(
            serde_json::Value::Object(document.fields),
            json!({
                "productId": "p1",
                "productName": "Ring",
                "productPrice": "19.9",
                "customerDetails": {
                    "fullName": "Salma B",
                    "phone": "+212600000000",
                    "address": "12 Rue Mohammed V",
                    "city": "Tetouan",
                    "notes": ""
                },
                "status": "pending"
            })
        );
    }
}
