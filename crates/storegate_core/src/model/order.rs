//! Order records: orders, their line items, payment and shipment.
//!
//! # Invariants
//! - A `CustomerOrder` has at most one `Payment` and at most one `Shipment`;
//!   the store enforces this with `UNIQUE (order_id)`.

use super::RecordId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerOrder {
    pub id: Option<RecordId>,
    /// `customer_order.user_id`
    pub user_id: Option<RecordId>,
}

impl CustomerOrder {
    pub fn new(user_id: RecordId) -> Self {
        Self {
            id: None,
            user_id: Some(user_id),
        }
    }
}

/// One product line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: Option<RecordId>,
    /// `order_item.order_id`
    pub order_id: Option<RecordId>,
    /// `order_item.product_id`
    pub product_id: Option<RecordId>,
    /// Nullable; `NULL` quantities are skipped by aggregates.
    pub quantity: Option<i32>,
}

impl OrderItem {
    pub fn new(order_id: RecordId, product_id: RecordId, quantity: i32) -> Self {
        Self {
            id: None,
            order_id: Some(order_id),
            product_id: Some(product_id),
            quantity: Some(quantity),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Option<RecordId>,
    pub status: Option<String>,
    /// `payment.order_id`, unique across payments.
    pub order_id: Option<RecordId>,
}

impl Payment {
    pub fn new(status: impl Into<String>, order_id: RecordId) -> Self {
        Self {
            id: None,
            status: Some(status.into()),
            order_id: Some(order_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shipment {
    pub id: Option<RecordId>,
    pub tracking_number: Option<String>,
    /// `shipment.order_id`, unique across shipments.
    pub order_id: Option<RecordId>,
}

impl Shipment {
    pub fn new(tracking_number: impl Into<String>, order_id: RecordId) -> Self {
        Self {
            id: None,
            tracking_number: Some(tracking_number.into()),
            order_id: Some(order_id),
        }
    }
}
