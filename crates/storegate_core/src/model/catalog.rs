//! Product catalog records: categories, products, discounts and reviews.
//!
//! `price`, `percentage` and `rating` carry no range constraint; the store
//! accepts any value the column type allows.

use super::RecordId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Option<RecordId>,
    pub name: Option<String>,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Option<RecordId>,
    pub name: Option<String>,
    pub price: Option<f64>,
    /// `product.category_id`
    pub category_id: Option<RecordId>,
}

impl Product {
    pub fn new(name: impl Into<String>, price: f64, category_id: Option<RecordId>) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
            price: Some(price),
            category_id,
        }
    }
}

/// Discount code attached to one product.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discount {
    pub id: Option<RecordId>,
    pub code: Option<String>,
    pub percentage: Option<f64>,
    /// `discount.product_id`
    pub product_id: Option<RecordId>,
}

impl Discount {
    pub fn new(code: impl Into<String>, percentage: f64, product_id: RecordId) -> Self {
        Self {
            id: None,
            code: Some(code.into()),
            percentage: Some(percentage),
            product_id: Some(product_id),
        }
    }
}

/// Rating and comment left by one user on one product.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Option<RecordId>,
    pub comment: Option<String>,
    pub rating: Option<i32>,
    /// `review.user_id`
    pub user_id: Option<RecordId>,
    /// `review.product_id`
    pub product_id: Option<RecordId>,
}

impl Review {
    pub fn new(
        comment: impl Into<String>,
        rating: i32,
        user_id: RecordId,
        product_id: RecordId,
    ) -> Self {
        Self {
            id: None,
            comment: Some(comment.into()),
            rating: Some(rating),
            user_id: Some(user_id),
            product_id: Some(product_id),
        }
    }
}
