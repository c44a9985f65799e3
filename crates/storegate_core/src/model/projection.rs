//! Non-entity query results: grouped counts, flags and fetch-join pairs.

use super::catalog::{Discount, Product};
use super::user::{Address, AppUser};
use super::RecordId;
use serde::{Deserialize, Serialize};

/// Row of `count_addresses_by_city`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityCount {
    pub city: Option<String>,
    pub count: i64,
}

/// Row of `count_users_with_orders`; users without orders count zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOrderCount {
    pub user: AppUser,
    pub order_count: i64,
}

/// Row of `count_discounts_by_product`, grouped by product name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDiscountCount {
    pub product_name: Option<String>,
    pub count: i64,
}

/// Row of `group_by_product_id_count`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductItemCount {
    pub product_id: Option<RecordId>,
    pub count: i64,
}

/// Payment status with the number of payments carrying it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub status: Option<String>,
    pub count: i64,
}

/// Payment id with whether its status is exactly `COMPLETED`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCompletion {
    pub payment_id: RecordId,
    pub is_completed: bool,
}

/// Address loaded together with its owning user in one round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressWithUser {
    pub address: Address,
    pub user: AppUser,
}

/// Discount loaded together with its product in one round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountWithProduct {
    pub discount: Discount,
    pub product: Product,
}

