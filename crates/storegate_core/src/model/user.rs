//! Customer records: users and their postal addresses.

use super::RecordId;
use serde::{Deserialize, Serialize};

/// Registered customer. Owns addresses, orders and reviews.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppUser {
    pub id: Option<RecordId>,
    pub name: Option<String>,
}

impl AppUser {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
        }
    }
}

/// Postal address belonging to one user.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: Option<RecordId>,
    pub street: Option<String>,
    pub city: Option<String>,
    /// `address.user_id`
    pub user_id: Option<RecordId>,
}

impl Address {
    pub fn new(street: impl Into<String>, city: impl Into<String>, user_id: RecordId) -> Self {
        Self {
            id: None,
            street: Some(street.into()),
            city: Some(city.into()),
            user_id: Some(user_id),
        }
    }
}
