//! Customer order persistence and order-scoped loaders.
//!
//! Payment and shipment are loaded through their own repositories
//! (`payment_for_order`, `shipment_for_order`); an order row only carries
//! its owning user.

use super::crud::{CrudRepository, Entity};
use super::error::RepoResult;
use super::query::fetch_all;
use crate::db::ensure_schema_ready;
use crate::model::order::CustomerOrder;
use crate::model::RecordId;
use rusqlite::types::Value;
use rusqlite::{params, Connection, Row};

const FIND_BY_USER_ID_SQL: &str = "SELECT o.id, o.user_id
FROM customer_order o
WHERE o.user_id = ?1
ORDER BY o.id;";

impl Entity for CustomerOrder {
    const TABLE: &'static str = "customer_order";
    const COLUMNS: &'static [&'static str] = &["user_id"];

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn column_values(&self) -> Vec<Value> {
        vec![self.user_id.into()]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
        })
    }
}

/// SQLite-backed customer order repository.
pub struct SqliteCustomerOrderRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCustomerOrderRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }

    pub(crate) fn from_ready(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Orders placed by `user_id`; also the user -> orders loader.
    pub fn find_by_user_id(&self, user_id: RecordId) -> RepoResult<Vec<CustomerOrder>> {
        fetch_all(
            self.conn,
            "customer_order.find_by_user_id",
            FIND_BY_USER_ID_SQL,
            params![user_id],
            CustomerOrder::from_row,
        )
    }
}

impl CrudRepository<CustomerOrder> for SqliteCustomerOrderRepository<'_> {
    fn connection(&self) -> &Connection {
        self.conn
    }
}
