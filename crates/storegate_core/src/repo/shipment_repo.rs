//! Shipment persistence and the order -> shipment loader.

use super::crud::{CrudRepository, Entity};
use super::error::RepoResult;
use super::query::fetch_optional;
use crate::db::ensure_schema_ready;
use crate::model::order::Shipment;
use crate::model::RecordId;
use rusqlite::types::Value;
use rusqlite::{params, Connection, Row};

const SHIPMENT_FOR_ORDER_SQL: &str = "SELECT s.id, s.tracking_number, s.order_id
FROM shipment s
WHERE s.order_id = ?1;";

impl Entity for Shipment {
    const TABLE: &'static str = "shipment";
    const COLUMNS: &'static [&'static str] = &["tracking_number", "order_id"];

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn column_values(&self) -> Vec<Value> {
        vec![self.tracking_number.clone().into(), self.order_id.into()]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: row.get(0)?,
            tracking_number: row.get(1)?,
            order_id: row.get(2)?,
        })
    }
}

/// SQLite-backed shipment repository.
pub struct SqliteShipmentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteShipmentRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }

    pub(crate) fn from_ready(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// The shipment of one order, if any. `shipment.order_id` is unique.
    pub fn shipment_for_order(&self, order_id: RecordId) -> RepoResult<Option<Shipment>> {
        fetch_optional(
            self.conn,
            "shipment.shipment_for_order",
            SHIPMENT_FOR_ORDER_SQL,
            params![order_id],
            Shipment::from_row,
        )
    }
}

impl CrudRepository<Shipment> for SqliteShipmentRepository<'_> {
    fn connection(&self) -> &Connection {
        self.conn
    }
}
