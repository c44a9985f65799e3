//! Single entry point handing out every repository over one connection.
//!
//! # Responsibility
//! - Check the connection's schema once, then construct repositories
//!   without repeating the check.
//! - Report store-wide facts (schema version, per-table row counts).
//!
//! # Invariants
//! - The gateway borrows the connection; transactions stay with the caller.

use crate::db::ensure_schema_ready;
use crate::db::migrations::latest_version;
use crate::model::catalog::{Category, Discount, Product, Review};
use crate::model::order::{CustomerOrder, OrderItem, Payment, Shipment};
use crate::model::user::{Address, AppUser};
use crate::repo::address_repo::SqliteAddressRepository;
use crate::repo::category_repo::SqliteCategoryRepository;
use crate::repo::crud::{CrudRepository, Entity};
use crate::repo::discount_repo::SqliteDiscountRepository;
use crate::repo::error::RepoResult;
use crate::repo::order_item_repo::SqliteOrderItemRepository;
use crate::repo::order_repo::SqliteCustomerOrderRepository;
use crate::repo::payment_repo::SqlitePaymentRepository;
use crate::repo::product_repo::SqliteProductRepository;
use crate::repo::review_repo::SqliteReviewRepository;
use crate::repo::shipment_repo::SqliteShipmentRepository;
use crate::repo::user_repo::SqliteAppUserRepository;
use rusqlite::Connection;

/// Row count of one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableCount {
    pub table: &'static str,
    pub rows: i64,
}

/// Repository factory bound to one migrated connection.
pub struct StoreGateway<'conn> {
    conn: &'conn Connection,
}

impl<'conn> StoreGateway<'conn> {
    /// Verifies `conn` carries the latest schema and wraps it.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &'conn Connection {
        self.conn
    }

    /// Schema version this gateway was checked against.
    pub fn schema_version(&self) -> u32 {
        latest_version()
    }

    pub fn users(&self) -> SqliteAppUserRepository<'conn> {
        SqliteAppUserRepository::from_ready(self.conn)
    }

    pub fn addresses(&self) -> SqliteAddressRepository<'conn> {
        SqliteAddressRepository::from_ready(self.conn)
    }

    pub fn categories(&self) -> SqliteCategoryRepository<'conn> {
        SqliteCategoryRepository::from_ready(self.conn)
    }

    pub fn products(&self) -> SqliteProductRepository<'conn> {
        SqliteProductRepository::from_ready(self.conn)
    }

    pub fn orders(&self) -> SqliteCustomerOrderRepository<'conn> {
        SqliteCustomerOrderRepository::from_ready(self.conn)
    }

    pub fn order_items(&self) -> SqliteOrderItemRepository<'conn> {
        SqliteOrderItemRepository::from_ready(self.conn)
    }

    pub fn discounts(&self) -> SqliteDiscountRepository<'conn> {
        SqliteDiscountRepository::from_ready(self.conn)
    }

    pub fn payments(&self) -> SqlitePaymentRepository<'conn> {
        SqlitePaymentRepository::from_ready(self.conn)
    }

    pub fn shipments(&self) -> SqliteShipmentRepository<'conn> {
        SqliteShipmentRepository::from_ready(self.conn)
    }

    pub fn reviews(&self) -> SqliteReviewRepository<'conn> {
        SqliteReviewRepository::from_ready(self.conn)
    }

    /// Row counts of every table, in schema dependency order.
    pub fn table_counts(&self) -> RepoResult<Vec<TableCount>> {
        Ok(vec![
            table_count::<AppUser, _>(&self.users())?,
            table_count::<Address, _>(&self.addresses())?,
            table_count::<Category, _>(&self.categories())?,
            table_count::<Product, _>(&self.products())?,
            table_count::<CustomerOrder, _>(&self.orders())?,
            table_count::<OrderItem, _>(&self.order_items())?,
            table_count::<Discount, _>(&self.discounts())?,
            table_count::<Payment, _>(&self.payments())?,
            table_count::<Shipment, _>(&self.shipments())?,
            table_count::<Review, _>(&self.reviews())?,
        ])
    }
}

fn table_count<E, R>(repo: &R) -> RepoResult<TableCount>
where
    E: Entity,
    R: CrudRepository<E>,
{
    Ok(TableCount {
        table: E::TABLE,
        rows: repo.count()?,
    })
}
