//! Product persistence, price-range lookup and the category -> products loader.

use super::crud::{CrudRepository, Entity};
use super::error::RepoResult;
use super::query::fetch_all;
use crate::db::ensure_schema_ready;
use crate::model::catalog::Product;
use crate::model::RecordId;
use rusqlite::types::Value;
use rusqlite::{params, Connection, Row};

const FIND_BY_PRICE_RANGE_SQL: &str = "SELECT p.id, p.name, p.price, p.category_id
FROM product p
WHERE p.price BETWEEN ?1 AND ?2
ORDER BY p.id;";

const FIND_BY_CATEGORY_ID_SQL: &str = "SELECT p.id, p.name, p.price, p.category_id
FROM product p
WHERE p.category_id = ?1
ORDER BY p.id;";

impl Entity for Product {
    const TABLE: &'static str = "product";
    const COLUMNS: &'static [&'static str] = &["name", "price", "category_id"];

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn column_values(&self) -> Vec<Value> {
        vec![
            self.name.clone().into(),
            self.price.into(),
            self.category_id.into(),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(read_product(row, 0)?)
    }
}

/// Decodes `(id, name, price, category_id)` starting at column `offset`.
pub(crate) fn read_product(row: &Row<'_>, offset: usize) -> rusqlite::Result<Product> {
    Ok(Product {
        id: row.get(offset)?,
        name: row.get(offset + 1)?,
        price: row.get(offset + 2)?,
        category_id: row.get(offset + 3)?,
    })
}

/// SQLite-backed product repository.
pub struct SqliteProductRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProductRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }

    pub(crate) fn from_ready(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Products priced within `[min_price, max_price]`.
    pub fn find_by_price_range(&self, min_price: f64, max_price: f64) -> RepoResult<Vec<Product>> {
        fetch_all(
            self.conn,
            "product.find_by_price_range",
            FIND_BY_PRICE_RANGE_SQL,
            params![min_price, max_price],
            Product::from_row,
        )
    }

    pub fn find_by_category_id(&self, category_id: RecordId) -> RepoResult<Vec<Product>> {
        fetch_all(
            self.conn,
            "product.find_by_category_id",
            FIND_BY_CATEGORY_ID_SQL,
            params![category_id],
            Product::from_row,
        )
    }
}

impl CrudRepository<Product> for SqliteProductRepository<'_> {
    fn connection(&self) -> &Connection {
        self.conn
    }
}
