//! Category persistence.

use super::crud::{CrudRepository, Entity};
use super::error::RepoResult;
use super::query::fetch_optional;
use crate::db::ensure_schema_ready;
use crate::model::catalog::Category;
use crate::model::RecordId;
use rusqlite::types::Value;
use rusqlite::{params, Connection, Row};

const FIND_BY_PRODUCT_ID_SQL: &str = "SELECT c.id, c.name
FROM category c
JOIN product p ON p.category_id = c.id
WHERE p.id = ?1;";

impl Entity for Category {
    const TABLE: &'static str = "category";
    const COLUMNS: &'static [&'static str] = &["name"];

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn column_values(&self) -> Vec<Value> {
        vec![self.name.clone().into()]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    }
}

/// SQLite-backed category repository.
pub struct SqliteCategoryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCategoryRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }

    pub(crate) fn from_ready(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Category of one product; `None` when the product has none.
    pub fn find_by_product_id(&self, product_id: RecordId) -> RepoResult<Option<Category>> {
        fetch_optional(
            self.conn,
            "category.find_by_product_id",
            FIND_BY_PRODUCT_ID_SQL,
            params![product_id],
            Category::from_row,
        )
    }
}

impl CrudRepository<Category> for SqliteCategoryRepository<'_> {
    fn connection(&self) -> &Connection {
        self.conn
    }
}
