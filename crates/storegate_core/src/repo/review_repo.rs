//! Review persistence, rating lookup and user/product loaders.

use super::crud::{CrudRepository, Entity};
use super::error::RepoResult;
use super::query::fetch_all;
use crate::db::ensure_schema_ready;
use crate::model::catalog::Review;
use crate::model::RecordId;
use rusqlite::types::Value;
use rusqlite::{params, Connection, Params, Row};

const FIND_BY_PRODUCT_AND_MIN_RATING_SQL: &str = "SELECT r.id, r.comment, r.rating, r.user_id, r.product_id
FROM review r
WHERE r.product_id = ?1 AND r.rating >= ?2
ORDER BY r.id;";

const FIND_BY_USER_ID_SQL: &str = "SELECT r.id, r.comment, r.rating, r.user_id, r.product_id
FROM review r
WHERE r.user_id = ?1
ORDER BY r.id;";

const FIND_BY_PRODUCT_ID_SQL: &str = "SELECT r.id, r.comment, r.rating, r.user_id, r.product_id
FROM review r
WHERE r.product_id = ?1
ORDER BY r.id;";

impl Entity for Review {
    const TABLE: &'static str = "review";
    const COLUMNS: &'static [&'static str] = &["comment", "rating", "user_id", "product_id"];

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn column_values(&self) -> Vec<Value> {
        vec![
            self.comment.clone().into(),
            self.rating.into(),
            self.user_id.into(),
            self.product_id.into(),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: row.get(0)?,
            comment: row.get(1)?,
            rating: row.get(2)?,
            user_id: row.get(3)?,
            product_id: row.get(4)?,
        })
    }
}

/// SQLite-backed review repository.
pub struct SqliteReviewRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteReviewRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }

    pub(crate) fn from_ready(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Reviews of `product_id` rated at least `min_rating`.
    pub fn find_by_product_and_min_rating(
        &self,
        product_id: RecordId,
        min_rating: i32,
    ) -> RepoResult<Vec<Review>> {
        self.reviews(
            "review.find_by_product_and_min_rating",
            FIND_BY_PRODUCT_AND_MIN_RATING_SQL,
            params![product_id, min_rating],
        )
    }

    pub fn find_by_user_id(&self, user_id: RecordId) -> RepoResult<Vec<Review>> {
        self.reviews(
            "review.find_by_user_id",
            FIND_BY_USER_ID_SQL,
            params![user_id],
        )
    }

    pub fn find_by_product_id(&self, product_id: RecordId) -> RepoResult<Vec<Review>> {
        self.reviews(
            "review.find_by_product_id",
            FIND_BY_PRODUCT_ID_SQL,
            params![product_id],
        )
    }

    fn reviews<P: Params>(
        &self,
        operation: &'static str,
        sql: &str,
        params: P,
    ) -> RepoResult<Vec<Review>> {
        fetch_all(self.conn, operation, sql, params, Review::from_row)
    }
}

impl CrudRepository<Review> for SqliteReviewRepository<'_> {
    fn connection(&self) -> &Connection {
        self.conn
    }
}
