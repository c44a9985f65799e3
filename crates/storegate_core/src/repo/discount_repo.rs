//! Discount persistence and the discount query catalog.

use super::crud::{CrudRepository, Entity};
use super::error::RepoResult;
use super::product_repo::read_product;
use super::query::{fetch_all, like_fragment};
use crate::db::ensure_schema_ready;
use crate::model::catalog::Discount;
use crate::model::projection::{DiscountWithProduct, ProductDiscountCount};
use crate::model::RecordId;
use rusqlite::types::Value;
use rusqlite::{params, Connection, Params, Row};

const FIND_DISCOUNTS_BY_CODE_PATTERN_SQL: &str = "SELECT d.id, d.code, d.percentage, d.product_id
FROM discount d
WHERE d.code LIKE '%' || ?1 || '%' ESCAPE '\\'
ORDER BY d.id;";

const FIND_DISCOUNTS_BY_PERCENTAGE_RANGE_SQL: &str = "SELECT d.id, d.code, d.percentage, d.product_id
FROM discount d
WHERE d.percentage BETWEEN ?1 AND ?2
ORDER BY d.id;";

const FIND_DISCOUNTS_BY_PRODUCT_NAME_SQL: &str = "SELECT d.id, d.code, d.percentage, d.product_id
FROM discount d
JOIN product p ON p.id = d.product_id
WHERE p.name = ?1
ORDER BY d.id;";

const FIND_ALL_DISCOUNTS_WITH_PRODUCT_SQL: &str = "SELECT d.id, d.code, d.percentage, d.product_id,
       p.id, p.name, p.price, p.category_id
FROM discount d
JOIN product p ON p.id = d.product_id
ORDER BY d.id;";

const FIND_DISCOUNTS_BY_PRODUCT_PRICE_GREATER_THAN_SQL: &str = "SELECT d.id, d.code, d.percentage, d.product_id
FROM discount d
JOIN product p ON p.id = d.product_id
WHERE p.price > ?1
ORDER BY d.id;";

const FIND_DISCOUNTS_BY_PRODUCT_CATEGORY_SQL: &str = "SELECT d.id, d.code, d.percentage, d.product_id
FROM discount d
JOIN product p ON p.id = d.product_id
JOIN category c ON c.id = p.category_id
WHERE c.name = ?1
ORDER BY d.id;";

const FIND_DISCOUNTS_FOR_PRODUCTS_WITH_ORDER_ITEMS_SQL: &str = "SELECT DISTINCT d.id, d.code, d.percentage, d.product_id
FROM discount d
JOIN product p ON p.id = d.product_id
JOIN order_item oi ON oi.product_id = p.id
ORDER BY d.id;";

const FIND_DISCOUNTS_BY_PRODUCT_AVG_REVIEW_RATING_SQL: &str = "SELECT d.id, d.code, d.percentage, d.product_id
FROM discount d
JOIN product p ON p.id = d.product_id
JOIN review r ON r.product_id = p.id
GROUP BY d.id, p.id
HAVING AVG(r.rating) > ?1
ORDER BY d.id;";

const COUNT_DISCOUNTS_BY_PRODUCT_SQL: &str = "SELECT p.name, COUNT(d.id)
FROM discount d
JOIN product p ON p.id = d.product_id
GROUP BY p.name
ORDER BY p.name;";

const FIND_DISTINCT_DISCOUNTS_WITH_CODE_SQL: &str = "SELECT DISTINCT d.id, d.code, d.percentage, d.product_id
FROM discount d
JOIN product p ON p.id = d.product_id
WHERE d.code IS NOT NULL
ORDER BY d.id;";

const FIND_BY_PRODUCT_ID_SQL: &str = "SELECT d.id, d.code, d.percentage, d.product_id
FROM discount d
WHERE d.product_id = ?1
ORDER BY d.id;";

impl Entity for Discount {
    const TABLE: &'static str = "discount";
    const COLUMNS: &'static [&'static str] = &["code", "percentage", "product_id"];

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn column_values(&self) -> Vec<Value> {
        vec![
            self.code.clone().into(),
            self.percentage.into(),
            self.product_id.into(),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: row.get(0)?,
            code: row.get(1)?,
            percentage: row.get(2)?,
            product_id: row.get(3)?,
        })
    }
}

/// SQLite-backed discount repository.
pub struct SqliteDiscountRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDiscountRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }

    pub(crate) fn from_ready(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    pub fn find_discounts_by_code_pattern(&self, code_pattern: &str) -> RepoResult<Vec<Discount>> {
        self.discounts(
            "discount.find_discounts_by_code_pattern",
            FIND_DISCOUNTS_BY_CODE_PATTERN_SQL,
            params![like_fragment(code_pattern)],
        )
    }

    /// Inclusive on both bounds.
    pub fn find_discounts_by_percentage_range(
        &self,
        min_percentage: f64,
        max_percentage: f64,
    ) -> RepoResult<Vec<Discount>> {
        self.discounts(
            "discount.find_discounts_by_percentage_range",
            FIND_DISCOUNTS_BY_PERCENTAGE_RANGE_SQL,
            params![min_percentage, max_percentage],
        )
    }

    pub fn find_discounts_by_product_name(&self, product_name: &str) -> RepoResult<Vec<Discount>> {
        self.discounts(
            "discount.find_discounts_by_product_name",
            FIND_DISCOUNTS_BY_PRODUCT_NAME_SQL,
            params![product_name],
        )
    }

    /// Every discount attached to a product, loaded with that product.
    pub fn find_all_discounts_with_product(&self) -> RepoResult<Vec<DiscountWithProduct>> {
        fetch_all(
            self.conn,
            "discount.find_all_discounts_with_product",
            FIND_ALL_DISCOUNTS_WITH_PRODUCT_SQL,
            params![],
            |row| {
                Ok(DiscountWithProduct {
                    discount: Discount::from_row(row)?,
                    product: read_product(row, 4)?,
                })
            },
        )
    }

    pub fn find_discounts_by_product_price_greater_than(
        &self,
        price: f64,
    ) -> RepoResult<Vec<Discount>> {
        self.discounts(
            "discount.find_discounts_by_product_price_greater_than",
            FIND_DISCOUNTS_BY_PRODUCT_PRICE_GREATER_THAN_SQL,
            params![price],
        )
    }

    pub fn find_discounts_by_product_category(
        &self,
        category_name: &str,
    ) -> RepoResult<Vec<Discount>> {
        self.discounts(
            "discount.find_discounts_by_product_category",
            FIND_DISCOUNTS_BY_PRODUCT_CATEGORY_SQL,
            params![category_name],
        )
    }

    pub fn find_discounts_for_products_with_order_items(&self) -> RepoResult<Vec<Discount>> {
        self.discounts(
            "discount.find_discounts_for_products_with_order_items",
            FIND_DISCOUNTS_FOR_PRODUCTS_WITH_ORDER_ITEMS_SQL,
            params![],
        )
    }

    /// Discounts whose product averages a review rating above `min_avg_rating`.
    pub fn find_discounts_by_product_avg_review_rating(
        &self,
        min_avg_rating: f64,
    ) -> RepoResult<Vec<Discount>> {
        self.discounts(
            "discount.find_discounts_by_product_avg_review_rating",
            FIND_DISCOUNTS_BY_PRODUCT_AVG_REVIEW_RATING_SQL,
            params![min_avg_rating],
        )
    }

    /// Discount count per product name.
    pub fn count_discounts_by_product(&self) -> RepoResult<Vec<ProductDiscountCount>> {
        fetch_all(
            self.conn,
            "discount.count_discounts_by_product",
            COUNT_DISCOUNTS_BY_PRODUCT_SQL,
            params![],
            |row| {
                Ok(ProductDiscountCount {
                    product_name: row.get(0)?,
                    count: row.get(1)?,
                })
            },
        )
    }

    pub fn find_distinct_discounts_with_code(&self) -> RepoResult<Vec<Discount>> {
        self.discounts(
            "discount.find_distinct_discounts_with_code",
            FIND_DISTINCT_DISCOUNTS_WITH_CODE_SQL,
            params![],
        )
    }

    pub fn find_by_product_id(&self, product_id: RecordId) -> RepoResult<Vec<Discount>> {
        self.discounts(
            "discount.find_by_product_id",
            FIND_BY_PRODUCT_ID_SQL,
            params![product_id],
        )
    }

    fn discounts<P: Params>(
        &self,
        operation: &'static str,
        sql: &str,
        params: P,
    ) -> RepoResult<Vec<Discount>> {
        fetch_all(self.conn, operation, sql, params, Discount::from_row)
    }
}

impl CrudRepository<Discount> for SqliteDiscountRepository<'_> {
    fn connection(&self) -> &Connection {
        self.conn
    }
}
