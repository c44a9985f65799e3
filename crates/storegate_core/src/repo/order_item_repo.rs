//! Order item persistence and the order item query catalog.
//!
//! # Invariants
//! - Quantity aggregates skip `NULL` quantities; `count_by_order_id` counts
//!   rows regardless of quantity.
//! - `find_max_quantity_in_order` / `find_min_quantity_in_order` break ties
//!   on the lowest item id.

use super::crud::{CrudRepository, Entity};
use super::error::{RepoError, RepoResult};
use super::query::{expand_in_list, fetch_all, fetch_optional, fetch_scalar, like_fragment};
use crate::db::ensure_schema_ready;
use crate::model::order::OrderItem;
use crate::model::projection::ProductItemCount;
use crate::model::RecordId;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Params, Row};

const FIND_BY_ORDER_ID_SQL: &str = "SELECT oi.id, oi.order_id, oi.product_id, oi.quantity
FROM order_item oi
WHERE oi.order_id = ?1
ORDER BY oi.id;";

const FIND_BY_PRODUCT_NAME_SQL: &str = "SELECT oi.id, oi.order_id, oi.product_id, oi.quantity
FROM order_item oi
JOIN product p ON p.id = oi.product_id
WHERE p.name = ?1
ORDER BY oi.id;";

const FIND_BY_PRODUCT_NAME_LIKE_SQL: &str = "SELECT oi.id, oi.order_id, oi.product_id, oi.quantity
FROM order_item oi
JOIN product p ON p.id = oi.product_id
WHERE p.name LIKE '%' || ?1 || '%' ESCAPE '\\'
ORDER BY oi.id;";

const FIND_BY_QUANTITY_GREATER_THAN_SQL: &str = "SELECT oi.id, oi.order_id, oi.product_id, oi.quantity
FROM order_item oi
WHERE oi.quantity > ?1
ORDER BY oi.id;";

const FIND_BY_QUANTITY_LESS_THAN_SQL: &str = "SELECT oi.id, oi.order_id, oi.product_id, oi.quantity
FROM order_item oi
WHERE oi.quantity < ?1
ORDER BY oi.id;";

const FIND_BY_QUANTITY_BETWEEN_SQL: &str = "SELECT oi.id, oi.order_id, oi.product_id, oi.quantity
FROM order_item oi
WHERE oi.quantity BETWEEN ?1 AND ?2
ORDER BY oi.id;";

const COUNT_BY_ORDER_ID_SQL: &str = "SELECT COUNT(oi.id)
FROM order_item oi
WHERE oi.order_id = ?1;";

const SUM_QUANTITIES_BY_ORDER_ID_SQL: &str = "SELECT SUM(oi.quantity)
FROM order_item oi
WHERE oi.order_id = ?1;";

const FIND_DISTINCT_BY_PRODUCT_ID_SQL: &str = "SELECT DISTINCT oi.id, oi.order_id, oi.product_id, oi.quantity
FROM order_item oi
WHERE oi.product_id = ?1
ORDER BY oi.id;";

const FIND_BY_ORDER_ID_AND_PRODUCT_ID_SQL: &str = "SELECT oi.id, oi.order_id, oi.product_id, oi.quantity
FROM order_item oi
WHERE oi.order_id = ?1 AND oi.product_id = ?2
ORDER BY oi.id;";

const FIND_BY_QUANTITY_MIN_AND_MAX_SQL: &str = "SELECT oi.id, oi.order_id, oi.product_id, oi.quantity
FROM order_item oi
WHERE oi.quantity >= ?1 AND oi.quantity <= ?2
ORDER BY oi.id;";

const FIND_BY_ORDER_ID_ORDER_BY_QUANTITY_ASC_SQL: &str = "SELECT oi.id, oi.order_id, oi.product_id, oi.quantity
FROM order_item oi
WHERE oi.order_id = ?1
ORDER BY oi.quantity ASC, oi.id ASC;";

const FIND_BY_ORDER_ID_ORDER_BY_QUANTITY_DESC_SQL: &str = "SELECT oi.id, oi.order_id, oi.product_id, oi.quantity
FROM order_item oi
WHERE oi.order_id = ?1
ORDER BY oi.quantity DESC, oi.id ASC;";

const FIND_BY_PRODUCT_PRICE_GREATER_THAN_SQL: &str = "SELECT oi.id, oi.order_id, oi.product_id, oi.quantity
FROM order_item oi
JOIN product p ON p.id = oi.product_id
WHERE p.price > ?1
ORDER BY oi.id;";

const FIND_BY_PRODUCT_PRICE_LESS_THAN_SQL: &str = "SELECT oi.id, oi.order_id, oi.product_id, oi.quantity
FROM order_item oi
JOIN product p ON p.id = oi.product_id
WHERE p.price < ?1
ORDER BY oi.id;";

const FIND_BY_PRODUCT_CATEGORY_NAME_SQL: &str = "SELECT oi.id, oi.order_id, oi.product_id, oi.quantity
FROM order_item oi
JOIN product p ON p.id = oi.product_id
JOIN category c ON c.id = p.category_id
WHERE c.name = ?1
ORDER BY oi.id;";

const FIND_BY_CUSTOMER_ORDER_USER_ID_SQL: &str = "SELECT oi.id, oi.order_id, oi.product_id, oi.quantity
FROM order_item oi
JOIN customer_order co ON co.id = oi.order_id
WHERE co.user_id = ?1
ORDER BY oi.id;";

const FIND_BY_PRODUCT_NAME_AND_QUANTITY_SQL: &str = "SELECT oi.id, oi.order_id, oi.product_id, oi.quantity
FROM order_item oi
JOIN product p ON p.id = oi.product_id
WHERE p.name = ?1 AND oi.quantity = ?2
ORDER BY oi.id;";

const FIND_MAX_QUANTITY_IN_ORDER_SQL: &str = "SELECT oi.id, oi.order_id, oi.product_id, oi.quantity
FROM order_item oi
WHERE oi.order_id = ?1
  AND oi.quantity = (SELECT MAX(oi2.quantity) FROM order_item oi2 WHERE oi2.order_id = ?1)
ORDER BY oi.id ASC
LIMIT 1;";

const FIND_MIN_QUANTITY_IN_ORDER_SQL: &str = "SELECT oi.id, oi.order_id, oi.product_id, oi.quantity
FROM order_item oi
WHERE oi.order_id = ?1
  AND oi.quantity = (SELECT MIN(oi2.quantity) FROM order_item oi2 WHERE oi2.order_id = ?1)
ORDER BY oi.id ASC
LIMIT 1;";

const GROUP_BY_PRODUCT_ID_COUNT_SQL: &str = "SELECT oi.product_id, COUNT(oi.id)
FROM order_item oi
GROUP BY oi.product_id
ORDER BY oi.product_id;";

const FIND_BY_ORDER_ID_AND_QUANTITY_GREATER_THAN_SQL: &str = "SELECT oi.id, oi.order_id, oi.product_id, oi.quantity
FROM order_item oi
WHERE oi.order_id = ?1 AND oi.quantity > ?2
ORDER BY oi.id;";

const FIND_BY_ORDER_ID_AND_QUANTITY_LESS_THAN_SQL: &str = "SELECT oi.id, oi.order_id, oi.product_id, oi.quantity
FROM order_item oi
WHERE oi.order_id = ?1 AND oi.quantity < ?2
ORDER BY oi.id;";

const FIND_BY_PRODUCT_ID_ORDER_BY_QUANTITY_SQL: &str = "SELECT oi.id, oi.order_id, oi.product_id, oi.quantity
FROM order_item oi
WHERE oi.product_id = ?1
ORDER BY oi.quantity ASC, oi.id ASC;";

const FIND_DISTINCT_BY_ORDER_ID_SQL: &str = "SELECT DISTINCT oi.id, oi.order_id, oi.product_id, oi.quantity
FROM order_item oi
WHERE oi.order_id = ?1
ORDER BY oi.id;";

const FIND_BY_PRODUCT_ID_AND_QUANTITY_BETWEEN_SQL: &str = "SELECT oi.id, oi.order_id, oi.product_id, oi.quantity
FROM order_item oi
WHERE oi.product_id = ?1 AND oi.quantity BETWEEN ?2 AND ?3
ORDER BY oi.id;";

const FIND_BY_QUANTITY_SQL: &str = "SELECT oi.id, oi.order_id, oi.product_id, oi.quantity
FROM order_item oi
WHERE oi.quantity = ?1
ORDER BY oi.id;";

const FIND_BY_QUANTITY_NOT_EQUAL_SQL: &str = "SELECT oi.id, oi.order_id, oi.product_id, oi.quantity
FROM order_item oi
WHERE oi.quantity <> ?1
ORDER BY oi.id;";

const FIND_BY_ORDER_ID_WITH_NON_NULL_QUANTITY_SQL: &str = "SELECT oi.id, oi.order_id, oi.product_id, oi.quantity
FROM order_item oi
WHERE oi.order_id = ?1 AND oi.quantity IS NOT NULL
ORDER BY oi.id;";

const FIND_BY_PRODUCT_ID_WITH_NON_NULL_QUANTITY_SQL: &str = "SELECT oi.id, oi.order_id, oi.product_id, oi.quantity
FROM order_item oi
WHERE oi.product_id = ?1 AND oi.quantity IS NOT NULL
ORDER BY oi.id;";

const FIND_BY_PRODUCT_NAME_STARTING_WITH_SQL: &str = "SELECT oi.id, oi.order_id, oi.product_id, oi.quantity
FROM order_item oi
JOIN product p ON p.id = oi.product_id
WHERE p.name LIKE ?1 || '%' ESCAPE '\\'
ORDER BY oi.id;";

const FIND_BY_PRODUCT_NAME_ENDING_WITH_SQL: &str = "SELECT oi.id, oi.order_id, oi.product_id, oi.quantity
FROM order_item oi
JOIN product p ON p.id = oi.product_id
WHERE p.name LIKE '%' || ?1 ESCAPE '\\'
ORDER BY oi.id;";

const FIND_BY_ORDER_ID_AND_PRODUCT_NAME_LIKE_SQL: &str = "SELECT oi.id, oi.order_id, oi.product_id, oi.quantity
FROM order_item oi
JOIN product p ON p.id = oi.product_id
WHERE oi.order_id = ?1 AND p.name LIKE '%' || ?2 || '%' ESCAPE '\\'
ORDER BY oi.id;";

const FIND_BY_ORDER_ID_AND_PRODUCT_NAME_SQL: &str = "SELECT oi.id, oi.order_id, oi.product_id, oi.quantity
FROM order_item oi
JOIN product p ON p.id = oi.product_id
WHERE oi.order_id = ?1 AND p.name = ?2
ORDER BY oi.id;";

const FIND_BY_CUSTOMER_ORDER_USER_NAME_SQL: &str = "SELECT oi.id, oi.order_id, oi.product_id, oi.quantity
FROM order_item oi
JOIN customer_order co ON co.id = oi.order_id
JOIN app_user u ON u.id = co.user_id
WHERE u.name = ?1
ORDER BY oi.id;";

const FIND_BY_PRODUCT_IDS_TEMPLATE: &str = "SELECT oi.id, oi.order_id, oi.product_id, oi.quantity
FROM order_item oi
WHERE oi.product_id IN ({list})
ORDER BY oi.id;";

const FIND_BY_ORDER_IDS_TEMPLATE: &str = "SELECT oi.id, oi.order_id, oi.product_id, oi.quantity
FROM order_item oi
WHERE oi.order_id IN ({list})
ORDER BY oi.id;";

const FIND_BY_QUANTITY_MULTIPLE_OF_SQL: &str = "SELECT oi.id, oi.order_id, oi.product_id, oi.quantity
FROM order_item oi
WHERE oi.quantity % ?1 = 0
ORDER BY oi.id;";

const FIND_BY_EVEN_QUANTITY_SQL: &str = "SELECT oi.id, oi.order_id, oi.product_id, oi.quantity
FROM order_item oi
WHERE oi.quantity % 2 = 0
ORDER BY oi.id;";

const FIND_BY_ODD_QUANTITY_SQL: &str = "SELECT oi.id, oi.order_id, oi.product_id, oi.quantity
FROM order_item oi
WHERE oi.quantity % 2 = 1
ORDER BY oi.id;";

impl Entity for OrderItem {
    const TABLE: &'static str = "order_item";
    const COLUMNS: &'static [&'static str] = &["order_id", "product_id", "quantity"];

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn column_values(&self) -> Vec<Value> {
        vec![
            self.order_id.into(),
            self.product_id.into(),
            self.quantity.into(),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: row.get(0)?,
            order_id: row.get(1)?,
            product_id: row.get(2)?,
            quantity: row.get(3)?,
        })
    }
}

/// SQLite-backed order item repository.
pub struct SqliteOrderItemRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteOrderItemRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }

    pub(crate) fn from_ready(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Items of one order; also the order -> items loader.
    pub fn find_by_order_id(&self, order_id: RecordId) -> RepoResult<Vec<OrderItem>> {
        self.items(
            "order_item.find_by_order_id",
            FIND_BY_ORDER_ID_SQL,
            params![order_id],
        )
    }

    pub fn find_by_product_name(&self, product_name: &str) -> RepoResult<Vec<OrderItem>> {
        self.items(
            "order_item.find_by_product_name",
            FIND_BY_PRODUCT_NAME_SQL,
            params![product_name],
        )
    }

    pub fn find_by_product_name_like(&self, product_name: &str) -> RepoResult<Vec<OrderItem>> {
        self.items(
            "order_item.find_by_product_name_like",
            FIND_BY_PRODUCT_NAME_LIKE_SQL,
            params![like_fragment(product_name)],
        )
    }

    pub fn find_by_quantity_greater_than(&self, quantity: i32) -> RepoResult<Vec<OrderItem>> {
        self.items(
            "order_item.find_by_quantity_greater_than",
            FIND_BY_QUANTITY_GREATER_THAN_SQL,
            params![quantity],
        )
    }

    pub fn find_by_quantity_less_than(&self, quantity: i32) -> RepoResult<Vec<OrderItem>> {
        self.items(
            "order_item.find_by_quantity_less_than",
            FIND_BY_QUANTITY_LESS_THAN_SQL,
            params![quantity],
        )
    }

    /// Inclusive on both bounds.
    pub fn find_by_quantity_between(
        &self,
        min_quantity: i32,
        max_quantity: i32,
    ) -> RepoResult<Vec<OrderItem>> {
        self.items(
            "order_item.find_by_quantity_between",
            FIND_BY_QUANTITY_BETWEEN_SQL,
            params![min_quantity, max_quantity],
        )
    }

    /// Number of items in one order; `0` for an order without items.
    pub fn count_by_order_id(&self, order_id: RecordId) -> RepoResult<i64> {
        fetch_scalar(
            self.conn,
            "order_item.count_by_order_id",
            COUNT_BY_ORDER_ID_SQL,
            params![order_id],
        )
    }

    /// Sum of non-null quantities in one order; `None` when there are none.
    pub fn sum_quantities_by_order_id(&self, order_id: RecordId) -> RepoResult<Option<i64>> {
        fetch_scalar(
            self.conn,
            "order_item.sum_quantities_by_order_id",
            SUM_QUANTITIES_BY_ORDER_ID_SQL,
            params![order_id],
        )
    }

    pub fn find_distinct_by_product_id(&self, product_id: RecordId) -> RepoResult<Vec<OrderItem>> {
        self.items(
            "order_item.find_distinct_by_product_id",
            FIND_DISTINCT_BY_PRODUCT_ID_SQL,
            params![product_id],
        )
    }

    pub fn find_by_order_id_and_product_id(
        &self,
        order_id: RecordId,
        product_id: RecordId,
    ) -> RepoResult<Vec<OrderItem>> {
        self.items(
            "order_item.find_by_order_id_and_product_id",
            FIND_BY_ORDER_ID_AND_PRODUCT_ID_SQL,
            params![order_id, product_id],
        )
    }

    pub fn find_by_quantity_min_and_max(
        &self,
        min_quantity: i32,
        max_quantity: i32,
    ) -> RepoResult<Vec<OrderItem>> {
        self.items(
            "order_item.find_by_quantity_min_and_max",
            FIND_BY_QUANTITY_MIN_AND_MAX_SQL,
            params![min_quantity, max_quantity],
        )
    }

    /// `NULL` quantities sort first.
    pub fn find_by_order_id_order_by_quantity_asc(
        &self,
        order_id: RecordId,
    ) -> RepoResult<Vec<OrderItem>> {
        self.items(
            "order_item.find_by_order_id_order_by_quantity_asc",
            FIND_BY_ORDER_ID_ORDER_BY_QUANTITY_ASC_SQL,
            params![order_id],
        )
    }

    pub fn find_by_order_id_order_by_quantity_desc(
        &self,
        order_id: RecordId,
    ) -> RepoResult<Vec<OrderItem>> {
        self.items(
            "order_item.find_by_order_id_order_by_quantity_desc",
            FIND_BY_ORDER_ID_ORDER_BY_QUANTITY_DESC_SQL,
            params![order_id],
        )
    }

    pub fn find_by_product_price_greater_than(&self, price: f64) -> RepoResult<Vec<OrderItem>> {
        self.items(
            "order_item.find_by_product_price_greater_than",
            FIND_BY_PRODUCT_PRICE_GREATER_THAN_SQL,
            params![price],
        )
    }

    pub fn find_by_product_price_less_than(&self, price: f64) -> RepoResult<Vec<OrderItem>> {
        self.items(
            "order_item.find_by_product_price_less_than",
            FIND_BY_PRODUCT_PRICE_LESS_THAN_SQL,
            params![price],
        )
    }

    pub fn find_by_product_category_name(
        &self,
        category_name: &str,
    ) -> RepoResult<Vec<OrderItem>> {
        self.items(
            "order_item.find_by_product_category_name",
            FIND_BY_PRODUCT_CATEGORY_NAME_SQL,
            params![category_name],
        )
    }

    pub fn find_by_customer_order_user_id(&self, user_id: RecordId) -> RepoResult<Vec<OrderItem>> {
        self.items(
            "order_item.find_by_customer_order_user_id",
            FIND_BY_CUSTOMER_ORDER_USER_ID_SQL,
            params![user_id],
        )
    }

    pub fn find_by_product_name_and_quantity(
        &self,
        product_name: &str,
        quantity: i32,
    ) -> RepoResult<Vec<OrderItem>> {
        self.items(
            "order_item.find_by_product_name_and_quantity",
            FIND_BY_PRODUCT_NAME_AND_QUANTITY_SQL,
            params![product_name, quantity],
        )
    }

    /// Item carrying the largest quantity of the order, lowest id on ties.
    pub fn find_max_quantity_in_order(&self, order_id: RecordId) -> RepoResult<Option<OrderItem>> {
        fetch_optional(
            self.conn,
            "order_item.find_max_quantity_in_order",
            FIND_MAX_QUANTITY_IN_ORDER_SQL,
            params![order_id],
            OrderItem::from_row,
        )
    }

    /// Item carrying the smallest quantity of the order, lowest id on ties.
    pub fn find_min_quantity_in_order(&self, order_id: RecordId) -> RepoResult<Option<OrderItem>> {
        fetch_optional(
            self.conn,
            "order_item.find_min_quantity_in_order",
            FIND_MIN_QUANTITY_IN_ORDER_SQL,
            params![order_id],
            OrderItem::from_row,
        )
    }

    pub fn group_by_product_id_count(&self) -> RepoResult<Vec<ProductItemCount>> {
        fetch_all(
            self.conn,
            "order_item.group_by_product_id_count",
            GROUP_BY_PRODUCT_ID_COUNT_SQL,
            params![],
            |row| {
                Ok(ProductItemCount {
                    product_id: row.get(0)?,
                    count: row.get(1)?,
                })
            },
        )
    }

    pub fn find_by_order_id_and_quantity_greater_than(
        &self,
        order_id: RecordId,
        quantity: i32,
    ) -> RepoResult<Vec<OrderItem>> {
        self.items(
            "order_item.find_by_order_id_and_quantity_greater_than",
            FIND_BY_ORDER_ID_AND_QUANTITY_GREATER_THAN_SQL,
            params![order_id, quantity],
        )
    }

    pub fn find_by_order_id_and_quantity_less_than(
        &self,
        order_id: RecordId,
        quantity: i32,
    ) -> RepoResult<Vec<OrderItem>> {
        self.items(
            "order_item.find_by_order_id_and_quantity_less_than",
            FIND_BY_ORDER_ID_AND_QUANTITY_LESS_THAN_SQL,
            params![order_id, quantity],
        )
    }

    pub fn find_by_product_id_order_by_quantity(
        &self,
        product_id: RecordId,
    ) -> RepoResult<Vec<OrderItem>> {
        self.items(
            "order_item.find_by_product_id_order_by_quantity",
            FIND_BY_PRODUCT_ID_ORDER_BY_QUANTITY_SQL,
            params![product_id],
        )
    }

    pub fn find_distinct_by_order_id(&self, order_id: RecordId) -> RepoResult<Vec<OrderItem>> {
        self.items(
            "order_item.find_distinct_by_order_id",
            FIND_DISTINCT_BY_ORDER_ID_SQL,
            params![order_id],
        )
    }

    pub fn find_by_product_id_and_quantity_between(
        &self,
        product_id: RecordId,
        min_quantity: i32,
        max_quantity: i32,
    ) -> RepoResult<Vec<OrderItem>> {
        self.items(
            "order_item.find_by_product_id_and_quantity_between",
            FIND_BY_PRODUCT_ID_AND_QUANTITY_BETWEEN_SQL,
            params![product_id, min_quantity, max_quantity],
        )
    }

    pub fn find_by_quantity(&self, quantity: i32) -> RepoResult<Vec<OrderItem>> {
        self.items(
            "order_item.find_by_quantity",
            FIND_BY_QUANTITY_SQL,
            params![quantity],
        )
    }

    /// Items whose quantity is set and differs from `quantity`.
    pub fn find_by_quantity_not_equal(&self, quantity: i32) -> RepoResult<Vec<OrderItem>> {
        self.items(
            "order_item.find_by_quantity_not_equal",
            FIND_BY_QUANTITY_NOT_EQUAL_SQL,
            params![quantity],
        )
    }

    pub fn find_by_order_id_with_non_null_quantity(
        &self,
        order_id: RecordId,
    ) -> RepoResult<Vec<OrderItem>> {
        self.items(
            "order_item.find_by_order_id_with_non_null_quantity",
            FIND_BY_ORDER_ID_WITH_NON_NULL_QUANTITY_SQL,
            params![order_id],
        )
    }

    pub fn find_by_product_id_with_non_null_quantity(
        &self,
        product_id: RecordId,
    ) -> RepoResult<Vec<OrderItem>> {
        self.items(
            "order_item.find_by_product_id_with_non_null_quantity",
            FIND_BY_PRODUCT_ID_WITH_NON_NULL_QUANTITY_SQL,
            params![product_id],
        )
    }

    pub fn find_by_product_name_starting_with(&self, prefix: &str) -> RepoResult<Vec<OrderItem>> {
        self.items(
            "order_item.find_by_product_name_starting_with",
            FIND_BY_PRODUCT_NAME_STARTING_WITH_SQL,
            params![like_fragment(prefix)],
        )
    }

    pub fn find_by_product_name_ending_with(&self, suffix: &str) -> RepoResult<Vec<OrderItem>> {
        self.items(
            "order_item.find_by_product_name_ending_with",
            FIND_BY_PRODUCT_NAME_ENDING_WITH_SQL,
            params![like_fragment(suffix)],
        )
    }

    pub fn find_by_order_id_and_product_name_like(
        &self,
        order_id: RecordId,
        product_name: &str,
    ) -> RepoResult<Vec<OrderItem>> {
        self.items(
            "order_item.find_by_order_id_and_product_name_like",
            FIND_BY_ORDER_ID_AND_PRODUCT_NAME_LIKE_SQL,
            params![order_id, like_fragment(product_name)],
        )
    }

    pub fn find_by_order_id_and_product_name(
        &self,
        order_id: RecordId,
        product_name: &str,
    ) -> RepoResult<Vec<OrderItem>> {
        self.items(
            "order_item.find_by_order_id_and_product_name",
            FIND_BY_ORDER_ID_AND_PRODUCT_NAME_SQL,
            params![order_id, product_name],
        )
    }

    pub fn find_by_customer_order_user_name(
        &self,
        user_name: &str,
    ) -> RepoResult<Vec<OrderItem>> {
        self.items(
            "order_item.find_by_customer_order_user_name",
            FIND_BY_CUSTOMER_ORDER_USER_NAME_SQL,
            params![user_name],
        )
    }

    /// # Errors
    /// `InvalidArgument` when `product_ids` is empty.
    pub fn find_by_product_ids(&self, product_ids: &[RecordId]) -> RepoResult<Vec<OrderItem>> {
        let (sql, binds) =
            expand_in_list(FIND_BY_PRODUCT_IDS_TEMPLATE, "product_ids", Vec::new(), product_ids)?;
        self.items(
            "order_item.find_by_product_ids",
            &sql,
            params_from_iter(binds),
        )
    }

    /// # Errors
    /// `InvalidArgument` when `order_ids` is empty.
    pub fn find_by_order_ids(&self, order_ids: &[RecordId]) -> RepoResult<Vec<OrderItem>> {
        let (sql, binds) =
            expand_in_list(FIND_BY_ORDER_IDS_TEMPLATE, "order_ids", Vec::new(), order_ids)?;
        self.items("order_item.find_by_order_ids", &sql, params_from_iter(binds))
    }

    /// # Errors
    /// `InvalidArgument` when `multiple` is zero.
    pub fn find_by_quantity_multiple_of(&self, multiple: i32) -> RepoResult<Vec<OrderItem>> {
        if multiple == 0 {
            return Err(RepoError::InvalidArgument(
                "`multiple` must be non-zero".to_string(),
            ));
        }
        self.items(
            "order_item.find_by_quantity_multiple_of",
            FIND_BY_QUANTITY_MULTIPLE_OF_SQL,
            params![multiple],
        )
    }

    pub fn find_by_even_quantity(&self) -> RepoResult<Vec<OrderItem>> {
        self.items(
            "order_item.find_by_even_quantity",
            FIND_BY_EVEN_QUANTITY_SQL,
            params![],
        )
    }

    /// Positive odd quantities only; the remainder keeps the dividend's sign.
    pub fn find_by_odd_quantity(&self) -> RepoResult<Vec<OrderItem>> {
        self.items(
            "order_item.find_by_odd_quantity",
            FIND_BY_ODD_QUANTITY_SQL,
            params![],
        )
    }

    fn items<P: Params>(
        &self,
        operation: &'static str,
        sql: &str,
        params: P,
    ) -> RepoResult<Vec<OrderItem>> {
        fetch_all(self.conn, operation, sql, params, OrderItem::from_row)
    }
}

impl CrudRepository<OrderItem> for SqliteOrderItemRepository<'_> {
    fn connection(&self) -> &Connection {
        self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::SqliteOrderItemRepository;
    use crate::db::open_db_in_memory;
    use crate::repo::error::RepoError;

    #[test]
    fn zero_divisor_fails_before_round_trip() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteOrderItemRepository::try_new(&conn).unwrap();
        let err = repo.find_by_quantity_multiple_of(0).unwrap_err();
        assert!(matches!(err, RepoError::InvalidArgument(_)));
    }

    #[test]
    fn empty_id_lists_are_rejected() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteOrderItemRepository::try_new(&conn).unwrap();
        assert!(matches!(
            repo.find_by_product_ids(&[]).unwrap_err(),
            RepoError::InvalidArgument(_)
        ));
        assert!(matches!(
            repo.find_by_order_ids(&[]).unwrap_err(),
            RepoError::InvalidArgument(_)
        ));
    }
}
