//! App user persistence and the user query catalog.
//!
//! # Responsibility
//! - Map `app_user` rows to [`AppUser`].
//! - Serve name, relationship and aggregate lookups over users.
//!
//! # Invariants
//! - Queries without an explicit sort return rows ordered by `id`.
//! - Join-based lookups return each user at most once.

use super::crud::{CrudRepository, Entity};
use super::error::RepoResult;
use super::query::{fetch_all, like_fragment};
use crate::db::ensure_schema_ready;
use crate::model::projection::UserOrderCount;
use crate::model::user::AppUser;
use crate::model::RecordId;
use rusqlite::types::Value;
use rusqlite::{params, Connection, Params, Row};

/// Name a user must carry to pass [`SqliteAppUserRepository::find_complex_app_user_by_user_id`]
/// unconditionally.
pub const SPECIAL_USER_NAME: &str = "SPECIAL_USER";

const FIND_BY_NAME_CONTAINS_SQL: &str = "SELECT u.id, u.name
FROM app_user u
WHERE u.name LIKE '%' || ?1 || '%' ESCAPE '\\'
ORDER BY u.id;";

const FIND_BY_EXACT_NAME_SQL: &str = "SELECT u.id, u.name
FROM app_user u
WHERE u.name = ?1
ORDER BY u.id;";

const FIND_BY_NAME_STARTING_WITH_SQL: &str = "SELECT u.id, u.name
FROM app_user u
WHERE u.name LIKE ?1 || '%' ESCAPE '\\'
ORDER BY u.id;";

const FIND_BY_NAME_ENDING_WITH_SQL: &str = "SELECT u.id, u.name
FROM app_user u
WHERE u.name LIKE '%' || ?1 ESCAPE '\\'
ORDER BY u.id;";

const FIND_USERS_WITH_ORDERS_SQL: &str = "SELECT DISTINCT u.id, u.name
FROM app_user u
JOIN customer_order o ON o.user_id = u.id
ORDER BY u.id;";

const FIND_USERS_WITHOUT_ORDERS_SQL: &str = "SELECT u.id, u.name
FROM app_user u
LEFT JOIN customer_order o ON o.user_id = u.id
WHERE o.id IS NULL
ORDER BY u.id;";

const FIND_USERS_BY_ADDRESS_CITY_SQL: &str = "SELECT DISTINCT u.id, u.name
FROM app_user u
JOIN address a ON a.user_id = u.id
WHERE a.city = ?1
ORDER BY u.id;";

const FIND_USERS_BY_REVIEW_RATING_GREATER_THAN_SQL: &str = "SELECT DISTINCT u.id, u.name
FROM app_user u
JOIN review r ON r.user_id = u.id
WHERE r.rating > ?1
ORDER BY u.id;";

const COUNT_USERS_WITH_ORDERS_SQL: &str = "SELECT u.id, u.name, COUNT(o.id)
FROM app_user u
LEFT JOIN customer_order o ON o.user_id = u.id
GROUP BY u.id, u.name
ORDER BY u.id;";

const FIND_USERS_ORDERED_BY_NAME_ASC_SQL: &str = "SELECT u.id, u.name
FROM app_user u
ORDER BY u.name ASC, u.id ASC;";

const FIND_USERS_ORDERED_BY_NAME_DESC_SQL: &str = "SELECT u.id, u.name
FROM app_user u
ORDER BY u.name DESC, u.id ASC;";

const FIND_USERS_WITH_AT_LEAST_N_ORDERS_SQL: &str = "SELECT u.id, u.name
FROM app_user u
WHERE (SELECT COUNT(*) FROM customer_order o WHERE o.user_id = u.id) >= ?1
ORDER BY u.id;";

const FIND_USERS_BY_NAME_AND_ORDER_COUNT_SQL: &str = "SELECT u.id, u.name
FROM app_user u
LEFT JOIN customer_order o ON o.user_id = u.id
GROUP BY u.id, u.name
HAVING u.name = ?1 AND COUNT(o.id) >= ?2
ORDER BY u.id;";

const FIND_USERS_BY_MULTIPLE_CRITERIA_SQL: &str = "SELECT DISTINCT u.id, u.name
FROM app_user u
JOIN review r ON r.user_id = u.id
WHERE u.name LIKE '%' || ?1 || '%' ESCAPE '\\'
  AND r.rating = ?2
ORDER BY u.id;";

const FIND_USERS_WITH_SHIPMENT_SQL: &str = "SELECT DISTINCT u.id, u.name
FROM app_user u
JOIN customer_order o ON o.user_id = u.id
JOIN shipment s ON s.order_id = o.id
ORDER BY u.id;";

const FIND_USERS_WITH_PAYMENT_SQL: &str = "SELECT DISTINCT u.id, u.name
FROM app_user u
JOIN customer_order o ON o.user_id = u.id
JOIN payment p ON p.order_id = o.id
ORDER BY u.id;";

const FIND_USERS_WITH_ORDER_ITEMS_SQL: &str = "SELECT DISTINCT u.id, u.name
FROM app_user u
JOIN customer_order o ON o.user_id = u.id
JOIN order_item oi ON oi.order_id = o.id
ORDER BY u.id;";

const FIND_USERS_BY_CATEGORY_SQL: &str = "SELECT DISTINCT u.id, u.name
FROM app_user u
JOIN customer_order o ON o.user_id = u.id
JOIN order_item oi ON oi.order_id = o.id
JOIN product p ON p.id = oi.product_id
JOIN category c ON c.id = p.category_id
WHERE c.name = ?1
ORDER BY u.id;";

const FIND_USERS_BY_DISCOUNT_SQL: &str = "SELECT DISTINCT u.id, u.name
FROM app_user u
JOIN customer_order o ON o.user_id = u.id
JOIN order_item oi ON oi.order_id = o.id
JOIN product p ON p.id = oi.product_id
JOIN discount d ON d.product_id = p.id
WHERE d.code LIKE '%' || ?1 || '%' ESCAPE '\\'
ORDER BY u.id;";

const FIND_USERS_WITH_REVIEWS_AND_ORDERS_SQL: &str = "SELECT DISTINCT u.id, u.name
FROM app_user u
JOIN customer_order o ON o.user_id = u.id
JOIN review r ON r.user_id = u.id
ORDER BY u.id;";

// Fallback chain: sentinel name, then New York address, then any of
// category / discount code / above-average purchase.
const FIND_COMPLEX_APP_USER_BY_USER_ID_SQL: &str = "SELECT DISTINCT u.id
FROM app_user u
LEFT JOIN address a ON a.user_id = u.id
LEFT JOIN customer_order o ON o.user_id = u.id
LEFT JOIN order_item oi ON oi.order_id = o.id
LEFT JOIN product p ON p.id = oi.product_id
LEFT JOIN category c ON c.id = p.category_id
LEFT JOIN discount d ON d.product_id = p.id
WHERE u.id = ?1
  AND (
    CASE
      WHEN u.name = ?2 THEN 1
      ELSE (
        CASE
          WHEN a.city = 'New York' THEN 1
          ELSE (
            c.name = 'Electronics'
            OR d.code LIKE '%DISC%'
            OR u.id IN (
              SELECT u2.id
              FROM app_user u2
              JOIN customer_order o2 ON o2.user_id = u2.id
              JOIN order_item oi2 ON oi2.order_id = o2.id
              JOIN product p2 ON p2.id = oi2.product_id
              WHERE p2.price > (SELECT AVG(p3.price) FROM product p3)
            )
          )
        END
      )
    END
  )
ORDER BY u.id;";

impl Entity for AppUser {
    const TABLE: &'static str = "app_user";
    const COLUMNS: &'static [&'static str] = &["name"];

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn column_values(&self) -> Vec<Value> {
        vec![self.name.clone().into()]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(read_app_user(row, 0)?)
    }
}

/// Decodes `(id, name)` starting at column `offset`.
pub(crate) fn read_app_user(row: &Row<'_>, offset: usize) -> rusqlite::Result<AppUser> {
    Ok(AppUser {
        id: row.get(offset)?,
        name: row.get(offset + 1)?,
    })
}

/// SQLite-backed app user repository.
pub struct SqliteAppUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAppUserRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }

    pub(crate) fn from_ready(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Users whose name contains `name` literally.
    pub fn find_by_name_contains(&self, name: &str) -> RepoResult<Vec<AppUser>> {
        self.users(
            "app_user.find_by_name_contains",
            FIND_BY_NAME_CONTAINS_SQL,
            params![like_fragment(name)],
        )
    }

    pub fn find_by_exact_name(&self, name: &str) -> RepoResult<Vec<AppUser>> {
        self.users(
            "app_user.find_by_exact_name",
            FIND_BY_EXACT_NAME_SQL,
            params![name],
        )
    }

    pub fn find_by_name_starting_with(&self, prefix: &str) -> RepoResult<Vec<AppUser>> {
        self.users(
            "app_user.find_by_name_starting_with",
            FIND_BY_NAME_STARTING_WITH_SQL,
            params![like_fragment(prefix)],
        )
    }

    pub fn find_by_name_ending_with(&self, suffix: &str) -> RepoResult<Vec<AppUser>> {
        self.users(
            "app_user.find_by_name_ending_with",
            FIND_BY_NAME_ENDING_WITH_SQL,
            params![like_fragment(suffix)],
        )
    }

    /// Users with at least one order.
    pub fn find_users_with_orders(&self) -> RepoResult<Vec<AppUser>> {
        self.users(
            "app_user.find_users_with_orders",
            FIND_USERS_WITH_ORDERS_SQL,
            params![],
        )
    }

    pub fn find_users_without_orders(&self) -> RepoResult<Vec<AppUser>> {
        self.users(
            "app_user.find_users_without_orders",
            FIND_USERS_WITHOUT_ORDERS_SQL,
            params![],
        )
    }

    /// Users with at least one address whose city equals `city` exactly.
    pub fn find_users_by_address_city(&self, city: &str) -> RepoResult<Vec<AppUser>> {
        self.users(
            "app_user.find_users_by_address_city",
            FIND_USERS_BY_ADDRESS_CITY_SQL,
            params![city],
        )
    }

    pub fn find_users_by_review_rating_greater_than(
        &self,
        rating: i32,
    ) -> RepoResult<Vec<AppUser>> {
        self.users(
            "app_user.find_users_by_review_rating_greater_than",
            FIND_USERS_BY_REVIEW_RATING_GREATER_THAN_SQL,
            params![rating],
        )
    }

    /// Every user with its order count; users without orders count zero.
    pub fn count_users_with_orders(&self) -> RepoResult<Vec<UserOrderCount>> {
        fetch_all(
            self.conn,
            "app_user.count_users_with_orders",
            COUNT_USERS_WITH_ORDERS_SQL,
            params![],
            |row| {
                Ok(UserOrderCount {
                    user: read_app_user(row, 0)?,
                    order_count: row.get(2)?,
                })
            },
        )
    }

    pub fn find_users_ordered_by_name_asc(&self) -> RepoResult<Vec<AppUser>> {
        self.users(
            "app_user.find_users_ordered_by_name_asc",
            FIND_USERS_ORDERED_BY_NAME_ASC_SQL,
            params![],
        )
    }

    pub fn find_users_ordered_by_name_desc(&self) -> RepoResult<Vec<AppUser>> {
        self.users(
            "app_user.find_users_ordered_by_name_desc",
            FIND_USERS_ORDERED_BY_NAME_DESC_SQL,
            params![],
        )
    }

    pub fn find_users_with_at_least_n_orders(&self, order_count: i64) -> RepoResult<Vec<AppUser>> {
        self.users(
            "app_user.find_users_with_at_least_n_orders",
            FIND_USERS_WITH_AT_LEAST_N_ORDERS_SQL,
            params![order_count],
        )
    }

    pub fn find_users_by_name_and_order_count(
        &self,
        name: &str,
        order_count: i64,
    ) -> RepoResult<Vec<AppUser>> {
        self.users(
            "app_user.find_users_by_name_and_order_count",
            FIND_USERS_BY_NAME_AND_ORDER_COUNT_SQL,
            params![name, order_count],
        )
    }

    /// Users whose name contains `name` and who left a review rated exactly `rating`.
    pub fn find_users_by_multiple_criteria(
        &self,
        name: &str,
        rating: i32,
    ) -> RepoResult<Vec<AppUser>> {
        self.users(
            "app_user.find_users_by_multiple_criteria",
            FIND_USERS_BY_MULTIPLE_CRITERIA_SQL,
            params![like_fragment(name), rating],
        )
    }

    pub fn find_users_with_shipment(&self) -> RepoResult<Vec<AppUser>> {
        self.users(
            "app_user.find_users_with_shipment",
            FIND_USERS_WITH_SHIPMENT_SQL,
            params![],
        )
    }

    pub fn find_users_with_payment(&self) -> RepoResult<Vec<AppUser>> {
        self.users(
            "app_user.find_users_with_payment",
            FIND_USERS_WITH_PAYMENT_SQL,
            params![],
        )
    }

    pub fn find_users_with_order_items(&self) -> RepoResult<Vec<AppUser>> {
        self.users(
            "app_user.find_users_with_order_items",
            FIND_USERS_WITH_ORDER_ITEMS_SQL,
            params![],
        )
    }

    /// Users who ordered a product in the category named `category_name`.
    pub fn find_users_by_category(&self, category_name: &str) -> RepoResult<Vec<AppUser>> {
        self.users(
            "app_user.find_users_by_category",
            FIND_USERS_BY_CATEGORY_SQL,
            params![category_name],
        )
    }

    /// Users who ordered a product carrying a discount whose code contains `code`.
    pub fn find_users_by_discount(&self, code: &str) -> RepoResult<Vec<AppUser>> {
        self.users(
            "app_user.find_users_by_discount",
            FIND_USERS_BY_DISCOUNT_SQL,
            params![like_fragment(code)],
        )
    }

    pub fn find_users_with_reviews_and_orders(&self) -> RepoResult<Vec<AppUser>> {
        self.users(
            "app_user.find_users_with_reviews_and_orders",
            FIND_USERS_WITH_REVIEWS_AND_ORDERS_SQL,
            params![],
        )
    }

    /// Returns `[user_id]` when the user qualifies, otherwise an empty list.
    ///
    /// The user qualifies when, in order of precedence:
    /// 1. its name is [`SPECIAL_USER_NAME`];
    /// 2. otherwise, one of its addresses is in `New York`;
    /// 3. otherwise, it ordered a product in category `Electronics`, or a
    ///    product with a discount code containing `DISC`, or any product
    ///    priced above the average product price.
    pub fn find_complex_app_user_by_user_id(&self, user_id: RecordId) -> RepoResult<Vec<RecordId>> {
        fetch_all(
            self.conn,
            "app_user.find_complex_app_user_by_user_id",
            FIND_COMPLEX_APP_USER_BY_USER_ID_SQL,
            params![user_id, SPECIAL_USER_NAME],
            |row| Ok(row.get(0)?),
        )
    }

    fn users<P: Params>(
        &self,
        operation: &'static str,
        sql: &str,
        params: P,
    ) -> RepoResult<Vec<AppUser>> {
        fetch_all(self.conn, operation, sql, params, AppUser::from_row)
    }
}

impl CrudRepository<AppUser> for SqliteAppUserRepository<'_> {
    fn connection(&self) -> &Connection {
        self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::SqliteAppUserRepository;
    use crate::db::open_db_in_memory;
    use crate::model::user::AppUser;
    use crate::repo::crud::CrudRepository;
    use rusqlite::Connection;

    #[test]
    fn try_new_rejects_unmigrated_connection() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(SqliteAppUserRepository::try_new(&conn).is_err());
    }

    #[test]
    fn name_patterns_match_literally() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteAppUserRepository::try_new(&conn).unwrap();
        repo.create(&AppUser::new("100%_real")).unwrap();
        repo.create(&AppUser::new("1000 real")).unwrap();

        let matched = repo.find_by_name_contains("0%_").unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].name.as_deref(), Some("100%_real"));

        assert_eq!(repo.find_by_name_starting_with("100%").unwrap().len(), 1);
        assert_eq!(repo.find_by_name_ending_with("real").unwrap().len(), 2);
    }
}
