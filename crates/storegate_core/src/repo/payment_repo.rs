//! Payment persistence and the payment query catalog.
//!
//! # Responsibility
//! - Map `payment` rows to [`Payment`].
//! - Serve the payment catalog: filters, set operations, CTEs, window
//!   functions and scalar aggregates, written directly in SQLite SQL.
//!
//! # Invariants
//! - Statements that list payments without an explicit sort return them
//!   ordered by `id`.
//! - `LIMIT`-style arguments are rejected when negative.
//! - `find_payments_using_greatest` / `find_payments_using_least` use
//!   SQLite's multi-argument `max`/`min`, which yield `NULL` (no match)
//!   when `order_id` is `NULL`.

use super::crud::{CrudRepository, Entity};
use super::error::{RepoError, RepoResult};
use super::query::{
    expand_in_list, fetch_all, fetch_optional, fetch_scalar, like_fragment, non_negative,
};
use crate::db::ensure_schema_ready;
use crate::model::order::Payment;
use crate::model::projection::{PaymentCompletion, StatusCount};
use crate::model::RecordId;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Params, Row};

/// Status that `find_payments_using_case` and the custom ordering treat as done.
pub const COMPLETED_STATUS: &str = "COMPLETED";

const FIND_ALL_PAYMENTS_SQL: &str = "SELECT id, status, order_id
FROM payment
ORDER BY id;";

const FIND_PAYMENT_BY_ID_SQL: &str = "SELECT id, status, order_id
FROM payment
WHERE id = ?1;";

const FIND_PAYMENTS_BY_STATUS_SQL: &str = "SELECT id, status, order_id
FROM payment
WHERE status = ?1
ORDER BY id;";

const FIND_PAYMENTS_BY_ORDER_ID_SQL: &str = "SELECT id, status, order_id
FROM payment
WHERE order_id = ?1
ORDER BY id;";

const COUNT_PAYMENTS_SQL: &str = "SELECT COUNT(*) FROM payment;";

const SUM_PAYMENT_IDS_SQL: &str = "SELECT SUM(id) FROM payment;";

const FIND_DISTINCT_STATUSES_SQL: &str = "SELECT DISTINCT status
FROM payment
ORDER BY status;";

const FIND_PAYMENTS_ORDER_BY_STATUS_ASC_SQL: &str = "SELECT id, status, order_id
FROM payment
ORDER BY status ASC, id ASC;";

const FIND_PAYMENTS_ORDER_BY_STATUS_DESC_SQL: &str = "SELECT id, status, order_id
FROM payment
ORDER BY status DESC, id ASC;";

const FIND_PAYMENTS_WITH_ORDER_DETAILS_SQL: &str = "SELECT p.id, p.status, p.order_id
FROM payment p
JOIN customer_order co ON p.order_id = co.id
ORDER BY p.id;";

const FIND_PAYMENTS_WITH_ORDER_AND_USER_SQL: &str = "SELECT p.id, p.status, p.order_id
FROM payment p
JOIN customer_order co ON p.order_id = co.id
JOIN app_user au ON co.user_id = au.id
ORDER BY p.id;";

const FIND_PAYMENTS_USING_CTE_SQL: &str = "WITH orders AS (SELECT id FROM customer_order)
SELECT p.id, p.status, p.order_id
FROM payment p
JOIN orders o ON p.order_id = o.id
ORDER BY p.id;";

const FIND_PAYMENT_STATUS_COUNTS_USING_CTE_SQL: &str = "WITH status_cte AS (
  SELECT status, COUNT(*) AS cnt FROM payment GROUP BY status
)
SELECT status, cnt
FROM status_cte
WHERE cnt > ?1
ORDER BY status;";

const FIND_PAYMENTS_BY_STATUS_PATTERN_SQL: &str = "SELECT id, status, order_id
FROM payment
WHERE status LIKE '%' || ?1 || '%' ESCAPE '\\'
ORDER BY id;";

const FIND_PAYMENTS_BY_STATUS_AND_ORDER_ID_SQL: &str = "SELECT id, status, order_id
FROM payment
WHERE status = ?1 AND order_id = ?2
ORDER BY id;";

const FIND_PAYMENTS_BY_STATUSES_TEMPLATE: &str = "SELECT id, status, order_id
FROM payment
WHERE status IN ({list})
ORDER BY id;";

const FIND_PAYMENTS_WITH_PAGINATION_SQL: &str = "SELECT id, status, order_id
FROM payment
ORDER BY id
LIMIT ?1 OFFSET ?2;";

const FIND_PAYMENTS_ORDER_BY_ID_DESC_SQL: &str = "SELECT id, status, order_id
FROM payment
ORDER BY id DESC;";

const FIND_LATEST_PAYMENT_SQL: &str = "SELECT id, status, order_id
FROM payment
ORDER BY id DESC
LIMIT 1;";

const FIND_OLDEST_PAYMENT_SQL: &str = "SELECT id, status, order_id
FROM payment
ORDER BY id ASC
LIMIT 1;";

const FIND_PAYMENTS_WITH_NON_NULL_STATUS_SQL: &str = "SELECT id, status, order_id
FROM payment
WHERE status IS NOT NULL
ORDER BY id;";

const FIND_PAYMENTS_WITH_NULL_ORDER_ID_SQL: &str = "SELECT id, status, order_id
FROM payment
WHERE order_id IS NULL
ORDER BY id;";

const FIND_PAYMENTS_USING_CASE_SQL: &str = "SELECT id,
       CASE WHEN status = ?1 THEN 'Yes' ELSE 'No' END AS is_completed
FROM payment
ORDER BY id;";

const GROUP_PAYMENTS_BY_STATUS_SQL: &str = "SELECT status, COUNT(*)
FROM payment
GROUP BY status
ORDER BY status;";

const FIND_PAYMENTS_HAVING_COUNT_GREATER_THAN_SQL: &str = "SELECT id, status, order_id
FROM payment
WHERE status IN (
  SELECT status FROM payment GROUP BY status HAVING COUNT(*) > ?1
)
ORDER BY id;";

const FIND_PAYMENTS_WITH_VALID_ORDER_SQL: &str = "SELECT id, status, order_id
FROM payment
WHERE order_id IN (SELECT id FROM customer_order WHERE id IS NOT NULL)
ORDER BY id;";

const FIND_PAYMENTS_BY_ID_RANGE_SQL: &str = "SELECT id, status, order_id
FROM payment
WHERE id BETWEEN ?1 AND ?2
ORDER BY id;";

const FIND_PAYMENTS_USING_UNION_SQL: &str = "SELECT id, status, order_id FROM payment WHERE status = ?1
UNION
SELECT id, status, order_id FROM payment WHERE order_id = ?2
ORDER BY id;";

const FIND_AVERAGE_PAYMENT_ID_SQL: &str = "SELECT AVG(id) FROM payment;";

const FIND_PAYMENTS_WITH_EVEN_ID_SQL: &str = "SELECT id, status, order_id
FROM payment
WHERE id % 2 = 0
ORDER BY id;";

const FIND_PAYMENTS_USING_COALESCE_SQL: &str = "SELECT id, status, order_id
FROM payment
WHERE COALESCE(status, 'N/A') = ?1
ORDER BY id;";

const FIND_PAYMENTS_USING_NULLIF_SQL: &str = "SELECT id, status, order_id
FROM payment
WHERE NULLIF(order_id, 0) IS NOT NULL
ORDER BY id;";

const FIND_PAYMENTS_USING_GREATEST_SQL: &str = "SELECT id, status, order_id
FROM payment
WHERE max(id, order_id) > ?1
ORDER BY id;";

const FIND_PAYMENTS_USING_LEAST_SQL: &str = "SELECT id, status, order_id
FROM payment
WHERE min(id, order_id) < ?1
ORDER BY id;";

const FIND_PAYMENTS_USING_UPPER_SQL: &str = "SELECT id, status, order_id
FROM payment
WHERE UPPER(status) = UPPER(?1)
ORDER BY id;";

const FIND_PAYMENTS_USING_LOWER_SQL: &str = "SELECT id, status, order_id
FROM payment
WHERE LOWER(status) = LOWER(?1)
ORDER BY id;";

const FIND_PAYMENTS_USING_IN_SUBQUERY_SQL: &str = "SELECT id, status, order_id
FROM payment
WHERE status IN (SELECT status FROM payment WHERE status IS NOT NULL)
ORDER BY id;";

const FIND_PAYMENTS_EXCLUDING_STATUSES_TEMPLATE: &str = "SELECT id, status, order_id
FROM payment
WHERE status NOT IN ({list})
ORDER BY id;";

const FIND_PAYMENT_BY_ROW_NUMBER_SQL: &str = "SELECT id, status, order_id
FROM (
  SELECT p.id, p.status, p.order_id, ROW_NUMBER() OVER (ORDER BY p.id) AS rn
  FROM payment p
) sub
WHERE rn = ?1;";

const FIND_TOP_N_PAYMENTS_USING_CTE_SQL: &str = "WITH ranked_payments AS (
  SELECT p.id, p.status, p.order_id, ROW_NUMBER() OVER (ORDER BY p.id DESC) AS rn
  FROM payment p
)
SELECT id, status, order_id
FROM ranked_payments
WHERE rn <= ?1
ORDER BY rn;";

const FIND_PAYMENTS_WITH_NON_EMPTY_STATUS_SQL: &str = "SELECT id, status, order_id
FROM payment
WHERE status <> ''
ORDER BY id;";

const FIND_PAYMENTS_BY_CUSTOMER_ORDER_CONDITION_SQL: &str = "SELECT p.id, p.status, p.order_id
FROM payment p
JOIN customer_order co ON p.order_id = co.id
WHERE co.id IN (SELECT id FROM customer_order WHERE id > ?1)
ORDER BY p.id;";

const FIND_PAYMENTS_WITH_VALID_USER_SQL: &str = "SELECT id, status, order_id
FROM payment
WHERE order_id NOT IN (SELECT id FROM customer_order WHERE user_id IS NULL)
ORDER BY id;";

const FIND_PAYMENTS_BY_NESTED_SUBQUERY_SQL: &str = "SELECT id, status, order_id
FROM payment
WHERE status = (SELECT status FROM payment WHERE id = ?1)
ORDER BY id;";

const FIND_PAYMENTS_ORDERED_BY_CUSTOM_CASE_SQL: &str = "SELECT id, status, order_id
FROM payment
ORDER BY CASE WHEN status = ?1 THEN 1 ELSE 2 END, id;";

// UNION drops rows already visited, so cyclic chains terminate.
const FIND_PAYMENTS_USING_RECURSIVE_CTE_SQL: &str = "WITH RECURSIVE payment_cte AS (
  SELECT id, status, order_id FROM payment WHERE id = ?1
  UNION
  SELECT p.id, p.status, p.order_id
  FROM payment p
  JOIN payment_cte pc ON p.order_id = pc.id
)
SELECT id, status, order_id
FROM payment_cte
ORDER BY id;";

const FIND_PAYMENTS_BY_ID_LIST_TEMPLATE: &str = "SELECT id, status, order_id
FROM payment
WHERE id IN ({list})
ORDER BY id;";

const FIND_PAYMENTS_BY_STATUS_WITH_LIMIT_SQL: &str = "SELECT id, status, order_id
FROM payment
WHERE status = ?1
ORDER BY id
LIMIT ?2;";

const FIND_PAYMENTS_WITH_NON_NULL_ORDER_ID_SQL: &str = "SELECT id, status, order_id
FROM payment
WHERE order_id IS NOT NULL
ORDER BY id;";

const FIND_PAYMENTS_BY_USER_NAME_PATTERN_USING_CTE_SQL: &str = "WITH order_users AS (
  SELECT co.id AS order_id, au.name AS user_name
  FROM customer_order co
  JOIN app_user au ON co.user_id = au.id
)
SELECT p.id, p.status, p.order_id
FROM payment p
JOIN order_users ou ON p.order_id = ou.order_id
WHERE ou.user_name LIKE '%' || ?1 || '%' ESCAPE '\\'
ORDER BY p.id;";

impl Entity for Payment {
    const TABLE: &'static str = "payment";
    const COLUMNS: &'static [&'static str] = &["status", "order_id"];

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn column_values(&self) -> Vec<Value> {
        vec![self.status.clone().into(), self.order_id.into()]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: row.get(0)?,
            status: row.get(1)?,
            order_id: row.get(2)?,
        })
    }
}

/// SQLite-backed payment repository.
pub struct SqlitePaymentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePaymentRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }

    pub(crate) fn from_ready(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// The payment of one order, if any. `payment.order_id` is unique.
    pub fn payment_for_order(&self, order_id: RecordId) -> RepoResult<Option<Payment>> {
        self.payment(
            "payment.payment_for_order",
            FIND_PAYMENTS_BY_ORDER_ID_SQL,
            params![order_id],
        )
    }

    pub fn find_all_payments(&self) -> RepoResult<Vec<Payment>> {
        self.payments(
            "payment.find_all_payments",
            FIND_ALL_PAYMENTS_SQL,
            params![],
        )
    }

    pub fn find_payment_by_id(&self, id: RecordId) -> RepoResult<Option<Payment>> {
        self.payment(
            "payment.find_payment_by_id",
            FIND_PAYMENT_BY_ID_SQL,
            params![id],
        )
    }

    pub fn find_payments_by_status(&self, status: &str) -> RepoResult<Vec<Payment>> {
        self.payments(
            "payment.find_payments_by_status",
            FIND_PAYMENTS_BY_STATUS_SQL,
            params![status],
        )
    }

    pub fn find_payments_by_order_id(&self, order_id: RecordId) -> RepoResult<Vec<Payment>> {
        self.payments(
            "payment.find_payments_by_order_id",
            FIND_PAYMENTS_BY_ORDER_ID_SQL,
            params![order_id],
        )
    }

    pub fn count_payments(&self) -> RepoResult<i64> {
        fetch_scalar(
            self.conn,
            "payment.count_payments",
            COUNT_PAYMENTS_SQL,
            params![],
        )
    }

    /// `None` when there are no payments.
    pub fn sum_payment_ids(&self) -> RepoResult<Option<i64>> {
        fetch_scalar(
            self.conn,
            "payment.sum_payment_ids",
            SUM_PAYMENT_IDS_SQL,
            params![],
        )
    }

    /// Distinct statuses; a `NULL` status appears once as `None`.
    pub fn find_distinct_statuses(&self) -> RepoResult<Vec<Option<String>>> {
        fetch_all(
            self.conn,
            "payment.find_distinct_statuses",
            FIND_DISTINCT_STATUSES_SQL,
            params![],
            |row| Ok(row.get(0)?),
        )
    }

    pub fn find_payments_order_by_status_asc(&self) -> RepoResult<Vec<Payment>> {
        self.payments(
            "payment.find_payments_order_by_status_asc",
            FIND_PAYMENTS_ORDER_BY_STATUS_ASC_SQL,
            params![],
        )
    }

    pub fn find_payments_order_by_status_desc(&self) -> RepoResult<Vec<Payment>> {
        self.payments(
            "payment.find_payments_order_by_status_desc",
            FIND_PAYMENTS_ORDER_BY_STATUS_DESC_SQL,
            params![],
        )
    }

    /// Payments whose order exists.
    pub fn find_payments_with_order_details(&self) -> RepoResult<Vec<Payment>> {
        self.payments(
            "payment.find_payments_with_order_details",
            FIND_PAYMENTS_WITH_ORDER_DETAILS_SQL,
            params![],
        )
    }

    /// Payments whose order exists and belongs to an existing user.
    pub fn find_payments_with_order_and_user(&self) -> RepoResult<Vec<Payment>> {
        self.payments(
            "payment.find_payments_with_order_and_user",
            FIND_PAYMENTS_WITH_ORDER_AND_USER_SQL,
            params![],
        )
    }

    pub fn find_payments_using_cte(&self) -> RepoResult<Vec<Payment>> {
        self.payments(
            "payment.find_payments_using_cte",
            FIND_PAYMENTS_USING_CTE_SQL,
            params![],
        )
    }

    /// Statuses carried by more than `min_count` payments.
    pub fn find_payment_status_counts_using_cte(
        &self,
        min_count: i64,
    ) -> RepoResult<Vec<StatusCount>> {
        self.status_counts(
            "payment.find_payment_status_counts_using_cte",
            FIND_PAYMENT_STATUS_COUNTS_USING_CTE_SQL,
            params![min_count],
        )
    }

    pub fn find_payments_by_status_pattern(&self, pattern: &str) -> RepoResult<Vec<Payment>> {
        self.payments(
            "payment.find_payments_by_status_pattern",
            FIND_PAYMENTS_BY_STATUS_PATTERN_SQL,
            params![like_fragment(pattern)],
        )
    }

    pub fn find_payments_by_status_and_order_id(
        &self,
        status: &str,
        order_id: RecordId,
    ) -> RepoResult<Vec<Payment>> {
        self.payments(
            "payment.find_payments_by_status_and_order_id",
            FIND_PAYMENTS_BY_STATUS_AND_ORDER_ID_SQL,
            params![status, order_id],
        )
    }

    /// # Errors
    /// `InvalidArgument` when `statuses` is empty.
    pub fn find_payments_by_statuses(&self, statuses: &[String]) -> RepoResult<Vec<Payment>> {
        let (sql, binds) = expand_in_list(
            FIND_PAYMENTS_BY_STATUSES_TEMPLATE,
            "statuses",
            Vec::new(),
            statuses,
        )?;
        self.payments(
            "payment.find_payments_by_statuses",
            &sql,
            params_from_iter(binds),
        )
    }

    /// Payments ordered by id, skipping `offset` and returning at most `limit`.
    pub fn find_payments_with_pagination(
        &self,
        limit: i64,
        offset: i64,
    ) -> RepoResult<Vec<Payment>> {
        let limit = non_negative("limit", limit)?;
        let offset = non_negative("offset", offset)?;
        self.payments(
            "payment.find_payments_with_pagination",
            FIND_PAYMENTS_WITH_PAGINATION_SQL,
            params![limit, offset],
        )
    }

    pub fn find_payments_order_by_id_desc(&self) -> RepoResult<Vec<Payment>> {
        self.payments(
            "payment.find_payments_order_by_id_desc",
            FIND_PAYMENTS_ORDER_BY_ID_DESC_SQL,
            params![],
        )
    }

    pub fn find_latest_payment(&self) -> RepoResult<Option<Payment>> {
        self.payment(
            "payment.find_latest_payment",
            FIND_LATEST_PAYMENT_SQL,
            params![],
        )
    }

    pub fn find_oldest_payment(&self) -> RepoResult<Option<Payment>> {
        self.payment(
            "payment.find_oldest_payment",
            FIND_OLDEST_PAYMENT_SQL,
            params![],
        )
    }

    pub fn find_payments_with_non_null_status(&self) -> RepoResult<Vec<Payment>> {
        self.payments(
            "payment.find_payments_with_non_null_status",
            FIND_PAYMENTS_WITH_NON_NULL_STATUS_SQL,
            params![],
        )
    }

    pub fn find_payments_with_null_order_id(&self) -> RepoResult<Vec<Payment>> {
        self.payments(
            "payment.find_payments_with_null_order_id",
            FIND_PAYMENTS_WITH_NULL_ORDER_ID_SQL,
            params![],
        )
    }

    /// Every payment id with whether its status is exactly [`COMPLETED_STATUS`].
    pub fn find_payments_using_case(&self) -> RepoResult<Vec<PaymentCompletion>> {
        fetch_all(
            self.conn,
            "payment.find_payments_using_case",
            FIND_PAYMENTS_USING_CASE_SQL,
            params![COMPLETED_STATUS],
            |row| {
                let payment_id: RecordId = row.get(0)?;
                let flag: String = row.get(1)?;
                let is_completed = match flag.as_str() {
                    "Yes" => true,
                    "No" => false,
                    other => {
                        return Err(RepoError::InvalidData(format!(
                            "unexpected completion flag `{other}` for payment {payment_id}"
                        )))
                    }
                };
                Ok(PaymentCompletion {
                    payment_id,
                    is_completed,
                })
            },
        )
    }

    pub fn group_payments_by_status(&self) -> RepoResult<Vec<StatusCount>> {
        self.status_counts(
            "payment.group_payments_by_status",
            GROUP_PAYMENTS_BY_STATUS_SQL,
            params![],
        )
    }

    /// Payments whose status is shared by more than `threshold` payments.
    pub fn find_payments_having_count_greater_than(
        &self,
        threshold: i64,
    ) -> RepoResult<Vec<Payment>> {
        self.payments(
            "payment.find_payments_having_count_greater_than",
            FIND_PAYMENTS_HAVING_COUNT_GREATER_THAN_SQL,
            params![threshold],
        )
    }

    pub fn find_payments_with_valid_order(&self) -> RepoResult<Vec<Payment>> {
        self.payments(
            "payment.find_payments_with_valid_order",
            FIND_PAYMENTS_WITH_VALID_ORDER_SQL,
            params![],
        )
    }

    /// Inclusive on both bounds.
    pub fn find_payments_by_id_range(
        &self,
        start_id: RecordId,
        end_id: RecordId,
    ) -> RepoResult<Vec<Payment>> {
        self.payments(
            "payment.find_payments_by_id_range",
            FIND_PAYMENTS_BY_ID_RANGE_SQL,
            params![start_id, end_id],
        )
    }

    /// Payments with `status` or for `order_id`, each listed once.
    pub fn find_payments_using_union(
        &self,
        status: &str,
        order_id: RecordId,
    ) -> RepoResult<Vec<Payment>> {
        self.payments(
            "payment.find_payments_using_union",
            FIND_PAYMENTS_USING_UNION_SQL,
            params![status, order_id],
        )
    }

    /// `None` when there are no payments.
    pub fn find_average_payment_id(&self) -> RepoResult<Option<f64>> {
        fetch_scalar(
            self.conn,
            "payment.find_average_payment_id",
            FIND_AVERAGE_PAYMENT_ID_SQL,
            params![],
        )
    }

    pub fn find_payments_with_even_id(&self) -> RepoResult<Vec<Payment>> {
        self.payments(
            "payment.find_payments_with_even_id",
            FIND_PAYMENTS_WITH_EVEN_ID_SQL,
            params![],
        )
    }

    /// Matches `status`, treating a `NULL` status as `N/A`.
    pub fn find_payments_using_coalesce(&self, status: &str) -> RepoResult<Vec<Payment>> {
        self.payments(
            "payment.find_payments_using_coalesce",
            FIND_PAYMENTS_USING_COALESCE_SQL,
            params![status],
        )
    }

    /// Payments whose `order_id` is neither `NULL` nor `0`.
    pub fn find_payments_using_nullif(&self) -> RepoResult<Vec<Payment>> {
        self.payments(
            "payment.find_payments_using_nullif",
            FIND_PAYMENTS_USING_NULLIF_SQL,
            params![],
        )
    }

    pub fn find_payments_using_greatest(&self, value: i64) -> RepoResult<Vec<Payment>> {
        self.payments(
            "payment.find_payments_using_greatest",
            FIND_PAYMENTS_USING_GREATEST_SQL,
            params![value],
        )
    }

    pub fn find_payments_using_least(&self, value: i64) -> RepoResult<Vec<Payment>> {
        self.payments(
            "payment.find_payments_using_least",
            FIND_PAYMENTS_USING_LEAST_SQL,
            params![value],
        )
    }

    pub fn find_payments_using_upper(&self, status: &str) -> RepoResult<Vec<Payment>> {
        self.payments(
            "payment.find_payments_using_upper",
            FIND_PAYMENTS_USING_UPPER_SQL,
            params![status],
        )
    }

    pub fn find_payments_using_lower(&self, status: &str) -> RepoResult<Vec<Payment>> {
        self.payments(
            "payment.find_payments_using_lower",
            FIND_PAYMENTS_USING_LOWER_SQL,
            params![status],
        )
    }

    pub fn find_payments_using_in_subquery(&self) -> RepoResult<Vec<Payment>> {
        self.payments(
            "payment.find_payments_using_in_subquery",
            FIND_PAYMENTS_USING_IN_SUBQUERY_SQL,
            params![],
        )
    }

    /// Payments whose status is set and not listed.
    ///
    /// # Errors
    /// `InvalidArgument` when `statuses` is empty.
    pub fn find_payments_excluding_statuses(
        &self,
        statuses: &[String],
    ) -> RepoResult<Vec<Payment>> {
        let (sql, binds) = expand_in_list(
            FIND_PAYMENTS_EXCLUDING_STATUSES_TEMPLATE,
            "statuses",
            Vec::new(),
            statuses,
        )?;
        self.payments(
            "payment.find_payments_excluding_statuses",
            &sql,
            params_from_iter(binds),
        )
    }

    /// The payment at 1-based position `row_number` when ordered by id.
    pub fn find_payment_by_row_number(&self, row_number: i64) -> RepoResult<Vec<Payment>> {
        self.payments(
            "payment.find_payment_by_row_number",
            FIND_PAYMENT_BY_ROW_NUMBER_SQL,
            params![row_number],
        )
    }

    /// The `limit` most recent payments, newest first.
    pub fn find_top_n_payments_using_cte(&self, limit: i64) -> RepoResult<Vec<Payment>> {
        let limit = non_negative("limit", limit)?;
        self.payments(
            "payment.find_top_n_payments_using_cte",
            FIND_TOP_N_PAYMENTS_USING_CTE_SQL,
            params![limit],
        )
    }

    pub fn find_payments_with_non_empty_status(&self) -> RepoResult<Vec<Payment>> {
        self.payments(
            "payment.find_payments_with_non_empty_status",
            FIND_PAYMENTS_WITH_NON_EMPTY_STATUS_SQL,
            params![],
        )
    }

    pub fn find_payments_by_customer_order_condition(
        &self,
        min_order_id: RecordId,
    ) -> RepoResult<Vec<Payment>> {
        self.payments(
            "payment.find_payments_by_customer_order_condition",
            FIND_PAYMENTS_BY_CUSTOMER_ORDER_CONDITION_SQL,
            params![min_order_id],
        )
    }

    /// Payments whose order is not an order without a user.
    pub fn find_payments_with_valid_user(&self) -> RepoResult<Vec<Payment>> {
        self.payments(
            "payment.find_payments_with_valid_user",
            FIND_PAYMENTS_WITH_VALID_USER_SQL,
            params![],
        )
    }

    /// Payments sharing the status of payment `ref_id`.
    pub fn find_payments_by_nested_subquery(&self, ref_id: RecordId) -> RepoResult<Vec<Payment>> {
        self.payments(
            "payment.find_payments_by_nested_subquery",
            FIND_PAYMENTS_BY_NESTED_SUBQUERY_SQL,
            params![ref_id],
        )
    }

    /// Completed payments first, then the rest, each group by id.
    pub fn find_payments_ordered_by_custom_case(&self) -> RepoResult<Vec<Payment>> {
        self.payments(
            "payment.find_payments_ordered_by_custom_case",
            FIND_PAYMENTS_ORDERED_BY_CUSTOM_CASE_SQL,
            params![COMPLETED_STATUS],
        )
    }

    /// Payment `start_id` plus every payment whose `order_id` chains back to it.
    pub fn find_payments_using_recursive_cte(&self, start_id: RecordId) -> RepoResult<Vec<Payment>> {
        self.payments(
            "payment.find_payments_using_recursive_cte",
            FIND_PAYMENTS_USING_RECURSIVE_CTE_SQL,
            params![start_id],
        )
    }

    /// # Errors
    /// `InvalidArgument` when `ids` is empty.
    pub fn find_payments_by_id_list(&self, ids: &[RecordId]) -> RepoResult<Vec<Payment>> {
        let (sql, binds) =
            expand_in_list(FIND_PAYMENTS_BY_ID_LIST_TEMPLATE, "ids", Vec::new(), ids)?;
        self.payments(
            "payment.find_payments_by_id_list",
            &sql,
            params_from_iter(binds),
        )
    }

    pub fn find_payments_by_status_with_limit(
        &self,
        status: &str,
        limit: i64,
    ) -> RepoResult<Vec<Payment>> {
        let limit = non_negative("limit", limit)?;
        self.payments(
            "payment.find_payments_by_status_with_limit",
            FIND_PAYMENTS_BY_STATUS_WITH_LIMIT_SQL,
            params![status, limit],
        )
    }

    pub fn find_payments_with_non_null_order_id(&self) -> RepoResult<Vec<Payment>> {
        self.payments(
            "payment.find_payments_with_non_null_order_id",
            FIND_PAYMENTS_WITH_NON_NULL_ORDER_ID_SQL,
            params![],
        )
    }

    /// Payments whose ordering user's name contains `user_name_pattern`.
    pub fn find_payments_by_user_name_pattern_using_cte(
        &self,
        user_name_pattern: &str,
    ) -> RepoResult<Vec<Payment>> {
        self.payments(
            "payment.find_payments_by_user_name_pattern_using_cte",
            FIND_PAYMENTS_BY_USER_NAME_PATTERN_USING_CTE_SQL,
            params![like_fragment(user_name_pattern)],
        )
    }

    fn payments<P: Params>(
        &self,
        operation: &'static str,
        sql: &str,
        params: P,
    ) -> RepoResult<Vec<Payment>> {
        fetch_all(self.conn, operation, sql, params, Payment::from_row)
    }

    fn payment<P: Params>(
        &self,
        operation: &'static str,
        sql: &str,
        params: P,
    ) -> RepoResult<Option<Payment>> {
        fetch_optional(self.conn, operation, sql, params, Payment::from_row)
    }

    fn status_counts<P: Params>(
        &self,
        operation: &'static str,
        sql: &str,
        params: P,
    ) -> RepoResult<Vec<StatusCount>> {
        fetch_all(self.conn, operation, sql, params, |row| {
            Ok(StatusCount {
                status: row.get(0)?,
                count: row.get(1)?,
            })
        })
    }
}

impl CrudRepository<Payment> for SqlitePaymentRepository<'_> {
    fn connection(&self) -> &Connection {
        self.conn
    }
}
