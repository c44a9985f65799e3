//! Record types for the commerce schema.
//!
//! # Responsibility
//! - Define one plain record per table plus the projection shapes returned
//!   by aggregate and fetch-join queries.
//!
//! # Invariants
//! - `id` is `None` until the store assigns it on insert; callers never
//!   choose identities.
//! - Relationships are held as foreign-key ids only. Traversal is an explicit
//!   repository query, never an implicit load.

pub mod catalog;
pub mod order;
pub mod projection;
pub mod user;

/// Store-assigned surrogate identity shared by every table.
pub type RecordId = i64;

#[cfg(test)]
mod tests {
    use super::order::{OrderItem, Payment};
    use super::projection::PaymentCompletion;

    #[test]
    fn records_serialize_with_camel_case_keys() {
        let item = OrderItem {
            id: Some(7),
            ..OrderItem::new(3, 4, 2)
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["orderId"], 3);
        assert_eq!(json["productId"], 4);
        assert_eq!(json["quantity"], 2);
        assert!(json.get("order_id").is_none());

        let completion = PaymentCompletion {
            payment_id: 1,
            is_completed: true,
        };
        let json = serde_json::to_value(completion).unwrap();
        assert_eq!(json["paymentId"], 1);
        assert_eq!(json["isCompleted"], true);
    }

    #[test]
    fn absent_optionals_deserialize_as_none() {
        let payment: Payment =
            serde_json::from_str(r#"{"id":null,"status":null,"orderId":null}"#).unwrap();
        assert_eq!(payment, Payment::default());
    }
}
