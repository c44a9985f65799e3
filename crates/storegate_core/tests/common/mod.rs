#![allow(dead_code)]

use rusqlite::Connection;
use storegate_core::repo::address_repo::SqliteAddressRepository;
use storegate_core::repo::category_repo::SqliteCategoryRepository;
use storegate_core::repo::discount_repo::SqliteDiscountRepository;
use storegate_core::repo::order_item_repo::SqliteOrderItemRepository;
use storegate_core::repo::order_repo::SqliteCustomerOrderRepository;
use storegate_core::repo::payment_repo::SqlitePaymentRepository;
use storegate_core::repo::product_repo::SqliteProductRepository;
use storegate_core::repo::review_repo::SqliteReviewRepository;
use storegate_core::repo::shipment_repo::SqliteShipmentRepository;
use storegate_core::repo::user_repo::SqliteAppUserRepository;
use storegate_core::{
    open_db_in_memory, Address, AppUser, Category, CrudRepository, CustomerOrder, Discount,
    OrderItem, Payment, Product, RecordId, Review, Shipment,
};

pub fn store() -> Connection {
    open_db_in_memory().unwrap()
}

pub fn add_user(conn: &Connection, name: &str) -> RecordId {
    SqliteAppUserRepository::try_new(conn)
        .unwrap()
        .create(&AppUser::new(name))
        .unwrap()
}

pub fn add_address(conn: &Connection, street: &str, city: &str, user_id: RecordId) -> RecordId {
    SqliteAddressRepository::try_new(conn)
        .unwrap()
        .create(&Address::new(street, city, user_id))
        .unwrap()
}

pub fn add_category(conn: &Connection, name: &str) -> RecordId {
    SqliteCategoryRepository::try_new(conn)
        .unwrap()
        .create(&Category::new(name))
        .unwrap()
}

pub fn add_product(
    conn: &Connection,
    name: &str,
    price: f64,
    category_id: Option<RecordId>,
) -> RecordId {
    SqliteProductRepository::try_new(conn)
        .unwrap()
        .create(&Product::new(name, price, category_id))
        .unwrap()
}

pub fn add_order(conn: &Connection, user_id: RecordId) -> RecordId {
    SqliteCustomerOrderRepository::try_new(conn)
        .unwrap()
        .create(&CustomerOrder::new(user_id))
        .unwrap()
}

pub fn add_item(
    conn: &Connection,
    order_id: RecordId,
    product_id: RecordId,
    quantity: Option<i32>,
) -> RecordId {
    let item = OrderItem {
        quantity,
        ..OrderItem::new(order_id, product_id, 0)
    };
    SqliteOrderItemRepository::try_new(conn)
        .unwrap()
        .create(&item)
        .unwrap()
}

pub fn add_discount(conn: &Connection, code: &str, percentage: f64, product_id: RecordId) -> RecordId {
    SqliteDiscountRepository::try_new(conn)
        .unwrap()
        .create(&Discount::new(code, percentage, product_id))
        .unwrap()
}

pub fn add_payment(conn: &Connection, status: Option<&str>, order_id: Option<RecordId>) -> RecordId {
    let payment = Payment {
        id: None,
        status: status.map(str::to_string),
        order_id,
    };
    SqlitePaymentRepository::try_new(conn)
        .unwrap()
        .create(&payment)
        .unwrap()
}

pub fn add_shipment(conn: &Connection, tracking_number: &str, order_id: RecordId) -> RecordId {
    SqliteShipmentRepository::try_new(conn)
        .unwrap()
        .create(&Shipment::new(tracking_number, order_id))
        .unwrap()
}

pub fn add_review(
    conn: &Connection,
    comment: &str,
    rating: i32,
    user_id: RecordId,
    product_id: RecordId,
) -> RecordId {
    SqliteReviewRepository::try_new(conn)
        .unwrap()
        .create(&Review::new(comment, rating, user_id, product_id))
        .unwrap()
}

pub fn ids<T>(records: &[T], id: impl Fn(&T) -> Option<RecordId>) -> Vec<RecordId> {
    records.iter().filter_map(id).collect()
}
