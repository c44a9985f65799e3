//! Repository layer: generic CRUD plus one query catalog per entity.
//!
//! # Responsibility
//! - Provide identity-based data access for every table (`crud`).
//! - Expose each named catalog query as one typed method on the owning
//!   entity's repository.
//! - Keep SQL text, parameter binding and row mapping out of callers.
//!
//! # Invariants
//! - Repositories borrow a migrated connection and never start, commit or
//!   roll back transactions; callers own transaction boundaries.
//! - Store rejections surface unchanged as `RepoError::Db`.

pub mod address_repo;
pub mod category_repo;
pub mod crud;
pub mod discount_repo;
pub mod error;
pub mod order_item_repo;
pub mod order_repo;
pub mod payment_repo;
pub mod product_repo;
mod query;
pub mod review_repo;
pub mod shipment_repo;
pub mod user_repo;
