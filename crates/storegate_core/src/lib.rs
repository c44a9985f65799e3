//! Relational schema and query gateway for a commerce store.
//! This crate owns the table layout, generic CRUD and every named query.

pub mod config;
pub mod db;
pub mod gateway;
pub mod logging;
pub mod model;
pub mod repo;

pub use config::{ConfigError, StoreConfig};
pub use db::{ensure_schema_ready, open_db, open_db_in_memory, open_db_with_config, DbError};
pub use gateway::{StoreGateway, TableCount};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::catalog::{Category, Discount, Product, Review};
pub use model::order::{CustomerOrder, OrderItem, Payment, Shipment};
pub use model::projection::{
    AddressWithUser, CityCount, DiscountWithProduct, PaymentCompletion, ProductDiscountCount,
    ProductItemCount, StatusCount, UserOrderCount,
};
pub use model::user::{Address, AppUser};
pub use model::RecordId;
pub use repo::crud::{CrudRepository, Criterion, Entity, FilterOp, PageRequest};
pub use repo::error::{RepoError, RepoResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
