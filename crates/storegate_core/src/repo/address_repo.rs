//! Address persistence and the address query catalog.

use super::crud::{CrudRepository, Entity};
use super::error::RepoResult;
use super::query::{fetch_all, like_fragment};
use super::user_repo::read_app_user;
use crate::db::ensure_schema_ready;
use crate::model::projection::{AddressWithUser, CityCount};
use crate::model::user::Address;
use crate::model::RecordId;
use rusqlite::types::Value;
use rusqlite::{params, Connection, Params, Row};

const FIND_ADDRESSES_BY_CITY_SQL: &str = "SELECT a.id, a.street, a.city, a.user_id
FROM address a
WHERE a.city LIKE '%' || ?1 || '%' ESCAPE '\\'
ORDER BY a.id;";

const FIND_ADDRESSES_BY_USER_ID_SQL: &str = "SELECT a.id, a.street, a.city, a.user_id
FROM address a
WHERE a.user_id = ?1
ORDER BY a.id;";

const FIND_ADDRESSES_OF_USERS_WITH_ORDERS_SQL: &str = "SELECT DISTINCT a.id, a.street, a.city, a.user_id
FROM address a
JOIN app_user u ON u.id = a.user_id
JOIN customer_order o ON o.user_id = u.id
ORDER BY a.id;";

const FIND_ADDRESSES_BY_USER_NAME_SQL: &str = "SELECT a.id, a.street, a.city, a.user_id, u.id, u.name
FROM address a
JOIN app_user u ON u.id = a.user_id
WHERE u.name = ?1
ORDER BY a.id;";

const FIND_ALL_ADDRESSES_ORDER_BY_CITY_SQL: &str = "SELECT a.id, a.street, a.city, a.user_id
FROM address a
ORDER BY a.city ASC, a.id ASC;";

const COUNT_ADDRESSES_BY_CITY_SQL: &str = "SELECT a.city, COUNT(a.id)
FROM address a
GROUP BY a.city
ORDER BY a.city;";

const FIND_ADDRESSES_BY_STREET_SQL: &str = "SELECT a.id, a.street, a.city, a.user_id
FROM address a
WHERE a.street LIKE '%' || ?1 || '%' ESCAPE '\\'
ORDER BY a.id;";

const FIND_ADDRESSES_BY_USERS_WITH_REVIEWS_SQL: &str = "SELECT DISTINCT a.id, a.street, a.city, a.user_id
FROM address a
JOIN app_user u ON u.id = a.user_id
WHERE EXISTS (SELECT 1 FROM review r WHERE r.user_id = u.id)
ORDER BY a.id;";

const FIND_DISTINCT_ADDRESSES_BY_USER_SQL: &str = "SELECT DISTINCT a.id, a.street, a.city, a.user_id
FROM address a
JOIN app_user u ON u.id = a.user_id
ORDER BY a.id;";

const FIND_ADDRESSES_WITH_ORDERS_SQL: &str = "SELECT DISTINCT a.id, a.street, a.city, a.user_id
FROM address a
JOIN app_user u ON u.id = a.user_id
JOIN customer_order o ON o.user_id = u.id
WHERE o.id IS NOT NULL
ORDER BY a.id;";

impl Entity for Address {
    const TABLE: &'static str = "address";
    const COLUMNS: &'static [&'static str] = &["street", "city", "user_id"];

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn column_values(&self) -> Vec<Value> {
        vec![
            self.street.clone().into(),
            self.city.clone().into(),
            self.user_id.into(),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(read_address(row, 0)?)
    }
}

fn read_address(row: &Row<'_>, offset: usize) -> rusqlite::Result<Address> {
    Ok(Address {
        id: row.get(offset)?,
        street: row.get(offset + 1)?,
        city: row.get(offset + 2)?,
        user_id: row.get(offset + 3)?,
    })
}

/// SQLite-backed address repository.
pub struct SqliteAddressRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAddressRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }

    pub(crate) fn from_ready(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Addresses whose city contains `city` literally.
    pub fn find_addresses_by_city(&self, city: &str) -> RepoResult<Vec<Address>> {
        self.addresses(
            "address.find_addresses_by_city",
            FIND_ADDRESSES_BY_CITY_SQL,
            params![like_fragment(city)],
        )
    }

    /// Addresses owned by `user_id`; also the user -> addresses loader.
    pub fn find_addresses_by_user_id(&self, user_id: RecordId) -> RepoResult<Vec<Address>> {
        self.addresses(
            "address.find_addresses_by_user_id",
            FIND_ADDRESSES_BY_USER_ID_SQL,
            params![user_id],
        )
    }

    pub fn find_addresses_of_users_with_orders(&self) -> RepoResult<Vec<Address>> {
        self.addresses(
            "address.find_addresses_of_users_with_orders",
            FIND_ADDRESSES_OF_USERS_WITH_ORDERS_SQL,
            params![],
        )
    }

    /// Addresses of users named `user_name`, each loaded with its user.
    pub fn find_addresses_by_user_name(&self, user_name: &str) -> RepoResult<Vec<AddressWithUser>> {
        fetch_all(
            self.conn,
            "address.find_addresses_by_user_name",
            FIND_ADDRESSES_BY_USER_NAME_SQL,
            params![user_name],
            |row| {
                Ok(AddressWithUser {
                    address: read_address(row, 0)?,
                    user: read_app_user(row, 4)?,
                })
            },
        )
    }

    pub fn find_all_addresses_order_by_city(&self) -> RepoResult<Vec<Address>> {
        self.addresses(
            "address.find_all_addresses_order_by_city",
            FIND_ALL_ADDRESSES_ORDER_BY_CITY_SQL,
            params![],
        )
    }

    /// Address count per city; addresses without a city form one `None` group.
    pub fn count_addresses_by_city(&self) -> RepoResult<Vec<CityCount>> {
        fetch_all(
            self.conn,
            "address.count_addresses_by_city",
            COUNT_ADDRESSES_BY_CITY_SQL,
            params![],
            |row| {
                Ok(CityCount {
                    city: row.get(0)?,
                    count: row.get(1)?,
                })
            },
        )
    }

    pub fn find_addresses_by_street(&self, street: &str) -> RepoResult<Vec<Address>> {
        self.addresses(
            "address.find_addresses_by_street",
            FIND_ADDRESSES_BY_STREET_SQL,
            params![like_fragment(street)],
        )
    }

    pub fn find_addresses_by_users_with_reviews(&self) -> RepoResult<Vec<Address>> {
        self.addresses(
            "address.find_addresses_by_users_with_reviews",
            FIND_ADDRESSES_BY_USERS_WITH_REVIEWS_SQL,
            params![],
        )
    }

    /// Addresses that belong to an existing user.
    pub fn find_distinct_addresses_by_user(&self) -> RepoResult<Vec<Address>> {
        self.addresses(
            "address.find_distinct_addresses_by_user",
            FIND_DISTINCT_ADDRESSES_BY_USER_SQL,
            params![],
        )
    }

    pub fn find_addresses_with_orders(&self) -> RepoResult<Vec<Address>> {
        self.addresses(
            "address.find_addresses_with_orders",
            FIND_ADDRESSES_WITH_ORDERS_SQL,
            params![],
        )
    }

    fn addresses<P: Params>(
        &self,
        operation: &'static str,
        sql: &str,
        params: P,
    ) -> RepoResult<Vec<Address>> {
        fetch_all(self.conn, operation, sql, params, Address::from_row)
    }
}

impl CrudRepository<Address> for SqliteAddressRepository<'_> {
    fn connection(&self) -> &Connection {
        self.conn
    }
}
