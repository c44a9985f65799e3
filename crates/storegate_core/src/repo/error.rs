//! Repository error taxonomy.
//!
//! - Absent rows on identity lookups are `Ok(None)`, not errors.
//! - Store rejections (constraint violations, type mismatches, malformed SQL
//!   input) surface unchanged as `Db` with the native diagnostic.
//! - Malformed caller input that the store would silently accept (empty `IN`
//!   lists, zero divisors, unknown filter columns) fails fast as
//!   `InvalidArgument` before any round trip.

use crate::db::DbError;
use crate::model::RecordId;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Update or delete addressed an identity with no row.
    NotFound {
        table: &'static str,
        id: RecordId,
    },
    /// Update was called on a record that was never inserted.
    MissingIdentity(&'static str),
    InvalidArgument(String),
    /// Persisted data cannot be converted to the expected read model.
    InvalidData(String),
}

impl RepoError {
    /// Returns the store's native error when the store rejected the call.
    pub fn store_error(&self) -> Option<&rusqlite::Error> {
        match self {
            Self::Db(DbError::Sqlite(err)) => Some(err),
            _ => None,
        }
    }

    /// Returns whether the store rejected the call on a constraint check.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self.store_error().and_then(rusqlite::Error::sqlite_error_code),
            Some(rusqlite::ErrorCode::ConstraintViolation)
        )
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { table, id } => write!(f, "{table} row not found: {id}"),
            Self::MissingIdentity(table) => {
                write!(f, "{table} record has no identity; insert it first")
            }
            Self::InvalidArgument(message) => write!(f, "invalid query argument: {message}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound { .. } => None,
            Self::MissingIdentity(_) => None,
            Self::InvalidArgument(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
