//! Generic identity-based data access, instantiated once per entity.
//!
//! # Responsibility
//! - Describe how a record maps to its table (`Entity`).
//! - Provide create/read/update/delete, pagination and ad-hoc filtering for
//!   any `Entity` through one trait with default methods.
//!
//! # Invariants
//! - Identities are assigned by the store on insert; `create` ignores any
//!   `id` already present on the record.
//! - Listing is ordered by `id ASC` so pages are stable.
//! - Filter columns are checked against `Entity::COLUMNS`; caller text is
//!   never spliced into SQL.

use super::error::{RepoError, RepoResult};
use super::query::{execute, expand_in_list, fetch_all, fetch_optional, fetch_scalar};
use crate::model::RecordId;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

/// Table mapping for one record type.
pub trait Entity: Sized {
    /// Table name, also used as the operation prefix in logs.
    const TABLE: &'static str;
    /// Non-identity columns, in the order of [`Entity::column_values`].
    const COLUMNS: &'static [&'static str];

    fn id(&self) -> Option<RecordId>;
    fn column_values(&self) -> Vec<Value>;
    /// Decodes one row selected with `id` plus every name in `COLUMNS`.
    fn from_row(row: &Row<'_>) -> RepoResult<Self>;
}

/// Page window for [`CrudRepository::list`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageRequest {
    /// Maximum rows to return; `None` returns every remaining row.
    pub limit: Option<u32>,
    /// Number of rows to skip.
    pub offset: u32,
}

impl PageRequest {
    pub fn new(limit: u32, offset: u32) -> Self {
        Self {
            limit: Some(limit),
            offset,
        }
    }
}

/// Comparison applied by one [`Criterion`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    /// Literal substring match; `value` must be text.
    Contains,
    IsNull,
    IsNotNull,
}

/// One column predicate. Criteria passed together are combined with `AND`.
#[derive(Debug, Clone, PartialEq)]
pub struct Criterion {
    pub column: String,
    pub op: FilterOp,
    /// Ignored by `IsNull` / `IsNotNull`.
    pub value: Value,
}

impl Criterion {
    pub fn new(column: impl Into<String>, op: FilterOp, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            op,
            value: value.into(),
        }
    }

    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, FilterOp::Eq, value)
    }

    /// Equality on a text column; accepts `&str` as well as `String`.
    pub fn eq_text(column: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(column, FilterOp::Eq, text.into())
    }

    pub fn contains(column: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self::new(column, FilterOp::Contains, fragment.into())
    }

    pub fn is_null(column: impl Into<String>) -> Self {
        Self::new(column, FilterOp::IsNull, Value::Null)
    }
}

/// Identity-based data access for one entity type.
///
/// Implementors only supply the connection; every operation is a default
/// method so each repository gets the same contract.
pub trait CrudRepository<E: Entity> {
    fn connection(&self) -> &Connection;

    /// Inserts `entity` and returns the store-assigned id.
    fn create(&self, entity: &E) -> RepoResult<RecordId> {
        let conn = self.connection();
        let placeholders = (1..=E::COLUMNS.len())
            .map(|index| format!("?{index}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({placeholders});",
            E::TABLE,
            E::COLUMNS.join(", ")
        );
        execute(
            conn,
            "crud.create",
            &sql,
            params_from_iter(entity.column_values()),
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Inserts every record in order and returns their ids.
    ///
    /// Stops at the first rejected insert; earlier inserts stay unless the
    /// caller's transaction is rolled back.
    fn create_all(&self, entities: &[E]) -> RepoResult<Vec<RecordId>> {
        entities.iter().map(|entity| self.create(entity)).collect()
    }

    /// Loads one row by identity; an absent row is `Ok(None)`.
    fn get_by_id(&self, id: RecordId) -> RepoResult<Option<E>> {
        let sql = format!("{} WHERE id = ?1;", select_all_sql::<E>());
        fetch_optional(self.connection(), "crud.get_by_id", &sql, params![id], E::from_row)
    }

    /// Loads every row whose id is listed, ordered by id.
    fn get_all_by_ids(&self, ids: &[RecordId]) -> RepoResult<Vec<E>> {
        let template = format!("{} WHERE id IN ({{list}}) ORDER BY id ASC;", select_all_sql::<E>());
        let (sql, binds) = expand_in_list(&template, "ids", Vec::new(), ids)?;
        fetch_all(
            self.connection(),
            "crud.get_all_by_ids",
            &sql,
            params_from_iter(binds),
            E::from_row,
        )
    }

    fn exists_by_id(&self, id: RecordId) -> RepoResult<bool> {
        let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?1);", E::TABLE);
        let exists: i64 = fetch_scalar(self.connection(), "crud.exists_by_id", &sql, params![id])?;
        Ok(exists == 1)
    }

    /// Overwrites every column of the row identified by `entity.id`.
    fn update(&self, entity: &E) -> RepoResult<()> {
        let id = entity.id().ok_or(RepoError::MissingIdentity(E::TABLE))?;
        let assignments = E::COLUMNS
            .iter()
            .enumerate()
            .map(|(index, column)| format!("{column} = ?{}", index + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {} SET {assignments} WHERE id = ?{};",
            E::TABLE,
            E::COLUMNS.len() + 1
        );
        let mut binds = entity.column_values();
        binds.push(Value::Integer(id));

        let changed = execute(self.connection(), "crud.update", &sql, params_from_iter(binds))?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                table: E::TABLE,
                id,
            });
        }
        Ok(())
    }

    /// Deletes one row. Rows still referenced by dependents are rejected by
    /// the store's foreign-key check; nothing cascades.
    fn delete(&self, id: RecordId) -> RepoResult<()> {
        let sql = format!("DELETE FROM {} WHERE id = ?1;", E::TABLE);
        let changed = execute(self.connection(), "crud.delete", &sql, params![id])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                table: E::TABLE,
                id,
            });
        }
        Ok(())
    }

    fn list(&self, page: &PageRequest) -> RepoResult<Vec<E>> {
        let mut sql = format!("{} ORDER BY id ASC", select_all_sql::<E>());
        let mut binds: Vec<Value> = Vec::new();
        match page.limit {
            Some(limit) => {
                sql.push_str(" LIMIT ? OFFSET ?");
                binds.push(Value::Integer(i64::from(limit)));
                binds.push(Value::Integer(i64::from(page.offset)));
            }
            None if page.offset > 0 => {
                sql.push_str(" LIMIT -1 OFFSET ?");
                binds.push(Value::Integer(i64::from(page.offset)));
            }
            None => {}
        }
        fetch_all(
            self.connection(),
            "crud.list",
            &sql,
            params_from_iter(binds),
            E::from_row,
        )
    }

    fn count(&self) -> RepoResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM {};", E::TABLE);
        fetch_scalar(self.connection(), "crud.count", &sql, params![])
    }

    /// Loads rows satisfying every criterion, ordered by id.
    fn find_matching(&self, criteria: &[Criterion]) -> RepoResult<Vec<E>> {
        let (predicate, binds) = build_predicate::<E>(criteria)?;
        let sql = format!("{}{predicate} ORDER BY id ASC;", select_all_sql::<E>());
        fetch_all(
            self.connection(),
            "crud.find_matching",
            &sql,
            params_from_iter(binds),
            E::from_row,
        )
    }

    fn count_matching(&self, criteria: &[Criterion]) -> RepoResult<i64> {
        let (predicate, binds) = build_predicate::<E>(criteria)?;
        let sql = format!("SELECT COUNT(*) FROM {}{predicate};", E::TABLE);
        fetch_scalar(
            self.connection(),
            "crud.count_matching",
            &sql,
            params_from_iter(binds),
        )
    }
}

fn select_all_sql<E: Entity>() -> String {
    format!("SELECT id, {} FROM {}", E::COLUMNS.join(", "), E::TABLE)
}

fn build_predicate<E: Entity>(criteria: &[Criterion]) -> RepoResult<(String, Vec<Value>)> {
    let mut clauses = Vec::with_capacity(criteria.len());
    let mut binds = Vec::new();

    for criterion in criteria {
        let column = resolve_column::<E>(&criterion.column)?;
        let operator = match criterion.op {
            FilterOp::IsNull => {
                clauses.push(format!("{column} IS NULL"));
                continue;
            }
            FilterOp::IsNotNull => {
                clauses.push(format!("{column} IS NOT NULL"));
                continue;
            }
            FilterOp::Contains => {
                let Value::Text(fragment) = &criterion.value else {
                    return Err(RepoError::InvalidArgument(format!(
                        "`contains` on `{column}` requires a text value"
                    )));
                };
                binds.push(Value::Text(super::query::like_fragment(fragment)));
                clauses.push(format!("{column} LIKE '%' || ? || '%' ESCAPE '\\'"));
                continue;
            }
            FilterOp::Eq => "=",
            FilterOp::NotEq => "<>",
            FilterOp::Lt => "<",
            FilterOp::Le => "<=",
            FilterOp::Gt => ">",
            FilterOp::Ge => ">=",
        };
        binds.push(criterion.value.clone());
        clauses.push(format!("{column} {operator} ?"));
    }

    if clauses.is_empty() {
        return Ok((String::new(), binds));
    }
    Ok((format!(" WHERE {}", clauses.join(" AND ")), binds))
}

fn resolve_column<E: Entity>(column: &str) -> RepoResult<&'static str> {
    if column == "id" {
        return Ok("id");
    }
    E::COLUMNS
        .iter()
        .copied()
        .find(|known| *known == column)
        .ok_or_else(|| {
            RepoError::InvalidArgument(format!("unknown column `{column}` for {}", E::TABLE))
        })
}

#[cfg(test)]
mod tests {
    use super::{build_predicate, Criterion, FilterOp};
    use crate::model::user::AppUser;
    use rusqlite::types::Value;

    #[test]
    fn every_filter_op_renders_a_clause() {
        let ops = [
            (FilterOp::Eq, "name = ?"),
            (FilterOp::NotEq, "name <> ?"),
            (FilterOp::Lt, "name < ?"),
            (FilterOp::Le, "name <= ?"),
            (FilterOp::Gt, "name > ?"),
            (FilterOp::Ge, "name >= ?"),
            (FilterOp::Contains, "name LIKE '%' || ? || '%' ESCAPE '\\'"),
            (FilterOp::IsNull, "name IS NULL"),
            (FilterOp::IsNotNull, "name IS NOT NULL"),
        ];
        for (op, expected) in ops {
            let criterion = Criterion::new("name", op, "x".to_string());
            let (predicate, _) = build_predicate::<AppUser>(&[criterion]).unwrap();
            assert_eq!(predicate, format!(" WHERE {expected}"));
        }
    }

    #[test]
    fn null_checks_bind_nothing_and_text_equality_binds_text() {
        let (predicate, binds) = build_predicate::<AppUser>(&[
            Criterion::is_null("name"),
            Criterion::eq_text("name", "Ada"),
        ])
        .unwrap();
        assert_eq!(predicate, " WHERE name IS NULL AND name = ?");
        assert_eq!(binds, vec![Value::Text("Ada".to_string())]);
    }
}
