//! Statement execution helpers shared by every repository.
//!
//! # Responsibility
//! - Run one named statement per call, map its rows, and log the outcome.
//! - Shape caller input for `LIKE` fragments and `IN` lists.
//!
//! # Invariants
//! - Each call is exactly one round trip; nothing is cached between calls.
//! - Logged lines carry the operation name, row count and duration only.

use super::error::{RepoError, RepoResult};
use log::{debug, error};
use rusqlite::types::{FromSql, Value};
use rusqlite::{Connection, Params, Row};
use std::time::Instant;

const LIKE_ESCAPE: char = '\\';

/// Runs `sql` and maps every returned row.
pub(crate) fn fetch_all<T, P, F>(
    conn: &Connection,
    operation: &'static str,
    sql: &str,
    params: P,
    mut map: F,
) -> RepoResult<Vec<T>>
where
    P: Params,
    F: FnMut(&Row<'_>) -> RepoResult<T>,
{
    let started_at = Instant::now();
    let result = (|| -> RepoResult<Vec<T>> {
        let mut stmt = conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(map(row)?);
        }
        Ok(items)
    })();
    log_outcome(operation, started_at, result.as_ref().map(Vec::len));
    result
}

/// Runs `sql` and maps the first returned row, if any.
///
/// Further rows are ignored; callers that need a specific row order the
/// statement and add `LIMIT 1`.
pub(crate) fn fetch_optional<T, P, F>(
    conn: &Connection,
    operation: &'static str,
    sql: &str,
    params: P,
    map: F,
) -> RepoResult<Option<T>>
where
    P: Params,
    F: FnOnce(&Row<'_>) -> RepoResult<T>,
{
    let started_at = Instant::now();
    let result = (|| -> RepoResult<Option<T>> {
        let mut stmt = conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        match rows.next()? {
            Some(row) => map(row).map(Some),
            None => Ok(None),
        }
    })();
    log_outcome(
        operation,
        started_at,
        result.as_ref().map(|item| usize::from(item.is_some())),
    );
    result
}

/// Runs a single-row, single-column statement such as an aggregate.
pub(crate) fn fetch_scalar<T, P>(
    conn: &Connection,
    operation: &'static str,
    sql: &str,
    params: P,
) -> RepoResult<T>
where
    T: FromSql,
    P: Params,
{
    let started_at = Instant::now();
    let result = conn
        .query_row(sql, params, |row| row.get::<_, T>(0))
        .map_err(RepoError::from);
    log_outcome(operation, started_at, result.as_ref().map(|_| 1));
    result
}

/// Runs a write statement and returns the number of changed rows.
pub(crate) fn execute<P: Params>(
    conn: &Connection,
    operation: &'static str,
    sql: &str,
    params: P,
) -> RepoResult<usize> {
    let started_at = Instant::now();
    let result = conn.execute(sql, params).map_err(RepoError::from);
    log_outcome(operation, started_at, result.as_ref().copied());
    result
}

fn log_outcome(operation: &str, started_at: Instant, outcome: Result<usize, &RepoError>) {
    let duration_ms = started_at.elapsed().as_millis();
    match outcome {
        Ok(rows) => debug!(
            "event=query module=repo status=ok operation={operation} rows={rows} duration_ms={duration_ms}"
        ),
        Err(err) => error!(
            "event=query module=repo status=error operation={operation} duration_ms={duration_ms} error={err}"
        ),
    }
}

/// Escapes `LIKE` wildcards so `fragment` matches literally.
///
/// Statements using the result must declare `ESCAPE '\'`.
pub(crate) fn like_fragment(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len());
    for ch in fragment.chars() {
        if matches!(ch, '%' | '_' | LIKE_ESCAPE) {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(ch);
    }
    escaped
}

/// Expands `template` by replacing `{list}` with one placeholder per value.
///
/// `values` are appended after `leading` positional bindings.
pub(crate) fn expand_in_list<T>(
    template: &str,
    parameter: &str,
    leading: Vec<Value>,
    values: &[T],
) -> RepoResult<(String, Vec<Value>)>
where
    T: Clone + Into<Value>,
{
    if values.is_empty() {
        return Err(RepoError::InvalidArgument(format!(
            "`{parameter}` must contain at least one value"
        )));
    }
    let placeholders = vec!["?"; values.len()].join(", ");
    let sql = template.replace("{list}", &placeholders);
    let mut binds = leading;
    binds.extend(values.iter().cloned().map(Into::into));
    Ok((sql, binds))
}

/// Rejects negative `LIMIT`/`OFFSET`-style arguments.
pub(crate) fn non_negative(parameter: &str, value: i64) -> RepoResult<i64> {
    if value < 0 {
        return Err(RepoError::InvalidArgument(format!(
            "`{parameter}` must be non-negative, got {value}"
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::{expand_in_list, like_fragment, non_negative};
    use crate::repo::error::RepoError;
    use rusqlite::types::Value;

    #[test]
    fn like_fragment_escapes_wildcards_and_escape_char() {
        assert_eq!(like_fragment("oh"), "oh");
        assert_eq!(like_fragment("50%_off"), "50\\%\\_off");
        assert_eq!(like_fragment("a\\b"), "a\\\\b");
    }

    #[test]
    fn expand_in_list_appends_placeholders_after_leading_binds() {
        let (sql, binds) = expand_in_list(
            "SELECT 1 WHERE a = ? AND b IN ({list})",
            "ids",
            vec![Value::Integer(7)],
            &[1_i64, 2, 3],
        )
        .unwrap();
        assert_eq!(sql, "SELECT 1 WHERE a = ? AND b IN (?, ?, ?)");
        assert_eq!(
            binds,
            vec![
                Value::Integer(7),
                Value::Integer(1),
                Value::Integer(2),
                Value::Integer(3)
            ]
        );
    }

    #[test]
    fn expand_in_list_rejects_empty_lists() {
        let err = expand_in_list::<i64>("x IN ({list})", "ids", Vec::new(), &[]).unwrap_err();
        assert!(matches!(err, RepoError::InvalidArgument(message) if message.contains("ids")));
    }

    #[test]
    fn non_negative_rejects_negative_values() {
        assert_eq!(non_negative("limit", 0).unwrap(), 0);
        assert!(non_negative("offset", -1).is_err());
    }
}
