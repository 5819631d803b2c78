//! Mapping result rows onto records.

use crate::error::{JoblyError, JoblyResult};
use tokio_postgres::Row;
use tokio_postgres::types::FromSql;

/// Build a record from one result row.
///
/// Columns are read by name, so statements alias snake_case columns to the
/// record's camelCase names (`num_employees AS "numEmployees"`).
///
/// ```ignore
/// impl FromRow for Application {
///     fn from_row(row: &Row) -> JoblyResult<Self> {
///         Ok(Self {
///             username: row.try_get_column("username")?,
///             job_id: row.try_get_column("job_id")?,
///         })
///     }
/// }
/// ```
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> JoblyResult<Self>;
}

/// Typed column access that reports the failing column.
pub trait RowExt {
    /// Read `column`, or [`JoblyError::Decode`] naming it.
    fn try_get_column<T>(&self, column: &str) -> JoblyResult<T>
    where
        T: for<'a> FromSql<'a>;
}

impl RowExt for Row {
    fn try_get_column<T>(&self, column: &str) -> JoblyResult<T>
    where
        T: for<'a> FromSql<'a>,
    {
        self.try_get(column)
            .map_err(|e| JoblyError::decode(column, e.to_string()))
    }
}
