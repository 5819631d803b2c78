//! Dynamic SQL building.
//!
//! - [`Sql`] composes statements without manually tracking placeholder
//!   indices.
//! - [`sql_for_partial_update`] turns an [`UpdatePayload`] into a SET list and
//!   positional values.
//! - [`sql_for_variable_where`] turns a [`FilterPayload`] into a WHERE
//!   fragment using an entity's [`FilterTable`].
//!
//! # Example
//!
//! ```ignore
//! use jobly::sql::{sql, sql_for_variable_where};
//!
//! let mut q = sql("SELECT handle, name FROM companies");
//! q.push_where(sql_for_variable_where(Some(&filters), &COMPANY_FILTERS)?);
//! q.push(" ORDER BY name");
//!
//! let companies: Vec<Company> = q.fetch_all_as(&conn).await?;
//! ```

mod builder;
mod filter;
mod partial_update;
mod payload;

#[cfg(test)]
mod tests;

pub use builder::Sql;
pub use filter::{FilterRule, FilterTable, sql_for_variable_where};
pub use partial_update::{ColumnMap, PartialUpdate, sql_for_partial_update};
pub use payload::{FilterPayload, FilterValue, UpdatePayload};

/// Start building a SQL statement.
pub fn sql(initial_sql: impl Into<String>) -> Sql {
    Sql::new(initial_sql)
}
