//! Table definitions for companies, jobs, users and applications.
//!
//! Used to provision test and local databases; not a migration tool.

use crate::client::GenericClient;
use crate::error::JoblyResult;

/// DDL for the four tables, in dependency order.
pub const SCHEMA_SQL: &str = include_str!("../sql/schema.sql");

/// Create the tables in the current `search_path`.
pub async fn apply_schema(conn: &impl GenericClient) -> JoblyResult<()> {
    tracing::debug!(target: "jobly.sql", "applying schema");
    conn.batch_execute(SCHEMA_SQL).await
}
