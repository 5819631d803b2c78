//! # jobly
//!
//! Data access for the Jobly job board: companies, jobs, users and job
//! applications stored in Postgres.
//!
//! ## Features
//!
//! - **Partial updates**: [`sql_for_partial_update`] turns an ordered field
//!   payload into a `SET` list with positional parameters
//! - **Search filters**: [`sql_for_variable_where`] turns request filters into
//!   a `WHERE` fragment, driven by a per-entity [`FilterTable`]
//! - **Parameter safety**: filter and update values are always bound, column
//!   names are quoted
//! - **Transaction-friendly**: pass a transaction anywhere a `GenericClient` is
//!   expected
//!
//! ## Models
//!
//! ```ignore
//! use jobly::models::{CompanyModel, JobModel, UserModel};
//! use jobly::sql::{FilterPayload, UpdatePayload};
//!
//! let companies = CompanyModel::default();
//! let found = companies
//!     .find_some(&conn, &FilterPayload::new().with("name", "net").with("minEmployees", 10))
//!     .await?;
//!
//! let updated = companies
//!     .update(&conn, "c1", &UpdatePayload::new().set("numEmployees", 35))
//!     .await?;
//!
//! let user = UserModel::default().authenticate(&conn, "u1", "password1").await?;
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod ident;
pub mod models;
pub mod password;
pub mod row;
pub mod schema;
pub mod sql;
pub mod types;

pub use client::GenericClient;
pub use config::JoblyConfig;
pub use error::{JoblyError, JoblyResult};
pub use row::{FromRow, RowExt};
pub use sql::{
    ColumnMap, FilterPayload, FilterRule, FilterTable, FilterValue, PartialUpdate, Sql,
    UpdatePayload, sql, sql_for_partial_update, sql_for_variable_where,
};
pub use types::SqlValue;

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::create_pool;

// Re-export deadpool types for convenience
#[cfg(feature = "pool")]
pub use deadpool_postgres::{Pool, PoolError};
