//! Record access for companies, jobs, users and applications.
//!
//! Each model is a small `Copy`/`Clone` value constructed with its
//! [`EntityTables`]; every operation takes the store as `&impl GenericClient`,
//! so a pooled client or an open transaction can be passed.
//!
//! ```ignore
//! use jobly::models::{CompanyModel, JobModel};
//! use jobly::sql::FilterPayload;
//!
//! let companies = CompanyModel::default();
//! let found = companies
//!     .find_some(&conn, &FilterPayload::new().with("minEmployees", 2))
//!     .await?;
//! ```

mod company;
mod job;
mod tables;
mod user;

pub use company::{Company, CompanyDetail, CompanyModel, NewCompany};
pub use job::{Job, JobDetail, JobModel, NewJob};
pub use tables::{
    COMPANY_FILTERS, COMPANY_TABLES, EntityTables, JOB_FILTERS, JOB_TABLES, USER_TABLES,
};
pub use user::{Application, NewUser, User, UserDetail, UserModel};

use crate::error::JoblyError;
use crate::sql::{PartialUpdate, Sql, sql};
use tokio_postgres::types::ToSql;

/// `UPDATE <table> SET … WHERE <key_column> = $n RETURNING <returning>`.
///
/// The key is bound after the update values.
fn update_statement<K>(
    table: &str,
    key_column: &str,
    key: K,
    update: PartialUpdate,
    returning: &str,
) -> Sql
where
    K: ToSql + Sync + Send + 'static,
{
    let mut q = sql(format!(
        "UPDATE {table} SET {} WHERE {key_column} = ${} RETURNING {returning}",
        update.set_cols(),
        update.next_placeholder()
    ));
    for value in update.values {
        q = q.bind(value);
    }
    q.bind(key)
}

/// Remap a store uniqueness violation to a domain `Duplicate`.
fn duplicate_on_unique(err: JoblyError, message: impl FnOnce() -> String) -> JoblyError {
    if !err.is_unique_violation() {
        return err;
    }
    let message = message();
    tracing::warn!(source = %err, %message, "uniqueness violation reported as duplicate");
    JoblyError::duplicate(message)
}
