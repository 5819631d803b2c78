//! Store interface consumed by the models.

use crate::error::{JoblyError, JoblyResult};
use std::future::Future;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// Positional parameters for `$1, $2, ...`.
pub type Params<'a> = [&'a (dyn ToSql + Sync)];

/// Anything the models can run parameterized SQL through.
///
/// Every model operation takes `&impl GenericClient`, so a pooled connection,
/// a bare `tokio_postgres::Client` or an open transaction can all be passed.
/// Driver errors are classified through [`JoblyError::from_db_error`], which
/// is how a uniqueness violation becomes distinguishable from other failures.
pub trait GenericClient: Send + Sync {
    /// All rows produced by `sql`.
    fn query(
        &self,
        sql: &str,
        params: &Params<'_>,
    ) -> impl Future<Output = JoblyResult<Vec<Row>>> + Send;

    /// Rows affected by `sql`.
    fn execute(
        &self,
        sql: &str,
        params: &Params<'_>,
    ) -> impl Future<Output = JoblyResult<u64>> + Send;

    /// Run one or more parameterless statements separated by `;`.
    fn batch_execute(&self, sql: &str) -> impl Future<Output = JoblyResult<()>> + Send;

    /// The first row; [`JoblyError::NotFound`] when there is none.
    fn query_one(
        &self,
        sql: &str,
        params: &Params<'_>,
    ) -> impl Future<Output = JoblyResult<Row>> + Send {
        async move {
            self.query_opt(sql, params)
                .await?
                .ok_or_else(|| JoblyError::not_found("Expected one row, got none"))
        }
    }

    /// The first row, if any.
    fn query_opt(
        &self,
        sql: &str,
        params: &Params<'_>,
    ) -> impl Future<Output = JoblyResult<Option<Row>>> + Send {
        async move { Ok(self.query(sql, params).await?.into_iter().next()) }
    }
}

impl GenericClient for tokio_postgres::Client {
    async fn query(&self, sql: &str, params: &Params<'_>) -> JoblyResult<Vec<Row>> {
        tokio_postgres::Client::query(self, sql, params)
            .await
            .map_err(JoblyError::from_db_error)
    }

    async fn execute(&self, sql: &str, params: &Params<'_>) -> JoblyResult<u64> {
        tokio_postgres::Client::execute(self, sql, params)
            .await
            .map_err(JoblyError::from_db_error)
    }

    async fn batch_execute(&self, sql: &str) -> JoblyResult<()> {
        tokio_postgres::Client::batch_execute(self, sql)
            .await
            .map_err(JoblyError::from_db_error)
    }
}

impl GenericClient for tokio_postgres::Transaction<'_> {
    async fn query(&self, sql: &str, params: &Params<'_>) -> JoblyResult<Vec<Row>> {
        tokio_postgres::Transaction::query(self, sql, params)
            .await
            .map_err(JoblyError::from_db_error)
    }

    async fn execute(&self, sql: &str, params: &Params<'_>) -> JoblyResult<u64> {
        tokio_postgres::Transaction::execute(self, sql, params)
            .await
            .map_err(JoblyError::from_db_error)
    }

    async fn batch_execute(&self, sql: &str) -> JoblyResult<()> {
        tokio_postgres::Transaction::batch_execute(self, sql)
            .await
            .map_err(JoblyError::from_db_error)
    }
}

// A pooled client derefs to `tokio_postgres::Client`; the explicit binding
// skips the intermediate `ClientWrapper`, which has no impl.
#[cfg(feature = "pool")]
impl GenericClient for deadpool_postgres::Client {
    async fn query(&self, sql: &str, params: &Params<'_>) -> JoblyResult<Vec<Row>> {
        let client: &tokio_postgres::Client = self;
        GenericClient::query(client, sql, params).await
    }

    async fn execute(&self, sql: &str, params: &Params<'_>) -> JoblyResult<u64> {
        let client: &tokio_postgres::Client = self;
        GenericClient::execute(client, sql, params).await
    }

    async fn batch_execute(&self, sql: &str) -> JoblyResult<()> {
        let client: &tokio_postgres::Client = self;
        GenericClient::batch_execute(client, sql).await
    }
}
