//! Connection pool setup

use crate::config::JoblyConfig;
use crate::error::{JoblyError, JoblyResult};
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use tokio_postgres::NoTls;

/// Create a `NoTls` connection pool sized by `config.pool_max_size`.
///
/// # Example
///
/// ```ignore
/// let config = jobly::JoblyConfig::from_env()?;
/// let pool = jobly::create_pool(&config)?;
/// let conn = pool.get().await?;
/// let companies = CompanyModel::default().find_all(&conn).await?;
/// ```
pub fn create_pool(config: &JoblyConfig) -> JoblyResult<Pool> {
    let pg_config: tokio_postgres::Config = config
        .database_url
        .parse()
        .map_err(|e: tokio_postgres::Error| JoblyError::Connection(e.to_string()))?;

    let manager = Manager::from_config(
        pg_config,
        NoTls,
        ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        },
    );
    Pool::builder(manager)
        .max_size(config.pool_max_size)
        .build()
        .map_err(|e| JoblyError::Pool(e.to_string()))
}
