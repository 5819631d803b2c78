//! Runtime configuration read from the environment.

use crate::error::{JoblyError, JoblyResult};
use std::env;

const DEFAULT_POOL_MAX_SIZE: usize = 16;
const DEFAULT_HASH_ROUNDS: u32 = 12;
const TEST_HASH_ROUNDS: u32 = 1;

/// Database and hashing settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoblyConfig {
    /// Postgres connection string.
    pub database_url: String,
    /// Maximum pooled connections.
    pub pool_max_size: usize,
    /// Work factor for [`Sha256Hasher`](crate::password::Sha256Hasher).
    pub hash_rounds: u32,
}

impl JoblyConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            pool_max_size: DEFAULT_POOL_MAX_SIZE,
            hash_rounds: DEFAULT_HASH_ROUNDS,
        }
    }

    /// Load `.env` (if present) and read the process environment.
    ///
    /// | variable              | meaning                                   |
    /// |-----------------------|-------------------------------------------|
    /// | `JOBLY_ENV`           | `test` switches to the test database      |
    /// | `DATABASE_URL`        | connection string (required)              |
    /// | `TEST_DATABASE_URL`   | preferred over `DATABASE_URL` in test     |
    /// | `JOBLY_POOL_MAX_SIZE` | pool size, default 16                     |
    /// | `JOBLY_HASH_ROUNDS`   | hashing work factor, default 12 (1 in test) |
    pub fn from_env() -> JoblyResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> JoblyResult<Self> {
        let test_mode = lookup("JOBLY_ENV").is_some_and(|v| v.trim().eq_ignore_ascii_case("test"));

        let database_url = test_mode
            .then(|| lookup("TEST_DATABASE_URL"))
            .flatten()
            .or_else(|| lookup("DATABASE_URL"))
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| JoblyError::Config("DATABASE_URL is not set".to_string()))?;

        let default_rounds = if test_mode {
            TEST_HASH_ROUNDS
        } else {
            DEFAULT_HASH_ROUNDS
        };

        Ok(Self::new(database_url)
            .pool_max_size(parse_var(&lookup, "JOBLY_POOL_MAX_SIZE", DEFAULT_POOL_MAX_SIZE)?)
            .hash_rounds(parse_var(&lookup, "JOBLY_HASH_ROUNDS", default_rounds)?))
    }

    /// Set the maximum pool size.
    pub fn pool_max_size(mut self, size: usize) -> Self {
        self.pool_max_size = size;
        self
    }

    /// Set the hashing work factor.
    pub fn hash_rounds(mut self, rounds: u32) -> Self {
        self.hash_rounds = rounds;
        self
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> JoblyResult<T> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| JoblyError::Config(format!("{key} is not a valid number: {raw}"))),
    }
}
