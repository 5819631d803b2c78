use super::tables::{EntityTables, USER_TABLES};
use super::{duplicate_on_unique, update_statement};
use crate::client::GenericClient;
use crate::config::JoblyConfig;
use crate::error::{JoblyError, JoblyResult};
use crate::password::{PasswordHasher, Sha256Hasher};
use crate::row::{FromRow, RowExt};
use crate::sql::{Sql, UpdatePayload, sql, sql_for_partial_update};
use crate::types::SqlValue;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio_postgres::Row;

const USER_COLUMNS: &str = r#"username, first_name AS "firstName", last_name AS "lastName", email, is_admin AS "isAdmin""#;

/// Users with the ids of the jobs they applied to; an empty array when none.
const USER_DETAIL_SELECT: &str = r#"SELECT u.username,
       u.first_name AS "firstName",
       u.last_name AS "lastName",
       u.email,
       u.is_admin AS "isAdmin",
       COALESCE(array_agg(a.job_id ORDER BY a.job_id) FILTER (WHERE a.job_id IS NOT NULL), '{}') AS jobs
FROM users AS u
LEFT JOIN applications AS a ON a.username = u.username"#;

const INVALID_CREDENTIALS: &str = "Invalid username/password";

/// A user as returned by writes and authentication. Never carries the
/// password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_admin: bool,
}

impl FromRow for User {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            username: row.try_get_column("username")?,
            first_name: row.try_get_column("firstName")?,
            last_name: row.try_get_column("lastName")?,
            email: row.try_get_column("email")?,
            is_admin: row.try_get_column("isAdmin")?,
        })
    }
}

/// A user with applied job ids, ascending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: User,
    pub jobs: Vec<i32>,
}

impl FromRow for UserDetail {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            user: User::from_row(row)?,
            jobs: row.try_get_column("jobs")?,
        })
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("is_admin", &self.is_admin)
            .finish()
    }
}

/// A user's application to a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub username: String,
    pub job_id: i32,
}

impl FromRow for Application {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            username: row.try_get_column("username")?,
            job_id: row.try_get_column("job_id")?,
        })
    }
}

/// User and application record access.
///
/// Passwords go through the injected [`PasswordHasher`] on registration and
/// update; the stored hash is never returned.
#[derive(Clone)]
pub struct UserModel {
    tables: &'static EntityTables,
    hasher: Arc<dyn PasswordHasher>,
    /// Verified against when the username is unknown.
    dummy_hash: Arc<str>,
}

impl fmt::Debug for UserModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserModel")
            .field("tables", &self.tables)
            .finish_non_exhaustive()
    }
}

impl Default for UserModel {
    fn default() -> Self {
        Self::new(&USER_TABLES, Arc::new(Sha256Hasher::default()))
    }
}

impl UserModel {
    pub fn new(tables: &'static EntityTables, hasher: Arc<dyn PasswordHasher>) -> Self {
        let dummy_hash = hasher.hash("jobly-unknown-user").unwrap_or_default().into();
        Self {
            tables,
            hasher,
            dummy_hash,
        }
    }

    /// Default tables with a [`Sha256Hasher`] using `config.hash_rounds`.
    pub fn from_config(config: &JoblyConfig) -> Self {
        Self::new(
            &USER_TABLES,
            Arc::new(Sha256Hasher::new(config.hash_rounds)),
        )
    }

    pub fn tables(&self) -> &'static EntityTables {
        self.tables
    }

    /// Check credentials.
    ///
    /// A missing user and a wrong password fail identically.
    pub async fn authenticate(
        &self,
        conn: &impl GenericClient,
        username: &str,
        password: &str,
    ) -> JoblyResult<User> {
        let row = sql(format!(
            "SELECT password, {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username.to_string())
        .tagged("user.authenticate")
        .fetch_opt(conn)
        .await?;

        let stored: Option<String> = row
            .as_ref()
            .map(|row| row.try_get_column("password"))
            .transpose()?;
        if self.credentials_match(stored.as_deref(), password)
            && let Some(row) = row
        {
            return User::from_row(&row);
        }
        Err(JoblyError::unauthorized(INVALID_CREDENTIALS))
    }

    /// Runs exactly one verification whether or not the user exists, so an
    /// unknown username costs the same as a wrong password.
    fn credentials_match(&self, stored: Option<&str>, password: &str) -> bool {
        let matched = self
            .hasher
            .verify(password, stored.unwrap_or(&*self.dummy_hash));
        matched && stored.is_some()
    }

    /// Create a user; `isAdmin` defaults to false.
    pub async fn register(&self, conn: &impl GenericClient, new: &NewUser) -> JoblyResult<User> {
        let existing = sql("SELECT username FROM users WHERE username = $1")
            .bind(new.username.clone())
            .fetch_opt(conn)
            .await?;
        if existing.is_some() {
            return Err(JoblyError::duplicate(format!(
                "Duplicate username: {}",
                new.username
            )));
        }

        let hashed = self.hasher.hash(&new.password)?;
        let user: User = sql(format!(
            "INSERT INTO users (username, password, first_name, last_name, email, is_admin) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {USER_COLUMNS}"
        ))
        .bind(new.username.clone())
        .bind(hashed)
        .bind(new.first_name.clone())
        .bind(new.last_name.clone())
        .bind(new.email.clone())
        .bind(new.is_admin)
        .tagged("user.register")
        .fetch_one_as(conn)
        .await
        .map_err(|e| duplicate_on_unique(e, || format!("Duplicate username: {}", new.username)))?;

        tracing::debug!(username = %user.username, is_admin = user.is_admin, "user registered");
        Ok(user)
    }

    /// All users with their applications, ordered by username.
    pub async fn find_all(&self, conn: &impl GenericClient) -> JoblyResult<Vec<UserDetail>> {
        let mut q = sql(USER_DETAIL_SELECT);
        q.push(" GROUP BY u.username ORDER BY u.username");
        q.fetch_all_as(conn).await
    }

    pub async fn get(&self, conn: &impl GenericClient, username: &str) -> JoblyResult<UserDetail> {
        let mut q = sql(USER_DETAIL_SELECT);
        let mut by_name = Sql::new("u.username = ");
        by_name.push_bind(username.to_string());
        q.push_where(by_name);
        q.push(" GROUP BY u.username");

        q.fetch_opt_as(conn)
            .await?
            .ok_or_else(|| JoblyError::not_found(format!("No user: {username}")))
    }

    /// Partially update a user.
    ///
    /// Accepted fields: `firstName`, `lastName`, `password`, `email`,
    /// `isAdmin`. A new password is hashed before it is stored.
    pub async fn update(
        &self,
        conn: &impl GenericClient,
        username: &str,
        payload: &UpdatePayload,
    ) -> JoblyResult<User> {
        self.tables.check_updatable(payload)?;

        let mut payload = payload.clone();
        if let Some(password) = payload.get_mut("password") {
            let SqlValue::Text(plain) = &*password else {
                return Err(JoblyError::bad_request("password must be a string"));
            };
            *password = SqlValue::Text(self.hasher.hash(plain)?);
        }

        let update = sql_for_partial_update(&payload, &self.tables.columns)?;
        let user: User = update_statement(
            "users",
            "username",
            username.to_string(),
            update,
            USER_COLUMNS,
        )
        .tagged("user.update")
        .fetch_opt_as(conn)
        .await?
        .ok_or_else(|| JoblyError::not_found(format!("No user: {username}")))?;

        tracing::debug!(username, fields = payload.len(), "user updated");
        Ok(user)
    }

    pub async fn remove(&self, conn: &impl GenericClient, username: &str) -> JoblyResult<()> {
        sql("DELETE FROM users WHERE username = $1 RETURNING username")
            .bind(username.to_string())
            .fetch_opt(conn)
            .await?
            .ok_or_else(|| JoblyError::not_found(format!("No user: {username}")))?;

        tracing::debug!(username, "user removed");
        Ok(())
    }

    /// Record that `username` applied to job `job_id`.
    ///
    /// The user and the job are checked separately so the error names the
    /// missing one. Applying twice fails with `Duplicate`.
    pub async fn create_job_application(
        &self,
        conn: &impl GenericClient,
        username: &str,
        job_id: i32,
    ) -> JoblyResult<Application> {
        sql("SELECT username FROM users WHERE username = $1")
            .bind(username.to_string())
            .fetch_opt(conn)
            .await?
            .ok_or_else(|| JoblyError::not_found(format!("User {username} does not exist.")))?;

        sql("SELECT id FROM jobs WHERE id = $1")
            .bind(job_id)
            .fetch_opt(conn)
            .await?
            .ok_or_else(|| JoblyError::not_found(format!("Job with ID {job_id} does not exist.")))?;

        let application: Application = sql(
            "INSERT INTO applications (username, job_id) VALUES ($1, $2) RETURNING username, job_id",
        )
        .bind(username.to_string())
        .bind(job_id)
        .tagged("user.apply")
        .fetch_one_as(conn)
        .await
        .map_err(|e| {
            duplicate_on_unique(e, || {
                format!("User {username} already has application for job {job_id}.")
            })
        })?;

        tracing::debug!(username, job_id, "application created");
        Ok(application)
    }
}
