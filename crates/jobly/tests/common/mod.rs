//! Shared fixture for the database tests.
//!
//! Every test runs in its own transaction inside a private schema, seeded with
//! the same data, and is rolled back when the fixture drops. Tests skip when
//! `DATABASE_URL` is not set.

#![allow(dead_code)]

use jobly::models::{USER_TABLES, UserModel};
use jobly::password::{PasswordHasher, Sha256Hasher};
use jobly::schema::apply_schema;
use jobly::{GenericClient, JoblyError, JoblyResult, sql};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio_postgres::{Client, NoTls, Transaction};

static SCHEMA_SEQ: AtomicUsize = AtomicUsize::new(0);

/// Connect to `DATABASE_URL`, or `None` (after a note on stderr) when unset.
pub async fn connect(test: &str) -> JoblyResult<Option<Client>> {
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(v) => v,
        Err(_) => {
            eprintln!("DATABASE_URL is not set; skipping {test}");
            return Ok(None);
        }
    };

    let (client, connection) = tokio_postgres::connect(&database_url, NoTls)
        .await
        .map_err(JoblyError::from_db_error)?;
    tokio::spawn(async move {
        let _ = connection.await;
    });
    Ok(Some(client))
}

pub struct Fixture<'a> {
    pub tx: Transaction<'a>,
    /// Ids of jobs T1 (c1) and T2 (c2).
    pub job_ids: [i32; 2],
}

/// Fast hasher for fixtures and tests.
pub fn hasher() -> Sha256Hasher {
    Sha256Hasher::new(1)
}

pub fn user_model() -> UserModel {
    UserModel::new(&USER_TABLES, Arc::new(hasher()))
}

/// Open a transaction on a fresh schema and seed it.
///
/// - companies c1, c2, c3 with 1, 2, 3 employees
/// - users u1 (`password1`) and u2 (`password2`)
/// - jobs T1 (c1, 10000, 0.2) and T2 (c2, 20000, 0)
/// - u1 applied to both jobs
pub async fn seed(client: &mut Client) -> JoblyResult<Fixture<'_>> {
    let tx = client
        .transaction()
        .await
        .map_err(JoblyError::from_db_error)?;

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before UNIX_EPOCH")
        .as_nanos();
    let schema = format!(
        "jobly_test_{}_{}_{}",
        std::process::id(),
        nanos,
        SCHEMA_SEQ.fetch_add(1, Ordering::Relaxed)
    );
    GenericClient::batch_execute(
        &tx,
        &format!("CREATE SCHEMA {schema}; SET LOCAL search_path TO {schema}"),
    )
    .await?;
    apply_schema(&tx).await?;

    GenericClient::batch_execute(
        &tx,
        "INSERT INTO companies (handle, name, num_employees, description, logo_url)
         VALUES ('c1', 'C1', 1, 'Desc1', 'http://c1.img'),
                ('c2', 'C2', 2, 'Desc2', 'http://c2.img'),
                ('c3', 'C3', 3, 'Desc3', 'http://c3.img')",
    )
    .await?;

    let hasher = hasher();
    sql("INSERT INTO users (username, password, first_name, last_name, email)
         VALUES ('u1', $1, 'U1F', 'U1L', 'u1@email.com'),
                ('u2', $2, 'U2F', 'U2L', 'u2@email.com')")
    .bind(hasher.hash("password1")?)
    .bind(hasher.hash("password2")?)
    .execute(&tx)
    .await?;

    let rows = sql("INSERT INTO jobs (company_handle, title, salary, equity)
                    VALUES ('c1', 'T1', 10000, 0.2),
                           ('c2', 'T2', 20000, 0)
                    RETURNING id")
    .fetch_all(&tx)
    .await?;
    let job_ids = [rows[0].get::<_, i32>("id"), rows[1].get::<_, i32>("id")];

    sql("INSERT INTO applications (username, job_id) VALUES ('u1', $1), ('u1', $2)")
        .bind(job_ids[0])
        .bind(job_ids[1])
        .execute(&tx)
        .await?;

    Ok(Fixture { tx, job_ids })
}

/// Connect and seed, or return from the test when no database is configured.
macro_rules! fixture {
    ($client:ident, $fx:ident, $test:literal) => {
        let Some(mut $client) = common::connect($test).await? else {
            return Ok(());
        };
        let $fx = common::seed(&mut $client).await?;
    };
}
