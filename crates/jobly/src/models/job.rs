use super::company::Company;
use super::tables::{EntityTables, JOB_TABLES};
use super::update_statement;
use crate::client::GenericClient;
use crate::error::{JoblyError, JoblyResult};
use crate::row::{FromRow, RowExt};
use crate::sql::{FilterPayload, UpdatePayload, sql, sql_for_partial_update, sql_for_variable_where};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

pub(crate) const JOB_COLUMNS: &str =
    r#"id, title, salary, equity, company_handle AS "companyHandle""#;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    /// Fraction of the company, serialized as a decimal string.
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

impl FromRow for Job {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            title: row.try_get_column("title")?,
            salary: row.try_get_column("salary")?,
            equity: row.try_get_column("equity")?,
            company_handle: row.try_get_column("companyHandle")?,
        })
    }
}

/// A job with its owning company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDetail {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company: Company,
}

impl FromRow for JobDetail {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            title: row.try_get_column("title")?,
            salary: row.try_get_column("salary")?,
            equity: row.try_get_column("equity")?,
            company: Company::from_row(row)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    pub title: String,
    #[serde(default)]
    pub salary: Option<i32>,
    #[serde(default)]
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

/// Job record access.
#[derive(Debug, Clone, Copy)]
pub struct JobModel {
    tables: &'static EntityTables,
}

impl Default for JobModel {
    fn default() -> Self {
        Self::new(&JOB_TABLES)
    }
}

impl JobModel {
    pub const fn new(tables: &'static EntityTables) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &'static EntityTables {
        self.tables
    }

    /// Insert a job for an existing company and return it with its new id.
    pub async fn create(&self, conn: &impl GenericClient, new: &NewJob) -> JoblyResult<Job> {
        let unknown_company =
            || JoblyError::bad_request(format!("Company handle doesn't exist: {}", new.company_handle));

        let owner = sql("SELECT handle FROM companies WHERE handle = $1")
            .bind(new.company_handle.clone())
            .fetch_opt(conn)
            .await?;
        if owner.is_none() {
            return Err(unknown_company());
        }

        // The company can still vanish between the check and the insert.
        let job: Job = sql(format!(
            "INSERT INTO jobs (company_handle, title, salary, equity) \
             VALUES ($1, $2, $3, $4) RETURNING {JOB_COLUMNS}"
        ))
        .bind(new.company_handle.clone())
        .bind(new.title.clone())
        .bind(new.salary)
        .bind(new.equity)
        .tagged("job.create")
        .fetch_one_as(conn)
        .await
        .map_err(|e| match e {
            JoblyError::ForeignKeyViolation(_) => unknown_company(),
            other => other,
        })?;

        tracing::debug!(id = job.id, company = %job.company_handle, "job created");
        Ok(job)
    }

    /// All jobs, ordered by id.
    pub async fn find_all(&self, conn: &impl GenericClient) -> JoblyResult<Vec<Job>> {
        sql(format!("SELECT {JOB_COLUMNS} FROM jobs ORDER BY id"))
            .fetch_all_as(conn)
            .await
    }

    /// Jobs matching every filter, ordered by id.
    ///
    /// `hasEquity: true` keeps jobs with positive equity; `false` keeps all.
    pub async fn find_some(
        &self,
        conn: &impl GenericClient,
        filters: &FilterPayload,
    ) -> JoblyResult<Vec<Job>> {
        let mut q = sql(format!("SELECT {JOB_COLUMNS} FROM jobs"));
        q.push_where(sql_for_variable_where(Some(filters), &self.tables.filters)?);
        q.push(" ORDER BY id");
        q.tagged("job.find_some").fetch_all_as(conn).await
    }

    pub async fn get(&self, conn: &impl GenericClient, id: i32) -> JoblyResult<JobDetail> {
        sql(
            r#"SELECT j.id, j.title, j.salary, j.equity,
                      c.handle, c.name, c.description,
                      c.num_employees AS "numEmployees", c.logo_url AS "logoUrl"
               FROM jobs AS j
               JOIN companies AS c ON c.handle = j.company_handle
               WHERE j.id = $1"#,
        )
        .bind(id)
        .fetch_opt_as(conn)
        .await?
        .ok_or_else(|| JoblyError::not_found(format!("No job: {id}")))
    }

    /// Partially update a job.
    ///
    /// Accepted fields: `title`, `salary`, `equity`. The id and owning
    /// company never change.
    pub async fn update(
        &self,
        conn: &impl GenericClient,
        id: i32,
        payload: &UpdatePayload,
    ) -> JoblyResult<Job> {
        self.tables.check_updatable(payload)?;
        let update = sql_for_partial_update(payload, &self.tables.columns)?;

        let job: Job = update_statement("jobs", "id", id, update, JOB_COLUMNS)
            .tagged("job.update")
            .fetch_opt_as(conn)
            .await?
            .ok_or_else(|| JoblyError::not_found(format!("No job: {id}")))?;

        tracing::debug!(id, fields = payload.len(), "job updated");
        Ok(job)
    }

    pub async fn remove(&self, conn: &impl GenericClient, id: i32) -> JoblyResult<()> {
        sql("DELETE FROM jobs WHERE id = $1 RETURNING id")
            .bind(id)
            .fetch_opt(conn)
            .await?
            .ok_or_else(|| JoblyError::not_found(format!("No job: {id}")))?;

        tracing::debug!(id, "job removed");
        Ok(())
    }
}
