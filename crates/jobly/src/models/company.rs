use super::job::{JOB_COLUMNS, Job};
use super::tables::{COMPANY_TABLES, EntityTables};
use super::{duplicate_on_unique, update_statement};
use crate::client::GenericClient;
use crate::error::{JoblyError, JoblyResult};
use crate::row::{FromRow, RowExt};
use crate::sql::{FilterPayload, UpdatePayload, sql, sql_for_partial_update, sql_for_variable_where};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

pub(crate) const COMPANY_COLUMNS: &str =
    r#"handle, name, description, num_employees AS "numEmployees", logo_url AS "logoUrl""#;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

impl FromRow for Company {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            handle: row.try_get_column("handle")?,
            name: row.try_get_column("name")?,
            description: row.try_get_column("description")?,
            num_employees: row.try_get_column("numEmployees")?,
            logo_url: row.try_get_column("logoUrl")?,
        })
    }
}

/// A company together with its jobs (ordered by id, possibly empty).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyDetail {
    #[serde(flatten)]
    pub company: Company,
    pub jobs: Vec<Job>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCompany {
    pub handle: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub num_employees: Option<i32>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

/// Company record access.
#[derive(Debug, Clone, Copy)]
pub struct CompanyModel {
    tables: &'static EntityTables,
}

impl Default for CompanyModel {
    fn default() -> Self {
        Self::new(&COMPANY_TABLES)
    }
}

impl CompanyModel {
    pub const fn new(tables: &'static EntityTables) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &'static EntityTables {
        self.tables
    }

    /// Insert a company.
    ///
    /// Fails with `Duplicate` when the handle is taken, or when the insert
    /// itself hits a uniqueness constraint.
    pub async fn create(&self, conn: &impl GenericClient, new: &NewCompany) -> JoblyResult<Company> {
        let existing = sql("SELECT handle FROM companies WHERE handle = $1")
            .bind(new.handle.clone())
            .fetch_opt(conn)
            .await?;
        if existing.is_some() {
            return Err(JoblyError::duplicate(format!(
                "Duplicate company: {}",
                new.handle
            )));
        }

        let company: Company = sql(format!(
            "INSERT INTO companies (handle, name, description, num_employees, logo_url) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {COMPANY_COLUMNS}"
        ))
        .bind(new.handle.clone())
        .bind(new.name.clone())
        .bind(new.description.clone())
        .bind(new.num_employees)
        .bind(new.logo_url.clone())
        .tagged("company.create")
        .fetch_one_as(conn)
        .await
        .map_err(|e| duplicate_on_unique(e, || format!("Duplicate company: {}", new.handle)))?;

        tracing::debug!(handle = %company.handle, "company created");
        Ok(company)
    }

    /// All companies, ordered by name.
    pub async fn find_all(&self, conn: &impl GenericClient) -> JoblyResult<Vec<Company>> {
        sql(format!("SELECT {COMPANY_COLUMNS} FROM companies ORDER BY name"))
            .fetch_all_as(conn)
            .await
    }

    /// Companies matching every filter, ordered by name.
    pub async fn find_some(
        &self,
        conn: &impl GenericClient,
        filters: &FilterPayload,
    ) -> JoblyResult<Vec<Company>> {
        let mut q = sql(format!("SELECT {COMPANY_COLUMNS} FROM companies"));
        q.push_where(sql_for_variable_where(Some(filters), &self.tables.filters)?);
        q.push(" ORDER BY name");
        q.tagged("company.find_some").fetch_all_as(conn).await
    }

    pub async fn get(&self, conn: &impl GenericClient, handle: &str) -> JoblyResult<CompanyDetail> {
        let company: Company = sql(format!(
            "SELECT {COMPANY_COLUMNS} FROM companies WHERE handle = $1"
        ))
        .bind(handle.to_string())
        .fetch_opt_as(conn)
        .await?
        .ok_or_else(|| JoblyError::not_found(format!("No company: {handle}")))?;

        let jobs: Vec<Job> = sql(format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE company_handle = $1 ORDER BY id"
        ))
        .bind(handle.to_string())
        .fetch_all_as(conn)
        .await?;

        Ok(CompanyDetail { company, jobs })
    }

    /// Partially update a company.
    ///
    /// Accepted fields: `name`, `description`, `numEmployees`, `logoUrl`.
    pub async fn update(
        &self,
        conn: &impl GenericClient,
        handle: &str,
        payload: &UpdatePayload,
    ) -> JoblyResult<Company> {
        self.tables.check_updatable(payload)?;
        let update = sql_for_partial_update(payload, &self.tables.columns)?;

        let company: Company = update_statement(
            "companies",
            "handle",
            handle.to_string(),
            update,
            COMPANY_COLUMNS,
        )
        .tagged("company.update")
        .fetch_opt_as(conn)
        .await
        .map_err(|e| duplicate_on_unique(e, || format!("Duplicate company: {handle}")))?
        .ok_or_else(|| JoblyError::not_found(format!("No company: {handle}")))?;

        tracing::debug!(handle, fields = payload.len(), "company updated");
        Ok(company)
    }

    /// Delete a company (its jobs cascade).
    pub async fn remove(&self, conn: &impl GenericClient, handle: &str) -> JoblyResult<()> {
        sql("DELETE FROM companies WHERE handle = $1 RETURNING handle")
            .bind(handle.to_string())
            .fetch_opt(conn)
            .await?
            .ok_or_else(|| JoblyError::not_found(format!("No company: {handle}")))?;

        tracing::debug!(handle, "company removed");
        Ok(())
    }
}
