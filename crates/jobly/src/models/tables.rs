//! Per-entity column maps, filter tables and updatable fields.

use crate::error::{JoblyError, JoblyResult};
use crate::sql::{ColumnMap, FilterRule, FilterTable, UpdatePayload};

/// Static configuration a model is constructed with.
#[derive(Debug, Clone, Copy)]
pub struct EntityTables {
    /// Field → column translations for partial updates.
    pub columns: ColumnMap,
    /// Filters accepted by `find_some`.
    pub filters: FilterTable,
    /// Fields a partial update may touch.
    pub updatable: &'static [&'static str],
}

impl EntityTables {
    /// Reject payload keys outside [`EntityTables::updatable`].
    pub fn check_updatable(&self, payload: &UpdatePayload) -> JoblyResult<()> {
        match payload
            .keys()
            .find(|k| !self.updatable.iter().any(|field| field == k))
        {
            Some(field) => Err(JoblyError::bad_request(format!(
                "Field cannot be updated: {field}"
            ))),
            None => Ok(()),
        }
    }
}

pub const COMPANY_FILTERS: FilterTable = FilterTable::new(&[
    ("name", FilterRule::Contains("name")),
    ("minEmployees", FilterRule::AtLeast("num_employees")),
    ("maxEmployees", FilterRule::AtMost("num_employees")),
])
.with_ranges(&[("minEmployees", "maxEmployees")]);

pub const JOB_FILTERS: FilterTable = FilterTable::new(&[
    ("title", FilterRule::Contains("title")),
    ("minSalary", FilterRule::AtLeast("salary")),
    ("hasEquity", FilterRule::Positive("equity")),
]);

pub static COMPANY_TABLES: EntityTables = EntityTables {
    columns: ColumnMap::new(&[("numEmployees", "num_employees"), ("logoUrl", "logo_url")]),
    filters: COMPANY_FILTERS,
    updatable: &["name", "description", "numEmployees", "logoUrl"],
};

pub static JOB_TABLES: EntityTables = EntityTables {
    columns: ColumnMap::new(&[("companyHandle", "company_handle")]),
    filters: JOB_FILTERS,
    updatable: &["title", "salary", "equity"],
};

// Users are never searched.
pub static USER_TABLES: EntityTables = EntityTables {
    columns: ColumnMap::new(&[
        ("firstName", "first_name"),
        ("lastName", "last_name"),
        ("isAdmin", "is_admin"),
    ]),
    filters: FilterTable::empty(),
    updatable: &["firstName", "lastName", "password", "email", "isAdmin"],
};
