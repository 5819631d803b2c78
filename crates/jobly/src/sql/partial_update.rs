//! SET-clause generation for partial record updates.

use super::payload::UpdatePayload;
use crate::error::{JoblyError, JoblyResult};
use crate::ident;
use crate::types::SqlValue;

/// Field name → column name translations.
///
/// Fields without an entry are used verbatim as the column name; no case
/// conversion is applied.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnMap {
    entries: &'static [(&'static str, &'static str)],
}

impl ColumnMap {
    pub const fn new(entries: &'static [(&'static str, &'static str)]) -> Self {
        Self { entries }
    }

    /// A map with no entries (identity for every field).
    pub const fn empty() -> Self {
        Self { entries: &[] }
    }

    /// Column name for `field`.
    pub fn resolve<'a>(&self, field: &'a str) -> &'a str {
        self.entries
            .iter()
            .find(|(f, _)| *f == field)
            .map_or(field, |&(_, column)| column)
    }
}

/// Output of [`sql_for_partial_update`].
///
/// `assignments[i]` is `"column"=$<i+1>` and `values[i]` is the value for it.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialUpdate {
    pub assignments: Vec<String>,
    pub values: Vec<SqlValue>,
}

impl PartialUpdate {
    /// The SET list, e.g. `"name"=$1, "num_employees"=$2`.
    pub fn set_cols(&self) -> String {
        self.assignments.join(", ")
    }

    /// Placeholder index for the first parameter bound after the values.
    pub fn next_placeholder(&self) -> usize {
        self.values.len() + 1
    }
}

/// Build the assignments and positional values for an UPDATE.
///
/// ```ignore
/// let payload = UpdatePayload::new()
///     .set("name", "NewCo")
///     .set("numEmployees", 35);
/// let update = sql_for_partial_update(&payload, &ColumnMap::new(&[("numEmployees", "num_employees")]))?;
/// assert_eq!(update.set_cols(), r#""name"=$1, "num_employees"=$2"#);
/// ```
///
/// Fails with [`JoblyError::BadRequest`] when the payload is empty.
pub fn sql_for_partial_update(
    payload: &UpdatePayload,
    columns: &ColumnMap,
) -> JoblyResult<PartialUpdate> {
    if payload.is_empty() {
        return Err(JoblyError::bad_request("No data"));
    }

    let mut assignments = Vec::with_capacity(payload.len());
    let mut values = Vec::with_capacity(payload.len());
    for (idx, (field, value)) in payload.iter().enumerate() {
        let column = ident::quote(columns.resolve(field))?;
        assignments.push(format!("{}=${}", column, idx + 1));
        values.push(value.clone());
    }

    Ok(PartialUpdate {
        assignments,
        values,
    })
}
