//! WHERE-fragment generation from search filters.
//!
//! Each entity declares a [`FilterTable`] mapping the filter names it accepts
//! to a [`FilterRule`]. The builder is generic over the table, so a new entity
//! only needs a new table. Filter values are always bound as parameters.

use super::builder::Sql;
use super::payload::{FilterPayload, FilterValue};
use crate::error::{JoblyError, JoblyResult};
use crate::ident;
use crate::types::SqlValue;

/// How one filter turns into a condition over a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterRule {
    /// `"col" ILIKE '%value%'` (case-insensitive substring).
    Contains(&'static str),
    /// `"col" >= value` (INTEGER column).
    AtLeast(&'static str),
    /// `"col" <= value` (INTEGER column).
    AtMost(&'static str),
    /// `"col" > 0` when the value is true; no condition when false.
    Positive(&'static str),
}

impl FilterRule {
    pub fn column(&self) -> &'static str {
        match *self {
            FilterRule::Contains(c)
            | FilterRule::AtLeast(c)
            | FilterRule::AtMost(c)
            | FilterRule::Positive(c) => c,
        }
    }

    /// Build the condition for `value`, or `None` when it restricts nothing.
    pub fn condition(&self, name: &str, value: &FilterValue) -> JoblyResult<Option<Sql>> {
        let column = ident::quote(self.column())?;
        let condition = match self {
            FilterRule::Contains(_) => {
                let mut q = Sql::new(format!("{column} ILIKE "));
                q.push_bind(SqlValue::Text(format!("%{}%", escape_like(&text_value(value)))));
                Some(q)
            }
            FilterRule::AtLeast(_) => {
                let mut q = Sql::new(format!("{column} >= "));
                q.push_bind(SqlValue::Int(integer_value(name, value)?.into()));
                Some(q)
            }
            FilterRule::AtMost(_) => {
                let mut q = Sql::new(format!("{column} <= "));
                q.push_bind(SqlValue::Int(integer_value(name, value)?.into()));
                Some(q)
            }
            FilterRule::Positive(_) => {
                bool_value(name, value)?.then(|| Sql::new(format!("{column} > 0")))
            }
        };
        Ok(condition)
    }
}

/// The filters an entity recognizes.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterTable {
    rules: &'static [(&'static str, FilterRule)],
    /// (min filter, max filter) pairs that must satisfy min <= max.
    ranges: &'static [(&'static str, &'static str)],
}

impl FilterTable {
    pub const fn new(rules: &'static [(&'static str, FilterRule)]) -> Self {
        Self { rules, ranges: &[] }
    }

    /// A table that recognizes nothing; every filter is unsupported.
    pub const fn empty() -> Self {
        Self::new(&[])
    }

    pub const fn with_ranges(mut self, ranges: &'static [(&'static str, &'static str)]) -> Self {
        self.ranges = ranges;
        self
    }

    pub fn rule(&self, name: &str) -> Option<FilterRule> {
        self.rules
            .iter()
            .find(|(n, _)| *n == name)
            .map(|&(_, rule)| rule)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        self.rules.iter().map(|&(n, _)| n)
    }

    fn check_ranges(&self, filters: &FilterPayload) -> JoblyResult<()> {
        for &(min, max) in self.ranges {
            if let (Some(lo), Some(hi)) = (filters.get(min), filters.get(max))
                && integer_value(min, lo)? > integer_value(max, hi)?
            {
                return Err(JoblyError::bad_request(format!(
                    "'{min}' must be less than or equal to '{max}'"
                )));
            }
        }
        Ok(())
    }
}

/// Build a WHERE fragment (without the `WHERE` keyword) from `filters`.
///
/// - `None` or an empty payload yields an empty fragment.
/// - Any name missing from `table` fails the whole call with
///   `BadRequest("Unsupported filter: …")` before a condition is built.
/// - Conditions follow input order, joined by `" AND "`.
///
/// ```ignore
/// let filters = FilterPayload::new().with("name", "NewCo").with("minEmployees", 10);
/// let fragment = sql_for_variable_where(Some(&filters), &COMPANY_FILTERS)?;
/// assert_eq!(fragment.to_sql(), r#""name" ILIKE $1 AND "num_employees" >= $2"#);
/// ```
pub fn sql_for_variable_where(
    filters: Option<&FilterPayload>,
    table: &FilterTable,
) -> JoblyResult<Sql> {
    let Some(filters) = filters.filter(|f| !f.is_empty()) else {
        return Ok(Sql::empty());
    };

    let mut rules = Vec::with_capacity(filters.len());
    for (name, value) in filters.iter() {
        let rule = table
            .rule(name)
            .ok_or_else(|| JoblyError::bad_request(format!("Unsupported filter: {name}")))?;
        rules.push((name, rule, value));
    }
    table.check_ranges(filters)?;

    let mut fragment = Sql::empty();
    let mut first = true;
    for (name, rule, value) in rules {
        if let Some(condition) = rule.condition(name, value)? {
            if !first {
                fragment.push(" AND ");
            }
            fragment.push_sql(condition);
            first = false;
        }
    }
    Ok(fragment)
}

fn text_value(value: &FilterValue) -> String {
    match value {
        FilterValue::Text(s) => s.clone(),
        FilterValue::Int(i) => i.to_string(),
        FilterValue::Float(f) => f.to_string(),
        FilterValue::Bool(b) => b.to_string(),
    }
}

/// Parse an integer filter; values outside the INTEGER range are rejected
/// here rather than failing in the driver.
fn integer_value(name: &str, value: &FilterValue) -> JoblyResult<i32> {
    let invalid = || JoblyError::bad_request(format!("Invalid value for filter '{name}'"));
    let wide: i64 = match value {
        FilterValue::Int(i) => *i,
        FilterValue::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => *f as i64,
        FilterValue::Text(s) => s.trim().parse().map_err(|_| invalid())?,
        _ => return Err(invalid()),
    };
    i32::try_from(wide).map_err(|_| invalid())
}

fn bool_value(name: &str, value: &FilterValue) -> JoblyResult<bool> {
    match value {
        FilterValue::Bool(b) => Ok(*b),
        FilterValue::Text(s) if s.eq_ignore_ascii_case("true") => Ok(true),
        FilterValue::Text(s) if s.eq_ignore_ascii_case("false") => Ok(false),
        _ => Err(JoblyError::bad_request(format!(
            "Invalid value for filter '{name}'"
        ))),
    }
}

/// Escape LIKE wildcards so the value matches literally.
fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
