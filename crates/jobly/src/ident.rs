//! SQL identifier quoting.
//!
//! Column names cannot be bound as parameters, so the builders wrap them in
//! double quotes instead. Quoting keeps case-sensitive and reserved-word
//! column names intact:
//!
//! - any character except NUL is allowed
//! - an embedded `"` is escaped as `""`
//!
//! # Example
//! ```ignore
//! use jobly::ident;
//!
//! assert_eq!(ident::quote("num_employees")?, r#""num_employees""#);
//! # Ok::<(), jobly::JoblyError>(())
//! ```

use crate::error::{JoblyError, JoblyResult};

/// Quote a single identifier (column or table name).
pub fn quote(name: &str) -> JoblyResult<String> {
    if name.is_empty() {
        return Err(JoblyError::bad_request("Empty quoted identifier"));
    }
    if name.contains('\0') {
        return Err(JoblyError::bad_request(
            "Identifier cannot contain NUL character",
        ));
    }

    let mut out = String::with_capacity(name.len() + 2);
    out.push('"');
    for c in name.chars() {
        if c == '"' {
            out.push('"');
        }
        out.push(c);
    }
    out.push('"');
    Ok(out)
}
