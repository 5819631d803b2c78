//! Postgres value types used by the builders.

pub mod value;

pub use value::SqlValue;
