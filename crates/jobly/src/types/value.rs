//! Dynamically typed scalar bound into update and filter statements.
//!
//! Payload values arrive untyped (JSON bodies, query strings), while the
//! server decides the parameter type from the column it is compared with or
//! assigned to. `SqlValue` therefore defers the encoding until `to_sql`
//! receives the target [`Type`] and converts accordingly:
//!
//! | value     | accepted column types                                   |
//! |-----------|---------------------------------------------------------|
//! | `Null`    | any                                                     |
//! | `Bool`    | `bool`                                                  |
//! | `Int`     | `int2`, `int4`, `int8`, `numeric`, `float4/8`, text     |
//! | `Float`   | `float4/8`, `numeric`, integers (when integral)         |
//! | `Decimal` | `numeric`, `float4/8`, text                             |
//! | `Text`    | text types, or parsed into integer/numeric/float/bool   |
//!
//! Any other combination fails the bind with a descriptive error, which the
//! driver surfaces as a query error.

use crate::error::{JoblyError, JoblyResult};
use bytes::BytesMut;
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use std::error::Error;
use std::fmt;
use std::str::FromStr;
use tokio_postgres::types::{IsNull, ToSql, Type};

type BoxError = Box<dyn Error + Sync + Send>;

/// A scalar (or NULL) value with late-bound Postgres encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Decimal(Decimal),
    Text(String),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Text content, if this is a `Text` value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            SqlValue::Text(s) => Some(s),
            _ => None,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            SqlValue::Null => "null",
            SqlValue::Bool(_) => "bool",
            SqlValue::Int(_) => "integer",
            SqlValue::Float(_) => "float",
            SqlValue::Decimal(_) => "decimal",
            SqlValue::Text(_) => "text",
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => f.write_str("NULL"),
            SqlValue::Bool(v) => write!(f, "{v}"),
            SqlValue::Int(v) => write!(f, "{v}"),
            SqlValue::Float(v) => write!(f, "{v}"),
            SqlValue::Decimal(v) => write!(f, "{v}"),
            SqlValue::Text(v) => f.write_str(v),
        }
    }
}

fn is_text_type(ty: &Type) -> bool {
    matches!(
        *ty,
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN
    )
}

fn mismatch(value: &SqlValue, ty: &Type) -> BoxError {
    format!("cannot bind {} value to column of type {}", value.kind(), ty).into()
}

fn encode_int(v: i64, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    match *ty {
        Type::INT2 => i16::try_from(v)?.to_sql(ty, out),
        Type::INT4 => i32::try_from(v)?.to_sql(ty, out),
        Type::INT8 => v.to_sql(ty, out),
        Type::NUMERIC => Decimal::from(v).to_sql(ty, out),
        Type::FLOAT4 => (v as f32).to_sql(ty, out),
        Type::FLOAT8 => (v as f64).to_sql(ty, out),
        _ if is_text_type(ty) => v.to_string().to_sql(ty, out),
        _ => Err(mismatch(&SqlValue::Int(v), ty)),
    }
}

fn encode_float(v: f64, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    match *ty {
        Type::FLOAT4 => (v as f32).to_sql(ty, out),
        Type::FLOAT8 => v.to_sql(ty, out),
        Type::NUMERIC => Decimal::from_f64(v)
            .ok_or_else(|| format!("{v} is not representable as numeric"))?
            .to_sql(ty, out),
        Type::INT2 | Type::INT4 | Type::INT8 if v.fract() == 0.0 => encode_int(
            v.to_i64()
                .ok_or_else(|| format!("{v} is out of integer range"))?,
            ty,
            out,
        ),
        _ if is_text_type(ty) => v.to_string().to_sql(ty, out),
        _ => Err(mismatch(&SqlValue::Float(v), ty)),
    }
}

fn encode_decimal(v: Decimal, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    match *ty {
        Type::NUMERIC => v.to_sql(ty, out),
        Type::FLOAT4 | Type::FLOAT8 => encode_float(
            v.to_f64()
                .ok_or_else(|| format!("{v} is not representable as float"))?,
            ty,
            out,
        ),
        _ if is_text_type(ty) => v.to_string().to_sql(ty, out),
        _ => Err(mismatch(&SqlValue::Decimal(v), ty)),
    }
}

fn encode_text(v: &str, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    match *ty {
        Type::INT2 | Type::INT4 | Type::INT8 => encode_int(v.trim().parse::<i64>()?, ty, out),
        Type::NUMERIC => Decimal::from_str(v.trim())?.to_sql(ty, out),
        Type::FLOAT4 | Type::FLOAT8 => encode_float(v.trim().parse::<f64>()?, ty, out),
        Type::BOOL => v.trim().parse::<bool>()?.to_sql(ty, out),
        _ if is_text_type(ty) => v.to_sql(ty, out),
        _ => Err(mismatch(&SqlValue::Text(v.to_string()), ty)),
    }
}

impl ToSql for SqlValue {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        match self {
            SqlValue::Null => Ok(IsNull::Yes),
            SqlValue::Bool(v) => match *ty {
                Type::BOOL => v.to_sql(ty, out),
                _ => Err(mismatch(self, ty)),
            },
            SqlValue::Int(v) => encode_int(*v, ty, out),
            SqlValue::Float(v) => encode_float(*v, ty, out),
            SqlValue::Decimal(v) => encode_decimal(*v, ty, out),
            SqlValue::Text(v) => encode_text(v, ty, out),
        }
    }

    // Conversion is decided per value in `to_sql`.
    fn accepts(_ty: &Type) -> bool {
        true
    }

    tokio_postgres::types::to_sql_checked!();
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Int(v.into())
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Int(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Float(v)
    }
}

impl From<Decimal> for SqlValue {
    fn from(v: Decimal) -> Self {
        SqlValue::Decimal(v)
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(SqlValue::Null, Into::into)
    }
}

impl SqlValue {
    /// Convert a JSON scalar. Arrays and objects are rejected.
    pub fn from_json(value: serde_json::Value) -> JoblyResult<Self> {
        use serde_json::Value;

        match value {
            Value::Null => Ok(SqlValue::Null),
            Value::Bool(b) => Ok(SqlValue::Bool(b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(SqlValue::Int(i)),
                None => n
                    .as_f64()
                    .map(SqlValue::Float)
                    .ok_or_else(|| JoblyError::bad_request(format!("Unsupported number: {n}"))),
            },
            Value::String(s) => Ok(SqlValue::Text(s)),
            other => Err(JoblyError::bad_request(format!(
                "Expected a scalar value, got {other}"
            ))),
        }
    }
}
