//! The dynamic [`Value`] type SQLite stores every cell as, plus the
//! `ToSql`/`FromSql` codec that converts between it and host primitives.

use std::convert::TryFrom;
use std::fmt;

use crate::error::Error;
use crate::Result;

/// SQLite's fundamental storage classes. Carried alongside type-mismatch
/// errors so callers can see what was actually stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Type {
    Null,
    Integer,
    Real,
    Text,
    Blob,
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Type::Null => "Null",
            Type::Integer => "Integer",
            Type::Real => "Real",
            Type::Text => "Text",
            Type::Blob => "Blob",
        })
    }
}

/// An owning dynamic SQLite value. Every column of every row decodes into
/// one of these before the primitive codec narrows it to a host type.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    pub fn data_type(&self) -> Type {
        match self {
            Value::Null => Type::Null,
            Value::Integer(_) => Type::Integer,
            Value::Real(_) => Type::Real,
            Value::Text(_) => Type::Text,
            Value::Blob(_) => Type::Blob,
        }
    }
}

/// A non-owning view of a dynamic SQLite value, usually backed by memory
/// SQLite itself owns (a live column during `step`).
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ValueRef<'a> {
    Null,
    Integer(i64),
    Real(f64),
    Text(&'a str),
    Blob(&'a [u8]),
}

impl<'a> ValueRef<'a> {
    pub fn data_type(&self) -> Type {
        match self {
            ValueRef::Null => Type::Null,
            ValueRef::Integer(_) => Type::Integer,
            ValueRef::Real(_) => Type::Real,
            ValueRef::Text(_) => Type::Text,
            ValueRef::Blob(_) => Type::Blob,
        }
    }
}

impl From<ValueRef<'_>> for Value {
    fn from(borrowed: ValueRef<'_>) -> Value {
        match borrowed {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(r) => Value::Real(r),
            ValueRef::Text(s) => Value::Text(s.to_string()),
            ValueRef::Blob(b) => Value::Blob(b.to_vec()),
        }
    }
}

impl<'a> From<&'a Value> for ValueRef<'a> {
    fn from(value: &'a Value) -> ValueRef<'a> {
        match value {
            Value::Null => ValueRef::Null,
            Value::Integer(i) => ValueRef::Integer(*i),
            Value::Real(r) => ValueRef::Real(*r),
            Value::Text(s) => ValueRef::Text(s),
            Value::Blob(b) => ValueRef::Blob(b),
        }
    }
}

impl From<bool> for Value {
    #[inline]
    fn from(b: bool) -> Value {
        Value::Integer(b as i64)
    }
}

macro_rules! from_i64(
    ($t:ty) => (
        impl From<$t> for Value {
            #[inline]
            fn from(i: $t) -> Value {
                Value::Integer(i64::from(i))
            }
        }
    )
);

from_i64!(i8);
from_i64!(i16);
from_i64!(i32);
from_i64!(u8);
from_i64!(u16);
from_i64!(u32);

impl From<i64> for Value {
    #[inline]
    fn from(i: i64) -> Value {
        Value::Integer(i)
    }
}

impl From<f32> for Value {
    #[inline]
    fn from(f: f32) -> Value {
        Value::Real(f.into())
    }
}

impl From<f64> for Value {
    #[inline]
    fn from(f: f64) -> Value {
        Value::Real(f)
    }
}

impl From<String> for Value {
    #[inline]
    fn from(s: String) -> Value {
        Value::Text(s)
    }
}

impl From<Vec<u8>> for Value {
    #[inline]
    fn from(v: Vec<u8>) -> Value {
        Value::Blob(v)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    #[inline]
    fn from(v: Option<T>) -> Value {
        match v {
            Some(x) => x.into(),
            None => Value::Null,
        }
    }
}

/// Types that can be bound as a query parameter (§4.4, §4.1 encoding
/// contract). Implementors produce an owned [`Value`]; the statement layer
/// chooses the SQLite bind call and destructor.
pub trait ToSql {
    fn to_sql(&self) -> Result<Value>;
}

impl ToSql for Value {
    #[inline]
    fn to_sql(&self) -> Result<Value> {
        Ok(self.clone())
    }
}

macro_rules! to_sql_self {
    ($t:ty) => {
        impl ToSql for $t {
            #[inline]
            fn to_sql(&self) -> Result<Value> {
                Ok(Value::from(*self))
            }
        }
    };
}

to_sql_self!(bool);
to_sql_self!(i8);
to_sql_self!(i16);
to_sql_self!(i32);
to_sql_self!(i64);
to_sql_self!(u8);
to_sql_self!(u16);
to_sql_self!(u32);
to_sql_self!(f32);
to_sql_self!(f64);

impl ToSql for str {
    #[inline]
    fn to_sql(&self) -> Result<Value> {
        Ok(Value::Text(self.to_owned()))
    }
}

impl ToSql for String {
    #[inline]
    fn to_sql(&self) -> Result<Value> {
        Ok(Value::Text(self.clone()))
    }
}

impl ToSql for [u8] {
    #[inline]
    fn to_sql(&self) -> Result<Value> {
        Ok(Value::Blob(self.to_vec()))
    }
}

impl ToSql for Vec<u8> {
    #[inline]
    fn to_sql(&self) -> Result<Value> {
        Ok(Value::Blob(self.clone()))
    }
}

impl<T: ToSql + ?Sized> ToSql for &T {
    #[inline]
    fn to_sql(&self) -> Result<Value> {
        (*self).to_sql()
    }
}

impl<T: ToSql> ToSql for Option<T> {
    #[inline]
    fn to_sql(&self) -> Result<Value> {
        match self {
            Some(t) => t.to_sql(),
            None => Ok(Value::Null),
        }
    }
}

/// Types that can be decoded from a [`ValueRef`] (§4.1 decoding contract).
pub trait FromSql: Sized {
    fn column_result(value: ValueRef<'_>) -> Result<Self>;
}

/// Mirrors the source's established (if surprising) boolean coercion:
/// `0 => true`, any other integer => `false`. Preserved verbatim rather
/// than "fixed" — see the design notes on this coercion.
impl FromSql for bool {
    fn column_result(value: ValueRef<'_>) -> Result<bool> {
        match value {
            ValueRef::Integer(0) => Ok(true),
            ValueRef::Integer(_) => Ok(false),
            _ => Err(wrong_type(value)),
        }
    }
}

macro_rules! integral_from_sql {
    ($t:ty) => {
        impl FromSql for $t {
            fn column_result(value: ValueRef<'_>) -> Result<$t> {
                match value {
                    ValueRef::Integer(i) => <$t>::try_from(i)
                        .map_err(|_| Error::IntegralValueOutOfRange(usize::MAX, i)),
                    ValueRef::Real(r) if r.fract() == 0.0 && r.is_finite() => {
                        let i = r as i64;
                        <$t>::try_from(i).map_err(|_| Error::IntegralValueOutOfRange(usize::MAX, i))
                    }
                    _ => Err(wrong_type(value)),
                }
            }
        }
    };
}

integral_from_sql!(i8);
integral_from_sql!(i16);
integral_from_sql!(i32);
integral_from_sql!(i64);
integral_from_sql!(u8);
integral_from_sql!(u16);
integral_from_sql!(u32);

impl FromSql for f64 {
    fn column_result(value: ValueRef<'_>) -> Result<f64> {
        match value {
            ValueRef::Real(r) => Ok(r),
            ValueRef::Integer(i) if (i as f64) as i64 == i => Ok(i as f64),
            ValueRef::Integer(_) => Err(wrong_type(value)),
            _ => Err(wrong_type(value)),
        }
    }
}

impl FromSql for f32 {
    fn column_result(value: ValueRef<'_>) -> Result<f32> {
        f64::column_result(value).map(|v| v as f32)
    }
}

impl FromSql for String {
    fn column_result(value: ValueRef<'_>) -> Result<String> {
        match value {
            ValueRef::Text(s) => Ok(s.to_owned()),
            _ => Err(wrong_type(value)),
        }
    }
}

impl FromSql for Vec<u8> {
    fn column_result(value: ValueRef<'_>) -> Result<Vec<u8>> {
        match value {
            ValueRef::Blob(b) => Ok(b.to_vec()),
            _ => Err(wrong_type(value)),
        }
    }
}

impl<T: FromSql> FromSql for Option<T> {
    fn column_result(value: ValueRef<'_>) -> Result<Option<T>> {
        match value {
            ValueRef::Null => Ok(None),
            _ => T::column_result(value).map(Some),
        }
    }
}

impl FromSql for Value {
    fn column_result(value: ValueRef<'_>) -> Result<Value> {
        Ok(Value::from(value))
    }
}

fn wrong_type(value: ValueRef<'_>) -> Error {
    Error::InvalidColumnType(usize::MAX, String::new(), value.data_type())
}

#[cfg(feature = "chrono")]
mod chrono_impls {
    use super::{wrong_type, FromSql, Result, ToSql, Value, ValueRef};
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};

    /// "YYYY-MM-DD HH:MM:SS.SSS+00:00" (RFC3339-ish, see §6 date/time grammar).
    impl<Tz: TimeZone> ToSql for DateTime<Tz> {
        fn to_sql(&self) -> Result<Value> {
            Ok(Value::Text(
                self.with_timezone(&Utc)
                    .to_rfc3339_opts(SecondsFormat::Millis, true),
            ))
        }
    }

    impl FromSql for DateTime<Utc> {
        fn column_result(value: ValueRef<'_>) -> Result<DateTime<Utc>> {
            match value {
                ValueRef::Text(s) => parse_datetime(s).ok_or_else(|| wrong_type(value)),
                ValueRef::Integer(secs) => Utc
                    .timestamp_opt(secs, 0)
                    .single()
                    .ok_or_else(|| wrong_type(value)),
                ValueRef::Real(secs) => {
                    let whole = secs.trunc() as i64;
                    let nanos = ((secs.fract()) * 1_000_000_000.0).round() as u32;
                    Utc.timestamp_opt(whole, nanos)
                        .single()
                        .ok_or_else(|| wrong_type(value))
                }
                _ => Err(wrong_type(value)),
            }
        }
    }

    /// Permissive ISO-8601-ish parse per §6: `T` or space separator,
    /// optional fractional seconds, optional `Z`/offset suffix (UTC assumed
    /// when absent).
    fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.with_timezone(&Utc));
        }
        let normalized = s.replacen(' ', "T", 1);
        for fmt in ["%Y-%m-%dT%H:%M:%S%.fZ", "%Y-%m-%dT%H:%M:%S%.f"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(&normalized, fmt) {
                return Some(Utc.from_utc_datetime(&naive));
            }
        }
        None
    }
}
