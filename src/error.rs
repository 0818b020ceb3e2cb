use crate::value::Type;
use crate::{errmsg_to_string, ffi};
use std::error;
use std::ffi::NulError;
use std::fmt;
use std::os::raw::c_int;
use std::str;

/// The error type returned by every fallible operation in this crate.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// An error from an underlying SQLite call, including from within
    /// `sqlite3_step` (e.g. `SQLITE_BUSY`, which this crate surfaces as an
    /// error rather than retrying).
    SqliteFailure(ffi::Error, Option<String>),

    /// SQLite was compiled or configured for single-threaded use only; this
    /// crate cannot guarantee the safety it promises in that mode.
    SqliteSingleThreadedMode,

    /// Opening the database failed for a reason other than an engine error
    /// (invalid path encoding, library init failure).
    CannotOpen(String),

    /// A query text produced no prepared statement (empty input or only a
    /// comment).
    EmptyQuery,

    /// A query was provided with the wrong number of bindings for its
    /// placeholder count. First field: expected, second: got.
    InvalidParameterCount(usize, usize),

    /// Column index is out of range for the statement.
    InvalidColumnIndex(usize),

    /// No column matches the requested name.
    InvalidColumnName(String),

    /// The value of a particular column could not be converted to the
    /// requested Rust type.
    InvalidColumnType(usize, String, Type),

    /// A row had a different number of columns than a tuple/structural
    /// decode expected. First field: expected, second: got.
    ColumnCountMismatch(usize, usize),

    /// `query_row`/`fetchOne` was called on a query that returned no rows.
    QueryReturnedNoRows,

    /// `execute` was called on a statement that returns rows.
    ExecuteReturnedResults,

    /// Error converting a string to UTF-8.
    Utf8Error(str::Utf8Error),

    /// Error converting a string to a C string because it contained an
    /// embedded NUL.
    NulError(NulError),

    /// Error converting a value during encode (`ToSql`) or decode
    /// (`FromSql`/ the structural row decoder).
    FromSqlConversionFailure(usize, Type, Box<dyn error::Error + Send + Sync + 'static>),
    ToSqlConversionFailure(Box<dyn error::Error + Send + Sync + 'static>),

    /// `sqlite3_column_int64` returned a value outside the requested
    /// integral type's range. First field: column index, second: the raw
    /// value.
    IntegralValueOutOfRange(usize, i64),

    /// The row decoder (`de::from_row`) was asked for a shape the row
    /// cannot provide (e.g. a scalar decode against a multi-column row, or
    /// an unkeyed container at row level).
    DecodeShape(String),

    /// [`crate::pool::Pool::open`]/`open_in_memory` was given a `max` of 0.
    InvalidPoolSize(usize),
}

impl PartialEq for Error {
    fn eq(&self, other: &Error) -> bool {
        match (self, other) {
            (Error::SqliteFailure(e1, s1), Error::SqliteFailure(e2, s2)) => e1 == e2 && s1 == s2,
            (Error::SqliteSingleThreadedMode, Error::SqliteSingleThreadedMode) => true,
            (Error::CannotOpen(a), Error::CannotOpen(b)) => a == b,
            (Error::EmptyQuery, Error::EmptyQuery) => true,
            (Error::InvalidParameterCount(a1, b1), Error::InvalidParameterCount(a2, b2)) => {
                a1 == a2 && b1 == b2
            }
            (Error::InvalidColumnIndex(a), Error::InvalidColumnIndex(b)) => a == b,
            (Error::InvalidColumnName(a), Error::InvalidColumnName(b)) => a == b,
            (Error::InvalidColumnType(i1, n1, t1), Error::InvalidColumnType(i2, n2, t2)) => {
                i1 == i2 && n1 == n2 && t1 == t2
            }
            (Error::ColumnCountMismatch(a1, b1), Error::ColumnCountMismatch(a2, b2)) => {
                a1 == a2 && b1 == b2
            }
            (Error::QueryReturnedNoRows, Error::QueryReturnedNoRows) => true,
            (Error::ExecuteReturnedResults, Error::ExecuteReturnedResults) => true,
            (Error::Utf8Error(a), Error::Utf8Error(b)) => a == b,
            (Error::NulError(a), Error::NulError(b)) => a == b,
            (Error::IntegralValueOutOfRange(i1, n1), Error::IntegralValueOutOfRange(i2, n2)) => {
                i1 == i2 && n1 == n2
            }
            (Error::DecodeShape(a), Error::DecodeShape(b)) => a == b,
            (Error::InvalidPoolSize(a), Error::InvalidPoolSize(b)) => a == b,
            (..) => false,
        }
    }
}

impl From<str::Utf8Error> for Error {
    fn from(err: str::Utf8Error) -> Error {
        Error::Utf8Error(err)
    }
}

impl From<NulError> for Error {
    fn from(err: NulError) -> Error {
        Error::NulError(err)
    }
}

/// Lets `serde`'s derived `Deserialize` impls raise this crate's own
/// `Error` directly from [`crate::de`], instead of going through a
/// stringly-typed intermediate that collapses every failure into one
/// variant. Missing-field failures (a struct field with no matching
/// column) map onto the same `InvalidColumnName` used by
/// [`crate::row::Row::get_by_name`]; anything else serde raises on its own
/// (an unknown enum variant, a visitor rejecting a shape) becomes
/// `DecodeShape`.
impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Error {
        Error::DecodeShape(msg.to_string())
    }

    fn missing_field(field: &'static str) -> Error {
        Error::InvalidColumnName(field.to_string())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Error::SqliteFailure(ref err, None) => err.fmt(f),
            Error::SqliteFailure(_, Some(ref s)) => write!(f, "{}", s),
            Error::SqliteSingleThreadedMode => write!(
                f,
                "SQLite was compiled or configured for single-threaded use only"
            ),
            Error::CannotOpen(ref msg) => write!(f, "cannot open database: {}", msg),
            Error::EmptyQuery => write!(f, "query text contained no statement"),
            Error::InvalidParameterCount(expected, got) => write!(
                f,
                "wrong number of bindings for query: got {}, expected {}",
                got, expected
            ),
            Error::InvalidColumnIndex(i) => write!(f, "invalid column index: {}", i),
            Error::InvalidColumnName(ref name) => write!(f, "invalid column name: {}", name),
            Error::InvalidColumnType(i, ref name, ref t) => write!(
                f,
                "invalid column type {} at index: {}, name: {}",
                t, i, name
            ),
            Error::ColumnCountMismatch(expected, got) => write!(
                f,
                "expected {} columns in row, got {}",
                expected, got
            ),
            Error::QueryReturnedNoRows => write!(f, "query returned no rows"),
            Error::ExecuteReturnedResults => {
                write!(f, "execute returned rows - did you mean to call a fetch method?")
            }
            Error::Utf8Error(ref err) => err.fmt(f),
            Error::NulError(ref err) => err.fmt(f),
            Error::FromSqlConversionFailure(i, ref t, ref err) => {
                write!(f, "conversion error from type {} at index: {}, {}", t, i, err)
            }
            Error::ToSqlConversionFailure(ref err) => err.fmt(f),
            Error::IntegralValueOutOfRange(col, val) => {
                write!(f, "integer {} out of range at index {}", val, col)
            }
            Error::DecodeShape(ref msg) => write!(f, "cannot decode row: {}", msg),
            Error::InvalidPoolSize(max) => write!(f, "pool max size must be greater than 0, got {}", max),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::SqliteFailure(ref err, _) => Some(err),
            Error::Utf8Error(ref err) => Some(err),
            Error::NulError(ref err) => Some(err),
            Error::FromSqlConversionFailure(_, _, ref err)
            | Error::ToSqlConversionFailure(ref err) => Some(&**err),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

pub fn error_from_sqlite_code(code: c_int, message: Option<String>) -> Error {
    Error::SqliteFailure(ffi::Error::new(code), message)
}

/// # Safety
///
/// `db` must be a live (or null) `sqlite3*`.
pub unsafe fn error_from_handle(db: *mut ffi::sqlite3, code: c_int) -> Error {
    let message = if db.is_null() {
        None
    } else {
        Some(errmsg_to_string(ffi::sqlite3_errmsg(db)))
    };
    error_from_sqlite_code(code, message)
}
