//! An ergonomic, type-safe SQLite binding library built directly on
//! `libsqlite3-sys`: interpolated bound queries, an owned row type with
//! tuple and structural decoding, and three connection models (a plain
//! single-thread connection, a mutex-serialized shared async connection,
//! and a bounded FIFO-fair pool).

pub(crate) use libsqlite3_sys as ffi;

mod connection;
mod de;
mod error;
mod inner_connection;
mod pool;
mod query;
mod raw_statement;
mod row;
mod shared;
mod statement;
mod transaction;
mod util;
mod value;

pub(crate) use util::errmsg_to_string;

pub use connection::Connection;
pub use de::from_row;
pub use error::{Error, Result};
pub use inner_connection::OpenMode;
pub use pool::{Pool, PooledConnection};
pub use query::BoundQuery;
pub use row::{ColumnNames, Row};
pub use shared::{SharedConnection, SharedStatement};
pub use statement::{RunStats, Statement};
pub use transaction::TransactionKind;
pub use value::{FromSql, ToSql, Type, Value, ValueRef};
