//! Single-thread Connection (§4.7.1, C9): the primary way to talk to one
//! database file from one thread. Not `Sync`; sharing across threads goes
//! through [`crate::shared::SharedConnection`] or [`crate::pool::Pool`]
//! instead.

use std::convert::TryFrom;
use std::path::Path;

use crate::error::Error;
use crate::inner_connection::{InnerConnection, OpenMode};
use crate::query::BoundQuery;
use crate::row::Row;
use crate::statement::{RunStats, Statement};
use crate::transaction::{transaction, TransactionKind};
use crate::Result;

/// A connection to one SQLite database, usable from a single thread at a
/// time (§4.7.1).
pub struct Connection {
    inner: InnerConnection,
}

impl Connection {
    pub fn open(path: impl AsRef<Path>) -> Result<Connection> {
        let path = path.as_ref().to_string_lossy().into_owned();
        Ok(Connection {
            inner: InnerConnection::open(&path, OpenMode::ReadWrite { create: true })?,
        })
    }

    pub fn open_read_only(path: impl AsRef<Path>) -> Result<Connection> {
        let path = path.as_ref().to_string_lossy().into_owned();
        Ok(Connection {
            inner: InnerConnection::open(&path, OpenMode::ReadOnly)?,
        })
    }

    pub fn open_in_memory() -> Result<Connection> {
        Connection::open(":memory:")
    }

    pub(crate) fn inner(&self) -> &InnerConnection {
        &self.inner
    }

    fn prepare(&self, query: &BoundQuery) -> Result<Statement<'_>> {
        Statement::prepare(&self.inner, query)
    }

    /// Runs a bound query expected not to return rows (§4.5 `run`).
    pub fn execute(&self, query: &BoundQuery) -> Result<RunStats> {
        self.prepare(query)?.run()
    }

    /// Runs `query` and returns every row.
    pub fn fetch_all(&self, query: &BoundQuery) -> Result<Vec<Row>> {
        self.prepare(query)?.fetch_all()
    }

    /// Runs `query` expecting exactly one row; errors on zero rows.
    pub fn fetch_one(&self, query: &BoundQuery) -> Result<Row> {
        self.prepare(query)?.fetch_one()
    }

    /// Runs `query` and returns its first row, if any.
    pub fn fetch_optional(&self, query: &BoundQuery) -> Result<Option<Row>> {
        self.prepare(query)?.fetch_optional()
    }

    /// Tuple/structural-typed variant of [`Connection::fetch_all`].
    pub fn fetch_all_as<T>(&self, query: &BoundQuery) -> Result<Vec<T>>
    where
        for<'a> T: TryFrom<&'a Row, Error = Error>,
    {
        self.prepare(query)?.fetch_all_as()
    }

    pub fn fetch_one_as<T>(&self, query: &BoundQuery) -> Result<T>
    where
        for<'a> T: TryFrom<&'a Row, Error = Error>,
    {
        self.prepare(query)?.fetch_one_as()
    }

    pub fn fetch_optional_as<T>(&self, query: &BoundQuery) -> Result<Option<T>>
    where
        for<'a> T: TryFrom<&'a Row, Error = Error>,
    {
        self.prepare(query)?.fetch_optional_as()
    }

    /// Structural-typed variant of [`Connection::fetch_all`] (§4.7.1).
    pub fn fetch_all_de<T>(&self, query: &BoundQuery) -> Result<Vec<T>>
    where
        T: for<'de> serde::Deserialize<'de>,
    {
        self.prepare(query)?.fetch_all_de()
    }

    pub fn fetch_one_de<T>(&self, query: &BoundQuery) -> Result<T>
    where
        T: for<'de> serde::Deserialize<'de>,
    {
        self.prepare(query)?.fetch_one_de()
    }

    pub fn fetch_optional_de<T>(&self, query: &BoundQuery) -> Result<Option<T>>
    where
        T: for<'de> serde::Deserialize<'de>,
    {
        self.prepare(query)?.fetch_optional_de()
    }

    /// Prepares `query` once and hands the live statement to `block`, for
    /// callers that need incremental `step` or several terminal fetchers
    /// against the same prepared statement.
    pub fn preparing<T>(
        &self,
        query: &BoundQuery,
        block: impl FnOnce(&Statement<'_>) -> Result<T>,
    ) -> Result<T> {
        let stmt = self.prepare(query)?;
        block(&stmt)
    }

    /// Runs `block` inside a `kind`-flavored transaction (§4.7.2):
    /// `BEGIN`, then `COMMIT` if `block` returns `Ok`, or `ROLLBACK` if it
    /// returns `Err`.
    pub fn transaction<T>(
        &self,
        kind: TransactionKind,
        block: impl FnOnce(&Connection) -> Result<T>,
    ) -> Result<T> {
        transaction(self, kind, block)
    }

    pub fn last_insert_rowid(&self) -> i64 {
        self.inner.last_insert_rowid()
    }

    pub fn changes(&self) -> u64 {
        self.inner.changes()
    }

    pub fn is_autocommit(&self) -> bool {
        self.inner.is_autocommit()
    }

    pub fn busy_timeout_ms(&self, ms: i32) -> Result<()> {
        self.inner.busy_timeout_ms(ms)
    }

    /// Runs a semicolon-delimited batch of statements directly, bypassing
    /// bound-query interpolation (§4.6). Caller is responsible for
    /// injection safety; there is no binding support.
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.inner.execute_batch(sql)
    }

    pub fn close(mut self) -> Result<()> {
        self.inner.close()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::bound_query;

    #[test]
    fn test_execute_and_fetch() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute(&bound_query!("create table t (a integer)").unwrap())
            .unwrap();
        conn.execute(&bound_query!("insert into t (a) values (" { 1i64 } ")").unwrap())
            .unwrap();
        let row = conn
            .fetch_one(&bound_query!("select a from t").unwrap())
            .unwrap();
        assert_eq!(row.get::<i64>(0).unwrap(), 1);
    }

    #[test]
    fn test_fetch_one_de_decodes_struct() {
        #[derive(Debug, serde::Deserialize, PartialEq)]
        struct Row {
            a: i64,
        }

        let conn = Connection::open_in_memory().unwrap();
        conn.execute(&bound_query!("create table t (a integer)").unwrap())
            .unwrap();
        conn.execute(&bound_query!("insert into t (a) values (" { 1i64 } ")").unwrap())
            .unwrap();
        let row: Row = conn
            .fetch_one_de(&bound_query!("select a from t").unwrap())
            .unwrap();
        assert_eq!(row, Row { a: 1 });
    }

    #[test]
    fn test_transaction_rollback_on_error() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute(&bound_query!("create table t (a integer)").unwrap())
            .unwrap();
        let result: Result<()> = conn.transaction(TransactionKind::Deferred, |c| {
            c.execute(&bound_query!("insert into t (a) values (" { 1i64 } ")").unwrap())?;
            Err(Error::QueryReturnedNoRows)
        });
        assert!(result.is_err());
        let rows = conn.fetch_all(&bound_query!("select a from t").unwrap()).unwrap();
        assert!(rows.is_empty());
    }
}
