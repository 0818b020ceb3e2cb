//! Statement Lifecycle (§4.5, C7): prepare a [`BoundQuery`], bind its
//! values, and drive it to completion through terminal fetchers or
//! incremental `step`.

use std::cell::Cell;
use std::convert::TryFrom;
use std::os::raw::{c_int, c_void};

use crate::de;
use crate::error::Error;
use crate::ffi;
use crate::inner_connection::InnerConnection;
use crate::query::BoundQuery;
use crate::raw_statement::RawStatement;
use crate::row::{ColumnNames, Row};
use crate::value::Value;
use crate::Result;

/// Outcome of [`Statement::run`] (the non-row-returning terminal fetcher).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct RunStats {
    pub rows_affected: u64,
    /// Rows changed by this statement plus any triggered cascades, for
    /// the whole connection lifetime up to this point (§4.5).
    pub total_rows_affected: u64,
    pub last_insert_rowid: i64,
}

pub struct Statement<'conn> {
    conn: &'conn InnerConnection,
    stmt: RawStatement,
    columns: ColumnNames,
    done: Cell<bool>,
}

impl<'conn> Statement<'conn> {
    /// Prepares `query` against `conn`, binding its values in order.
    /// Rejects an arity mismatch before ever touching the engine (§4.5).
    pub fn prepare(conn: &'conn InnerConnection, query: &BoundQuery) -> Result<Statement<'conn>> {
        let (stmt, columns) = prepare_and_bind(conn, query)?;
        Ok(Statement {
            conn,
            stmt,
            columns,
            done: Cell::new(false),
        })
    }

    pub fn column_names(&self) -> &[Box<str>] {
        &self.columns
    }

    /// Advances the cursor by one row (§4.5 "incremental step"). Once the
    /// statement is exhausted, further calls keep returning `Ok(None)`
    /// rather than erroring (I2, idempotent-after-done).
    pub fn step(&self) -> Result<Option<Row>> {
        if self.done.get() {
            return Ok(None);
        }
        match self.stmt.step() {
            ffi::SQLITE_ROW => Ok(Some(self.current_row())),
            ffi::SQLITE_DONE => {
                self.done.set(true);
                Ok(None)
            }
            rc => {
                self.done.set(true);
                Err(unsafe { crate::error::error_from_handle(self.conn.db(), rc) })
            }
        }
    }

    fn current_row(&self) -> Row {
        materialize_row(&self.stmt, &self.columns)
    }

    /// Runs a non-row-returning statement to completion (`INSERT`/`UPDATE`/
    /// `DELETE`/DDL). A statement that actually yields a row is a caller
    /// error (§4.5).
    pub fn run(&self) -> Result<RunStats> {
        if let Some(_row) = self.step()? {
            return Err(Error::ExecuteReturnedResults);
        }
        Ok(RunStats {
            rows_affected: self.conn.changes(),
            total_rows_affected: self.conn.total_changes(),
            last_insert_rowid: self.conn.last_insert_rowid(),
        })
    }

    /// Collects every remaining row (§4.5 "fetchAll").
    pub fn fetch_all(&self) -> Result<Vec<Row>> {
        let mut rows = Vec::new();
        while let Some(row) = self.step()? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Fetches at most one row, leaving later rows (if any) unconsumed
    /// (§4.5 "fetchOptional").
    pub fn fetch_optional(&self) -> Result<Option<Row>> {
        self.step()
    }

    /// Like [`Statement::fetch_optional`] but errors when the query
    /// produced no rows (§4.5 "fetchOne").
    pub fn fetch_one(&self) -> Result<Row> {
        self.fetch_optional()?.ok_or(Error::QueryReturnedNoRows)
    }

    /// Tuple/structural variant of [`Statement::fetch_all`] (§4.5).
    pub fn fetch_all_as<T>(&self) -> Result<Vec<T>>
    where
        for<'a> T: TryFrom<&'a Row, Error = Error>,
    {
        self.fetch_all()?.iter().map(T::try_from).collect()
    }

    pub fn fetch_one_as<T>(&self) -> Result<T>
    where
        for<'a> T: TryFrom<&'a Row, Error = Error>,
    {
        let row = self.fetch_one()?;
        T::try_from(&row)
    }

    pub fn fetch_optional_as<T>(&self) -> Result<Option<T>>
    where
        for<'a> T: TryFrom<&'a Row, Error = Error>,
    {
        match self.fetch_optional()? {
            Some(row) => Ok(Some(T::try_from(&row)?)),
            None => Ok(None),
        }
    }

    /// Structural variant: decode a row through `serde::Deserialize`
    /// instead of `TryFrom<&Row>` (§4.3 shapes 1/2).
    pub fn fetch_one_de<T>(&self) -> Result<T>
    where
        T: for<'de> serde::Deserialize<'de>,
    {
        let row = self.fetch_one()?;
        de::from_row(&row)
    }

    pub fn fetch_all_de<T>(&self) -> Result<Vec<T>>
    where
        T: for<'de> serde::Deserialize<'de>,
    {
        self.fetch_all()?.iter().map(de::from_row).collect()
    }

    pub fn fetch_optional_de<T>(&self) -> Result<Option<T>>
    where
        T: for<'de> serde::Deserialize<'de>,
    {
        match self.fetch_optional()? {
            Some(row) => Ok(Some(de::from_row(&row)?)),
            None => Ok(None),
        }
    }

    /// Releases the statement early. A no-op drop afterward is safe (I3).
    pub fn finalize(self) -> Result<()> {
        let rc = self.stmt.finalize();
        if rc == ffi::SQLITE_OK {
            Ok(())
        } else {
            Err(unsafe { crate::error::error_from_handle(self.conn.db(), rc) })
        }
    }
}

/// Prepares `query` against `conn` and binds its values, shared by
/// [`Statement::prepare`] and [`crate::shared::SharedConnection::prepare`]
/// (the latter owns the returned `RawStatement` directly rather than
/// through a `Statement<'conn>`, since its statement handle outlives any
/// single mutex acquisition).
pub(crate) fn prepare_and_bind(
    conn: &InnerConnection,
    query: &BoundQuery,
) -> Result<(RawStatement, ColumnNames)> {
    let stmt = conn.prepare(query.sql())?;

    let expected = stmt.bind_parameter_count() as usize;
    let got = query.bindings().len();
    if expected != got {
        return Err(Error::InvalidParameterCount(expected, got));
    }
    for (i, value) in query.bindings().iter().enumerate() {
        bind_value(conn.db(), &stmt, (i + 1) as c_int, value)?;
    }

    let columns = column_names(&stmt);
    Ok((stmt, columns))
}

pub(crate) fn materialize_row(stmt: &RawStatement, columns: &ColumnNames) -> Row {
    let n = columns.len();
    let mut values = Vec::with_capacity(n);
    for i in 0..n {
        values.push(column_value(stmt, i as c_int));
    }
    Row::new(columns.clone(), values)
}

fn column_names(stmt: &RawStatement) -> ColumnNames {
    let n = stmt.column_count();
    (0..n)
        .map(|i| {
            stmt.column_name(i)
                .to_string_lossy()
                .into_owned()
                .into_boxed_str()
        })
        .collect::<Vec<_>>()
        .into()
}

fn column_value(stmt: &RawStatement, idx: c_int) -> Value {
    match stmt.column_type(idx) {
        ffi::SQLITE_NULL => Value::Null,
        ffi::SQLITE_INTEGER => Value::Integer(unsafe { ffi::sqlite3_column_int64(stmt.ptr(), idx) }),
        ffi::SQLITE_FLOAT => Value::Real(unsafe { ffi::sqlite3_column_double(stmt.ptr(), idx) }),
        ffi::SQLITE_TEXT => {
            let ptr = unsafe { ffi::sqlite3_column_text(stmt.ptr(), idx) };
            let len = unsafe { ffi::sqlite3_column_bytes(stmt.ptr(), idx) } as usize;
            let bytes = unsafe { std::slice::from_raw_parts(ptr, len) };
            Value::Text(String::from_utf8_lossy(bytes).into_owned())
        }
        _ => {
            let ptr = unsafe { ffi::sqlite3_column_blob(stmt.ptr(), idx) } as *const u8;
            let len = unsafe { ffi::sqlite3_column_bytes(stmt.ptr(), idx) } as usize;
            if len == 0 {
                Value::Blob(Vec::new())
            } else {
                Value::Blob(unsafe { std::slice::from_raw_parts(ptr, len) }.to_vec())
            }
        }
    }
}

fn bind_value(db: *mut ffi::sqlite3, stmt: &RawStatement, idx: c_int, value: &Value) -> Result<()> {
    let rc = match value {
        Value::Null => unsafe { ffi::sqlite3_bind_null(stmt.ptr(), idx) },
        Value::Integer(i) => unsafe { ffi::sqlite3_bind_int64(stmt.ptr(), idx, *i) },
        Value::Real(r) => unsafe { ffi::sqlite3_bind_double(stmt.ptr(), idx, *r) },
        Value::Text(s) => unsafe {
            ffi::sqlite3_bind_text(
                stmt.ptr(),
                idx,
                s.as_ptr() as *const std::os::raw::c_char,
                s.len() as c_int,
                ffi::SQLITE_TRANSIENT(),
            )
        },
        Value::Blob(b) => unsafe {
            if b.is_empty() {
                ffi::sqlite3_bind_zeroblob(stmt.ptr(), idx, 0)
            } else {
                ffi::sqlite3_bind_blob(
                    stmt.ptr(),
                    idx,
                    b.as_ptr() as *const c_void,
                    b.len() as c_int,
                    ffi::SQLITE_TRANSIENT(),
                )
            }
        },
    };
    if rc == ffi::SQLITE_OK {
        Ok(())
    } else {
        Err(unsafe { crate::error::error_from_handle(db, rc) })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::inner_connection::OpenMode;

    fn open_memory() -> InnerConnection {
        InnerConnection::open(":memory:", OpenMode::ReadWrite { create: true }).unwrap()
    }

    #[test]
    fn test_run_create_and_insert() {
        let conn = open_memory();
        Statement::prepare(&conn, &BoundQuery::raw("create table t (a integer, b text)"))
            .unwrap()
            .run()
            .unwrap();
        let q = BoundQuery {
            sql: "insert into t (a, b) values (?, ?)".into(),
            bindings: vec![Value::Integer(1), Value::Text("x".into())],
        };
        let stats = Statement::prepare(&conn, &q).unwrap().run().unwrap();
        assert_eq!(stats.rows_affected, 1);
        assert_eq!(stats.total_rows_affected, 1);
    }

    #[test]
    fn test_total_rows_affected_includes_earlier_statements() {
        let conn = open_memory();
        Statement::prepare(&conn, &BoundQuery::raw("create table t (a integer)"))
            .unwrap()
            .run()
            .unwrap();
        for i in 0..2i64 {
            let q = BoundQuery {
                sql: "insert into t (a) values (?)".into(),
                bindings: vec![Value::Integer(i)],
            };
            Statement::prepare(&conn, &q).unwrap().run().unwrap();
        }
        let stats = Statement::prepare(&conn, &BoundQuery::raw("delete from t"))
            .unwrap()
            .run()
            .unwrap();
        assert_eq!(stats.rows_affected, 2);
        assert_eq!(stats.total_rows_affected, 4);
    }

    #[test]
    fn test_invalid_parameter_count() {
        let conn = open_memory();
        let q = BoundQuery {
            sql: "select ?".into(),
            bindings: vec![],
        };
        let err = Statement::prepare(&conn, &q).unwrap_err();
        assert_eq!(err, Error::InvalidParameterCount(1, 0));
    }

    #[test]
    fn test_invalid_parameter_count_too_many_bindings() {
        let conn = open_memory();
        let q = BoundQuery {
            sql: "select 1".into(),
            bindings: vec![Value::Integer(2)],
        };
        let err = Statement::prepare(&conn, &q).unwrap_err();
        assert_eq!(err, Error::InvalidParameterCount(0, 1));
    }

    #[test]
    fn test_fetch_all_round_trip() {
        let conn = open_memory();
        Statement::prepare(&conn, &BoundQuery::raw("create table t (a integer)"))
            .unwrap()
            .run()
            .unwrap();
        for i in 0..3i64 {
            let q = BoundQuery {
                sql: "insert into t (a) values (?)".into(),
                bindings: vec![Value::Integer(i)],
            };
            Statement::prepare(&conn, &q).unwrap().run().unwrap();
        }
        let rows = Statement::prepare(&conn, &BoundQuery::raw("select a from t order by a"))
            .unwrap()
            .fetch_all()
            .unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].get::<i64>(0).unwrap(), 1);
    }

    #[test]
    fn test_fetch_one_no_rows_errors() {
        let conn = open_memory();
        Statement::prepare(&conn, &BoundQuery::raw("create table t (a integer)"))
            .unwrap()
            .run()
            .unwrap();
        let err = Statement::prepare(&conn, &BoundQuery::raw("select a from t"))
            .unwrap()
            .fetch_one()
            .unwrap_err();
        assert_eq!(err, Error::QueryReturnedNoRows);
    }

    #[test]
    fn test_step_idempotent_after_done() {
        let conn = open_memory();
        let stmt = Statement::prepare(&conn, &BoundQuery::raw("select 1 where 0")).unwrap();
        assert_eq!(stmt.step().unwrap(), None);
        assert_eq!(stmt.step().unwrap(), None);
    }
}
