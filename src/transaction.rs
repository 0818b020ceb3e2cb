//! Transaction (§4.7.2, C10): a closure-scoped `BEGIN`/`COMMIT`/`ROLLBACK`
//! wrapper. Adapted from the guard-based `Transaction`/`Savepoint` pair of
//! the source this crate started from — the closure form replaces the
//! drop-guard so commit/rollback is driven by the closure's `Result`
//! instead of an explicit `drop_behavior` toggle.

use crate::connection::Connection;
use crate::query::BoundQuery;
use crate::Result;

/// Mirrors SQLite's three `BEGIN` flavors (see
/// <http://www.sqlite.org/lang_transaction.html>).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransactionKind {
    /// Does not actually acquire a lock until the database is first
    /// accessed.
    Deferred,
    /// Starts a write transaction immediately.
    Immediate,
    /// Like `Immediate`, and additionally prevents other connections from
    /// reading the database for the transaction's duration.
    Exclusive,
}

impl TransactionKind {
    fn begin_sql(self) -> &'static str {
        match self {
            TransactionKind::Deferred => "BEGIN DEFERRED",
            TransactionKind::Immediate => "BEGIN IMMEDIATE",
            TransactionKind::Exclusive => "BEGIN EXCLUSIVE",
        }
    }
}

/// Runs `block(conn)` between `BEGIN kind` and `COMMIT`/`ROLLBACK`. Commits
/// on `Ok`, rolls back on `Err`, and propagates whichever error is more
/// informative if both the rollback and the original error fail.
pub(crate) fn transaction<T>(
    conn: &Connection,
    kind: TransactionKind,
    block: impl FnOnce(&Connection) -> Result<T>,
) -> Result<T> {
    conn.execute(&BoundQuery::raw(kind.begin_sql()))?;

    match block(conn) {
        Ok(value) => {
            conn.execute(&BoundQuery::raw("COMMIT"))?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = conn.execute(&BoundQuery::raw("ROLLBACK")) {
                tracing::warn!(
                    original = %err,
                    rollback_error = %rollback_err,
                    "rollback failed after transaction error"
                );
            }
            Err(err)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::bound_query;

    #[test]
    fn test_commit_on_ok() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute(&bound_query!("create table t (a integer)").unwrap())
            .unwrap();
        conn.transaction(TransactionKind::Immediate, |c| {
            c.execute(&bound_query!("insert into t (a) values (" { 1i64 } ")").unwrap())
        })
        .unwrap();
        let rows = conn
            .fetch_all(&bound_query!("select a from t").unwrap())
            .unwrap();
        assert_eq!(rows.len(), 1);
    }
}
