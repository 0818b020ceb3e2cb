use std::convert::TryInto;

use sqlbind::{bound_query, Connection, Error, Pool, SharedConnection, TransactionKind};

// S1: open :memory:, create a table, fetch a literal row.
#[test]
fn s1_open_create_fetch_literal() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute(&bound_query!("create table t(x)").unwrap())
        .unwrap();
    let rows = conn.fetch_all(&bound_query!("select 1").unwrap()).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].len(), 1);
    assert_eq!(rows[0].get::<i64>(0).unwrap(), 1);
}

// S2: writes inside an uncommitted transaction are visible on the same
// connection, invisible to a second on-disk connection until commit.
#[test]
fn s2_transaction_visibility_across_connections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("s2.db");

    let conn1 = Connection::open(&path).unwrap();
    conn1
        .execute(&bound_query!("create table t(x integer)").unwrap())
        .unwrap();

    let conn2 = Connection::open(&path).unwrap();

    conn1
        .transaction(TransactionKind::Immediate, |c| {
            c.execute(&bound_query!("insert into t(x) values (" { 1i64 } ")").unwrap())?;

            let seen_in_tx = c.fetch_all(&bound_query!("select x from t").unwrap())?;
            assert_eq!(seen_in_tx.len(), 1);

            let seen_elsewhere = conn2.fetch_all(&bound_query!("select x from t").unwrap())?;
            assert!(seen_elsewhere.is_empty());

            Ok(())
        })
        .unwrap();

    let rows1 = conn1.fetch_all(&bound_query!("select x from t").unwrap()).unwrap();
    let rows2 = conn2.fetch_all(&bound_query!("select x from t").unwrap()).unwrap();
    assert_eq!(rows1.len(), 1);
    assert_eq!(rows2.len(), 1);
}

// S3: a transaction that errors after its inserts leaves no trace.
#[test]
fn s3_transaction_rollback_on_error_leaves_no_rows() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute(&bound_query!("create table t(x integer)").unwrap())
        .unwrap();

    let result: Result<(), Error> = conn.transaction(TransactionKind::Deferred, |c| {
        c.execute(&bound_query!("insert into t(x) values (" { 1i64 } ")").unwrap())?;
        c.execute(&bound_query!("insert into t(x) values (" { 2i64 } ")").unwrap())?;
        Err(Error::QueryReturnedNoRows)
    });
    assert!(result.is_err());

    let rows = conn.fetch_all(&bound_query!("select x from t").unwrap()).unwrap();
    assert!(rows.is_empty());
}

// S4: binding-count mismatch in both directions.
#[test]
fn s4_binding_arity_mismatch() {
    let conn = Connection::open_in_memory().unwrap();

    // Every BoundQuery built through the public builder/macro API keeps its
    // placeholder count and binding count in lockstep (invariant 2), so the
    // only way to observe a real mismatch from outside the crate is a query
    // with more `?`s than supplied bindings; the reverse direction (more
    // bindings than placeholders) is exercised against a hand-built
    // BoundQuery in `statement.rs`'s own test module.
    let too_few = sqlbind::BoundQuery::from("select ?");
    let err = conn.fetch_all(&too_few).unwrap_err();
    assert_eq!(err, Error::InvalidParameterCount(1, 0));
}

// S5: fetchOne on zero rows, and column-count mismatch on typed decode.
#[test]
fn s5_no_rows_and_column_count_mismatch() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute(&bound_query!("create table t(x integer)").unwrap())
        .unwrap();

    let err = conn.fetch_one(&bound_query!("select x from t").unwrap()).unwrap_err();
    assert_eq!(err, Error::QueryReturnedNoRows);

    let row = conn.fetch_one(&bound_query!("select 1, 2").unwrap()).unwrap();
    let decoded: Result<(i64, i64, i64), Error> = (&row).try_into();
    assert_eq!(decoded.unwrap_err(), Error::ColumnCountMismatch(3, 2));
}

// S6: the source's established (backwards) boolean coercion.
#[test]
fn s6_boolean_coercion_matches_source() {
    let conn = Connection::open_in_memory().unwrap();
    let row = conn
        .fetch_one(&bound_query!("select " { 1i64 } ", " { 0i64 } ", " { 69i64 }).unwrap())
        .unwrap();
    let (a, b, c): (bool, bool, bool) = (&row).try_into().unwrap();
    assert_eq!((a, b, c), (false, true, false));
}

#[cfg(feature = "chrono")]
#[test]
fn s7_datetime_forms_agree_within_a_millisecond() {
    use chrono::{DateTime, Utc};

    let conn = Connection::open_in_memory().unwrap();
    let row = conn
        .fetch_one(
            &bound_query!(
                "select "
                    "2024-05-18T14:11:35.069Z"
                    ", "
                    { 1716041495.069f64 }
                    ", "
                    { 1716041495i64 }
            )
            .unwrap(),
        )
        .unwrap();

    let text_form: DateTime<Utc> = row.get(0).unwrap();
    let float_form: DateTime<Utc> = row.get(1).unwrap();
    let int_form: DateTime<Utc> = row.get(2).unwrap();

    assert_eq!(text_form.timestamp_millis(), 1716041495069);
    assert_eq!(float_form.timestamp_millis(), 1716041495069);
    assert_eq!(int_form.timestamp_millis(), 1716041495000);
}

#[tokio::test]
async fn pool_capacity_and_fifo_fairness() {
    let pool = std::sync::Arc::new(Pool::open_in_memory(1).unwrap());
    let held = pool.acquire().await.unwrap();

    let pool2 = pool.clone();
    let first_waiter = tokio::spawn(async move {
        let _conn = pool2.acquire().await.unwrap();
        1u32
    });
    tokio::task::yield_now().await;

    let pool3 = pool.clone();
    let second_waiter = tokio::spawn(async move {
        let _conn = pool3.acquire().await.unwrap();
        2u32
    });
    tokio::task::yield_now().await;

    drop(held);
    let first = first_waiter.await.unwrap();
    assert_eq!(first, 1);
    second_waiter.await.unwrap();
}

#[tokio::test]
async fn shared_connection_serializes_concurrent_writers() {
    let conn = SharedConnection::open_in_memory().await.unwrap();
    conn.execute(&bound_query!("create table t(x integer)").unwrap())
        .await
        .unwrap();

    let mut tasks = Vec::new();
    for i in 0..16i64 {
        let conn = conn.clone();
        tasks.push(tokio::spawn(async move {
            conn.execute(&bound_query!("insert into t(x) values (" i ")").unwrap())
                .await
        }));
    }
    for t in tasks {
        t.await.unwrap().unwrap();
    }

    let rows = conn
        .fetch_all(&bound_query!("select x from t").unwrap())
        .await
        .unwrap();
    assert_eq!(rows.len(), 16);
}
