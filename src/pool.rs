//! Pool (§4.7.4, C12): a bounded set of connections shared by async tasks
//! with FIFO-fair hand-off — the task that has been waiting longest gets
//! the next freed connection, rather than whichever task happens to poll
//! first.

use std::collections::VecDeque;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{oneshot, Mutex};

use crate::connection::Connection;
use crate::error::Error;
use crate::Result;

/// Where a lazily-opened connection comes from (§4.7.4 step 2).
enum PoolTarget {
    File(PathBuf),
    Memory,
}

impl PoolTarget {
    fn open(&self) -> Result<Connection> {
        match self {
            PoolTarget::File(path) => Connection::open(path),
            PoolTarget::Memory => Connection::open_in_memory(),
        }
    }
}

struct PoolInner {
    free: Vec<Connection>,
    waiters: VecDeque<oneshot::Sender<Connection>>,
    current: usize,
    max: usize,
    target: PoolTarget,
}

/// A bounded pool of [`Connection`]s (invariants P1-P4 in the design
/// notes: capacity never exceeds the configured size, a connection is
/// owned by at most one borrower at a time, waiters are served in arrival
/// order, and the pool's own drop closes every connection still free).
pub struct Pool {
    inner: Arc<Mutex<PoolInner>>,
}

impl Pool {
    /// Opens a pool against `path`, lazily, up to `max` connections
    /// (§4.7.4: `max` is a ceiling, not an eager pre-allocation count).
    pub fn open(path: impl AsRef<Path>, max: usize) -> Result<Pool> {
        Pool::with_target(PoolTarget::File(path.as_ref().to_path_buf()), max)
    }

    pub fn open_in_memory(max: usize) -> Result<Pool> {
        Pool::with_target(PoolTarget::Memory, max)
    }

    fn with_target(target: PoolTarget, max: usize) -> Result<Pool> {
        if max == 0 {
            return Err(Error::InvalidPoolSize(max));
        }
        Ok(Pool {
            inner: Arc::new(Mutex::new(PoolInner {
                free: Vec::new(),
                waiters: VecDeque::new(),
                current: 0,
                max,
                target,
            })),
        })
    }

    /// Borrows a connection: hand out a free one, lazily open a new one if
    /// the pool has not yet reached `max`, or wait in FIFO order otherwise
    /// (§4.7.4).
    pub async fn acquire(&self) -> Result<PooledConnection> {
        let mut guard = self.inner.lock().await;
        if let Some(conn) = guard.free.pop() {
            return Ok(PooledConnection {
                pool: self.inner.clone(),
                conn: Some(conn),
            });
        }
        if guard.current < guard.max {
            let conn = guard.target.open()?;
            guard.current += 1;
            return Ok(PooledConnection {
                pool: self.inner.clone(),
                conn: Some(conn),
            });
        }
        let (tx, rx) = oneshot::channel();
        guard.waiters.push_back(tx);
        drop(guard);
        let conn = rx
            .await
            .expect("pool dropped while a waiter was queued");
        Ok(PooledConnection {
            pool: self.inner.clone(),
            conn: Some(conn),
        })
    }
}

/// An RAII borrow from a [`Pool`]; returns the connection (directly to the
/// next waiter, if any, or to the free list otherwise) when dropped.
pub struct PooledConnection {
    pool: Arc<Mutex<PoolInner>>,
    conn: Option<Connection>,
}

impl Deref for PooledConnection {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        self.conn.as_ref().expect("connection taken")
    }
}

impl DerefMut for PooledConnection {
    fn deref_mut(&mut self) -> &mut Connection {
        self.conn.as_mut().expect("connection taken")
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        let conn = self.conn.take().expect("connection taken");
        let pool = self.pool.clone();
        // `try_lock` is enough here: the mutex is only held across the
        // short, non-blocking span of `acquire`'s own critical section, so
        // a drop never needs to wait for it. Fall back to a detached task
        // only in the unlikely case it's contended at this exact instant.
        let try_result = pool.try_lock();
        match try_result {
            Ok(mut guard) => return_connection(&mut guard, conn),
            Err(_) => {
                drop(try_result);
                tokio::spawn(async move {
                    let mut guard = pool.lock().await;
                    return_connection(&mut guard, conn);
                });
            }
        }
    }
}

fn return_connection(guard: &mut PoolInner, conn: Connection) {
    match guard.waiters.pop_front() {
        Some(waiter) => {
            if let Err(conn) = waiter.send(conn) {
                guard.free.push(conn);
            }
        }
        None => guard.free.push(conn),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::bound_query;

    #[tokio::test]
    async fn test_acquire_and_return() {
        let pool = Pool::open_in_memory(2).unwrap();
        {
            let c1 = pool.acquire().await.unwrap();
            let c2 = pool.acquire().await.unwrap();
            c1.execute(&bound_query!("create table t (a integer)").unwrap())
                .unwrap();
            let _ = c2;
        }
        let c3 = pool.acquire().await.unwrap();
        c3.execute(&bound_query!("select 1").unwrap()).unwrap();
    }

    #[tokio::test]
    async fn test_waiter_gets_served_when_connection_returns() {
        let pool = Arc::new(Pool::open_in_memory(1).unwrap());
        let held = pool.acquire().await.unwrap();

        let pool2 = pool.clone();
        let waiter = tokio::spawn(async move {
            let conn = pool2.acquire().await.unwrap();
            conn.execute(&bound_query!("select 1").unwrap()).unwrap();
        });

        tokio::task::yield_now().await;
        drop(held);
        waiter.await.unwrap();
    }

    #[tokio::test]
    async fn test_connections_are_opened_lazily_up_to_max() {
        let pool = Pool::open_in_memory(3).unwrap();
        {
            let guard = pool.inner.lock().await;
            assert_eq!(guard.current, 0);
        }
        let c1 = pool.acquire().await.unwrap();
        {
            let guard = pool.inner.lock().await;
            assert_eq!(guard.current, 1);
        }
        let c2 = pool.acquire().await.unwrap();
        let _ = (c1, c2);
        let guard = pool.inner.lock().await;
        assert_eq!(guard.current, 2);
    }

    #[tokio::test]
    async fn test_acquire_waits_once_max_reached() {
        let pool = Arc::new(Pool::open_in_memory(1).unwrap());
        let held = pool.acquire().await.unwrap();

        let pool2 = pool.clone();
        let waiter = tokio::spawn(async move { pool2.acquire().await.unwrap() });

        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());
        drop(held);
        waiter.await.unwrap();
    }

    #[test]
    fn test_open_rejects_zero_max() {
        let err = Pool::open_in_memory(0).unwrap_err();
        assert_eq!(err, Error::InvalidPoolSize(0));
    }
}
