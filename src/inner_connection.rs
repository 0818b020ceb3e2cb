//! Unmanaged Connection (§4.6, C6): a thin, non-thread-safe safe wrapper
//! over one raw `sqlite3*` handle. `Connection`, `SharedConnection`, and
//! `Pool` are all built on top of this.

use std::ffi::CString;
use std::os::raw::c_int;
use std::ptr;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{error_from_handle, error_from_sqlite_code, Error};
use crate::ffi;
use crate::raw_statement::RawStatement;
use crate::util::{errmsg_to_string, str_for_sqlite};
use crate::Result;

/// How a database file is opened (§6 "Configuration surface").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpenMode {
    ReadOnly,
    ReadWrite { create: bool },
}

impl OpenMode {
    fn flags(self) -> c_int {
        let base = match self {
            OpenMode::ReadOnly => ffi::SQLITE_OPEN_READ_ONLY,
            OpenMode::ReadWrite { create: false } => ffi::SQLITE_OPEN_READ_WRITE,
            OpenMode::ReadWrite { create: true } => {
                ffi::SQLITE_OPEN_READ_WRITE | ffi::SQLITE_OPEN_CREATE
            }
        };
        let threadsafe = unsafe { ffi::sqlite3_threadsafe() != 0 };
        if threadsafe {
            base | ffi::SQLITE_OPEN_NO_MUTEX
        } else {
            base
        }
    }
}

pub struct InnerConnection {
    db: *mut ffi::sqlite3,
}

unsafe impl Send for InnerConnection {}

impl InnerConnection {
    pub fn open(path: &str, mode: OpenMode) -> Result<InnerConnection> {
        ensure_safe_sqlite_threading_mode()?;

        let c_path = CString::new(path).map_err(|_| Error::CannotOpen(path.to_string()))?;
        let mut db: *mut ffi::sqlite3 = ptr::null_mut();
        let r = unsafe {
            ffi::sqlite3_open_v2(c_path.as_ptr(), &mut db, mode.flags(), ptr::null())
        };
        if r != ffi::SQLITE_OK {
            let e = if db.is_null() {
                error_from_sqlite_code(r, Some(path.to_string()))
            } else {
                let e = unsafe { error_from_handle(db, r) };
                unsafe { ffi::sqlite3_close(db) };
                e
            };
            return Err(e);
        }

        unsafe { ffi::sqlite3_extended_result_codes(db, 1) };
        let r = unsafe { ffi::sqlite3_busy_timeout(db, 5_000) };
        if r != ffi::SQLITE_OK {
            let e = unsafe { error_from_handle(db, r) };
            unsafe { ffi::sqlite3_close(db) };
            return Err(e);
        }

        Ok(InnerConnection { db })
    }

    #[inline]
    pub fn db(&self) -> *mut ffi::sqlite3 {
        self.db
    }

    #[inline]
    pub fn decode_result(&self, code: c_int) -> Result<()> {
        if code == ffi::SQLITE_OK {
            Ok(())
        } else {
            Err(unsafe { error_from_handle(self.db, code) })
        }
    }

    pub fn busy_timeout_ms(&self, ms: i32) -> Result<()> {
        self.decode_result(unsafe { ffi::sqlite3_busy_timeout(self.db, ms) })
    }

    pub fn close(&mut self) -> Result<()> {
        if self.db.is_null() {
            return Ok(());
        }
        let r = unsafe { ffi::sqlite3_close(self.db) };
        let result = self.decode_result(r);
        if result.is_ok() {
            self.db = ptr::null_mut();
        }
        result
    }

    pub fn prepare(&self, sql: &str) -> Result<RawStatement> {
        let (c_sql, len, _owned) = str_for_sqlite(sql.as_bytes())?;
        let mut c_stmt: *mut ffi::sqlite3_stmt = ptr::null_mut();
        let mut c_tail = ptr::null();
        let r = unsafe {
            ffi::sqlite3_prepare_v2(self.db, c_sql, len, &mut c_stmt, &mut c_tail)
        };
        if r != ffi::SQLITE_OK {
            return Err(unsafe { error_from_handle(self.db, r) });
        }
        if c_stmt.is_null() {
            return Err(Error::EmptyQuery);
        }
        Ok(RawStatement::new(c_stmt))
    }

    /// Runs `sql` as a semicolon-delimited batch via `sqlite3_exec`.
    /// Injection-unsafe by design (§4.6).
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        let c_sql = CString::new(sql)?;
        let r = unsafe {
            ffi::sqlite3_exec(
                self.db,
                c_sql.as_ptr(),
                None,
                ptr::null_mut(),
                ptr::null_mut(),
            )
        };
        self.decode_result(r)
    }

    #[inline]
    pub fn last_insert_rowid(&self) -> i64 {
        unsafe { ffi::sqlite3_last_insert_rowid(self.db) }
    }

    #[inline]
    pub fn changes(&self) -> u64 {
        unsafe { ffi::sqlite3_changes(self.db) as u64 }
    }

    #[inline]
    pub fn total_changes(&self) -> u64 {
        unsafe { ffi::sqlite3_total_changes(self.db) as u64 }
    }

    #[inline]
    pub fn is_autocommit(&self) -> bool {
        unsafe { ffi::sqlite3_get_autocommit(self.db) != 0 }
    }

    pub fn errmsg(&self) -> String {
        unsafe { errmsg_to_string(ffi::sqlite3_errmsg(self.db)) }
    }
}

impl Drop for InnerConnection {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!(error = %e, "error closing database during drop");
        }
    }
}

static SQLITE_INIT: std::sync::Once = std::sync::Once::new();
pub static BYPASS_SQLITE_INIT: AtomicBool = AtomicBool::new(false);

/// Library initialization (§4.6): on a statically-linked engine build we
/// must call `sqlite3_initialize` ourselves exactly once; on a dynamically
/// linked build the host has already done it.
fn ensure_safe_sqlite_threading_mode() -> Result<()> {
    if unsafe { ffi::sqlite3_threadsafe() == 0 } {
        return Err(Error::SqliteSingleThreadedMode);
    }

    const SQLITE_SINGLETHREADED_MUTEX_MAGIC: usize = 8;
    let is_singlethreaded = unsafe {
        let mutex_ptr = ffi::sqlite3_mutex_alloc(0);
        let is_singlethreaded = mutex_ptr as usize == SQLITE_SINGLETHREADED_MUTEX_MAGIC;
        ffi::sqlite3_mutex_free(mutex_ptr);
        is_singlethreaded
    };
    if is_singlethreaded {
        return Err(Error::SqliteSingleThreadedMode);
    }

    SQLITE_INIT.call_once(|| {
        if BYPASS_SQLITE_INIT.load(Ordering::Relaxed) {
            return;
        }
        let rc = unsafe { ffi::sqlite3_initialize() };
        if rc != ffi::SQLITE_OK {
            tracing::warn!(code = rc, "sqlite3_initialize failed");
        }
    });
    Ok(())
}
