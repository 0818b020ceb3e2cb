use std::ffi::CString;
use std::os::raw::{c_char, c_int};

use crate::Result;

/// Convert a Rust string to a nul-terminated C string, rejecting embedded nuls.
#[inline]
pub fn str_to_cstring(s: &str) -> Result<CString> {
    Ok(CString::new(s)?)
}

/// Prepare a UTF-8 byte slice for `sqlite3_prepare_v2`: SQLite wants either a
/// nul-terminated pointer with `len == -1`, or an explicit byte length. We
/// always append a NUL ourselves so we can pass the exact length and avoid a
/// second scan for the terminator.
pub fn str_for_sqlite(s: &[u8]) -> Result<(*const c_char, c_int, CString)> {
    let len = len_as_c_int(s.len())?;
    let c_str = CString::new(s)?;
    Ok((c_str.as_ptr(), len, c_str))
}

fn len_as_c_int(len: usize) -> Result<c_int> {
    if len >= (c_int::MAX as usize) {
        Err(crate::Error::SqliteFailure(
            crate::ffi::Error::new(crate::ffi::SQLITE_TOOBIG),
            None,
        ))
    } else {
        Ok(len as c_int)
    }
}

/// Translate an `sqlite3_errmsg`-style pointer into an owned `String`,
/// tolerating non-UTF-8 garbage rather than panicking.
pub unsafe fn errmsg_to_string(errmsg: *const c_char) -> String {
    let c_str = std::ffi::CStr::from_ptr(errmsg);
    c_str.to_string_lossy().into_owned()
}
