//! Bound Query (§4.4): an interpolation-built SQL text plus its ordered
//! bindings, in the spirit of the sibling `libsql` crate's `params!`/
//! `named_params!` token-munching macros.

use crate::value::{ToSql, Value};
use crate::Result;

/// SQL text with `?` placeholders, paired with the values bound to them in
/// order. Composable: `extend` appends another query's text and bindings.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoundQuery {
    pub(crate) sql: String,
    pub(crate) bindings: Vec<Value>,
}

impl BoundQuery {
    pub fn new() -> BoundQuery {
        BoundQuery::default()
    }

    pub fn raw(sql: impl Into<String>) -> BoundQuery {
        BoundQuery {
            sql: sql.into(),
            bindings: Vec::new(),
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn bindings(&self) -> &[Value] {
        &self.bindings
    }

    /// Append verbatim SQL text (the `raw:` form). Caller is responsible
    /// for injection safety.
    pub fn push_raw(&mut self, text: &str) -> &mut Self {
        self.sql.push_str(text);
        self
    }

    /// Append a single bound value, emitting one `?` placeholder.
    pub fn push_bound(&mut self, value: impl ToSql) -> Result<&mut Self> {
        self.sql.push('?');
        self.bindings.push(value.to_sql()?);
        Ok(self)
    }

    /// Append another query's text and bindings in order (the `fragment:`
    /// form).
    pub fn push_fragment(&mut self, other: &BoundQuery) -> &mut Self {
        self.sql.push_str(&other.sql);
        self.bindings.extend(other.bindings.iter().cloned());
        self
    }

    pub fn extend(mut self, other: BoundQuery) -> BoundQuery {
        self.push_fragment(&other);
        self
    }
}

impl From<&str> for BoundQuery {
    fn from(sql: &str) -> BoundQuery {
        BoundQuery::raw(sql)
    }
}

impl From<String> for BoundQuery {
    fn from(sql: String) -> BoundQuery {
        BoundQuery::raw(sql)
    }
}

/// Builds a [`BoundQuery`] by token-munching a comma/space-free stream of
/// literal-text, `{expr}`, `{raw: expr}`, and `{fragment: expr}` forms
/// (§4.4). String literal tokens are appended verbatim; any other
/// expression not wrapped in `raw:`/`fragment:` is bound as a `?`
/// placeholder.
///
/// ```ignore
/// let name = "ada";
/// let q = bound_query!("select * from users where name = " name " and id > " { 0 });
/// ```
#[macro_export]
macro_rules! bound_query {
    (@inner $q:expr;) => {};
    (@inner $q:expr; raw: $e:expr $(, $($rest:tt)*)?) => {
        $q.push_raw(&$e);
        $crate::bound_query!(@inner $q; $($($rest)*)?);
    };
    (@inner $q:expr; fragment: $e:expr $(, $($rest:tt)*)?) => {
        $q.push_fragment(&$e);
        $crate::bound_query!(@inner $q; $($($rest)*)?);
    };
    (@inner $q:expr; $lit:literal $(, $($rest:tt)*)?) => {
        $q.push_raw($lit);
        $crate::bound_query!(@inner $q; $($($rest)*)?);
    };
    (@inner $q:expr; $e:expr $(, $($rest:tt)*)?) => {
        $q.push_bound($e)?;
        $crate::bound_query!(@inner $q; $($($rest)*)?);
    };
    ($($tt:tt)*) => {{
        #[allow(unused_mut)]
        let mut q = $crate::query::BoundQuery::new();
        (|| -> $crate::Result<$crate::query::BoundQuery> {
            $crate::bound_query!(@inner q; $($tt)*);
            Ok(q)
        })()
    }};
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_literal_and_binding() {
        let q = bound_query!("select * from t where x = " { 1i64 }).unwrap();
        assert_eq!(q.sql(), "select * from t where x = ?");
        assert_eq!(q.bindings(), &[Value::Integer(1)]);
    }

    #[test]
    fn test_raw_and_fragment() {
        let cond = bound_query!("x = " { 1i64 }).unwrap();
        let q = bound_query!("select * from t where " fragment: cond " order by x").unwrap();
        assert_eq!(q.sql(), "select * from t where x = ? order by x");
        assert_eq!(q.bindings(), &[Value::Integer(1)]);
    }

    #[test]
    fn test_placeholder_count_matches_bindings() {
        let q = bound_query!("select " { 1i64 } ", " "two").unwrap();
        assert_eq!(q.sql().matches('?').count(), q.bindings().len());
    }
}
