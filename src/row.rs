//! [`Row`]: an immutable, owned snapshot of one result row (§3 "Row").
//!
//! Unlike a cursor that borrows the live statement, a `Row` here is a plain
//! value: `fetchAll`/`fetchOne`/`fetchOptional` hand back rows that outlive
//! the statement they came from, matching the "Rows are immutable after
//! production" invariant in the data model.

use std::convert::TryFrom;
use std::sync::Arc;

use crate::error::Error;
use crate::value::{FromSql, Value, ValueRef};
use crate::Result;

/// Shared column-name list for every row produced by one statement
/// execution, so cloning a `Row` doesn't re-allocate the names.
pub type ColumnNames = Arc<[Box<str>]>;

#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    pub(crate) columns: ColumnNames,
    pub(crate) values: Vec<Value>,
}

impl Row {
    pub(crate) fn new(columns: ColumnNames, values: Vec<Value>) -> Row {
        Row { columns, values }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn column_names(&self) -> &[Box<str>] {
        &self.columns
    }

    pub fn column_name(&self, idx: usize) -> Option<&str> {
        self.columns.get(idx).map(|s| s.as_ref())
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.as_ref().eq_ignore_ascii_case(name))
    }

    pub fn value_ref(&self, idx: usize) -> Option<ValueRef<'_>> {
        self.values.get(idx).map(ValueRef::from)
    }

    /// Positional decode (§4.2).
    pub fn get<T: FromSql>(&self, idx: usize) -> Result<T> {
        let value_ref = self
            .value_ref(idx)
            .ok_or(Error::InvalidColumnIndex(idx))?;
        T::column_result(value_ref).map_err(|e| reindex(e, idx, self.column_name(idx)))
    }

    /// Named decode (§4.2); first matching column name wins on duplicates.
    pub fn get_by_name<T: FromSql>(&self, name: &str) -> Result<T> {
        let idx = self
            .column_index(name)
            .ok_or_else(|| Error::InvalidColumnName(name.to_string()))?;
        self.get(idx)
    }

    pub fn get_value(&self, idx: usize) -> Result<Value> {
        self.values
            .get(idx)
            .cloned()
            .ok_or(Error::InvalidColumnIndex(idx))
    }
}

fn reindex(err: Error, idx: usize, name: Option<&str>) -> Error {
    match err {
        Error::InvalidColumnType(_, _, t) => {
            Error::InvalidColumnType(idx, name.unwrap_or_default().to_string(), t)
        }
        Error::IntegralValueOutOfRange(_, v) => Error::IntegralValueOutOfRange(idx, v),
        Error::FromSqlConversionFailure(_, t, e) => Error::FromSqlConversionFailure(idx, t, e),
        other => other,
    }
}

/// Generates `TryFrom<&Row> for (A, ..., N)` for one tuple arity, enforcing
/// the column-count-mismatch check from §4.5 ("tuple/structural variants").
macro_rules! tuple_try_from_row {
    ($n:expr, $($field:ident : $ftype:ident),+) => {
        impl<$($ftype),+> TryFrom<&Row> for ($($ftype,)+)
        where
            $($ftype: FromSql,)+
        {
            type Error = Error;

            fn try_from(row: &Row) -> Result<Self> {
                if row.len() != $n {
                    return Err(Error::ColumnCountMismatch($n, row.len()));
                }
                let mut idx = 0usize;
                $(
                    let $field: $ftype = row.get(idx)?;
                    idx += 1;
                )+
                let _ = idx;
                Ok(($($field,)+))
            }
        }
    };
}

tuple_try_from_row!(1, a: A);
tuple_try_from_row!(2, a: A, b: B);
tuple_try_from_row!(3, a: A, b: B, c: C);
tuple_try_from_row!(4, a: A, b: B, c: C, d: D);
tuple_try_from_row!(5, a: A, b: B, c: C, d: D, e: E);
tuple_try_from_row!(6, a: A, b: B, c: C, d: D, e: E, f: F);
tuple_try_from_row!(7, a: A, b: B, c: C, d: D, e: E, f: F, g: G);
tuple_try_from_row!(8, a: A, b: B, c: C, d: D, e: E, f: F, g: G, h: H);
tuple_try_from_row!(9, a: A, b: B, c: C, d: D, e: E, f: F, g: G, h: H, i: I);
tuple_try_from_row!(10, a: A, b: B, c: C, d: D, e: E, f: F, g: G, h: H, i: I, j: J);

#[cfg(test)]
mod test {
    use super::*;
    use std::convert::TryInto;

    fn row(columns: &[&str], values: Vec<Value>) -> Row {
        let names: ColumnNames = columns
            .iter()
            .map(|s| (*s).into())
            .collect::<Vec<Box<str>>>()
            .into();
        Row::new(names, values)
    }

    #[test]
    fn test_try_from_row_for_tuple_2() {
        let r = row(&["a", "b"], vec![Value::Integer(1), Value::Text("x".into())]);
        let (a, b): (i64, String) = (&r).try_into().unwrap();
        assert_eq!(a, 1);
        assert_eq!(b, "x");
    }

    #[test]
    fn test_try_from_row_column_count_mismatch() {
        let r = row(&["a"], vec![Value::Integer(1)]);
        let err: Result<(i64, i64)> = (&r).try_into();
        assert_eq!(err.unwrap_err(), Error::ColumnCountMismatch(2, 1));
    }

    #[test]
    fn test_get_by_name_case_insensitive() {
        let r = row(&["Name"], vec![Value::Text("hi".into())]);
        let v: String = r.get_by_name("name").unwrap();
        assert_eq!(v, "hi");
    }

    #[test]
    fn test_boolean_coercion() {
        let r = row(
            &["a", "b", "c"],
            vec![Value::Integer(1), Value::Integer(0), Value::Integer(69)],
        );
        let (a, b, c): (bool, bool, bool) = (&r).try_into().unwrap();
        assert_eq!((a, b, c), (false, true, false));
    }
}
