//! Structural row decoding (§4.3): map a [`Row`] onto any `Deserialize`
//! type via a `serde::Deserializer` over the row's columns, adapted from
//! the sibling `libsql` crate's `de.rs`.

use serde::de::{Error as _, IntoDeserializer, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use crate::error::Error;
use crate::row::Row;
use crate::value::Value;

struct RowDeserializer<'a> {
    row: &'a Row,
}

impl<'de> Deserializer<'de> for RowDeserializer<'de> {
    type Error = Error;

    fn deserialize_any<V>(self, _visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        Err(Error::custom(
            "expects a map, newtype, sequence, struct, or tuple",
        ))
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        struct RowMapAccess<'a> {
            row: &'a Row,
            idx: std::ops::Range<usize>,
            current: Option<(usize, Value)>,
        }

        impl<'de> MapAccess<'de> for RowMapAccess<'de> {
            type Error = Error;

            fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, Self::Error>
            where
                K: serde::de::DeserializeSeed<'de>,
            {
                match self.idx.next() {
                    None => Ok(None),
                    Some(i) => {
                        let value = self.row.get_value(i)?;
                        let name = self
                            .row
                            .column_name(i)
                            .ok_or_else(|| Error::custom("missing column name"))?
                            .to_owned();
                        self.current = Some((i, value));
                        seed.deserialize(name.into_deserializer()).map(Some)
                    }
                }
            }

            fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, Self::Error>
            where
                V: serde::de::DeserializeSeed<'de>,
            {
                let (idx, value) = self
                    .current
                    .take()
                    .ok_or_else(|| Error::custom("expects a value but row is exhausted"))?;
                let type_of = value.data_type();
                seed.deserialize(value.into_deserializer()).map_err(|_| {
                    let name = self.row.column_name(idx).unwrap_or("").to_owned();
                    Error::InvalidColumnType(idx, name, type_of)
                })
            }
        }

        visitor.visit_map(RowMapAccess {
            row: self.row,
            idx: 0..self.row.len(),
            current: None,
        })
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_map(visitor)
    }

    /// Unkeyed container at row level: not supported (§4.3 shape 3). A row
    /// has named columns, not a positional arity a sequence/tuple could
    /// decode against without silently depending on column order.
    fn deserialize_seq<V>(self, _visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        Err(Error::custom(
            "unkeyed sequence decode at row level is not supported; use a struct or a single-column newtype",
        ))
    }

    fn deserialize_tuple<V>(self, _len: usize, _visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        Err(Error::custom(
            "unkeyed tuple decode at row level is not supported; use a struct or a single-column newtype",
        ))
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        _visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        Err(Error::custom(
            "unkeyed tuple struct decode at row level is not supported; use a struct or a single-column newtype",
        ))
    }

    /// A single-value container at row level (§4.3 shape 2): only legal
    /// when the row has exactly one column.
    fn deserialize_newtype_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        if self.row.len() != 1 {
            return Err(Error::custom(
                "single-value decode requires a row with exactly one column",
            ));
        }
        visitor.visit_newtype_struct(self)
    }

    serde::forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct enum identifier ignored_any
    }
}

/// Decode a row into any `Deserialize` type per the three shapes of §4.3.
pub fn from_row<'de, T: Deserialize<'de>>(row: &'de Row) -> Result<T, Error> {
    T::deserialize(RowDeserializer { row })
}

/// Lets a single cell's owned [`Value`] feed a field deserializer directly
/// (`value.into_deserializer()` in `RowMapAccess::next_value_seed` above),
/// via serde's blanket `IntoDeserializer` impl for any `Deserializer` whose
/// `Error` matches.
impl<'de> Deserializer<'de> for Value {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self {
            Value::Null => visitor.visit_unit(),
            Value::Integer(i) => visitor.visit_i64(i),
            Value::Real(f) => visitor.visit_f64(f),
            Value::Text(s) => visitor.visit_string(s),
            Value::Blob(b) => visitor.visit_byte_buf(b),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self {
            Value::Null => visitor.visit_none(),
            other => visitor.visit_some(other),
        }
    }

    fn deserialize_newtype_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    serde::forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple tuple_struct map struct enum
        identifier ignored_any
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::row::ColumnNames;
    use serde::Deserialize;

    fn row(columns: &[&str], values: Vec<Value>) -> Row {
        let names: ColumnNames = columns
            .iter()
            .map(|s| (*s).into())
            .collect::<Vec<Box<str>>>()
            .into();
        Row::new(names, values)
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Person {
        id: i64,
        name: String,
    }

    #[test]
    fn test_decode_struct() {
        let r = row(
            &["id", "name"],
            vec![Value::Integer(1), Value::Text("ada".into())],
        );
        let p: Person = from_row(&r).unwrap();
        assert_eq!(
            p,
            Person {
                id: 1,
                name: "ada".into()
            }
        );
    }

    #[test]
    fn test_decode_scalar_requires_single_column() {
        let r = row(
            &["id", "name"],
            vec![Value::Integer(1), Value::Text("ada".into())],
        );
        #[derive(Debug, Deserialize)]
        struct OnlyId(i64);
        let err = from_row::<OnlyId>(&r).unwrap_err();
        assert!(err.to_string().contains("exactly one column"));
    }

    #[test]
    fn test_decode_tuple_at_row_level_is_rejected() {
        let r = row(
            &["id", "name"],
            vec![Value::Integer(1), Value::Text("ada".into())],
        );
        let err = from_row::<(i64, String)>(&r).unwrap_err();
        assert!(matches!(err, Error::DecodeShape(_)));
    }

    #[test]
    fn test_decode_missing_field_is_invalid_column_name() {
        let r = row(&["id"], vec![Value::Integer(1)]);
        let err = from_row::<Person>(&r).unwrap_err();
        assert_eq!(err, Error::InvalidColumnName("name".into()));
    }

    #[test]
    fn test_decode_wrong_type_is_invalid_column_type() {
        let r = row(
            &["id", "name"],
            vec![Value::Text("not an int".into()), Value::Text("ada".into())],
        );
        let err = from_row::<Person>(&r).unwrap_err();
        assert!(matches!(err, Error::InvalidColumnType(0, ref name, _) if name == "id"));
    }
}
