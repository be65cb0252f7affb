//! Record marshaling
//!
//! Explicit, named conversion between host records and script tables.
//! Conversion is always invoked directly by the caller; there is no
//! ambient coercion at any call boundary.
//!
//! # Numeric contract
//!
//! Script numbers are doubles. Reading a numeric field renders the stored
//! value to its shortest round-trip decimal form and parses that text as
//! the host's declared type. A whole number inside the double-exact-integer
//! range survives an `i64` round trip; a fractional or out-of-range value
//! destined for an integer field is a hard error. Numeric *strings* parse
//! too, which keeps the layer tolerant of heterogeneous table encodings.
//!
//! # Presence contract
//!
//! An optional mapping field that is absent produces a table with no
//! corresponding key — never a nil-valued key — and a table without the key
//! (or with a non-table value under it) reads back as absent.

use std::collections::HashMap;
use thiserror::Error;

use crate::value::{ScriptTable, ScriptValue};

pub mod item;
pub mod vec2;

/// Marshaling failure during table → record conversion.
///
/// Always names the offending field; a missing or mistyped required field
/// fails fast rather than substituting a default.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarshalError {
    #[error("missing required field '{field}'")]
    MissingField { field: &'static str },

    #[error("field '{field}' expected {expected}, found {found}")]
    WrongKind {
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("field '{field}' is not a valid {expected}: '{text}'")]
    BadNumber {
        field: &'static str,
        expected: &'static str,
        text: String,
    },
}

/// A host record with a fixed, named field list that converts to and from
/// a script table.
pub trait TableRecord: Sized {
    /// Write one table entry per non-absent field, keyed by field name.
    fn to_table(&self) -> ScriptTable;

    /// Read each declared field by name. Field order is irrelevant.
    fn from_table(table: &ScriptTable) -> Result<Self, MarshalError>;
}

fn numeric_text(
    table: &ScriptTable,
    field: &'static str,
) -> Result<String, MarshalError> {
    match table.get_str(field) {
        None => Err(MarshalError::MissingField { field }),
        Some(ScriptValue::Number(n)) => Ok(n.to_string()),
        Some(ScriptValue::String(s)) => Ok(s.clone()),
        Some(other) => Err(MarshalError::WrongKind {
            field,
            expected: "number",
            found: other.kind(),
        }),
    }
}

/// Read an integer field via the textual round trip.
pub fn int_field(table: &ScriptTable, field: &'static str) -> Result<i64, MarshalError> {
    let text = numeric_text(table, field)?;
    text.parse::<i64>().map_err(|_| MarshalError::BadNumber {
        field,
        expected: "integer",
        text,
    })
}

/// Read a double field via the textual round trip.
pub fn number_field(table: &ScriptTable, field: &'static str) -> Result<f64, MarshalError> {
    let text = numeric_text(table, field)?;
    text.parse::<f64>().map_err(|_| MarshalError::BadNumber {
        field,
        expected: "number",
        text,
    })
}

/// Read a required string field.
pub fn string_field(table: &ScriptTable, field: &'static str) -> Result<String, MarshalError> {
    match table.get_str(field) {
        None => Err(MarshalError::MissingField { field }),
        Some(ScriptValue::String(s)) => Ok(s.clone()),
        Some(other) => Err(MarshalError::WrongKind {
            field,
            expected: "string",
            found: other.kind(),
        }),
    }
}

/// Read an optional string→string mapping field.
///
/// Returns `None` when the key is absent or its value is not a table.
/// A present table with a non-string key or value is a hard error.
pub fn string_map_field(
    table: &ScriptTable,
    field: &'static str,
) -> Result<Option<HashMap<String, String>>, MarshalError> {
    let Some(ScriptValue::Table(nested)) = table.get_str(field) else {
        return Ok(None);
    };

    let mut map = HashMap::new();
    for (key, value) in nested.iter() {
        let ScriptValue::String(key) = key else {
            return Err(MarshalError::WrongKind {
                field,
                expected: "string key",
                found: key.kind(),
            });
        };
        let ScriptValue::String(value) = value else {
            return Err(MarshalError::WrongKind {
                field,
                expected: "string value",
                found: value.kind(),
            });
        };
        map.insert(key.clone(), value.clone());
    }
    Ok(Some(map))
}

/// Write a string→string mapping as a nested table, keys sorted for stable
/// output. Absent mappings write nothing.
pub(crate) fn push_string_map(
    table: &mut ScriptTable,
    field: &'static str,
    map: Option<&HashMap<String, String>>,
) {
    let Some(map) = map else { return };

    let mut keys: Vec<_> = map.keys().collect();
    keys.sort();

    let mut nested = ScriptTable::new();
    for key in keys {
        nested.insert_str(key.clone(), ScriptValue::String(map[key].clone()));
    }
    table.insert_str(field, ScriptValue::Table(nested));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_with(field: &'static str, value: ScriptValue) -> ScriptTable {
        let mut table = ScriptTable::new();
        table.insert_str(field, value);
        table
    }

    #[test]
    fn test_int_field_whole_number() {
        let table = table_with("count", ScriptValue::Number(25.0));
        assert_eq!(int_field(&table, "count").unwrap(), 25);
    }

    #[test]
    fn test_int_field_from_numeric_string() {
        let table = table_with("count", ScriptValue::from("42"));
        assert_eq!(int_field(&table, "count").unwrap(), 42);
    }

    #[test]
    fn test_int_field_rejects_fraction() {
        let table = table_with("count", ScriptValue::Number(25.5));
        let err = int_field(&table, "count").unwrap_err();
        assert_eq!(
            err,
            MarshalError::BadNumber {
                field: "count",
                expected: "integer",
                text: "25.5".to_string(),
            }
        );
    }

    #[test]
    fn test_int_field_rejects_nan() {
        let table = table_with("count", ScriptValue::Number(f64::NAN));
        assert!(int_field(&table, "count").is_err());
    }

    #[test]
    fn test_missing_field_names_field() {
        let table = ScriptTable::new();
        let err = int_field(&table, "count").unwrap_err();
        assert_eq!(err.to_string(), "missing required field 'count'");
    }

    #[test]
    fn test_wrong_kind_names_field() {
        let table = table_with("count", ScriptValue::Bool(true));
        let err = int_field(&table, "count").unwrap_err();
        assert_eq!(err.to_string(), "field 'count' expected number, found boolean");
    }

    #[test]
    fn test_number_field_round_trips_exactly() {
        // Shortest round-trip rendering parses back to the same double.
        for n in [4.4, 0.1, -12345.6789, 1.0e15] {
            let table = table_with("weight", ScriptValue::Number(n));
            assert_eq!(number_field(&table, "weight").unwrap(), n);
        }
    }

    #[test]
    fn test_string_field_rejects_number() {
        let table = table_with("label", ScriptValue::Number(1.0));
        assert!(matches!(
            string_field(&table, "label"),
            Err(MarshalError::WrongKind { field: "label", .. })
        ));
    }

    #[test]
    fn test_string_map_absent_key_is_none() {
        let table = ScriptTable::new();
        assert_eq!(string_map_field(&table, "attrs").unwrap(), None);
    }

    #[test]
    fn test_string_map_non_table_is_none() {
        let table = table_with("attrs", ScriptValue::Number(7.0));
        assert_eq!(string_map_field(&table, "attrs").unwrap(), None);
    }

    #[test]
    fn test_string_map_rejects_non_string_value() {
        let mut nested = ScriptTable::new();
        nested.insert_str("key1", ScriptValue::Number(1.0));
        let table = table_with("attrs", ScriptValue::Table(nested));
        assert!(string_map_field(&table, "attrs").is_err());
    }

    #[test]
    fn test_string_map_enumeration_order_irrelevant() {
        let mut forward = ScriptTable::new();
        forward.insert_str("key1", ScriptValue::from("value1"));
        forward.insert_str("key2", ScriptValue::from("value2"));
        let mut backward = ScriptTable::new();
        backward.insert_str("key2", ScriptValue::from("value2"));
        backward.insert_str("key1", ScriptValue::from("value1"));

        let a = string_map_field(&table_with("attrs", ScriptValue::Table(forward)), "attrs")
            .unwrap();
        let b = string_map_field(&table_with("attrs", ScriptValue::Table(backward)), "attrs")
            .unwrap();
        assert_eq!(a, b);
    }
}
