//! General-purpose host record: int, double, string, optional attributes.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{
    MarshalError, TableRecord, int_field, number_field, push_string_map, string_field,
    string_map_field,
};
use crate::value::{ScriptTable, ScriptValue};

/// A typed host record exchanged with scripts as a table keyed by field name.
///
/// `attrs` is presence-signalled: `None` writes no table entry at all, and a
/// missing (or non-table) entry reads back as `None`. An empty map is a
/// present, empty table — a different thing from absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub count: i64,
    pub weight: f64,
    pub label: String,
    pub attrs: Option<HashMap<String, String>>,
}

impl ItemRecord {
    pub fn new(count: i64, weight: f64, label: impl Into<String>) -> Self {
        Self {
            count,
            weight,
            label: label.into(),
            attrs: None,
        }
    }

    pub fn with_attrs(mut self, attrs: HashMap<String, String>) -> Self {
        self.attrs = Some(attrs);
        self
    }
}

impl TableRecord for ItemRecord {
    fn to_table(&self) -> ScriptTable {
        let mut table = ScriptTable::new();
        table.insert_str("count", ScriptValue::Number(self.count as f64));
        table.insert_str("weight", ScriptValue::Number(self.weight));
        table.insert_str("label", ScriptValue::String(self.label.clone()));
        push_string_map(&mut table, "attrs", self.attrs.as_ref());
        table
    }

    fn from_table(table: &ScriptTable) -> Result<Self, MarshalError> {
        Ok(Self {
            count: int_field(table, "count")?,
            weight: number_field(table, "weight")?,
            label: string_field(table, "label")?,
            attrs: string_map_field(table, "attrs")?,
        })
    }
}

impl std::fmt::Display for ItemRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} x{} ({}kg)", self.label, self.count, self.weight)?;
        if let Some(attrs) = &self.attrs {
            let mut keys: Vec<_> = attrs.keys().collect();
            keys.sort();
            for key in keys {
                write!(f, " [{}={}]", key, attrs[key])?;
            }
        }
        Ok(())
    }
}
