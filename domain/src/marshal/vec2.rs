//! 2-component vector record.

use serde::{Deserialize, Serialize};

use super::{MarshalError, TableRecord, number_field};
use crate::value::{ScriptTable, ScriptValue};

/// A 2D vector of doubles, marshaled as `{ x = ..., y = ... }`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

impl TableRecord for Vec2 {
    fn to_table(&self) -> ScriptTable {
        let mut table = ScriptTable::new();
        table.insert_str("x", ScriptValue::Number(self.x));
        table.insert_str("y", ScriptValue::Number(self.y));
        table
    }

    fn from_table(table: &ScriptTable) -> Result<Self, MarshalError> {
        Ok(Self {
            x: number_field(table, "x")?,
            y: number_field(table, "y")?,
        })
    }
}

impl std::fmt::Display for Vec2 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
