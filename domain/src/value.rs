//! Boundary value model
//!
//! Defines the tagged union for values crossing the host/script boundary.
//! The engine adapter in the infrastructure layer converts these to and
//! from the runtime's native representation; nothing in this module knows
//! about Lua.

/// Opaque reference to a script-side callable.
///
/// Handles are issued by the session when a function value crosses the
/// boundary and stay valid until the session is torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FunctionHandle(pub u64);

/// Opaque reference to a live host object installed into script space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectHandle(pub u64);

/// A value on the script side of the boundary.
///
/// All numeric script values are double-precision; host integers must be
/// re-parsed explicitly when they come back (see the `marshal` module).
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptValue {
    Nil,
    Bool(bool),
    Number(f64),
    String(String),
    Table(ScriptTable),
    Function(FunctionHandle),
    HostObject(ObjectHandle),
}

impl ScriptValue {
    /// Human-readable kind name, used in marshaling diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Table(_) => "table",
            Self::Function(_) => "function",
            Self::HostObject(_) => "host object",
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&ScriptTable> {
        match self {
            Self::Table(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<FunctionHandle> {
        match self {
            Self::Function(h) => Some(*h),
            _ => None,
        }
    }
}

impl std::fmt::Display for ScriptValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nil => write!(f, "nil"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Number(n) => write!(f, "{}", n),
            Self::String(s) => write!(f, "{}", s),
            Self::Table(t) => write!(f, "table({} entries)", t.len()),
            Self::Function(h) => write!(f, "function#{}", h.0),
            Self::HostObject(h) => write!(f, "hostobject#{}", h.0),
        }
    }
}

impl From<f64> for ScriptValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for ScriptValue {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<bool> for ScriptValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for ScriptValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for ScriptValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

/// A script table: key/value pairs in insertion order.
///
/// Tables arriving from the engine carry whatever enumeration order the
/// runtime produced; consumers must not depend on it. String-key lookup is
/// a linear scan, which is fine at record-field scale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptTable {
    entries: Vec<(ScriptValue, ScriptValue)>,
}

impl ScriptTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. Existing entries under an equal key are replaced.
    pub fn insert(&mut self, key: ScriptValue, value: ScriptValue) {
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// Insert under a string key.
    pub fn insert_str(&mut self, key: impl Into<String>, value: ScriptValue) {
        self.insert(ScriptValue::String(key.into()), value);
    }

    /// Look up a value by string key.
    pub fn get_str(&self, key: &str) -> Option<&ScriptValue> {
        self.entries.iter().find_map(|(k, v)| match k {
            ScriptValue::String(s) if s == key => Some(v),
            _ => None,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &(ScriptValue, ScriptValue)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Values in entry order, ignoring keys. Used for table-of-tables
    /// results where the script used array-style indices.
    pub fn values(&self) -> impl Iterator<Item = &ScriptValue> {
        self.entries.iter().map(|(_, v)| v)
    }
}

impl FromIterator<(ScriptValue, ScriptValue)> for ScriptTable {
    fn from_iter<I: IntoIterator<Item = (ScriptValue, ScriptValue)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (k, v) in iter {
            table.insert(k, v);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(ScriptValue::Nil.kind(), "nil");
        assert_eq!(ScriptValue::Number(1.5).kind(), "number");
        assert_eq!(ScriptValue::from("x").kind(), "string");
        assert_eq!(ScriptValue::Table(ScriptTable::new()).kind(), "table");
        assert_eq!(
            ScriptValue::Function(FunctionHandle(3)).kind(),
            "function"
        );
    }

    #[test]
    fn test_integer_widens_to_double() {
        let value = ScriptValue::from(25_i64);
        assert_eq!(value.as_number(), Some(25.0));
    }

    #[test]
    fn test_table_string_lookup() {
        let mut table = ScriptTable::new();
        table.insert_str("label", ScriptValue::from("sword"));
        table.insert_str("count", ScriptValue::from(3_i64));

        assert_eq!(table.get_str("label").and_then(|v| v.as_str()), Some("sword"));
        assert_eq!(table.get_str("count").and_then(|v| v.as_number()), Some(3.0));
        assert!(table.get_str("missing").is_none());
    }

    #[test]
    fn test_table_insert_replaces_existing_key() {
        let mut table = ScriptTable::new();
        table.insert_str("x", ScriptValue::from(1.0));
        table.insert_str("x", ScriptValue::from(2.0));

        assert_eq!(table.len(), 1);
        assert_eq!(table.get_str("x").and_then(|v| v.as_number()), Some(2.0));
    }

    #[test]
    fn test_table_preserves_insertion_order() {
        let mut table = ScriptTable::new();
        table.insert_str("a", ScriptValue::from(1.0));
        table.insert_str("b", ScriptValue::from(2.0));
        table.insert_str("c", ScriptValue::from(3.0));

        let keys: Vec<_> = table
            .iter()
            .filter_map(|(k, _)| k.as_str().map(str::to_string))
            .collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_values_ignores_keys() {
        let mut table = ScriptTable::new();
        table.insert(ScriptValue::Number(1.0), ScriptValue::from("one"));
        table.insert(ScriptValue::Number(2.0), ScriptValue::from("two"));

        let values: Vec<_> = table.values().filter_map(|v| v.as_str()).collect();
        assert_eq!(values, vec!["one", "two"]);
    }
}
