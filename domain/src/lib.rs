//! Domain layer for luagate
//!
//! This crate contains the boundary value model and record marshaling.
//! It has no dependency on the Lua runtime; the engine lives in the
//! infrastructure layer behind `ScriptEnginePort`.
//!
//! # Core Concepts
//!
//! ## ScriptValue
//!
//! Every value crossing the host/script boundary is represented as the
//! explicit tagged union [`ScriptValue`]. Conversion functions validate the
//! expected kind before use rather than assuming it.
//!
//! ## Records
//!
//! Host-native typed records ([`ItemRecord`], [`Vec2`]) convert to and from
//! script tables through the [`TableRecord`] trait. Fields are matched by
//! name, never by position, and numeric fields go through a text-based
//! parse (see `marshal`).

pub mod marshal;
pub mod value;

// Re-export commonly used types
pub use marshal::{
    MarshalError, TableRecord, int_field, item::ItemRecord, number_field, string_field,
    string_map_field, vec2::Vec2,
};
pub use value::{FunctionHandle, ObjectHandle, ScriptTable, ScriptValue};
