//! `LuaValue` ↔ `ScriptValue` conversion.
//!
//! Lua integers widen to doubles on the way out (all numeric script values
//! are doubles); functions and userdata are pinned in the registry and
//! replaced by opaque handles. Tables convert recursively in whatever
//! order the runtime enumerates them.

use luagate_domain::{ScriptTable, ScriptValue};
use mlua::prelude::*;
use std::sync::{Arc, Mutex};

use super::handles::HandleStore;

pub(crate) fn lua_to_script(
    lua: &Lua,
    value: LuaValue,
    store: &Arc<Mutex<HandleStore>>,
) -> LuaResult<ScriptValue> {
    match value {
        LuaValue::Nil => Ok(ScriptValue::Nil),
        LuaValue::Boolean(b) => Ok(ScriptValue::Bool(b)),
        LuaValue::Integer(n) => Ok(ScriptValue::Number(n as f64)),
        LuaValue::Number(n) => Ok(ScriptValue::Number(n)),
        LuaValue::String(s) => Ok(ScriptValue::String(s.to_str()?.to_string())),
        LuaValue::Table(table) => {
            let mut out = ScriptTable::new();
            for pair in table.pairs::<LuaValue, LuaValue>() {
                let (key, value) = pair?;
                out.insert(
                    lua_to_script(lua, key, store)?,
                    lua_to_script(lua, value, store)?,
                );
            }
            Ok(ScriptValue::Table(out))
        }
        LuaValue::Function(f) => {
            let key = lua.create_registry_value(f)?;
            let mut store = store
                .lock()
                .map_err(|e| LuaError::external(format!("handle store lock poisoned: {}", e)))?;
            Ok(ScriptValue::Function(store.add_function(key)))
        }
        LuaValue::UserData(ud) => {
            let key = lua.create_registry_value(ud)?;
            let mut store = store
                .lock()
                .map_err(|e| LuaError::external(format!("handle store lock poisoned: {}", e)))?;
            Ok(ScriptValue::HostObject(store.add_object(key)))
        }
        other => Err(LuaError::external(format!(
            "unsupported value kind crossing the boundary: {}",
            other.type_name()
        ))),
    }
}

pub(crate) fn script_to_lua(
    lua: &Lua,
    value: &ScriptValue,
    store: &Arc<Mutex<HandleStore>>,
) -> LuaResult<LuaValue> {
    match value {
        ScriptValue::Nil => Ok(LuaValue::Nil),
        ScriptValue::Bool(b) => Ok(LuaValue::Boolean(*b)),
        ScriptValue::Number(n) => Ok(LuaValue::Number(*n)),
        ScriptValue::String(s) => Ok(LuaValue::String(lua.create_string(s)?)),
        ScriptValue::Table(table) => {
            let out = lua.create_table()?;
            for (key, value) in table.iter() {
                out.raw_set(
                    script_to_lua(lua, key, store)?,
                    script_to_lua(lua, value, store)?,
                )?;
            }
            Ok(LuaValue::Table(out))
        }
        ScriptValue::Function(handle) => {
            let store = store
                .lock()
                .map_err(|e| LuaError::external(format!("handle store lock poisoned: {}", e)))?;
            let key = store.function_key(*handle).ok_or_else(|| {
                LuaError::external(format!("invalid function handle #{}", handle.0))
            })?;
            Ok(LuaValue::Function(lua.registry_value(key)?))
        }
        ScriptValue::HostObject(handle) => {
            let store = store
                .lock()
                .map_err(|e| LuaError::external(format!("handle store lock poisoned: {}", e)))?;
            let key = store.object_key(*handle).ok_or_else(|| {
                LuaError::external(format!("invalid object handle #{}", handle.0))
            })?;
            Ok(LuaValue::UserData(lua.registry_value(key)?))
        }
    }
}
