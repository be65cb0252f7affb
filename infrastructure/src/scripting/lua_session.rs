//! Lua session — one engine instance plus its global namespace.
//!
//! `LuaSession` implements `ScriptEnginePort` from the application layer,
//! providing the concrete Lua 5.4 runtime backed by mlua. Every operation
//! runs synchronously to completion on the calling thread; the VM sits
//! behind a `Mutex` and nothing is shared across sessions.

use luagate_application::{MethodReceiver, ScriptEnginePort, ScriptError};
use luagate_domain::{FunctionHandle, ObjectHandle, ScriptValue};
use mlua::prelude::*;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::debug;

use super::bridge::{call_handle, make_host_function};
use super::convert::{lua_to_script, script_to_lua};
use super::globals_lock::GlobalsLock;
use super::handles::HandleStore;
use super::sandbox::apply_sandbox;

/// Lua 5.4 engine session implementing `ScriptEnginePort`.
///
/// Owns the VM, the handle store, and the optional namespace lock. Handles
/// issued by this session stay valid until it is dropped and must not be
/// used with any other session.
pub struct LuaSession {
    lua: Mutex<Lua>,
    store: Arc<Mutex<HandleStore>>,
    lock: Mutex<Option<GlobalsLock>>,
}

fn lua_err(e: LuaError) -> ScriptError {
    ScriptError::Exec(e.to_string())
}

/// Syntax errors are load failures; everything else raised by a chunk is
/// an execution failure.
fn chunk_err(e: LuaError) -> ScriptError {
    match &e {
        LuaError::SyntaxError { .. } => ScriptError::Load(e.to_string()),
        _ => ScriptError::Exec(e.to_string()),
    }
}

fn session_poisoned<E: std::fmt::Display>(e: E) -> ScriptError {
    ScriptError::ContractViolation(format!("session state poisoned: {}", e))
}

impl LuaSession {
    /// Create a session with the C-module sandbox applied.
    pub fn new() -> Result<Self, ScriptError> {
        let lua = Lua::new();
        apply_sandbox(&lua).map_err(|e| ScriptError::Exec(format!("sandbox setup failed: {}", e)))?;

        Ok(Self {
            lua: Mutex::new(lua),
            store: Arc::new(Mutex::new(HandleStore::new())),
            lock: Mutex::new(None),
        })
    }

    /// Pin a host object in the registry and hand back its opaque handle.
    ///
    /// The handle is installed into script space with `set_global`, which
    /// under an armed lock means suspending first — scripts cannot
    /// construct a live host reference themselves.
    pub fn create_host_object<T>(&self, value: T) -> Result<ObjectHandle, ScriptError>
    where
        T: LuaUserData + Send + 'static,
    {
        let lua = self.lua.lock().map_err(session_poisoned)?;
        let ud = lua.create_userdata(value).map_err(lua_err)?;
        let key = lua.create_registry_value(ud).map_err(lua_err)?;
        let mut store = self.store.lock().map_err(session_poisoned)?;
        Ok(store.add_object(key))
    }

    /// Append `<dir>/?.lua` to the module search path so scripts can
    /// `require` modules from the host's script directory.
    pub fn add_package_path(&self, dir: &Path) -> Result<(), ScriptError> {
        // Lua re-escapes backslashes when the source is parsed.
        let dir = dir.display().to_string().replace('\\', "\\\\");
        self.exec(&format!(
            "package.path = package.path .. ';{}/?.lua'",
            dir
        ))
    }

    fn run_chunk(&self, lua: &Lua, source: &str, name: &str) -> Result<(), ScriptError> {
        let lock = self.lock.lock().map_err(session_poisoned)?;
        let chunk = lua.load(source).set_name(name);
        let chunk = match lock.as_ref() {
            Some(lock) => chunk.set_environment(lock.proxy()),
            None => chunk,
        };
        drop(lock);
        chunk.exec().map_err(chunk_err)
    }
}

impl ScriptEnginePort for LuaSession {
    fn get_global(&self, name: &str) -> Result<ScriptValue, ScriptError> {
        let lua = self.lua.lock().map_err(session_poisoned)?;
        let lock = self.lock.lock().map_err(session_poisoned)?;
        let value = match lock.as_ref() {
            Some(lock) => lock.read(name)?,
            None => lua.globals().get::<LuaValue>(name).map_err(lua_err)?,
        };
        drop(lock);
        lua_to_script(&lua, value, &self.store).map_err(lua_err)
    }

    fn set_global(&self, name: &str, value: ScriptValue) -> Result<(), ScriptError> {
        let lua = self.lua.lock().map_err(session_poisoned)?;
        let value = script_to_lua(&lua, &value, &self.store).map_err(lua_err)?;
        let lock = self.lock.lock().map_err(session_poisoned)?;
        match lock.as_ref() {
            Some(lock) => lock.write(name, value),
            None => lua.globals().set(name, value).map_err(lua_err),
        }
    }

    fn exec(&self, source: &str) -> Result<(), ScriptError> {
        let lua = self.lua.lock().map_err(session_poisoned)?;
        self.run_chunk(&lua, source, "inline chunk")
    }

    fn load_script(&self, path: &Path) -> Result<(), ScriptError> {
        let lua = self.lua.lock().map_err(session_poisoned)?;
        let source = std::fs::read_to_string(path)
            .map_err(|e| ScriptError::Load(format!("failed to read {}: {}", path.display(), e)))?;

        debug!(script = %path.display(), "executing script");
        self.run_chunk(&lua, &source, &path.to_string_lossy())
    }

    fn register_function(
        &self,
        name: &str,
        receiver: Arc<dyn MethodReceiver>,
        method: &str,
    ) -> Result<(), ScriptError> {
        let lua = self.lua.lock().map_err(session_poisoned)?;
        let func =
            make_host_function(&lua, receiver, method, Arc::clone(&self.store)).map_err(lua_err)?;

        let lock = self.lock.lock().map_err(session_poisoned)?;
        match lock.as_ref() {
            Some(lock) => lock.write(name, LuaValue::Function(func)),
            None => lua.globals().set(name, func).map_err(lua_err),
        }
    }

    fn call_function(
        &self,
        handle: FunctionHandle,
        args: Vec<ScriptValue>,
    ) -> Result<Vec<ScriptValue>, ScriptError> {
        let lua = self.lua.lock().map_err(session_poisoned)?;
        call_handle(&lua, &self.store, handle, args)
    }

    fn lock_globals(&self, allow: &[String]) -> Result<(), ScriptError> {
        let lua = self.lua.lock().map_err(session_poisoned)?;
        let mut lock = self.lock.lock().map_err(session_poisoned)?;
        if lock.is_some() {
            return Err(ScriptError::ContractViolation(
                "global namespace is already locked".to_string(),
            ));
        }
        *lock = Some(GlobalsLock::install(&lua, allow).map_err(lua_err)?);
        debug!(allowed = allow.len(), "global namespace locked");
        Ok(())
    }

    fn suspend_lock(&self) -> Result<(), ScriptError> {
        let lock = self.lock.lock().map_err(session_poisoned)?;
        lock.as_ref()
            .ok_or_else(|| {
                ScriptError::ContractViolation("namespace lock is not installed".to_string())
            })?
            .suspend()
    }

    fn restore_lock(&self) -> Result<(), ScriptError> {
        let lock = self.lock.lock().map_err(session_poisoned)?;
        lock.as_ref()
            .ok_or_else(|| {
                ScriptError::ContractViolation("namespace lock is not installed".to_string())
            })?
            .restore()
    }
}
