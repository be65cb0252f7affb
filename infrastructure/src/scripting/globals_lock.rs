//! Allow-list protection of the global namespace.
//!
//! Once installed, every global access — from scripts and from the host —
//! is mediated by an always-empty proxy table whose `__index`/`__newindex`
//! metamethods close over the shared lock state, the fixed allow-list, and
//! the real globals table (the backing store). Chunks loaded after
//! installation run with the proxy as their environment.
//!
//! Rules while `Locked`:
//! - reading a name that is neither declared in the backing store nor on
//!   the allow-list raises, so typos surface instead of yielding nil;
//! - writing any name not on the allow-list raises, declared or not.
//!
//! `Suspended` bypasses both checks with raw backing-store access. Only the
//! host can suspend or restore; scripts have no operation that touches lock
//! state. Installation is one-time and there is no path back to unlocked.

use luagate_application::ScriptError;
use mlua::prelude::*;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LockState {
    Locked,
    Suspended,
}

pub(crate) struct GlobalsLock {
    state: Arc<Mutex<LockState>>,
    allowed: Arc<HashSet<String>>,
    proxy: LuaTable,
    backing: LuaTable,
}

fn state_poisoned<E: std::fmt::Display>(e: E) -> ScriptError {
    ScriptError::ContractViolation(format!("lock state poisoned: {}", e))
}

impl GlobalsLock {
    /// Build the proxy and arm the lock.
    pub fn install(lua: &Lua, allow: &[String]) -> LuaResult<Self> {
        let state = Arc::new(Mutex::new(LockState::Locked));
        let allowed: Arc<HashSet<String>> = Arc::new(allow.iter().cloned().collect());
        let backing = lua.globals();
        let proxy = lua.create_table()?;
        let meta = lua.create_table()?;

        {
            let state = Arc::clone(&state);
            let allowed = Arc::clone(&allowed);
            let backing = backing.clone();
            let index_fn =
                lua.create_function(move |_, (_proxy, key): (LuaTable, LuaValue)| {
                    let LuaValue::String(name) = &key else {
                        // Non-string keys are outside the name contract.
                        return backing.raw_get::<LuaValue>(key);
                    };
                    let name = name.to_str()?.to_string();
                    let state = *state.lock().map_err(|e| {
                        LuaError::external(format!("lock state poisoned: {}", e))
                    })?;

                    let value: LuaValue = backing.raw_get(name.as_str())?;
                    match state {
                        LockState::Suspended => Ok(value),
                        LockState::Locked => {
                            if !value.is_nil() || allowed.contains(&name) {
                                Ok(value)
                            } else {
                                Err(LuaError::RuntimeError(format!(
                                    "attempt to read undeclared global '{}'",
                                    name
                                )))
                            }
                        }
                    }
                })?;
            meta.set("__index", index_fn)?;
        }

        {
            let state = Arc::clone(&state);
            let allowed = Arc::clone(&allowed);
            let backing = backing.clone();
            let newindex_fn = lua.create_function(
                move |_, (_proxy, key, value): (LuaTable, LuaValue, LuaValue)| {
                    let LuaValue::String(name) = &key else {
                        return backing.raw_set(key, value);
                    };
                    let name = name.to_str()?.to_string();
                    let state = *state.lock().map_err(|e| {
                        LuaError::external(format!("lock state poisoned: {}", e))
                    })?;

                    match state {
                        LockState::Suspended => backing.raw_set(name, value),
                        LockState::Locked => {
                            if allowed.contains(&name) {
                                backing.raw_set(name, value)
                            } else {
                                Err(LuaError::RuntimeError(format!(
                                    "attempt to write protected global '{}'",
                                    name
                                )))
                            }
                        }
                    }
                },
            )?;
            meta.set("__newindex", newindex_fn)?;
        }

        // Scripts that reach for _G get the proxy, not the backing store,
        // and getmetatable cannot hand the raw metatable back.
        meta.set("__metatable", "locked")?;
        proxy.raw_set("_G", &proxy)?;
        proxy.set_metatable(Some(meta));

        Ok(Self {
            state,
            allowed,
            proxy,
            backing,
        })
    }

    /// The environment table for chunks loaded under the lock.
    pub fn proxy(&self) -> LuaTable {
        self.proxy.clone()
    }

    /// Host-side read, same rules the metamethods enforce.
    pub fn read(&self, name: &str) -> Result<LuaValue, ScriptError> {
        let state = *self.state.lock().map_err(state_poisoned)?;
        let value: LuaValue = self
            .backing
            .raw_get(name)
            .map_err(|e| ScriptError::Exec(e.to_string()))?;

        match state {
            LockState::Suspended => Ok(value),
            LockState::Locked => {
                if !value.is_nil() || self.allowed.contains(name) {
                    Ok(value)
                } else {
                    Err(ScriptError::GuardViolation {
                        name: name.to_string(),
                    })
                }
            }
        }
    }

    /// Host-side write, same rules the metamethods enforce.
    pub fn write(&self, name: &str, value: LuaValue) -> Result<(), ScriptError> {
        let state = *self.state.lock().map_err(state_poisoned)?;
        match state {
            LockState::Suspended => {}
            LockState::Locked => {
                if !self.allowed.contains(name) {
                    return Err(ScriptError::GuardViolation {
                        name: name.to_string(),
                    });
                }
            }
        }
        self.backing
            .raw_set(name, value)
            .map_err(|e| ScriptError::Exec(e.to_string()))
    }

    /// `Locked` → `Suspended`. A second suspend without an intervening
    /// restore is a contract violation, never silently coalesced.
    pub fn suspend(&self) -> Result<(), ScriptError> {
        let mut state = self.state.lock().map_err(state_poisoned)?;
        match *state {
            LockState::Locked => {
                *state = LockState::Suspended;
                Ok(())
            }
            LockState::Suspended => Err(ScriptError::ContractViolation(
                "namespace lock is already suspended".to_string(),
            )),
        }
    }

    /// `Suspended` → `Locked`.
    pub fn restore(&self) -> Result<(), ScriptError> {
        let mut state = self.state.lock().map_err(state_poisoned)?;
        match *state {
            LockState::Suspended => {
                *state = LockState::Locked;
                Ok(())
            }
            LockState::Locked => Err(ScriptError::ContractViolation(
                "namespace lock is not suspended".to_string(),
            )),
        }
    }
}
