//! Lua 5.4 engine adapter
//!
//! Provides the `LuaSession` that implements `ScriptEnginePort` from the
//! application layer, backed by mlua.
//!
//! # Modules
//!
//! - `handles` — Registry-key store behind opaque function/object handles
//! - `convert` — `LuaValue` ↔ `ScriptValue` conversion
//! - `sandbox` — C module blocking for safety
//! - `globals_lock` — Allow-list protection of the global namespace
//! - `bridge` — Host callables into Lua, Lua callables back to the host
//! - `objects` — Live host-object userdata wrappers
//! - `lua_session` — Session struct tying everything together

mod bridge;
mod convert;
mod globals_lock;
mod handles;
mod lua_session;
mod objects;
mod sandbox;

pub use lua_session::LuaSession;
pub use objects::{SharedItem, SharedVec2};
