//! Infrastructure layer for luagate
//!
//! Concrete adapters for the ports defined in the application layer. The
//! only adapter family here is the Lua 5.4 engine session backed by mlua.

pub mod scripting;

pub use scripting::{LuaSession, SharedItem, SharedVec2};
