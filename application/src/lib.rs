//! Application layer for luagate
//!
//! Defines the ports through which the host talks to the scripting engine
//! and the use cases built on top of them. Nothing here depends on mlua;
//! the concrete `LuaSession` lives in the infrastructure layer.

pub mod ports;
pub mod use_cases;

pub use ports::script_engine::{MethodReceiver, ScriptEnginePort, ScriptError};
pub use use_cases::load_scripts::{LoadSummary, discover_scripts, load_scripts};
