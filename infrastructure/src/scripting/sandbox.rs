//! Lua sandbox — blocks C module loading for ABI safety.
//!
//! Scripts are trusted host-supplied code, but C extension modules can
//! crash the process on ABI mismatch, so `package.loadlib` and the C
//! search path are removed. Pure-Lua `require` keeps working.

use mlua::prelude::*;

/// Apply sandbox restrictions to a freshly created VM.
pub fn apply_sandbox(lua: &Lua) -> LuaResult<()> {
    lua.load(
        r#"
        package.loadlib = nil
        package.cpath = ''
    "#,
    )
    .exec()
}
