//! Function bridge — callables crossing the boundary in both directions.
//!
//! Host → script: a `MethodReceiver` method is wrapped in a Lua closure
//! that converts positional arguments, dispatches by method name, and
//! converts the ordered results back. The bridge is untyped: a table that
//! happens to match a record shape is converted explicitly by the caller,
//! never here.
//!
//! Script → host: a stored function handle is resolved from the registry
//! and called synchronously; a script runtime error propagates to the
//! caller as `ScriptError::Exec` with the engine diagnostic.

use luagate_application::{MethodReceiver, ScriptError};
use luagate_domain::{FunctionHandle, ScriptValue};
use mlua::prelude::*;
use std::sync::{Arc, Mutex};

use super::convert::{lua_to_script, script_to_lua};
use super::handles::HandleStore;

/// Wrap `receiver.method` as a Lua function.
pub(crate) fn make_host_function(
    lua: &Lua,
    receiver: Arc<dyn MethodReceiver>,
    method: &str,
    store: Arc<Mutex<HandleStore>>,
) -> LuaResult<LuaFunction> {
    let method = method.to_string();
    lua.create_function(move |lua, args: LuaMultiValue| {
        let mut script_args = Vec::with_capacity(args.len());
        for value in args {
            script_args.push(lua_to_script(lua, value, &store)?);
        }

        let results = receiver
            .dispatch(&method, script_args)
            .map_err(LuaError::external)?;

        let mut out = Vec::with_capacity(results.len());
        for value in &results {
            out.push(script_to_lua(lua, value, &store)?);
        }
        Ok(LuaMultiValue::from_vec(out))
    })
}

/// Invoke a script-side callable by handle.
pub(crate) fn call_handle(
    lua: &Lua,
    store: &Arc<Mutex<HandleStore>>,
    handle: FunctionHandle,
    args: Vec<ScriptValue>,
) -> Result<Vec<ScriptValue>, ScriptError> {
    let func: LuaFunction = {
        let guard = store.lock().map_err(|e| {
            ScriptError::ContractViolation(format!("handle store lock poisoned: {}", e))
        })?;
        let key = guard
            .function_key(handle)
            .ok_or(ScriptError::InvalidHandle(handle.0))?;
        lua.registry_value(key)
            .map_err(|e| ScriptError::Exec(e.to_string()))?
    };

    let mut lua_args = Vec::with_capacity(args.len());
    for value in &args {
        lua_args.push(
            script_to_lua(lua, value, store).map_err(|e| ScriptError::Exec(e.to_string()))?,
        );
    }

    let results: LuaMultiValue = func
        .call(LuaMultiValue::from_vec(lua_args))
        .map_err(|e| ScriptError::Exec(e.to_string()))?;

    results
        .into_iter()
        .map(|value| {
            lua_to_script(lua, value, store).map_err(|e| ScriptError::Exec(e.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Receiver that appends dispatched strings to an accumulator.
    struct Accumulator {
        lines: Mutex<Vec<String>>,
    }

    impl Accumulator {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                lines: Mutex::new(Vec::new()),
            })
        }
    }

    impl MethodReceiver for Accumulator {
        fn dispatch(
            &self,
            method: &str,
            args: Vec<ScriptValue>,
        ) -> Result<Vec<ScriptValue>, ScriptError> {
            match method {
                "append" => {
                    let Some(ScriptValue::String(line)) = args.into_iter().next() else {
                        return Err(ScriptError::BadArgument {
                            index: 1,
                            expected: "string",
                        });
                    };
                    self.lines.lock().unwrap().push(line);
                    Ok(vec![ScriptValue::Bool(true)])
                }
                other => Err(ScriptError::UnknownMethod {
                    method: other.to_string(),
                }),
            }
        }
    }

    fn store() -> Arc<Mutex<HandleStore>> {
        Arc::new(Mutex::new(HandleStore::new()))
    }

    #[test]
    fn test_script_calls_host_method() {
        let lua = Lua::new();
        let store = store();
        let receiver = Accumulator::new();

        let func = make_host_function(
            &lua,
            Arc::clone(&receiver) as Arc<dyn MethodReceiver>,
            "append",
            Arc::clone(&store),
        )
        .unwrap();
        lua.globals().set("console_out", func).unwrap();

        let ok: bool = lua.load(r#"return console_out("ping")"#).eval().unwrap();
        assert!(ok);
        assert_eq!(*receiver.lines.lock().unwrap(), vec!["ping".to_string()]);
    }

    #[test]
    fn test_unknown_method_surfaces_as_script_error() {
        let lua = Lua::new();
        let receiver = Accumulator::new();

        let func = make_host_function(
            &lua,
            receiver as Arc<dyn MethodReceiver>,
            "no_such_method",
            store(),
        )
        .unwrap();
        lua.globals().set("broken", func).unwrap();

        let err = lua.load("broken()").exec().unwrap_err();
        assert!(err.to_string().contains("no_such_method"));
    }

    #[test]
    fn test_bad_argument_surfaces_as_script_error() {
        let lua = Lua::new();
        let receiver = Accumulator::new();

        let func = make_host_function(&lua, receiver as Arc<dyn MethodReceiver>, "append", store())
            .unwrap();
        lua.globals().set("console_out", func).unwrap();

        let err = lua.load("console_out(42)").exec().unwrap_err();
        assert!(err.to_string().contains("bad argument"));
    }

    #[test]
    fn test_host_calls_script_function() {
        let lua = Lua::new();
        let store = store();

        let func: LuaValue = lua
            .load("function(s) return s .. '!', #s end")
            .eval()
            .unwrap();
        let handle = lua_to_script(&lua, func, &store)
            .unwrap()
            .as_function()
            .unwrap();

        let results = call_handle(
            &lua,
            &store,
            handle,
            vec![ScriptValue::String("ping".to_string())],
        )
        .unwrap();

        assert_eq!(
            results,
            vec![
                ScriptValue::String("ping!".to_string()),
                ScriptValue::Number(4.0),
            ]
        );
    }

    #[test]
    fn test_script_error_propagates_with_message() {
        let lua = Lua::new();
        let store = store();

        let func: LuaValue = lua
            .load("function() error('boom from script') end")
            .eval()
            .unwrap();
        let handle = lua_to_script(&lua, func, &store)
            .unwrap()
            .as_function()
            .unwrap();

        let err = call_handle(&lua, &store, handle, Vec::new()).unwrap_err();
        let ScriptError::Exec(message) = err else {
            panic!("expected an execution failure");
        };
        assert!(message.contains("boom from script"));
    }

    #[test]
    fn test_invalid_handle_is_hard_failure() {
        let lua = Lua::new();
        let err = call_handle(&lua, &store(), FunctionHandle(123), Vec::new()).unwrap_err();
        assert!(matches!(err, ScriptError::InvalidHandle(123)));
    }

    #[test]
    fn test_call_with_no_results() {
        let lua = Lua::new();
        let store = store();

        let func: LuaValue = lua.load("function() end").eval().unwrap();
        let handle = lua_to_script(&lua, func, &store)
            .unwrap()
            .as_function()
            .unwrap();

        let results = call_handle(&lua, &store, handle, Vec::new()).unwrap();
        assert!(results.is_empty());
    }
}
