//! Script engine port — interface for the embedded scripting runtime.
//!
//! This port abstracts the engine so the application layer and the host
//! driver never depend on mlua. One session owns one engine instance plus
//! its global namespace; every operation runs synchronously to completion
//! on the calling thread.

use luagate_domain::{FunctionHandle, MarshalError, ScriptValue};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Error from a script engine operation.
///
/// `Load` and `Exec` are runtime conditions a caller may recover from.
/// `Marshal` and `GuardViolation` point at the offending field or name.
/// The remaining variants are contract misuse by the embedding code and
/// should be escalated, not swallowed.
#[derive(Error, Debug)]
pub enum ScriptError {
    /// Script source could not be loaded: missing file or parse error.
    #[error("failed to load script: {0}")]
    Load(String),

    /// A runtime error raised while a chunk or callable was executing,
    /// carrying the engine's diagnostic message.
    #[error("script execution failed: {0}")]
    Exec(String),

    /// A table → record conversion failed; names the offending field.
    #[error(transparent)]
    Marshal(#[from] MarshalError),

    /// Access to a global name the lock does not permit.
    #[error("global '{name}' is protected by the namespace lock")]
    GuardViolation { name: String },

    /// Misuse of the session API: nested suspend, restore without suspend,
    /// locking twice, and the like.
    #[error("session contract violated: {0}")]
    ContractViolation(String),

    /// A function handle the session never issued (or from another session).
    #[error("invalid function handle #{0}")]
    InvalidHandle(u64),

    /// A registered receiver has no method with the requested name.
    #[error("receiver has no method '{method}'")]
    UnknownMethod { method: String },

    /// A cross-boundary call supplied a wrong argument count or kind.
    #[error("bad argument #{index}: expected {expected}")]
    BadArgument { index: usize, expected: &'static str },
}

/// A host object whose methods scripts may invoke through a registered name.
///
/// The method is resolved by name at call time; registration never checks
/// that the method exists, so a typo surfaces as an [`ScriptError::UnknownMethod`]
/// when the script first calls it. Arity and argument-kind mismatches are
/// likewise call-time failures, reported through [`ScriptError::BadArgument`].
pub trait MethodReceiver: Send + Sync {
    fn dispatch(
        &self,
        method: &str,
        args: Vec<ScriptValue>,
    ) -> Result<Vec<ScriptValue>, ScriptError>;
}

/// Port for one scripting engine session.
///
/// Global access is subject to the namespace lock once installed; the lock
/// itself is driven exclusively through the host-side methods below —
/// script code has no operation that alters lock state.
pub trait ScriptEnginePort: Send + Sync {
    /// Read a named global. Returns `ScriptValue::Nil` for an absent name
    /// while unlocked; raises a guard violation for undeclared names while
    /// locked.
    fn get_global(&self, name: &str) -> Result<ScriptValue, ScriptError>;

    /// Write a named global, subject to lock state.
    fn set_global(&self, name: &str, value: ScriptValue) -> Result<(), ScriptError>;

    /// Execute a chunk of script source text.
    fn exec(&self, source: &str) -> Result<(), ScriptError>;

    /// Load and execute a script file. A missing file or syntax error is a
    /// [`ScriptError::Load`]; the session stays usable and subsequent
    /// independent loads still proceed.
    fn load_script(&self, path: &Path) -> Result<(), ScriptError>;

    /// Bind `receiver.method` to a global function scripts call by `name`.
    ///
    /// Writes a function global, so under an active lock the name must be
    /// allow-listed or the lock suspended.
    fn register_function(
        &self,
        name: &str,
        receiver: Arc<dyn MethodReceiver>,
        method: &str,
    ) -> Result<(), ScriptError>;

    /// Invoke a script-side callable with ordered arguments, returning its
    /// ordered results (possibly empty). The call is synchronous; a script
    /// runtime error propagates as [`ScriptError::Exec`].
    fn call_function(
        &self,
        handle: FunctionHandle,
        args: Vec<ScriptValue>,
    ) -> Result<Vec<ScriptValue>, ScriptError>;

    /// Install the namespace lock with a fixed allow-list. One-time and
    /// irreversible for the life of the session.
    fn lock_globals(&self, allow: &[String]) -> Result<(), ScriptError>;

    /// Suspend the lock for privileged host writes. Not reentrant.
    fn suspend_lock(&self) -> Result<(), ScriptError>;

    /// Re-arm a suspended lock.
    fn restore_lock(&self) -> Result<(), ScriptError>;
}
