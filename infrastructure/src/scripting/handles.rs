//! Registry-key store behind the opaque boundary handles.
//!
//! Script functions and host objects crossing the boundary are pinned in
//! the Lua registry; the host only ever sees a `u64`-backed handle. Entries
//! live until the session is dropped — there is no mid-session
//! invalidation.

use luagate_domain::{FunctionHandle, ObjectHandle};
use mlua::prelude::*;

pub(crate) struct HandleStore {
    functions: Vec<(u64, LuaRegistryKey)>,
    objects: Vec<(u64, LuaRegistryKey)>,
    next_id: u64,
}

impl HandleStore {
    pub fn new() -> Self {
        Self {
            functions: Vec::new(),
            objects: Vec::new(),
            next_id: 1,
        }
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn add_function(&mut self, key: LuaRegistryKey) -> FunctionHandle {
        let id = self.next_id();
        self.functions.push((id, key));
        FunctionHandle(id)
    }

    pub fn function_key(&self, handle: FunctionHandle) -> Option<&LuaRegistryKey> {
        self.functions
            .iter()
            .find(|(id, _)| *id == handle.0)
            .map(|(_, key)| key)
    }

    pub fn add_object(&mut self, key: LuaRegistryKey) -> ObjectHandle {
        let id = self.next_id();
        self.objects.push((id, key));
        ObjectHandle(id)
    }

    pub fn object_key(&self, handle: ObjectHandle) -> Option<&LuaRegistryKey> {
        self.objects
            .iter()
            .find(|(id, _)| *id == handle.0)
            .map(|(_, key)| key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_are_unique_across_kinds() {
        let lua = Lua::new();
        let mut store = HandleStore::new();

        let f = lua.create_function(|_, ()| Ok(())).unwrap();
        let fh = store.add_function(lua.create_registry_value(f).unwrap());
        let t = lua.create_table().unwrap();
        let oh = store.add_object(lua.create_registry_value(t).unwrap());

        assert_ne!(fh.0, oh.0);
        assert!(store.function_key(fh).is_some());
        assert!(store.object_key(oh).is_some());
    }

    #[test]
    fn test_unknown_handle_is_none() {
        let store = HandleStore::new();
        assert!(store.function_key(FunctionHandle(99)).is_none());
        assert!(store.object_key(ObjectHandle(99)).is_none());
    }
}
