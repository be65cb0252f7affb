//! Live host-object userdata wrappers.
//!
//! A script could never legitimately construct a reference to live host
//! state; the host builds one of these wrappers around its own
//! `Arc<Mutex<…>>` and installs it as a global (suspending the namespace
//! lock if one is armed). Script-side field writes land in the shared
//! record, so the host observes them through its own `Arc`.

use luagate_domain::{ItemRecord, Vec2};
use mlua::prelude::*;
use std::sync::{Arc, Mutex};

fn record_poisoned<E: std::fmt::Display>(e: E) -> LuaError {
    LuaError::external(format!("host record lock poisoned: {}", e))
}

/// Shared, script-visible [`ItemRecord`].
#[derive(Clone)]
pub struct SharedItem(pub Arc<Mutex<ItemRecord>>);

impl SharedItem {
    pub fn new(record: ItemRecord) -> Self {
        Self(Arc::new(Mutex::new(record)))
    }
}

impl LuaUserData for SharedItem {
    fn add_fields<F: LuaUserDataFields<Self>>(fields: &mut F) {
        fields.add_field_method_get("count", |_, this| {
            Ok(this.0.lock().map_err(record_poisoned)?.count)
        });
        fields.add_field_method_set("count", |_, this, value: i64| {
            this.0.lock().map_err(record_poisoned)?.count = value;
            Ok(())
        });

        fields.add_field_method_get("weight", |_, this| {
            Ok(this.0.lock().map_err(record_poisoned)?.weight)
        });
        fields.add_field_method_set("weight", |_, this, value: f64| {
            this.0.lock().map_err(record_poisoned)?.weight = value;
            Ok(())
        });

        fields.add_field_method_get("label", |_, this| {
            Ok(this.0.lock().map_err(record_poisoned)?.label.clone())
        });
        fields.add_field_method_set("label", |_, this, value: String| {
            this.0.lock().map_err(record_poisoned)?.label = value;
            Ok(())
        });
    }

    fn add_methods<M: LuaUserDataMethods<Self>>(methods: &mut M) {
        methods.add_method("describe", |_, this, ()| {
            Ok(this.0.lock().map_err(record_poisoned)?.to_string())
        });
    }
}

/// Shared, script-visible [`Vec2`].
#[derive(Clone)]
pub struct SharedVec2(pub Arc<Mutex<Vec2>>);

impl SharedVec2 {
    pub fn new(vec: Vec2) -> Self {
        Self(Arc::new(Mutex::new(vec)))
    }
}

impl LuaUserData for SharedVec2 {
    fn add_fields<F: LuaUserDataFields<Self>>(fields: &mut F) {
        fields.add_field_method_get("x", |_, this| {
            Ok(this.0.lock().map_err(record_poisoned)?.x)
        });
        fields.add_field_method_set("x", |_, this, value: f64| {
            this.0.lock().map_err(record_poisoned)?.x = value;
            Ok(())
        });

        fields.add_field_method_get("y", |_, this| {
            Ok(this.0.lock().map_err(record_poisoned)?.y)
        });
        fields.add_field_method_set("y", |_, this, value: f64| {
            this.0.lock().map_err(record_poisoned)?.y = value;
            Ok(())
        });
    }

    fn add_methods<M: LuaUserDataMethods<Self>>(methods: &mut M) {
        methods.add_method("length", |_, this, ()| {
            Ok(this.0.lock().map_err(record_poisoned)?.length())
        });
        methods.add_method("set", |_, this, (x, y): (f64, f64)| {
            let mut vec = this.0.lock().map_err(record_poisoned)?;
            vec.x = x;
            vec.y = y;
            Ok(())
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_mutation_is_visible_to_host() {
        let lua = Lua::new();
        let shared = SharedItem::new(ItemRecord::new(5, 1.0, "old"));
        lua.globals()
            .set("item", shared.clone())
            .unwrap();

        lua.load(r#"item.label = "renamed"; item.count = item.count + 1"#)
            .exec()
            .unwrap();

        let record = shared.0.lock().unwrap();
        assert_eq!(record.label, "renamed");
        assert_eq!(record.count, 6);
    }

    #[test]
    fn test_two_instances_are_independent() {
        let lua = Lua::new();
        let first = SharedItem::new(ItemRecord::new(0, 0.0, "first"));
        let second = SharedItem::new(ItemRecord::new(0, 0.0, "second"));
        lua.globals().set("first", first.clone()).unwrap();
        lua.globals().set("second", second.clone()).unwrap();

        lua.load(r#"second.label = "changed""#).exec().unwrap();

        assert_eq!(first.0.lock().unwrap().label, "first");
        assert_eq!(second.0.lock().unwrap().label, "changed");
    }

    #[test]
    fn test_vec2_methods() {
        let lua = Lua::new();
        let shared = SharedVec2::new(Vec2::new(3.0, 4.0));
        lua.globals().set("vec", shared.clone()).unwrap();

        let length: f64 = lua.load("return vec:length()").eval().unwrap();
        assert_eq!(length, 5.0);

        lua.load("vec:set(1.5, -2.5)").exec().unwrap();
        assert_eq!(*shared.0.lock().unwrap(), Vec2::new(1.5, -2.5));
    }

    #[test]
    fn test_describe_reads_current_state() {
        let lua = Lua::new();
        let shared = SharedItem::new(ItemRecord::new(3, 1.2, "arrow"));
        lua.globals().set("item", shared).unwrap();

        let text: String = lua.load("return item:describe()").eval().unwrap();
        assert_eq!(text, "arrow x3 (1.2kg)");
    }
}
