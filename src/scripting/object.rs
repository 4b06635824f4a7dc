/// `scripting/object.rs` — the userdata behind every script-visible widget
///
/// A `ScriptObject` owns the lifecycle guard of its native handle. Methods
/// are not stored on the object: `__index` forwards to the class table of
/// the object's kind, kept in the Lua registry.
///
/// Live objects are also indexed by handle id in a weak-valued table so host
/// events can find them without keeping them alive.
use std::rc::Rc;

use mlua::{AnyUserData, Lua, MetaMethod, Result as LuaResult, Table, UserData, UserDataMethods, Value};

use crate::{
    bridge::Bridge,
    handle::{CallContext, HandleGuard, HandleId, HandleKind},
    widget::WidgetValue,
};

const OBJECTS_KEY: &str = "touchbridge.objects";

pub struct ScriptObject {
    guard: HandleGuard,
    kind: HandleKind,
}

impl ScriptObject {
    pub fn id(&self) -> HandleId {
        self.guard.id()
    }

    pub fn kind(&self) -> HandleKind {
        self.kind
    }

    fn describe(&self) -> String {
        self.guard
            .bridge()
            .and_then(|bridge| bridge.describe(self.id(), self.kind.flag()))
            .unwrap_or_else(|| format!("{} (released)", self.kind))
    }
}

impl UserData for ScriptObject {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_meta_function(MetaMethod::Index, |lua, (ud, key): (AnyUserData, Value)| {
            let kind = ud.borrow::<ScriptObject>()?.kind;
            let class: Table = lua.named_registry_value(class_key(kind))?;
            class.raw_get::<Value>(key)
        });

        methods.add_meta_method(MetaMethod::ToString, |_, this, ()| Ok(this.describe()));
    }
}

/// Registry key of the method table for `kind`.
pub fn class_key(kind: HandleKind) -> &'static str {
    match kind {
        HandleKind::Command => "touchbridge.class.Command",
        HandleKind::Label => "touchbridge.class.Label",
        HandleKind::Button => "touchbridge.class.Button",
        HandleKind::Slider => "touchbridge.class.Slider",
        HandleKind::Scrubber => "touchbridge.class.Scrubber",
    }
}

/// Create the weak-valued id → object table.
pub fn install_object_table(lua: &Lua) -> LuaResult<()> {
    let objects = lua.create_table()?;
    let mode = lua.create_table()?;
    mode.set("__mode", "v")?;
    objects.set_metatable(Some(mode));
    lua.set_named_registry_value(OBJECTS_KEY, objects)
}

/// Allocate a handle of `kind`, populate it and wrap it in a new object.
pub fn construct(
    lua: &Lua,
    bridge: &Rc<Bridge>,
    kind: HandleKind,
    initial: Option<WidgetValue>,
) -> LuaResult<AnyUserData> {
    let guard = bridge.construct(CallContext::Constructor, kind)?;
    let id = guard.id();
    if let Some(value) = initial {
        bridge.populate(id, value);
    }

    let ud = lua.create_userdata(ScriptObject { guard, kind })?;
    let objects: Table = lua.named_registry_value(OBJECTS_KEY)?;
    objects.raw_set(id.to_bits() as i64, ud.clone())?;
    Ok(ud)
}

/// The live object owning `id`, if it has not been collected.
pub fn lookup(lua: &Lua, id: HandleId) -> LuaResult<Option<AnyUserData>> {
    let objects: Table = lua.named_registry_value(OBJECTS_KEY)?;
    let ud = objects.raw_get::<Option<AnyUserData>>(id.to_bits() as i64)?;
    Ok(ud.filter(|ud| {
        ud.borrow::<ScriptObject>()
            .map(|obj| obj.id() == id)
            .unwrap_or(false)
    }))
}
