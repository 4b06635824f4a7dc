/// `scripting/api.rs` — registers all Lua globals and widget classes
///
/// Provides the API surface to the script VM:
///   Label, Button, Slider, Scrubber, Command, attach, detach, rgb, print, quit
///
/// Class methods take their receiver as argument #1 and resolve it under the
/// capability they need. A receiver of the wrong kind makes mutators return
/// the receiver untouched and accessors return nil.
use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use mlua::{Function, IntoLua, IntoLuaMulti, Lua, Result as LuaResult, Table, Value, Variadic};
use serde::Serialize;

use super::{
    args::Args,
    callback::CallbackSlot,
    object::{class_key, construct, install_object_table},
    sandbox::TrustLevel,
};
use crate::{
    bridge::Bridge,
    error::BridgeError,
    handle::{CallContext, HandleKind, TypeFlags},
    widget::{ColorSlot, Rgb, WidgetValue},
};

/// One line of script output (`print` calls).
#[derive(Debug, Clone, Serialize)]
pub struct ScriptLogEntry {
    pub level: String,
    pub message: String,
    pub timestamp: i64,
}

pub type ScriptLog = Rc<RefCell<Vec<ScriptLogEntry>>>;

/// State shared by every native function of one VM.
pub struct ScriptHost {
    pub bridge: Rc<Bridge>,
    pub trust: TrustLevel,
    pub log: ScriptLog,
    quit: Cell<bool>,
}

impl ScriptHost {
    pub fn new(bridge: Rc<Bridge>, trust: TrustLevel) -> Rc<Self> {
        Rc::new(Self {
            bridge,
            trust,
            log: Rc::new(RefCell::new(Vec::new())),
            quit: Cell::new(false),
        })
    }

    pub fn quit_requested(&self) -> bool {
        self.quit.get()
    }

    fn push_log(&self, level: &str, message: String) {
        self.log.borrow_mut().push(ScriptLogEntry {
            level: level.to_string(),
            message,
            timestamp: chrono::Utc::now().timestamp(),
        });
    }
}

impl IntoLua for WidgetValue {
    fn into_lua(self, lua: &Lua) -> LuaResult<Value> {
        match self {
            WidgetValue::Text(s) => lua.create_string(&s).map(Value::String),
            WidgetValue::Integer(i) => Ok(Value::Integer(i)),
            WidgetValue::Real(n) => Ok(Value::Number(n)),
        }
    }
}

/// Register every global on `lua`.
pub fn register_all(lua: &Lua, host: &Rc<ScriptHost>) -> LuaResult<()> {
    install_object_table(lua)?;
    register_print(lua, host)?;
    register_rgb(lua)?;
    register_touchbar(lua, host)?;
    register_quit(lua, host)?;
    register_classes(lua, host)?;
    Ok(())
}

/// Wrap `f` as a Lua function receiving its arguments as `Args`.
fn native<R, F>(lua: &Lua, name: &'static str, f: F) -> LuaResult<Function>
where
    R: IntoLuaMulti,
    F: Fn(&Lua, Args<'_>) -> LuaResult<R> + 'static,
{
    lua.create_function(move |lua, values: Variadic<Value>| f(lua, Args::new(name, &values)))
}

// ── print ─────────────────────────────────────────────────────────────────────

fn register_print(lua: &Lua, host: &Rc<ScriptHost>) -> LuaResult<()> {
    let host = Rc::clone(host);
    let print = native(lua, "print", move |lua, args| {
        let tostring: Function = lua.globals().get("tostring")?;
        let mut parts = Vec::with_capacity(args.len());
        for value in args.all() {
            parts.push(tostring.call::<String>(value.clone())?);
        }
        let line = parts.join(" ");
        log::info!("[script] {line}");
        host.push_log("info", line);
        Ok(())
    })?;
    lua.globals().set("print", print)
}

// ── rgb ───────────────────────────────────────────────────────────────────────

fn register_rgb(lua: &Lua) -> LuaResult<()> {
    let rgb = native(lua, "rgb", |lua, args| {
        let code = args.require_string(1)?;
        let rgb = Rgb::parse_hex(&code)?;
        lua.create_sequence_from([rgb.red, rgb.green, rgb.blue])
    })?;
    lua.globals().set("rgb", rgb)
}

// ── attach / detach ───────────────────────────────────────────────────────────

fn register_touchbar(lua: &Lua, host: &Rc<ScriptHost>) -> LuaResult<()> {
    let attach = {
        let host = Rc::clone(host);
        native(lua, "attach", move |_, args| {
            let (_, id) = args.require_object(1)?;
            if !host.bridge.attach_root(id) {
                log::debug!("[script] attach({id}) had no effect");
            }
            Ok(())
        })?
    };
    let detach = {
        let host = Rc::clone(host);
        native(lua, "detach", move |_, args| {
            let (_, id) = args.require_object(1)?;
            if !host.bridge.detach_root(id) {
                log::debug!("[script] detach({id}) had no effect");
            }
            Ok(())
        })?
    };

    lua.globals().set("attach", attach)?;
    lua.globals().set("detach", detach)?;
    Ok(())
}

// ── quit ──────────────────────────────────────────────────────────────────────

fn register_quit(lua: &Lua, host: &Rc<ScriptHost>) -> LuaResult<()> {
    let host = Rc::clone(host);
    let quit = native(lua, "quit", move |_, _| {
        log::info!("[script] quit()");
        host.quit.set(true);
        Ok(())
    })?;
    lua.globals().set("quit", quit)
}

// ── classes ───────────────────────────────────────────────────────────────────

fn register_classes(lua: &Lua, host: &Rc<ScriptHost>) -> LuaResult<()> {
    for kind in HandleKind::ALL {
        let class = lua.create_table()?;
        class.set("new", constructor(lua, host, kind)?)?;
        register_common(lua, host, kind, &class)?;
        match kind {
            HandleKind::Label => {}
            HandleKind::Button => register_button(lua, host, &class)?,
            HandleKind::Slider => register_slider(lua, host, &class)?,
            HandleKind::Scrubber => register_scrubber(lua, host, &class)?,
            HandleKind::Command => register_command(lua, host, &class)?,
        }

        // Calling the class table itself is a constructor call without `new`.
        let meta = lua.create_table()?;
        let bridge = Rc::clone(&host.bridge);
        meta.set(
            "__call",
            lua.create_function(move |_, _: Variadic<Value>| {
                bridge
                    .construct(CallContext::Plain, kind)
                    .map(drop)
                    .map_err(mlua::Error::from)
            })?,
        )?;
        class.set_metatable(Some(meta));

        lua.set_named_registry_value(class_key(kind), class.clone())?;
        lua.globals().set(kind.class_name(), class)?;
    }
    Ok(())
}

fn constructor(lua: &Lua, host: &Rc<ScriptHost>, kind: HandleKind) -> LuaResult<Function> {
    let bridge = Rc::clone(&host.bridge);
    native(lua, "new", move |lua, args| {
        // Arguments are checked before anything is allocated.
        let initial = match kind {
            HandleKind::Label | HandleKind::Button | HandleKind::Command => {
                Some(WidgetValue::Text(args.require_string(1)?))
            }
            HandleKind::Slider => Some(WidgetValue::Integer(args.require_int(1)?)),
            HandleKind::Scrubber => None,
        };
        construct(lua, &bridge, kind, initial)
    })
}

fn register_common(lua: &Lua, host: &Rc<ScriptHost>, kind: HandleKind, class: &Table) -> LuaResult<()> {
    let own = kind.flag();

    let to_string = {
        let bridge = Rc::clone(&host.bridge);
        native(lua, "toString", move |_, args| {
            let (_, id) = args.require_object(1)?;
            Ok(bridge.describe(id, own))
        })?
    };
    let get_value = {
        let bridge = Rc::clone(&host.bridge);
        native(lua, "getValue", move |_, args| {
            let (_, id) = args.require_object(1)?;
            Ok(bridge.value(id, own))
        })?
    };
    class.set("toString", to_string)?;
    class.set("getValue", get_value)?;

    if own.is_widget() {
        class.set("setFgColor", color_setter(lua, host, "setFgColor", ColorSlot::Foreground)?)?;
        class.set("setBgColor", color_setter(lua, host, "setBgColor", ColorSlot::Background)?)?;
    }
    Ok(())
}

fn color_setter(lua: &Lua, host: &Rc<ScriptHost>, name: &'static str, slot: ColorSlot) -> LuaResult<Function> {
    let bridge = Rc::clone(&host.bridge);
    native(lua, name, move |_, args| {
        let (ud, id) = args.require_object(1)?;
        let rgb = Rgb::from_ints(args.require_int(2)?, args.require_int(3)?, args.require_int(4)?);
        bridge.set_color(id, slot, rgb);
        Ok(ud)
    })
}

/// `bind(fn)` for the class whose type bit is `mask`.
fn binder(lua: &Lua, host: &Rc<ScriptHost>, mask: TypeFlags, slot: CallbackSlot) -> LuaResult<Function> {
    let bridge = Rc::clone(&host.bridge);
    native(lua, "bind", move |_, args| {
        let (ud, id) = args.require_object(1)?;
        let callback = args.require_function(2)?;
        if bridge.resolves(id, mask) {
            slot.bind(&ud, callback)?;
        }
        Ok(ud)
    })
}

// ── Button ────────────────────────────────────────────────────────────────────

fn register_button(lua: &Lua, host: &Rc<ScriptHost>, class: &Table) -> LuaResult<()> {
    let bridge = Rc::clone(&host.bridge);
    let click = native(lua, "click", move |_, args| {
        let (ud, id) = args.require_object(1)?;
        if bridge.resolves(id, TypeFlags::BUTTON) {
            CallbackSlot::Click.invoke(&ud, Vec::new())?;
        }
        Ok(ud)
    })?;

    class.set("bind", binder(lua, host, TypeFlags::BUTTON, CallbackSlot::Click)?)?;
    class.set("click", click)?;
    Ok(())
}

// ── Slider ────────────────────────────────────────────────────────────────────

fn register_slider(lua: &Lua, host: &Rc<ScriptHost>, class: &Table) -> LuaResult<()> {
    let get_percent = {
        let bridge = Rc::clone(&host.bridge);
        native(lua, "getPercent", move |_, args| {
            let (_, id) = args.require_object(1)?;
            Ok(bridge.percent(id))
        })?
    };
    let set_percent = {
        let bridge = Rc::clone(&host.bridge);
        native(lua, "setPercent", move |_, args| {
            let (ud, id) = args.require_object(1)?;
            let percent = args.require_int(2)?;
            bridge.set_percent(id, percent);
            Ok(ud)
        })?
    };

    class.set("bind", binder(lua, host, TypeFlags::SLIDER, CallbackSlot::Slide)?)?;
    class.set("getPercent", get_percent)?;
    class.set("setPercent", set_percent)?;
    Ok(())
}

// ── Scrubber ──────────────────────────────────────────────────────────────────

fn register_scrubber(lua: &Lua, host: &Rc<ScriptHost>, class: &Table) -> LuaResult<()> {
    let attach = {
        let bridge = Rc::clone(&host.bridge);
        native(lua, "attach", move |_, args| {
            let (ud, id) = args.require_object(1)?;
            let (_, child) = args.require_object(2)?;
            bridge.attach(id, child);
            Ok(ud)
        })?
    };
    let detach = {
        let bridge = Rc::clone(&host.bridge);
        native(lua, "detach", move |_, args| {
            let (ud, id) = args.require_object(1)?;
            let (_, child) = args.require_object(2)?;
            bridge.detach(id, child);
            Ok(ud)
        })?
    };
    let count = {
        let bridge = Rc::clone(&host.bridge);
        native(lua, "count", move |_, args| {
            let (_, id) = args.require_object(1)?;
            Ok(bridge.count(id))
        })?
    };

    class.set("attach", attach)?;
    class.set("detach", detach)?;
    class.set("count", count)?;
    Ok(())
}

// ── Command ───────────────────────────────────────────────────────────────────

fn register_command(lua: &Lua, host: &Rc<ScriptHost>, class: &Table) -> LuaResult<()> {
    let exec = {
        let host = Rc::clone(host);
        native(lua, "exec", move |_, args| {
            let (ud, id) = args.require_object(1)?;
            if !host.bridge.resolves(id, TypeFlags::COMMAND) {
                return Ok(ud);
            }
            if !host.trust.allows_commands() {
                return Err(BridgeError::CommandDenied(host.trust).into());
            }
            host.bridge.exec_command(id)?;
            Ok(ud)
        })?
    };
    let get_output = {
        let bridge = Rc::clone(&host.bridge);
        native(lua, "getOutput", move |_, args| {
            let (_, id) = args.require_object(1)?;
            Ok(bridge.command_output(id))
        })?
    };

    class.set("exec", exec)?;
    class.set("getOutput", get_output)?;
    Ok(())
}
