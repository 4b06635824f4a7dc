/// `scripting/callback.rs` — reserved callback slots on script objects
///
/// Callbacks live in named user values of the object's userdata. Script
/// code cannot reach them through indexing, so they never collide with
/// properties, and the GC traces them like any other reference.
use mlua::{AnyUserData, Function, MultiValue, Result as LuaResult, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackSlot {
    Click,
    Slide,
}

impl CallbackSlot {
    pub fn reserved_name(self) -> &'static str {
        match self {
            CallbackSlot::Click => "__click_cb",
            CallbackSlot::Slide => "__slide_cb",
        }
    }

    /// Store `callback`, replacing whatever was bound before.
    pub fn bind(self, owner: &AnyUserData, callback: Function) -> LuaResult<()> {
        owner.set_named_user_value(self.reserved_name(), callback)
    }

    pub fn bound(self, owner: &AnyUserData) -> LuaResult<Option<Function>> {
        match owner.named_user_value::<Value>(self.reserved_name())? {
            Value::Function(f) => Ok(Some(f)),
            _ => Ok(None),
        }
    }

    /// Call the bound callback with `owner` as receiver, followed by `args`.
    ///
    /// Returns whether a callback ran. Errors raised by the callback are
    /// logged and swallowed.
    pub fn invoke(self, owner: &AnyUserData, args: Vec<Value>) -> LuaResult<bool> {
        let Some(callback) = self.bound(owner)? else {
            return Ok(false);
        };

        let mut call_args = Vec::with_capacity(args.len() + 1);
        call_args.push(Value::UserData(owner.clone()));
        call_args.extend(args);

        if let Err(e) = callback.call::<()>(MultiValue::from_vec(call_args)) {
            log::warn!("[script] {} callback failed: {e}", self.reserved_name());
        }
        Ok(true)
    }
}
