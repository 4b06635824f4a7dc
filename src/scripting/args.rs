/// `scripting/args.rs` — positional argument extraction
///
/// Every native function receives its arguments as a flat list (the receiver
/// of a method call is argument #1). A missing or mistyped argument raises a
/// `TypeError` naming the function and the position.
use mlua::{AnyUserData, Function, Result as LuaResult, Value};

use super::object::ScriptObject;
use crate::handle::HandleId;

pub struct Args<'a> {
    func: &'static str,
    values: &'a [Value],
}

impl<'a> Args<'a> {
    pub fn new(func: &'static str, values: &'a [Value]) -> Self {
        Self { func, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Argument at 1-based `pos`, `nil` when absent.
    pub fn value(&self, pos: usize) -> Value {
        self.values
            .get(pos.wrapping_sub(1))
            .cloned()
            .unwrap_or(Value::Nil)
    }

    pub fn all(&self) -> &'a [Value] {
        self.values
    }

    pub fn require_string(&self, pos: usize) -> LuaResult<String> {
        match self.value(pos) {
            Value::String(s) => Ok(String::from(&*s.to_str()?)),
            other => Err(self.bad_argument(pos, "string", &other)),
        }
    }

    /// Integers pass through, floats are truncated toward zero.
    pub fn require_int(&self, pos: usize) -> LuaResult<i64> {
        match self.value(pos) {
            Value::Integer(i) => Ok(i),
            Value::Number(n) => Ok(n as i64),
            other => Err(self.bad_argument(pos, "number", &other)),
        }
    }

    pub fn require_function(&self, pos: usize) -> LuaResult<Function> {
        match self.value(pos) {
            Value::Function(f) => Ok(f),
            other => Err(self.bad_argument(pos, "function", &other)),
        }
    }

    /// A bridge object of any kind, with the id of its handle.
    pub fn require_object(&self, pos: usize) -> LuaResult<(AnyUserData, HandleId)> {
        match self.value(pos) {
            Value::UserData(ud) if ud.is::<ScriptObject>() => {
                let id = ud.borrow::<ScriptObject>()?.id();
                Ok((ud, id))
            }
            other => Err(self.bad_argument(pos, "widget", &other)),
        }
    }

    fn bad_argument(&self, pos: usize, expected: &str, got: &Value) -> mlua::Error {
        let got = match got {
            Value::Nil if pos > self.values.len() => "no value",
            v => v.type_name(),
        };
        mlua::Error::runtime(format!(
            "TypeError: {}: bad argument #{pos} ({expected} expected, got {got})",
            self.func
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mlua::Lua;

    #[test]
    fn require_int_truncates_floats_and_rejects_strings() {
        let lua = Lua::new();
        let values = vec![
            Value::Number(199.9),
            Value::Integer(-3),
            Value::String(lua.create_string("12").unwrap()),
        ];
        let args = Args::new("setPercent", &values);
        assert_eq!(args.require_int(1).ok(), Some(199));
        assert_eq!(args.require_int(2).ok(), Some(-3));

        let err = args.require_int(3).unwrap_err().to_string();
        assert!(err.contains("TypeError: setPercent: bad argument #3 (number expected, got string)"));
    }

    #[test]
    fn missing_argument_reports_no_value() {
        let values = vec![];
        let args = Args::new("rgb", &values);
        let err = args.require_string(1).unwrap_err().to_string();
        assert!(err.contains("bad argument #1 (string expected, got no value)"));
        assert!(matches!(args.value(0), Value::Nil));
    }

    #[test]
    fn plain_table_is_not_an_object() {
        let lua = Lua::new();
        let table = lua.create_table().unwrap();
        let values = vec![Value::Table(table)];
        let args = Args::new("attach", &values);
        assert!(args.require_object(1).is_err());
    }
}
