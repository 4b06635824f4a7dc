/// `scripting/` — Lua scripting engine
///
/// Scripts run in one sandboxed Lua VM (mlua) and build widgets through the
/// classes registered by `api`. Host events reach scripts through callbacks
/// dispatched from `ScriptEngine`. Callback errors are caught and logged.
pub mod api;
pub mod args;
pub mod callback;
pub mod engine;
pub mod object;
pub mod sandbox;
pub mod trigger;

pub use engine::{ScriptEngine, ScriptRunResult};
pub use sandbox::TrustLevel;
pub use trigger::UiEvent;
