/// `scripting/sandbox.rs` — Lua sandbox restrictions per engine
///
/// Every script VM is created with a restricted set of standard libraries.
/// Dangerous libraries (os, io, debug, package) are omitted by default.
/// The trust level also decides whether `Command:exec()` may spawn processes.
use mlua::{Lua, LuaOptions, Result as LuaResult, StdLib};
use serde::{Deserialize, Serialize};

/// Controls which Lua standard libraries are available to a script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustLevel {
    /// Default: string, table, math, coroutine, utf8. No I/O, no commands.
    #[default]
    Basic,
    /// Standard + io, commands may run
    FileRead,
    /// Full safe standard library, only for trusted scripts
    Elevated,
}

impl TrustLevel {
    pub fn allows_commands(self) -> bool {
        self != TrustLevel::Basic
    }
}

/// Creates a new Lua VM with sandbox restrictions applied.
pub fn create_sandboxed_vm(trust: TrustLevel) -> LuaResult<Lua> {
    let mut libs = StdLib::TABLE | StdLib::STRING | StdLib::MATH | StdLib::COROUTINE | StdLib::UTF8;

    if trust == TrustLevel::FileRead || trust == TrustLevel::Elevated {
        libs = libs | StdLib::IO;
    }

    if trust == TrustLevel::Elevated {
        libs = libs | StdLib::OS | StdLib::PACKAGE;
    }

    log::debug!("creating lua vm, trust={trust:?}");
    Lua::new_with(libs, LuaOptions::default())
}
