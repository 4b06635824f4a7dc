/// `scripting/engine.rs` — Lua VM manager
///
/// `ScriptEngine` owns one sandboxed VM, the bridge its widgets live in and
/// the output captured from `print`. Host events are dispatched to the
/// callbacks bound on the script objects.
use std::{fs, path::Path, rc::Rc};

use mlua::{Lua, Value};
use serde::{Deserialize, Serialize};

use super::{
    api::{register_all, ScriptHost, ScriptLogEntry},
    callback::CallbackSlot,
    object::lookup,
    sandbox::{create_sandboxed_vm, TrustLevel},
    trigger::UiEvent,
};
use crate::{
    bridge::Bridge,
    error::Result,
    handle::TypeFlags,
    touchbar::{LogSink, UpdateEvent, UpdateSink},
};

// ── Script run result ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptRunResult {
    pub success: bool,
    pub output: Vec<String>,
    pub error: Option<String>,
    pub error_line: Option<u32>,
}

// ── ScriptEngine ──────────────────────────────────────────────────────────────

pub struct ScriptEngine {
    // Dropped first so every object is finalized while the bridge is alive.
    lua: Lua,
    host: Rc<ScriptHost>,
}

impl ScriptEngine {
    pub fn new(trust: TrustLevel) -> Result<Self> {
        Self::with_sink(trust, Box::new(LogSink))
    }

    pub fn with_sink(trust: TrustLevel, sink: Box<dyn UpdateSink>) -> Result<Self> {
        let lua = create_sandboxed_vm(trust)?;
        let host = ScriptHost::new(Bridge::new(sink), trust);
        register_all(&lua, &host)?;
        Ok(Self { lua, host })
    }

    // ── Script execution ──────────────────────────────────────────────────

    /// Run `source` as a chunk called `name`. Script errors are reported in
    /// the result, never returned.
    pub fn exec(&self, name: &str, source: &str) -> ScriptRunResult {
        let start = self.host.log.borrow().len();
        let outcome = self.lua.load(source).set_name(format!("={name}")).exec();

        let output: Vec<String> = self.host.log.borrow()[start..]
            .iter()
            .map(|e| format!("[{}] {}", e.level, e.message))
            .collect();

        match outcome {
            Ok(()) => ScriptRunResult {
                success: true,
                output,
                error: None,
                error_line: None,
            },
            Err(e) => {
                let error_str = e.to_string();
                log::error!("[script] {name} failed: {error_str}");
                ScriptRunResult {
                    success: false,
                    output,
                    error_line: parse_error_line(&error_str, name),
                    error: Some(error_str),
                }
            }
        }
    }

    pub fn exec_file(&self, path: &Path) -> Result<ScriptRunResult> {
        let source = fs::read_to_string(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        log::info!("running script {}", path.display());
        Ok(self.exec(&name, &source))
    }

    // ── Event dispatch ────────────────────────────────────────────────────

    /// Deliver a host event. Returns whether a bound callback ran.
    pub fn dispatch(&self, event: &UiEvent) -> Result<bool> {
        let id = event.handle_id();
        let Some(owner) = lookup(&self.lua, id)? else {
            log::debug!("{} for unknown id={id} ignored", event.trigger_type());
            return Ok(false);
        };

        let ran = match *event {
            UiEvent::Click { .. } => {
                if !self.host.bridge.resolves(id, TypeFlags::BUTTON) {
                    return Ok(false);
                }
                CallbackSlot::Click.invoke(&owner, Vec::new())?
            }
            UiEvent::Slide { percent, .. } => {
                if !self.host.bridge.set_percent(id, percent) {
                    return Ok(false);
                }
                CallbackSlot::Slide.invoke(&owner, vec![Value::Integer(percent)])?
            }
        };
        Ok(ran)
    }

    // ── Host side ─────────────────────────────────────────────────────────

    /// Run a full collection so unreachable objects release their handles.
    pub fn collect_garbage(&self) -> Result<()> {
        // Objects with finalizers need a second cycle to be freed.
        self.lua.gc_collect()?;
        self.lua.gc_collect()?;
        Ok(())
    }

    pub fn flush(&self) -> Vec<UpdateEvent> {
        self.host.bridge.flush()
    }

    pub fn bridge(&self) -> &Rc<Bridge> {
        &self.host.bridge
    }

    pub fn trust(&self) -> TrustLevel {
        self.host.trust
    }

    pub fn quit_requested(&self) -> bool {
        self.host.quit_requested()
    }

    pub fn log(&self) -> Vec<ScriptLogEntry> {
        self.host.log.borrow().clone()
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Parse the line number following `chunk:` in a Lua error message
/// (e.g. "runtime error: init.lua:5: boom").
fn parse_error_line(err: &str, chunk: &str) -> Option<u32> {
    let marker = format!("{chunk}:");
    let start = err.find(&marker)? + marker.len();
    let digits: String = err[start..].chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}
