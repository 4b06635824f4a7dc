pub mod bridge;
pub mod config;
pub mod error;
pub mod handle;
pub mod scripting;
pub mod touchbar;
pub mod widget;

use std::io::{self, BufRead, Write};

use config::BridgeConfig;
use error::{BridgeError, Result};
use scripting::{ScriptEngine, UiEvent};
use touchbar::UpdateEvent;

pub fn run() -> Result<()> {
    let config = BridgeConfig::from_args(std::env::args().skip(1))?;

    // RUST_LOG overrides the configured filter.
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_filter.as_str()),
    )
    .try_init();

    let script = config.script.clone().ok_or(BridgeError::NoScript)?;
    log::info!("TouchBridge starting, trust={:?}", config.trust);

    let engine = ScriptEngine::new(config.trust)?;
    let result = engine.exec_file(&script)?;
    if !result.success {
        return Err(BridgeError::ScriptFailed(result.error.unwrap_or_default()));
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_updates(&mut out, &engine.flush())?;

    if config.event_loop && !engine.quit_requested() {
        serve(&engine, io::stdin().lock(), &mut out)?;
    }

    log::info!("TouchBridge stopped");
    Ok(())
}

/// Read `UiEvent` JSON lines from `input` until EOF or `quit()`, writing the
/// resulting `UpdateEvent` lines to `output` after every event.
pub fn serve<R: BufRead, W: Write>(engine: &ScriptEngine, input: R, output: &mut W) -> Result<()> {
    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<UiEvent>(line) {
            Ok(event) => {
                if let Err(e) = engine.dispatch(&event) {
                    log::warn!("dispatching {} failed: {e}", event.trigger_type());
                }
            }
            Err(e) => log::warn!("ignoring malformed event '{line}': {e}"),
        }

        write_updates(output, &engine.flush())?;
        if engine.quit_requested() {
            log::info!("quit requested by script");
            break;
        }
    }
    Ok(())
}

fn write_updates<W: Write>(output: &mut W, updates: &[UpdateEvent]) -> Result<()> {
    for update in updates {
        writeln!(output, "{}", serde_json::to_string(update)?)?;
    }
    output.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scripting::TrustLevel;

    fn engine_with(source: &str) -> ScriptEngine {
        let engine = ScriptEngine::new(TrustLevel::Basic).unwrap();
        let result = engine.exec("main.lua", source);
        assert!(result.success, "{:?}", result.error);
        engine
    }

    fn lines(output: Vec<u8>) -> Vec<serde_json::Value> {
        String::from_utf8_lossy(&output)
            .lines()
            .filter_map(|l| serde_json::from_str(l).ok())
            .collect()
    }

    #[test]
    fn click_updates_are_written_as_json_lines() {
        let engine = engine_with(
            r#"
            b = Button.new("Go"):bind(function(self) self:setBgColor(255, 0, 0) end)
            attach(b)
            "#,
        );
        let mut initial = Vec::new();
        write_updates(&mut initial, &engine.flush()).unwrap();
        let created = lines(initial);
        assert_eq!(created.len(), 1);
        assert_eq!(created[0]["kind"], "button");
        assert_eq!(created[0]["created"], true);
        assert_eq!(created[0]["value"], "Go");

        let id = created[0]["id"].as_u64().unwrap_or_default();
        let input = format!("{{\"type\":\"click\",\"id\":{id}}}\nnot json\n\n");
        let mut output = Vec::new();
        serve(&engine, input.as_bytes(), &mut output).unwrap();

        let updates = lines(output);
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0]["created"], false);
        assert_eq!(updates[0]["colors"]["bg"]["red"], 255);
    }

    #[test]
    fn serve_stops_after_quit() {
        let engine = engine_with(
            r#"
            b = Button.new("bye"):bind(function() print("bye") quit() end)
            attach(b)
            "#,
        );
        let id = engine.flush().first().map(|e| e.id).unwrap_or_default();
        let click = format!("{{\"type\":\"click\",\"id\":{id}}}\n");
        let input = click.repeat(3);

        let mut output = Vec::new();
        serve(&engine, input.as_bytes(), &mut output).unwrap();
        assert!(engine.quit_requested());
        let byes = engine.log().iter().filter(|e| e.message == "bye").count();
        assert_eq!(byes, 1);
    }
}
