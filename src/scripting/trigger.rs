/// `scripting/trigger.rs` — host UI events that map to Lua callbacks
///
/// The host renderer reports touches as `UiEvent`s, one JSON object per
/// line. `ScriptEngine::dispatch` looks up the owning script object and
/// fires the callback bound to the matching reserved slot.
use serde::{Deserialize, Serialize};

use crate::handle::HandleId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiEvent {
    /// A button was pressed.
    Click { id: u64 },
    /// A slider was moved to `percent`.
    Slide { id: u64, percent: i64 },
}

impl UiEvent {
    pub fn handle_id(&self) -> HandleId {
        match self {
            UiEvent::Click { id } | UiEvent::Slide { id, .. } => HandleId::from_bits(*id),
        }
    }

    /// Name used in log lines.
    pub fn trigger_type(&self) -> &'static str {
        match self {
            UiEvent::Click { .. } => "click",
            UiEvent::Slide { .. } => "slide",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tagged_json_lines() {
        let click: UiEvent = serde_json::from_str(r#"{"type":"click","id":4294967297}"#).unwrap();
        assert_eq!(click, UiEvent::Click { id: 4294967297 });
        assert_eq!(click.handle_id(), HandleId::new(1, 1));
        assert_eq!(click.trigger_type(), "click");

        let slide: UiEvent = serde_json::from_str(r#"{"type":"slide","id":0,"percent":75}"#).unwrap();
        assert_eq!(slide, UiEvent::Slide { id: 0, percent: 75 });
    }

    #[test]
    fn unknown_type_is_rejected() {
        assert!(serde_json::from_str::<UiEvent>(r#"{"type":"hover","id":1}"#).is_err());
    }
}
