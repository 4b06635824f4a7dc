/// `error.rs` — crate error type
use std::path::PathBuf;

use thiserror::Error;

use crate::handle::{HandleId, HandleKind};
use crate::scripting::sandbox::TrustLevel;

pub type Result<T> = std::result::Result<T, BridgeError>;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("{kind} must be constructed with {kind}.new")]
    NotConstructorCall { kind: HandleKind },

    #[error("stale handle {0}")]
    StaleHandle(HandleId),

    #[error("Invalid argument value: '{0}'")]
    InvalidColor(String),

    #[error("command execution is not permitted at trust level {0:?}")]
    CommandDenied(TrustLevel),

    #[error("failed to spawn '{line}': {source}")]
    CommandSpawn {
        line: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no script given (pass a path or set `script` in the config)")]
    NoScript,

    #[error("script failed: {0}")]
    ScriptFailed(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Script(#[from] mlua::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Whether the script should see this as a `TypeError`.
    pub fn is_type_error(&self) -> bool {
        matches!(
            self,
            BridgeError::NotConstructorCall { .. } | BridgeError::InvalidColor(_)
        )
    }
}

impl From<BridgeError> for mlua::Error {
    fn from(err: BridgeError) -> Self {
        match err {
            BridgeError::Script(e) => e,
            e if e.is_type_error() => mlua::Error::runtime(format!("TypeError: {e}")),
            e => mlua::Error::runtime(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructor_misuse_maps_to_type_error() {
        let err: mlua::Error = BridgeError::NotConstructorCall {
            kind: HandleKind::Label,
        }
        .into();
        assert!(err
            .to_string()
            .contains("TypeError: Label must be constructed with Label.new"));
    }

    #[test]
    fn invalid_color_message_names_the_code() {
        let err: mlua::Error = BridgeError::InvalidColor("fff".into()).into();
        assert!(err.to_string().contains("TypeError: Invalid argument value: 'fff'"));
    }
}
