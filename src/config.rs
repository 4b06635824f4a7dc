/// `config.rs` — runtime configuration
///
/// Read from a JSON file: `--config <path>` if given, otherwise
/// `config.json` in the platform config directory. Every field has a
/// default, and a missing default file means the default config.
use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    error::{BridgeError, Result},
    scripting::TrustLevel,
};

const IDENTIFIER: &str = "com.touchbridge.host";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Script run at startup.
    pub script: Option<PathBuf>,
    pub trust: TrustLevel,
    /// `env_logger` filter, `RUST_LOG` wins when set.
    pub log_filter: String,
    /// Keep reading host events from stdin after the script ran.
    pub event_loop: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            script: None,
            trust: TrustLevel::Basic,
            log_filter: "info".to_string(),
            event_loop: true,
        }
    }
}

impl BridgeConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| BridgeError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| BridgeError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Resolve the config from command line arguments (without argv[0]).
    pub fn from_args<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut explicit = None;
        let mut script = None;
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "-c" => explicit = args.next().map(PathBuf::from),
                _ if script.is_none() => script = Some(PathBuf::from(&arg)),
                _ => log::warn!("ignoring extra argument '{arg}'"),
            }
        }

        let mut config = match explicit {
            Some(path) => Self::load(&path)?,
            None => {
                let path = default_config_path();
                if path.exists() {
                    Self::load(&path)?
                } else {
                    Self::default()
                }
            }
        };
        if script.is_some() {
            config.script = script;
        }
        Ok(config)
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Return the platform-specific config file path.
pub fn default_config_path() -> PathBuf {
    PathBuf::from(compute_config_dir()).join("config.json")
}

fn compute_config_dir() -> String {
    #[cfg(target_os = "macos")]
    {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/Library/Application Support/{IDENTIFIER}")
    }

    #[cfg(target_os = "windows")]
    {
        let appdata = std::env::var("APPDATA").unwrap_or_else(|_| ".".into());
        format!("{appdata}\\{IDENTIFIER}")
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/.config/{IDENTIFIER}")
    }
}
