/// `widget/command.rs` — shell command handles
///
/// A command keeps the line it was constructed with and the stdout of its
/// last run. It has no visual representation and is never attachable.
use std::process::Command as Process;

use crate::error::{BridgeError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Command {
    pub line: String,
    pub output: Option<String>,
    pub status: Option<i32>,
}

impl Command {
    pub fn new(line: impl Into<String>) -> Self {
        Self {
            line: line.into(),
            ..Default::default()
        }
    }

    /// Run the line through `sh -c` and capture stdout.
    pub fn exec(&mut self) -> Result<()> {
        let out = Process::new("sh")
            .arg("-c")
            .arg(&self.line)
            .output()
            .map_err(|source| BridgeError::CommandSpawn {
                line: self.line.clone(),
                source,
            })?;

        self.output = Some(String::from_utf8_lossy(&out.stdout).into_owned());
        self.status = out.status.code();
        log::debug!(
            "command '{}' exited with {:?} ({} bytes)",
            self.line,
            self.status,
            out.stdout.len()
        );
        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn exec_captures_stdout() {
        let mut cmd = Command::new("echo touch");
        assert!(cmd.output.is_none());
        assert!(cmd.exec().is_ok());
        assert_eq!(cmd.output.as_deref(), Some("touch\n"));
        assert_eq!(cmd.status, Some(0));
    }

    #[test]
    fn exec_records_failure_status() {
        let mut cmd = Command::new("exit 3");
        assert!(cmd.exec().is_ok());
        assert_eq!(cmd.output.as_deref(), Some(""));
        assert_eq!(cmd.status, Some(3));
    }
}
