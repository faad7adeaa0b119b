//! Command runner for external process execution

use crate::core::models::results::{CoreError, CoreResult};
use std::io::ErrorKind;
use std::process::{Command, Stdio};
use std::sync::Arc;

/// Log callback signature shared with the batch layer
pub type LogCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Command output
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code, `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
    pub success: bool,
}

/// Command runner
///
/// Spawns an argv, blocks until the process exits, and captures both output
/// streams. A non-zero exit is reported through `CommandOutput`, never as an
/// `Err`; only host-level failure to start the process is an error.
pub struct CommandRunner {
    log: Option<LogCallback>,
}

impl CommandRunner {
    pub fn new() -> Self {
        Self { log: None }
    }

    /// Attach a log callback; the full command line is echoed before running
    pub fn with_log_callback(mut self, log: LogCallback) -> Self {
        self.log = Some(log);
        self
    }

    fn log(&self, msg: &str) {
        if let Some(log) = &self.log {
            log(msg);
        }
    }

    /// Run a command and return its captured output
    pub fn run(&self, cmd: &[String]) -> CoreResult<CommandOutput> {
        let program = cmd
            .first()
            .ok_or_else(|| CoreError::Execution("empty command".to_string()))?;

        self.log(&format!("$ {}", cmd.join(" ")));
        tracing::debug!(command = %cmd.join(" "), "spawning external tool");

        let output = Command::new(program)
            .args(&cmd[1..])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => {
                    CoreError::Execution(format!("executable not found: {}", program))
                }
                ErrorKind::PermissionDenied => {
                    CoreError::Execution(format!("permission denied: {}", program))
                }
                _ => CoreError::Execution(format!("failed to run {}: {}", program, e)),
            })?;

        let result = CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code(),
            success: output.status.success(),
        };

        if !result.success {
            self.log(&format!(
                "[runner] {} exited with {:?}",
                program, result.exit_code
            ));
        }

        Ok(result)
    }
}

impl Default for CommandRunner {
    fn default() -> Self {
        Self::new()
    }
}
