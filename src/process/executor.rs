use std::process::{Command, Stdio};

use tracing::debug;

use super::ProcessError;

/// Captured output of a single command run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

impl ExecutionResult {
    /// Any text on stderr counts as a failure, whatever the exit status says.
    pub fn failed(&self) -> bool {
        !self.stderr.is_empty()
    }
}

pub trait CommandRunner {
    fn run(&self, command: &str) -> Result<ExecutionResult, ProcessError>;
}

/// Hands whole command lines to the host interpreter and captures both streams.
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    interpreter: String,
    switch: &'static str,
}

impl Default for CommandExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandExecutor {
    #[cfg(windows)]
    pub fn new() -> Self {
        CommandExecutor {
            interpreter: std::env::var("COMSPEC").unwrap_or_else(|_| "cmd.exe".to_string()),
            switch: "/C",
        }
    }

    #[cfg(not(windows))]
    pub fn new() -> Self {
        CommandExecutor {
            interpreter: "/bin/sh".to_string(),
            switch: "-c",
        }
    }

    pub fn interpreter(&self) -> &str {
        &self.interpreter
    }
}

impl CommandRunner for CommandExecutor {
    fn run(&self, command: &str) -> Result<ExecutionResult, ProcessError> {
        debug!(interpreter = %self.interpreter, command, "spawning");

        let output = Command::new(&self.interpreter)
            .arg(self.switch)
            .arg(command)
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ProcessError::InterpreterNotFound(self.interpreter.clone())
                } else {
                    e.into()
                }
            })?;

        let result = ExecutionResult {
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            exit_code: output.status.code(),
        };
        debug!(exit_code = ?result.exit_code, failed = result.failed(), "process finished");
        Ok(result)
    }
}
