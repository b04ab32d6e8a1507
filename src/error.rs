use crate::core::config::ConfigError;
use crate::llm::BackendError;
use crate::process::ProcessError;
use crate::session::SessionError;

#[derive(Debug)]
pub enum ShellError {
    Readline(rustyline::error::ReadlineError),
    Io(std::io::Error),
    UnsupportedPlatform(String),
    Backend(BackendError),
    Session(SessionError),
    ProcessError(ProcessError),
    ConfigError(ConfigError),
    FlagError(String),
}

impl From<rustyline::error::ReadlineError> for ShellError {
    fn from(err: rustyline::error::ReadlineError) -> Self {
        ShellError::Readline(err)
    }
}

impl From<std::io::Error> for ShellError {
    fn from(err: std::io::Error) -> Self {
        ShellError::Io(err)
    }
}

impl From<BackendError> for ShellError {
    fn from(err: BackendError) -> Self {
        ShellError::Backend(err)
    }
}

impl From<SessionError> for ShellError {
    fn from(err: SessionError) -> Self {
        ShellError::Session(err)
    }
}

impl From<ProcessError> for ShellError {
    fn from(err: ProcessError) -> Self {
        ShellError::ProcessError(err)
    }
}

impl From<ConfigError> for ShellError {
    fn from(err: ConfigError) -> Self {
        ShellError::ConfigError(err)
    }
}

impl std::fmt::Display for ShellError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShellError::Readline(e) => write!(f, "Readline error: {}", e),
            ShellError::Io(e) => write!(f, "IO error: {}", e),
            ShellError::UnsupportedPlatform(os) => write!(
                f,
                "Unsupported OS '{}'. This tool is designed for Windows, macOS, and Linux.",
                os
            ),
            ShellError::Backend(e) => write!(f, "{}", e),
            ShellError::Session(e) => write!(f, "Session error: {}", e),
            ShellError::ProcessError(e) => write!(f, "Process error: {}", e),
            ShellError::ConfigError(e) => write!(f, "Config error: {}", e),
            ShellError::FlagError(msg) => write!(f, "Flag error: {}", msg),
        }
    }
}

impl std::error::Error for ShellError {}
