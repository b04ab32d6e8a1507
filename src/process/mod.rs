use std::fmt;

pub mod executor;
pub mod signal;

pub use executor::{CommandExecutor, CommandRunner, ExecutionResult};
pub use signal::Interrupt;

#[derive(Debug)]
pub enum ProcessError {
    InterpreterNotFound(String),
    SignalError(String),
    Other(String),
}

impl From<std::io::Error> for ProcessError {
    fn from(e: std::io::Error) -> Self {
        ProcessError::Other(e.to_string())
    }
}

impl From<ctrlc::Error> for ProcessError {
    fn from(e: ctrlc::Error) -> Self {
        ProcessError::SignalError(e.to_string())
    }
}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessError::InterpreterNotFound(shell) => {
                write!(f, "Command interpreter not found: {}", shell)
            }
            ProcessError::SignalError(msg) => write!(f, "Signal error: {}", msg),
            ProcessError::Other(msg) => write!(f, "Other error: {}", msg),
        }
    }
}

impl std::error::Error for ProcessError {}
