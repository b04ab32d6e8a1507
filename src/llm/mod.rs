//! Chat-completion plumbing for turning requests into shell commands.
//!
//! The backend is a black box that answers a [`ChatRequest`] with a lazy
//! stream of text fragments. [`generator::CommandGenerator`] drains that
//! stream and cleans the reply into a single command line.

use std::fmt;

use serde::Serialize;

use crate::session::Message;

pub mod generator;
pub mod ollama;

pub use generator::{normalize_command, CommandGenerator};
pub use ollama::OllamaClient;

pub const DEFAULT_MODEL: &str = "gemma3:4b";
pub const DEFAULT_TEMPERATURE: f32 = 0.1;

#[derive(Debug)]
pub enum BackendError {
    Unavailable(String),
    Remote(String),
    MalformedStream(String),
    Cancelled,
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        BackendError::Unavailable(e.to_string())
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Unavailable(msg) => write!(f, "Inference backend unavailable: {}", msg),
            BackendError::Remote(msg) => write!(f, "Inference backend error: {}", msg),
            BackendError::MalformedStream(msg) => write!(f, "Malformed response stream: {}", msg),
            BackendError::Cancelled => write!(f, "Generation cancelled"),
        }
    }
}

impl std::error::Error for BackendError {}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatOptions {
    pub temperature: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub stream: bool,
    pub options: ChatOptions,
}

/// Finite, non-restartable sequence of reply fragments.
pub type FragmentStream<'a> = Box<dyn Iterator<Item = Result<String, BackendError>> + 'a>;

pub trait ChatBackend {
    fn chat(&self, request: &ChatRequest) -> Result<FragmentStream<'_>, BackendError>;
}
