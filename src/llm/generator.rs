use tracing::{debug, info};

use super::{BackendError, ChatBackend, ChatOptions, ChatRequest};
use crate::platform::Platform;
use crate::process::Interrupt;
use crate::session::{Conversation, Message};

/// Fence openers removed from replies, longest first so `sh` never eats the
/// front of `shell`.
const FENCE_MARKERS: [&str; 6] = [
    "```powershell",
    "```shell",
    "```bash",
    "```zsh",
    "```cmd",
    "```sh",
];

/// Produces command lines from the model: fresh ones for requests, fixed ones
/// for errors. Both share the same streaming and clean-up path.
pub struct CommandGenerator {
    backend: Box<dyn ChatBackend>,
    model: String,
    temperature: f32,
    interrupt: Interrupt,
}

impl CommandGenerator {
    pub fn new(
        backend: Box<dyn ChatBackend>,
        model: impl Into<String>,
        temperature: f32,
        interrupt: Interrupt,
    ) -> Self {
        Self {
            backend,
            model: model.into(),
            temperature,
            interrupt,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn synthesize(
        &self,
        platform: Platform,
        request: &str,
        conversation: &mut Conversation,
        observer: &mut dyn FnMut(&str),
    ) -> Result<String, BackendError> {
        info!(%platform, request, model = %self.model, "synthesizing command");
        self.generate(synthesis_instruction(platform, request), conversation, observer)
    }

    pub fn correct(
        &self,
        platform: Platform,
        error_text: &str,
        conversation: &mut Conversation,
        observer: &mut dyn FnMut(&str),
    ) -> Result<String, BackendError> {
        info!(%platform, error = error_text, model = %self.model, "requesting correction");
        self.generate(correction_instruction(platform, error_text), conversation, observer)
    }

    fn generate(
        &self,
        instruction: String,
        conversation: &mut Conversation,
        observer: &mut dyn FnMut(&str),
    ) -> Result<String, BackendError> {
        let mut messages = conversation.messages().to_vec();
        messages.push(Message::user(instruction));

        let request = ChatRequest {
            model: self.model.clone(),
            messages,
            stream: true,
            options: ChatOptions {
                temperature: self.temperature,
            },
        };

        let mut reply = String::new();
        for fragment in self.backend.chat(&request)? {
            if self.interrupt.is_raised() {
                return Err(BackendError::Cancelled);
            }
            let fragment = fragment?;
            observer(&fragment);
            reply.push_str(&fragment);
        }

        let command = normalize_command(&reply);
        debug!(raw = %reply, %command, "normalized reply");
        if command.is_empty() {
            return Err(BackendError::MalformedStream("empty reply".to_string()));
        }
        conversation.push_assistant(command.clone());
        Ok(command)
    }
}

fn synthesis_instruction(platform: Platform, request: &str) -> String {
    format!(
        "I am using the {} operating system with no extensions installed. Convert this user \
         query into a terminal command: {}. Output exactly one line containing only the \
         command, with no explanation or formatting, because it will be pasted straight \
         into the terminal and run.",
        platform, request
    )
}

fn correction_instruction(platform: Platform, error_text: &str) -> String {
    format!(
        "I am using the {} operating system and running the previous command failed with \
         this error: {}. Provide a corrected command that resolves it. Output exactly one \
         line containing only the command, with no explanation or formatting.",
        platform, error_text
    )
}

/// Cleans a model reply into a single command line.
pub fn normalize_command(raw: &str) -> String {
    let without_fences = strip_fence_markers(raw);
    let without_ticks = without_fences.replace('`', "");

    without_ticks
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

fn strip_fence_markers(raw: &str) -> String {
    let mut result = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(pos) = rest.find("```") {
        result.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        let marker = FENCE_MARKERS.iter().find(|marker| {
            tail.starts_with(*marker)
                && !tail[marker.len()..]
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_ascii_alphanumeric())
        });

        match marker {
            Some(marker) => rest = &tail[marker.len()..],
            None => {
                result.push_str("```");
                rest = &tail[3..];
            }
        }
    }
    result.push_str(rest);
    result
}
