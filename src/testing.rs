//! Scripted stand-ins for the model, the interpreter and the user.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::error::ShellError;
use crate::llm::{BackendError, ChatBackend, ChatRequest, FragmentStream};
use crate::process::{CommandRunner, ExecutionResult, Interrupt, ProcessError};
use crate::shell::controller::{Confirmer, RequestSource};

enum Reply {
    Fragments(Vec<String>),
    BrokenStream(Vec<String>, String),
    Unavailable,
}

pub struct ScriptedBackend {
    replies: RefCell<VecDeque<Reply>>,
    requests: Rc<RefCell<Vec<ChatRequest>>>,
}

impl ScriptedBackend {
    pub fn new(replies: Vec<Vec<&str>>) -> Self {
        Self::from_replies(
            replies
                .into_iter()
                .map(|fragments| Reply::Fragments(fragments.into_iter().map(String::from).collect()))
                .collect(),
        )
    }

    pub fn unavailable() -> Self {
        Self::from_replies(vec![Reply::Unavailable])
    }

    pub fn with_stream_error(fragments: Vec<&str>, message: &str) -> Self {
        Self::from_replies(vec![Reply::BrokenStream(
            fragments.into_iter().map(String::from).collect(),
            message.to_string(),
        )])
    }

    fn from_replies(replies: Vec<Reply>) -> Self {
        Self {
            replies: RefCell::new(replies.into()),
            requests: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn requests(&self) -> Rc<RefCell<Vec<ChatRequest>>> {
        Rc::clone(&self.requests)
    }
}

impl ChatBackend for ScriptedBackend {
    fn chat(&self, request: &ChatRequest) -> Result<FragmentStream<'_>, BackendError> {
        self.requests.borrow_mut().push(request.clone());
        match self.replies.borrow_mut().pop_front() {
            Some(Reply::Fragments(fragments)) => Ok(Box::new(
                fragments.into_iter().map(Ok::<String, BackendError>),
            )),
            Some(Reply::BrokenStream(fragments, message)) => Ok(Box::new(
                fragments
                    .into_iter()
                    .map(Ok::<String, BackendError>)
                    .chain(std::iter::once(Err(BackendError::MalformedStream(message)))),
            )),
            Some(Reply::Unavailable) | None => Err(BackendError::Unavailable(
                "connection refused".to_string(),
            )),
        }
    }
}

pub struct ScriptedRunner {
    results: RefCell<VecDeque<ExecutionResult>>,
    commands: Rc<RefCell<Vec<String>>>,
}

impl ScriptedRunner {
    /// Each entry is `(stdout, stderr)` for the next run.
    pub fn new(results: Vec<(&str, &str)>) -> Self {
        Self {
            results: RefCell::new(
                results
                    .into_iter()
                    .map(|(stdout, stderr)| ExecutionResult {
                        stdout: stdout.to_string(),
                        stderr: stderr.to_string(),
                        exit_code: Some(if stderr.is_empty() { 0 } else { 1 }),
                    })
                    .collect(),
            ),
            commands: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn commands(&self) -> Rc<RefCell<Vec<String>>> {
        Rc::clone(&self.commands)
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, command: &str) -> Result<ExecutionResult, ProcessError> {
        self.commands.borrow_mut().push(command.to_string());
        self.results
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| ProcessError::InterpreterNotFound("scripted".to_string()))
    }
}

pub struct ScriptedConfirmer {
    answers: VecDeque<String>,
    pub prompts: Vec<String>,
}

impl ScriptedConfirmer {
    pub fn new(answers: Vec<&str>) -> Self {
        Self {
            answers: answers.into_iter().map(String::from).collect(),
            prompts: Vec::new(),
        }
    }
}

impl Confirmer for ScriptedConfirmer {
    fn ask(&mut self, prompt: &str) -> Result<String, ShellError> {
        self.prompts.push(prompt.to_string());
        Ok(self.answers.pop_front().unwrap_or_default())
    }
}

/// Feeds request lines to the loop and answers its confirmations. Running out
/// of lines behaves like Ctrl-D.
pub struct ScriptedSession {
    lines: VecDeque<String>,
    confirmer: ScriptedConfirmer,
    interrupt: Interrupt,
    pub reads: usize,
}

impl ScriptedSession {
    pub fn new(lines: Vec<&str>, answers: Vec<&str>, interrupt: Interrupt) -> Self {
        Self {
            lines: lines.into_iter().map(String::from).collect(),
            confirmer: ScriptedConfirmer::new(answers),
            interrupt,
            reads: 0,
        }
    }

    pub fn prompts(&self) -> &[String] {
        &self.confirmer.prompts
    }
}

impl RequestSource for ScriptedSession {
    fn read_request(&mut self) -> Result<Option<String>, ShellError> {
        self.reads += 1;
        match self.lines.pop_front() {
            Some(line) => Ok(Some(line)),
            None => {
                self.interrupt.raise();
                Ok(None)
            }
        }
    }
}

impl Confirmer for ScriptedSession {
    fn ask(&mut self, prompt: &str) -> Result<String, ShellError> {
        self.confirmer.ask(prompt)
    }
}
