use std::io::{self, Write};

use tracing::{error, info, info_span, warn, Span};
use uuid::Uuid;

use crate::error::ShellError;
use crate::highlight::Palette;
use crate::llm::CommandGenerator;
use crate::platform::Platform;
use crate::process::{CommandRunner, ExecutionResult, Interrupt};
use crate::session::Conversation;

const AFFIRMATIVES: [&str; 3] = ["y", "yes", "yup"];

/// Asks the user a question and returns the raw answer.
pub trait Confirmer {
    fn ask(&mut self, prompt: &str) -> Result<String, ShellError>;
}

/// Supplies the requests the interactive loop works through.
pub trait RequestSource: Confirmer {
    /// `Ok(None)` when no line was read, e.g. after Ctrl-C.
    fn read_request(&mut self) -> Result<Option<String>, ShellError>;
}

pub fn is_affirmative(answer: &str) -> bool {
    let answer = answer.trim().to_lowercase();
    AFFIRMATIVES.contains(&answer.as_str())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    First,
    Correction,
}

impl Attempt {
    fn label(&self) -> &'static str {
        match self {
            Attempt::First => "Generated",
            Attempt::Correction => "Corrected",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    Completed { corrected: bool },
    Cancelled,
    /// The corrected command failed as well.
    Unresolved,
    Interrupted,
    Failed(String),
}

#[derive(Debug)]
enum TurnState {
    Synthesizing,
    AwaitingConfirmation { command: String, attempt: Attempt },
    Executing { command: String, attempt: Attempt },
    Correcting { error: String },
}

/// Runs one request through generate, confirm, execute and at most one
/// correction.
pub struct ExecutionController {
    platform: Platform,
    generator: CommandGenerator,
    runner: Box<dyn CommandRunner>,
    palette: Palette,
    interrupt: Interrupt,
    span: Span,
}

impl ExecutionController {
    pub fn new(
        platform: Platform,
        generator: CommandGenerator,
        runner: Box<dyn CommandRunner>,
        palette: Palette,
        interrupt: Interrupt,
        session_id: Uuid,
    ) -> Self {
        Self {
            platform,
            generator,
            runner,
            palette,
            interrupt,
            span: info_span!("controller", session = %session_id),
        }
    }

    pub fn model(&self) -> &str {
        self.generator.model()
    }

    /// Never fails: errors are logged, shown to the user and folded into the outcome.
    pub fn handle(
        &self,
        request: &str,
        conversation: &mut Conversation,
        confirmer: &mut dyn Confirmer,
    ) -> TurnOutcome {
        let _entered = self.span.enter();

        match self.drive(request, conversation, confirmer) {
            Ok(outcome) => {
                info!(?outcome, "turn finished");
                outcome
            }
            Err(e) if self.interrupt.is_raised() => {
                warn!(error = %e, "turn interrupted");
                TurnOutcome::Interrupted
            }
            Err(e) => {
                error!(error = %e, details = ?e, "turn failed");
                eprintln!(
                    "{}",
                    self.palette.error(&format!(
                        "An exception occurred while executing the command: {}",
                        e
                    ))
                );
                TurnOutcome::Failed(e.to_string())
            }
        }
    }

    fn drive(
        &self,
        request: &str,
        conversation: &mut Conversation,
        confirmer: &mut dyn Confirmer,
    ) -> Result<TurnOutcome, ShellError> {
        let mut state = TurnState::Synthesizing;

        loop {
            if self.interrupt.is_raised() {
                return Ok(TurnOutcome::Interrupted);
            }

            state = match state {
                TurnState::Synthesizing => {
                    let command = self.generator.synthesize(
                        self.platform,
                        request,
                        conversation,
                        &mut |fragment: &str| self.echo(fragment),
                    )?;
                    self.announce(Attempt::First, &command);
                    TurnState::AwaitingConfirmation {
                        command,
                        attempt: Attempt::First,
                    }
                }
                TurnState::AwaitingConfirmation { command, attempt } => {
                    let prompt = format!(
                        "{} command is: '{}', shall we continue? (Y/N):# ",
                        attempt.label(),
                        self.palette.command(&command)
                    );
                    let answer = confirmer.ask(&prompt)?;
                    if self.interrupt.is_raised() {
                        return Ok(TurnOutcome::Interrupted);
                    }
                    if !is_affirmative(&answer) {
                        warn!(%command, ?attempt, "command execution cancelled by user");
                        println!("{}", self.palette.hint("Cancelled."));
                        return Ok(TurnOutcome::Cancelled);
                    }
                    TurnState::Executing { command, attempt }
                }
                TurnState::Executing { command, attempt } => {
                    let result = self.runner.run(&command)?;
                    info!(%command, ?attempt, exit_code = ?result.exit_code, "command executed");
                    self.report(&result);

                    match (result.failed(), attempt) {
                        (false, _) => {
                            return Ok(TurnOutcome::Completed {
                                corrected: attempt == Attempt::Correction,
                            })
                        }
                        (true, Attempt::First) => TurnState::Correcting {
                            error: result.stderr,
                        },
                        (true, Attempt::Correction) => return Ok(TurnOutcome::Unresolved),
                    }
                }
                TurnState::Correcting { error } => {
                    let command = self.generator.correct(
                        self.platform,
                        &error,
                        conversation,
                        &mut |fragment: &str| self.echo(fragment),
                    )?;
                    self.announce(Attempt::Correction, &command);
                    TurnState::AwaitingConfirmation {
                        command,
                        attempt: Attempt::Correction,
                    }
                }
            };
        }
    }

    fn echo(&self, fragment: &str) {
        print!("{}", self.palette.fragment(fragment));
        let _ = io::stdout().flush();
    }

    fn announce(&self, attempt: Attempt, command: &str) {
        println!(
            "\n{}",
            self.palette
                .fragment(&format!("Finished.\n{}: {}\n", attempt.label(), command))
        );
    }

    fn report(&self, result: &ExecutionResult) {
        if !result.stdout.is_empty() {
            println!(
                "\n{}\n{}",
                self.palette.prompt("# Output:"),
                self.palette.output(&result.stdout)
            );
        }
        if result.failed() {
            error!(stderr = %result.stderr, "command wrote to stderr");
            println!("\n{}", self.palette.error(&format!("Error: {}", result.stderr)));
        }
    }
}
