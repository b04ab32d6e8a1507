use tracing::{debug, error, info, info_span, Span};

pub mod controller;
mod prompter;

use crate::{
    core::config::Config,
    error::ShellError,
    flags::Flags,
    highlight::Palette,
    llm::{CommandGenerator, OllamaClient},
    platform::Platform,
    process::{CommandExecutor, Interrupt},
    session::{Conversation, SessionHandle, SessionStore},
};

use controller::{Confirmer, ExecutionController, RequestSource, TurnOutcome};
use prompter::Prompter;

const HISTORY_FILE: &str = "history.txt";

/// Input containing "exit" or "quit" anywhere ends the session.
pub fn is_exit_request(input: &str) -> bool {
    let input = input.to_lowercase();
    input.contains("exit") || input.contains("quit")
}

/// The conversation of the running session and where it is stored.
pub struct SessionState {
    store: SessionStore,
    handle: SessionHandle,
    conversation: Conversation,
}

impl SessionState {
    /// Starts a fresh session, or reopens `resume` and loads its history.
    pub fn start(
        store: SessionStore,
        platform: Platform,
        resume: Option<&str>,
    ) -> Result<Self, ShellError> {
        let handle = match resume {
            Some(id) => store.open(platform, id)?,
            None => store.create(platform)?,
        };
        let conversation = store.load(&handle)?;
        info!(
            session = %handle.id(),
            path = %handle.path().display(),
            messages = conversation.len(),
            "session ready"
        );
        Ok(Self {
            store,
            handle,
            conversation,
        })
    }

    pub fn handle(&self) -> &SessionHandle {
        &self.handle
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Records the request, runs it, and saves the session whatever the outcome.
    pub fn run_turn(
        &mut self,
        controller: &ExecutionController,
        request: &str,
        confirmer: &mut dyn Confirmer,
    ) -> Result<TurnOutcome, ShellError> {
        self.conversation.push_user(request);
        let outcome = controller.handle(request, &mut self.conversation, confirmer);
        self.store.save(&self.handle, &self.conversation)?;
        Ok(outcome)
    }

    /// Works through requests until an exit word or an interrupt. A failed
    /// save is reported and the loop carries on.
    pub fn run_loop<I: RequestSource>(
        &mut self,
        controller: &ExecutionController,
        input: &mut I,
        interrupt: &Interrupt,
        palette: &Palette,
    ) -> Result<(), ShellError> {
        loop {
            if interrupt.is_raised() {
                info!("exiting command prompt due to interrupt");
                return Ok(());
            }

            let line = match input.read_request()? {
                Some(line) => line,
                None => continue,
            };

            if line.trim().is_empty() {
                continue;
            }

            if is_exit_request(&line) {
                info!("exiting command prompt");
                return Ok(());
            }

            match self.run_turn(controller, &line, input) {
                Ok(outcome) => debug!(?outcome, "turn recorded"),
                Err(e) => {
                    error!(error = %e, "could not save session");
                    eprintln!("{}", palette.error(&format!("Warning: {}", e)));
                }
            }
        }
    }
}

pub struct Shell {
    prompter: Prompter,
    controller: ExecutionController,
    state: SessionState,
    platform: Platform,
    interrupt: Interrupt,
    palette: Palette,
    flags: Flags,
    span: Span,
}

impl Shell {
    pub fn new(flags: Flags, config: Config, platform: Platform) -> Result<Self, ShellError> {
        let interrupt = Interrupt::install()?;
        let palette = Palette::new();

        let store = SessionStore::new(config.session_dir());
        let resume = flags.get_value("resume").map(String::as_str);
        let state = SessionState::start(store, platform, resume)?;

        let backend = OllamaClient::new(config.host())?;
        let executor = CommandExecutor::new();
        info!(
            host = backend.host(),
            interpreter = executor.interpreter(),
            "backend and interpreter ready"
        );
        let generator = CommandGenerator::new(
            Box::new(backend),
            config.model(),
            config.temperature(),
            interrupt.clone(),
        );
        let controller = ExecutionController::new(
            platform,
            generator,
            Box::new(executor),
            palette,
            interrupt.clone(),
            state.handle().id(),
        );

        let history_file = config.session_dir().join(HISTORY_FILE);
        let prompter = Prompter::new(interrupt.clone(), palette, Some(history_file))?;
        let span = info_span!("shell", session = %state.handle().id());

        Ok(Shell {
            prompter,
            controller,
            state,
            platform,
            interrupt,
            palette,
            flags,
            span,
        })
    }

    pub fn run(&mut self) -> Result<(), ShellError> {
        let _entered = self.span.enter();
        info!(platform = %self.platform, model = %self.controller.model(), "starting command prompt");
        self.print_banner();

        let result = self.state.run_loop(
            &self.controller,
            &mut self.prompter,
            &self.interrupt,
            &self.palette,
        );

        self.prompter.save_history();
        result?;
        if !self.flags.is_set("quiet") {
            println!("{}", self.palette.prompt("Exiting the command prompt."));
        }
        Ok(())
    }

    fn print_banner(&self) {
        if self.flags.is_set("quiet") {
            return;
        }
        let model = self.controller.model();
        println!(
            "{}",
            self.palette.command(&format!(
                "Welcome to the Initial Terminal command prompt for {} with model {}!",
                self.platform, model
            ))
        );
        println!(
            "{}",
            self.palette
                .hint(&format!(" Ollama with {} running locally for inference", model))
        );
        println!(
            "{}",
            self.palette.hint(&format!(
                " Session {} ({} earlier messages)",
                self.state.handle().id(),
                self.state.conversation().len()
            ))
        );
        println!(" Type quit/exit to exit\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Message, Role};
    use crate::session::SessionError;
    use crate::testing::{ScriptedBackend, ScriptedConfirmer, ScriptedRunner, ScriptedSession};
    use tempfile::TempDir;

    fn controller(
        backend: ScriptedBackend,
        runner: ScriptedRunner,
        id: uuid::Uuid,
    ) -> ExecutionController {
        controller_with(backend, runner, id, Interrupt::new())
    }

    fn controller_with(
        backend: ScriptedBackend,
        runner: ScriptedRunner,
        id: uuid::Uuid,
        interrupt: Interrupt,
    ) -> ExecutionController {
        let generator =
            CommandGenerator::new(Box::new(backend), "test-model", 0.1, interrupt.clone());
        ExecutionController::new(
            Platform::Linux,
            generator,
            Box::new(runner),
            Palette::plain(),
            interrupt,
            id,
        )
    }

    #[test]
    fn test_exit_requests() {
        assert!(is_exit_request("exit"));
        assert!(is_exit_request("  QUIT "));
        assert!(is_exit_request("please exit now"));
        assert!(is_exit_request("Quitting time"));
        assert!(!is_exit_request("list files"));
    }

    #[test]
    fn test_turn_is_saved() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path());
        let mut state = SessionState::start(store.clone(), Platform::Linux, None).unwrap();
        let controller = controller(
            ScriptedBackend::new(vec![vec!["ls -la"]]),
            ScriptedRunner::new(vec![("total 0", "")]),
            state.handle().id(),
        );

        let mut confirmer = ScriptedConfirmer::new(vec!["y"]);
        let outcome = state.run_turn(&controller, "list files", &mut confirmer).unwrap();
        assert_eq!(outcome, TurnOutcome::Completed { corrected: false });

        let saved = store.load(state.handle()).unwrap();
        assert_eq!(
            saved.messages(),
            &[Message::user("list files"), Message::assistant("ls -la")]
        );
    }

    #[test]
    fn test_failed_turn_is_saved() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path());
        let mut state = SessionState::start(store.clone(), Platform::Linux, None).unwrap();
        let controller = controller(
            ScriptedBackend::unavailable(),
            ScriptedRunner::new(vec![]),
            state.handle().id(),
        );

        let mut confirmer = ScriptedConfirmer::new(vec![]);
        let outcome = state.run_turn(&controller, "list files", &mut confirmer).unwrap();
        assert!(matches!(outcome, TurnOutcome::Failed(_)));

        let saved = store.load(state.handle()).unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved.messages()[0].role, Role::User);
    }

    #[test]
    fn test_resume_continues_history() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path());
        let first = SessionState::start(store.clone(), Platform::Linux, None).unwrap();
        let mut conversation = Conversation::new();
        conversation.push_user("list files");
        conversation.push_assistant("ls -la");
        store.save(first.handle(), &conversation).unwrap();

        let id = first.handle().id().to_string();
        let resumed = SessionState::start(store, Platform::Linux, Some(&id)).unwrap();
        assert_eq!(resumed.handle(), first.handle());
        assert_eq!(resumed.conversation(), &conversation);
    }

    #[test]
    fn test_resume_corrupt_session_fails() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path());
        let first = SessionState::start(store.clone(), Platform::Linux, None).unwrap();
        std::fs::write(first.handle().path(), "[{\"role\": ").unwrap();

        let id = first.handle().id().to_string();
        assert!(matches!(
            SessionState::start(store, Platform::Linux, Some(&id)),
            Err(ShellError::Session(SessionError::Corrupt { .. }))
        ));
    }

    #[test]
    fn test_resume_unknown_session_fails() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path());
        let id = uuid::Uuid::new_v4().to_string();

        assert!(matches!(
            SessionState::start(store, Platform::Linux, Some(&id)),
            Err(ShellError::Session(SessionError::NotFound(_)))
        ));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_loop_skips_blank_lines_and_stops_at_exit() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path());
        let mut state = SessionState::start(store.clone(), Platform::Linux, None).unwrap();
        let backend = ScriptedBackend::new(vec![vec!["ls"], vec!["never"]]);
        let requests = backend.requests();
        let interrupt = Interrupt::new();
        let controller = controller_with(
            backend,
            ScriptedRunner::new(vec![("a.txt", "")]),
            state.handle().id(),
            interrupt.clone(),
        );

        let mut input = ScriptedSession::new(
            vec!["", "   ", "list files", "Exit please", "show date"],
            vec!["y"],
            interrupt.clone(),
        );
        state
            .run_loop(&controller, &mut input, &interrupt, &Palette::plain())
            .unwrap();

        assert_eq!(input.reads, 4);
        assert_eq!(requests.borrow().len(), 1);
        assert!(!interrupt.is_raised());
        assert_eq!(
            store.load(state.handle()).unwrap().messages(),
            &[Message::user("list files"), Message::assistant("ls")]
        );
    }

    #[test]
    fn test_loop_stops_on_interrupt() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path());
        let mut state = SessionState::start(store, Platform::Linux, None).unwrap();
        let backend = ScriptedBackend::new(vec![vec!["date"]]);
        let interrupt = Interrupt::new();
        let controller = controller_with(
            backend,
            ScriptedRunner::new(vec![("Fri Oct 16", "")]),
            state.handle().id(),
            interrupt.clone(),
        );

        let mut input = ScriptedSession::new(vec!["show date"], vec!["yes"], interrupt.clone());
        state
            .run_loop(&controller, &mut input, &interrupt, &Palette::plain())
            .unwrap();

        assert!(interrupt.is_raised());
        assert_eq!(input.reads, 2);
        assert_eq!(input.prompts().len(), 1);
        assert_eq!(state.conversation().len(), 2);
    }

    #[test]
    fn test_loop_continues_after_save_failure() {
        let dir = TempDir::new().unwrap();
        let session_dir = dir.path().join("conversation");
        let mut state =
            SessionState::start(SessionStore::new(&session_dir), Platform::Linux, None).unwrap();
        std::fs::remove_dir_all(&session_dir).unwrap();

        let backend = ScriptedBackend::new(vec![vec!["ls"], vec!["date"]]);
        let requests = backend.requests();
        let interrupt = Interrupt::new();
        let controller = controller_with(
            backend,
            ScriptedRunner::new(vec![("a.txt", ""), ("Fri Oct 16", "")]),
            state.handle().id(),
            interrupt.clone(),
        );

        let mut input = ScriptedSession::new(
            vec!["list files", "show date", "quit"],
            vec!["y", "y"],
            interrupt.clone(),
        );
        state
            .run_loop(&controller, &mut input, &interrupt, &Palette::plain())
            .unwrap();

        assert_eq!(requests.borrow().len(), 2);
        assert_eq!(state.conversation().len(), 4);
        assert!(!state.handle().path().exists());
    }
}
