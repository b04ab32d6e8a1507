use std::path::PathBuf;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::{debug, warn};

use super::controller::{Confirmer, RequestSource};
use crate::error::ShellError;
use crate::highlight::Palette;
use crate::process::Interrupt;

/// Terminal line input for requests and confirmations.
///
/// Ctrl-C and Ctrl-D at either prompt raise the shared interrupt so the loop
/// winds down after the current turn.
pub struct Prompter {
    editor: DefaultEditor,
    interrupt: Interrupt,
    palette: Palette,
    history_file: Option<PathBuf>,
}

impl Prompter {
    pub fn new(
        interrupt: Interrupt,
        palette: Palette,
        history_file: Option<PathBuf>,
    ) -> Result<Self, ShellError> {
        let mut editor = DefaultEditor::new()?;

        if let Some(path) = history_file.as_ref().filter(|p| p.exists()) {
            if let Err(e) = editor.load_history(path) {
                warn!(path = %path.display(), error = %e, "could not load request history");
            }
        }

        Ok(Prompter {
            editor,
            interrupt,
            palette,
            history_file,
        })
    }

    pub fn save_history(&mut self) {
        if let Some(path) = &self.history_file {
            if let Err(e) = self.editor.save_history(path) {
                warn!(path = %path.display(), error = %e, "could not save request history");
            }
        }
    }
}

impl RequestSource for Prompter {
    fn read_request(&mut self) -> Result<Option<String>, ShellError> {
        println!("{}", self.palette.prompt("_____________\nCommand to execute :"));
        match self.editor.readline("# ") {
            Ok(line) => {
                if !line.trim().is_empty() {
                    if let Err(e) = self.editor.add_history_entry(line.as_str()) {
                        warn!(error = %e, "couldn't add to history");
                    }
                }
                Ok(Some(line))
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                debug!("input closed by user");
                self.interrupt.raise();
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl Confirmer for Prompter {
    fn ask(&mut self, prompt: &str) -> Result<String, ShellError> {
        match self.editor.readline(prompt) {
            Ok(answer) => Ok(answer),
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                self.interrupt.raise();
                Ok(String::new())
            }
            Err(e) => Err(e.into()),
        }
    }
}
