use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::process::ProcessError;

/// Records Ctrl-C presses so the shell loop can stop between turns.
///
/// The handler replaces the default SIGINT behaviour, so the shell itself keeps
/// running while a child process in the foreground group receives the signal.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    raised: Arc<AtomicBool>,
}

impl Interrupt {
    /// A flag that is only raised programmatically.
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the process-wide Ctrl-C handler. Can only succeed once per process.
    pub fn install() -> Result<Self, ProcessError> {
        let interrupt = Self::new();
        let raised = Arc::clone(&interrupt.raised);
        ctrlc::set_handler(move || {
            raised.store(true, Ordering::SeqCst);
        })?;
        Ok(interrupt)
    }

    pub fn raise(&self) {
        self.raised.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::SeqCst)
    }
}
