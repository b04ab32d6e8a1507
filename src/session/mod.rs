mod file_ops;
mod message;

use std::{
    fmt,
    fs,
    path::{Path, PathBuf},
};

use tracing::debug;
use uuid::Uuid;

use self::file_ops::FileOps;
use crate::platform::Platform;

pub use message::{Conversation, Message, Role};

#[derive(Debug)]
pub enum SessionError {
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    InvalidId(String),
    NotFound(PathBuf),
    Serialize(serde_json::Error),
    IoError(std::io::Error),
}

impl From<std::io::Error> for SessionError {
    fn from(e: std::io::Error) -> Self {
        SessionError::IoError(e)
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Corrupt { path, source } => {
                write!(f, "Corrupt session file {}: {}", path.display(), source)
            }
            SessionError::InvalidId(id) => write!(f, "Invalid session id: {}", id),
            SessionError::NotFound(path) => write!(f, "No session file at {}", path.display()),
            SessionError::Serialize(e) => write!(f, "Could not serialize session: {}", e),
            SessionError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for SessionError {}

/// Identifies one session file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionHandle {
    id: Uuid,
    path: PathBuf,
}

impl SessionHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Keeps every session as one JSON file inside a per-user directory.
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Allocates a fresh session id and makes sure the directory exists.
    pub fn create(&self, platform: Platform) -> Result<SessionHandle, SessionError> {
        fs::create_dir_all(&self.dir)?;
        let id = Uuid::new_v4();
        let handle = self.handle_for(platform, id);
        debug!(session = %id, path = %handle.path.display(), "created session");
        Ok(handle)
    }

    /// Points at an existing session by its id, in either hyphenated or simple form.
    ///
    /// The file must already exist for this platform; a session saved on
    /// another OS is not picked up.
    pub fn open(&self, platform: Platform, id: &str) -> Result<SessionHandle, SessionError> {
        let id = Uuid::parse_str(id.trim()).map_err(|_| SessionError::InvalidId(id.to_string()))?;
        let handle = self.handle_for(platform, id);
        if !handle.path.is_file() {
            return Err(SessionError::NotFound(handle.path));
        }
        Ok(handle)
    }

    pub fn load(&self, handle: &SessionHandle) -> Result<Conversation, SessionError> {
        let conversation = FileOps::new(handle.path.clone()).load()?;
        debug!(session = %handle.id, messages = conversation.len(), "loaded session");
        Ok(conversation)
    }

    pub fn save(&self, handle: &SessionHandle, conversation: &Conversation) -> Result<(), SessionError> {
        let file_ops = FileOps::new(handle.path.clone());
        file_ops.store(conversation)?;
        debug!(session = %handle.id, path = %file_ops.path().display(), "saved session");
        Ok(())
    }

    fn handle_for(&self, platform: Platform, id: Uuid) -> SessionHandle {
        let file_name = format!(
            "session_{}_{}.json",
            platform.label().to_lowercase(),
            id.simple()
        );
        SessionHandle {
            id,
            path: self.dir.join(file_name),
        }
    }
}
