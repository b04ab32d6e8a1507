use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use super::{Conversation, SessionError};

pub struct FileOps {
    file_path: PathBuf,
}

impl FileOps {
    pub fn new(file_path: PathBuf) -> Self {
        Self { file_path }
    }

    pub fn load(&self) -> Result<Conversation, SessionError> {
        if !self.file_path.exists() {
            return Ok(Conversation::new());
        }

        let content = fs::read_to_string(&self.file_path)?;
        serde_json::from_str(&content).map_err(|source| SessionError::Corrupt {
            path: self.file_path.clone(),
            source,
        })
    }

    /// Writes next to the target and renames over it, so a crash leaves the
    /// previous turn's file in place.
    pub fn store(&self, conversation: &Conversation) -> Result<(), SessionError> {
        let tmp_path = self.tmp_path();
        {
            let file = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(file);
            let mut serializer =
                serde_json::Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(b"    "));
            conversation
                .serialize(&mut serializer)
                .map_err(SessionError::Serialize)?;
            writer.flush()?;
        }
        fs::rename(&tmp_path, &self.file_path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .file_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.file_path.with_file_name(name)
    }
}
