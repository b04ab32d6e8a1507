use super::ConfigError;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub rc_path: PathBuf,
    pub session_dir: PathBuf,
}

impl ConfigPaths {
    pub fn new() -> Result<Self, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeDirNotFound)?;
        Ok(Self::with_home(&home))
    }

    pub fn with_home(home: &Path) -> Self {
        ConfigPaths {
            rc_path: home.join(".initialtermrc"),
            session_dir: home.join(".conversation"),
        }
    }
}
