use crate::core::config::ConfigError;
use std::path::{Path, PathBuf};

#[derive(Clone)]
pub struct PathExpander;

impl Default for PathExpander {
    fn default() -> Self {
        Self::new()
    }
}

impl PathExpander {
    pub fn new() -> Self {
        Self
    }

    pub fn expand(&self, path: &str) -> Result<PathBuf, ConfigError> {
        if path.starts_with('~') {
            self.expand_tilde(path)
        } else {
            Ok(Path::new(path).to_path_buf())
        }
    }

    fn expand_tilde(&self, path: &str) -> Result<PathBuf, ConfigError> {
        if path.len() == 1 {
            return dirs::home_dir().ok_or(ConfigError::HomeDirNotFound);
        }

        let without_tilde = &path[1..];
        match without_tilde.strip_prefix('/') {
            Some(stripped) => {
                let mut home_path = dirs::home_dir().ok_or(ConfigError::HomeDirNotFound)?;
                for part in stripped.split('/').filter(|p| !p.is_empty()) {
                    home_path.push(part);
                }
                Ok(home_path)
            }
            // "~user/..." is left to the caller
            None => Ok(Path::new(path).to_path_buf()),
        }
    }
}
