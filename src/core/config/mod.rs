use std::{
    env, fmt,
    path::{Path, PathBuf},
};

mod loader;
mod paths;

use loader::ConfigLoader;
pub use paths::ConfigPaths;

use crate::flags::Flags;
use crate::llm::{ollama::DEFAULT_HOST, DEFAULT_MODEL, DEFAULT_TEMPERATURE};

/// Runtime settings, layered as defaults, rc file, `OLLAMA_HOST`, then flags.
#[derive(Debug, Clone)]
pub struct Config {
    paths: ConfigPaths,
    model: String,
    host: String,
    temperature: f32,
    session_dir: PathBuf,
}

impl Config {
    pub fn new() -> Result<Self, ConfigError> {
        Ok(Self::with_paths(ConfigPaths::new()?))
    }

    pub fn with_paths(paths: ConfigPaths) -> Self {
        Config {
            session_dir: paths.session_dir.clone(),
            paths,
            model: DEFAULT_MODEL.to_string(),
            host: DEFAULT_HOST.to_string(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn load(&mut self, flags: &Flags) -> Result<(), ConfigError> {
        let loader = ConfigLoader::new();
        match flags.get_value("config") {
            Some(path) => loader.source(Path::new(path), self)?,
            None => {
                let rc_path = self.paths.rc_path.clone();
                loader.source_if_exists(&rc_path, self)?;
            }
        }

        self.apply_host_override(env::var("OLLAMA_HOST").ok());
        self.apply_flags(flags);
        Ok(())
    }

    fn apply_host_override(&mut self, host: Option<String>) {
        if let Some(host) = host.filter(|h| !h.trim().is_empty()) {
            self.host = host;
        }
    }

    fn apply_flags(&mut self, flags: &Flags) {
        if let Some(model) = flags.get_value("model") {
            self.model = model.clone();
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn session_dir(&self) -> &Path {
        &self.session_dir
    }
}

#[derive(Debug)]
pub enum ConfigError {
    HomeDirNotFound,
    ConfigFileNotFound(String),
    InvalidValue { key: String, value: String },
    IoError(std::io::Error),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::IoError(e)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::HomeDirNotFound => write!(f, "Home directory not found"),
            ConfigError::ConfigFileNotFound(path) => write!(f, "Config file not found: {}", path),
            ConfigError::InvalidValue { key, value } => {
                write!(f, "Invalid value for {}: {}", key, value)
            }
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}
