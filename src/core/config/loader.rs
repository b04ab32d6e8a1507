use std::{fs, path::Path};

use tracing::{debug, warn};

use super::{Config, ConfigError};
use crate::path::PathExpander;

/// Reads `key = value` lines from an rc file into a [`Config`].
pub struct ConfigLoader {
    expander: PathExpander,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            expander: PathExpander::new(),
        }
    }

    pub fn source_if_exists(&self, path: &Path, config: &mut Config) -> Result<(), ConfigError> {
        if path.exists() {
            self.source(path, config)?;
        }
        Ok(())
    }

    pub fn source(&self, path: &Path, config: &mut Config) -> Result<(), ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigFileNotFound(path.display().to_string()));
        }

        debug!(path = %path.display(), "reading config");
        let content = fs::read_to_string(path)?;
        for line in content.lines() {
            self.process_line(line, config)?;
        }
        Ok(())
    }

    fn process_line(&self, line: &str, config: &mut Config) -> Result<(), ConfigError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(());
        }

        let Some((key, value)) = line.split_once('=') else {
            warn!(line, "ignoring config line without '='");
            return Ok(());
        };
        let key = key.trim();
        let value = unquote(value.trim());

        match key {
            "model" => config.model = value.to_string(),
            "host" => config.host = value.to_string(),
            "temperature" => config.temperature = parse_temperature(value)?,
            "session_dir" => config.session_dir = self.expander.expand(value)?,
            other => warn!(key = other, "ignoring unknown config key"),
        }
        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn unquote(value: &str) -> &str {
    let quoted = value.len() >= 2
        && ((value.starts_with('"') && value.ends_with('"'))
            || (value.starts_with('\'') && value.ends_with('\'')));
    if quoted {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

fn parse_temperature(value: &str) -> Result<f32, ConfigError> {
    value
        .parse::<f32>()
        .ok()
        .filter(|t| t.is_finite() && *t >= 0.0)
        .ok_or_else(|| ConfigError::InvalidValue {
            key: "temperature".to_string(),
            value: value.to_string(),
        })
}
