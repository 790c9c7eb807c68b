use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{CreateError, Result};

/// User-level configuration loaded from `~/.config/create-any/config.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct UserConfig {
    /// Extra template directory patterns, searched after the project's.
    /// Relative patterns are resolved against the user config directory.
    #[serde(default)]
    pub templates: Vec<String>,
}

/// Get the path to the user config file.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("create-any").join("config.toml"))
}

/// Load user configuration from the XDG config directory.
///
/// Returns `Ok(None)` if the config file does not exist.
/// Returns `Err` if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<Option<UserConfig>> {
    let path = match config_path() {
        Some(p) => p,
        None => return Ok(None),
    };

    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(&path).map_err(|e| CreateError::Io {
        context: format!("reading user config {}", path.display()),
        source: e,
    })?;

    let mut config: UserConfig = toml::from_str(&content).map_err(|e| CreateError::ConfigParse {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    if let Some(base) = path.parent() {
        config.templates = config
            .templates
            .iter()
            .map(|pattern| base.join(pattern).display().to_string())
            .collect();
    }

    Ok(Some(config))
}
