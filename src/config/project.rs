use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{CreateError, Result};

pub const RC_FILE: &str = ".createrc";
pub const PACKAGE_JSON: &str = "package.json";
pub const PACKAGE_JSON_PROPERTY: &str = "create-any-cli";

/// Project-level configuration from `.createrc` or `package.json["create-any-cli"]`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct ProjectConfig {
    /// Directory patterns, relative to the config's directory, searched for templates.
    #[serde(default)]
    pub templates: Vec<String>,
}

/// The directory a project config was found in, and what it says.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    pub root: PathBuf,
    pub config_path: Option<PathBuf>,
    pub config: ProjectConfig,
}

impl Workspace {
    fn unconfigured(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            config_path: None,
            config: ProjectConfig::default(),
        }
    }
}

/// Walk up from `start` to the first directory with a `.createrc` or a
/// `package.json` carrying a `create-any-cli` property.
///
/// Without one, `start` is the workspace root and no templates are configured.
pub fn find_project_config(start: &Path) -> Result<Workspace> {
    let start = absolute_path(start)?;
    for dir in start.ancestors() {
        let rc = dir.join(RC_FILE);
        if rc.is_file() {
            let config = parse_rc(&rc, &read(&rc)?)?;
            return Ok(Workspace {
                root: dir.to_path_buf(),
                config_path: Some(rc),
                config,
            });
        }

        let package = dir.join(PACKAGE_JSON);
        if package.is_file() {
            if let Some(config) = parse_package_json(&package, &read(&package)?)? {
                return Ok(Workspace {
                    root: dir.to_path_buf(),
                    config_path: Some(package),
                    config,
                });
            }
        }
    }
    Ok(Workspace::unconfigured(&start))
}

/// `path` joined onto the process directory when relative, with `.` segments dropped.
pub fn absolute_path(path: &Path) -> Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| CreateError::Io {
                context: "reading the current directory".into(),
                source: e,
            })?
            .join(path)
    };
    Ok(joined.components().collect())
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| CreateError::Io {
        context: format!("reading {}", path.display()),
        source: e,
    })
}

/// `.createrc` is JSON when it looks like JSON, TOML otherwise.
pub fn parse_rc(path: &Path, content: &str) -> Result<ProjectConfig> {
    let parse_error = |reason: String| CreateError::ConfigParse {
        path: path.to_path_buf(),
        reason,
    };
    if content.trim_start().starts_with('{') {
        serde_json::from_str(content).map_err(|e| parse_error(e.to_string()))
    } else {
        toml::from_str(content).map_err(|e| parse_error(e.to_string()))
    }
}

/// `Ok(None)` when the package has no `create-any-cli` property.
pub fn parse_package_json(path: &Path, content: &str) -> Result<Option<ProjectConfig>> {
    let parse_error = |reason: String| CreateError::ConfigParse {
        path: path.to_path_buf(),
        reason,
    };
    let package: serde_json::Value =
        serde_json::from_str(content).map_err(|e| parse_error(e.to_string()))?;
    match package.get(PACKAGE_JSON_PROPERTY) {
        None => Ok(None),
        Some(value) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|e| parse_error(e.to_string())),
    }
}
