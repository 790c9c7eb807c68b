pub mod list;
pub mod new;

use std::path::PathBuf;

use console::style;
use miette::{IntoDiagnostic, Result};

/// Directory the command operates in: `--cwd` made absolute, or the process directory.
pub fn working_dir(cwd: Option<PathBuf>) -> Result<PathBuf> {
    match cwd {
        Some(dir) => Ok(create_any::config::absolute_path(&dir)?),
        None => std::env::current_dir().into_diagnostic(),
    }
}

/// Template patterns from the user config, if there is one.
pub fn user_patterns() -> Vec<String> {
    match create_any::config::load_user_config() {
        Ok(Some(config)) => config.templates,
        Ok(None) => Vec::new(),
        Err(e) => {
            eprintln!(
                "{} {}",
                style("warning:").yellow().bold(),
                style(format!("ignoring user config: {e}")).yellow()
            );
            Vec::new()
        }
    }
}
