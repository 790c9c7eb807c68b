//! Template discovery: find `create-config.rhai` files, load them and index by id.

pub mod config;
pub mod loader;

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, warn};
use rhai::Engine;
use walkdir::WalkDir;

use crate::render::file::normalize_relative;
use crate::render::walker::{clean_pattern, glob};
use crate::script::create_engine;

pub use config::TemplateConfig;

pub const DEFAULT_CONFIG_FILE: &str = "create-config.rhai";

/// Everything discovery found: valid templates by id, plus warnings for the rest.
#[derive(Debug, Default)]
pub struct Discovery {
    pub templates: BTreeMap<String, TemplateConfig>,
    pub warnings: Vec<String>,
}

impl Discovery {
    pub fn get(&self, id: &str) -> Option<&TemplateConfig> {
        self.templates.get(id)
    }

    pub fn ids(&self) -> Vec<String> {
        self.templates.keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    fn warn(&mut self, message: String) {
        warn!("{message}");
        self.warnings.push(message);
    }
}

/// Discover template configs under `working_dir`.
///
/// Invalid or duplicate configs never fail discovery; they are skipped and
/// reported in [`Discovery::warnings`]. The first config to claim an id wins.
/// Scripts see the process working directory through `cwd()`.
pub fn discover(working_dir: &Path, patterns: &[String], config_file_name: &str) -> Discovery {
    let cwd = std::env::current_dir().unwrap_or_else(|_| working_dir.to_path_buf());
    let engine = Arc::new(create_engine(&cwd));
    discover_with(&engine, working_dir, patterns, config_file_name)
}

/// [`discover`] with a caller-built engine, so every loaded script shares its helpers.
pub fn discover_with(
    engine: &Arc<Engine>,
    working_dir: &Path,
    patterns: &[String],
    config_file_name: &str,
) -> Discovery {
    let mut discovery = Discovery::default();

    let (candidates, problems) = config_paths(working_dir, patterns, config_file_name);
    for problem in problems {
        discovery.warn(problem);
    }
    debug!("found {} template config(s)", candidates.len());

    let loaded: Vec<_> = candidates
        .into_iter()
        .map(|path| {
            let result = loader::load(engine, &path);
            (path, result)
        })
        .collect();

    for (path, result) in loaded {
        let config = match result {
            Ok(config) => config,
            Err(message) => {
                discovery.warn(message);
                continue;
            }
        };
        if let Some(existing) = discovery.templates.get(&config.id) {
            let message = format!(
                "Duplicate template id '{}': {} is ignored, already defined by {}",
                config.id,
                path.display(),
                existing.config_path.display()
            );
            discovery.warn(message);
            continue;
        }
        debug!("registered template '{}' from {}", config.id, path.display());
        discovery.templates.insert(config.id.clone(), config);
    }

    discovery
}

/// Every config file matched by `patterns`, in pattern order, each listed once.
///
/// Bad patterns and unreadable directories are skipped; each one comes back
/// as a message next to the paths that were found.
pub fn config_paths(
    working_dir: &Path,
    patterns: &[String],
    config_file_name: &str,
) -> (Vec<PathBuf>, Vec<String>) {
    let mut seen = HashSet::new();
    let mut paths = Vec::new();
    let mut problems = Vec::new();

    for pattern in patterns {
        let (root, rest) = split_literal_prefix(pattern);
        let root = working_dir.join(root);
        if !root.is_dir() {
            debug!("template pattern '{pattern}' has no directory {}", root.display());
            continue;
        }

        let expanded = if rest.is_empty() {
            format!("**/{config_file_name}")
        } else {
            format!("{rest}/**/{config_file_name}")
        };
        let matcher = match glob(&expanded) {
            Ok(glob) => glob.compile_matcher(),
            Err(e) => {
                problems.push(format!("Skipping template pattern '{pattern}': {e}"));
                continue;
            }
        };

        for entry in WalkDir::new(&root)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let location = root.display();
                    problems.push(format!("Skipping an entry while walking {location}: {e}"));
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(&root)
                .map(normalize_relative)
                .unwrap_or_default();
            if matcher.is_match(&relative) && seen.insert(entry.path().to_path_buf()) {
                paths.push(entry.into_path());
            }
        }
    }

    (paths, problems)
}

/// Split a pattern into its leading glob-free directory and the remainder.
fn split_literal_prefix(pattern: &str) -> (PathBuf, String) {
    let mut root = PathBuf::new();
    if pattern.starts_with('/') {
        root.push("/");
    }
    let pattern = clean_pattern(pattern).trim_end_matches('/');
    let is_glob = |segment: &str| segment.contains(['*', '?', '[', '{']);

    let mut segments = pattern.split('/').filter(|s| !s.is_empty() && *s != ".");
    let mut rest = Vec::new();
    for segment in segments.by_ref() {
        if is_glob(segment) {
            rest.push(segment);
            break;
        }
        root.push(segment);
    }
    rest.extend(segments);
    (root, rest.join("/"))
}
