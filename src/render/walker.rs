use std::collections::HashSet;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher, GlobSet, GlobSetBuilder};
use log::debug;
use serde_json::Value;
use walkdir::WalkDir;

use super::context::build_context;
use super::engine::Renderer;
use super::file::{
    is_dir_empty, normalize_relative, read_text, validate_rendered_path, write_atomic, FileJob,
};
use super::hooks::{DestinationDecision, FileHooks, HookPayload};
use crate::error::{CreateError, Result};

/// Everything the processor needs to materialize one template.
#[derive(Debug, Clone)]
pub struct ProcessJob {
    pub source_dir: PathBuf,
    pub dest_dir: PathBuf,
    /// Globs relative to `source_dir`.
    pub file_patterns: Vec<String>,
    /// Globs relative to `source_dir`; matching files are never processed.
    pub ignore_patterns: Vec<String>,
    pub args: Value,
}

#[derive(Debug, Clone)]
pub struct ProcessReport {
    pub dest_dir: PathBuf,
    /// Destination-relative paths in write order.
    pub files_written: Vec<PathBuf>,
}

/// Render the files of `job.source_dir` matched by its patterns into `job.dest_dir`.
///
/// Files are handled one at a time, each through read -> render -> write, in the
/// order returned by [`expand_files`]. A non-empty destination is reported to
/// [`FileHooks::on_invalid_destination`] before anything is read. The first error
/// stops the run; files already written stay on disk.
pub fn process(job: &ProcessJob, hooks: &dyn FileHooks) -> Result<ProcessReport> {
    process_with(&Renderer::new(), job, hooks)
}

pub fn process_with(
    renderer: &Renderer,
    job: &ProcessJob,
    hooks: &dyn FileHooks,
) -> Result<ProcessReport> {
    std::fs::create_dir_all(&job.dest_dir).map_err(|e| CreateError::Io {
        context: format!("creating directory {}", job.dest_dir.display()),
        source: e,
    })?;

    if !is_dir_empty(&job.dest_dir)? {
        debug!("destination {} is not empty", job.dest_dir.display());
        match hooks.on_invalid_destination(&job.dest_dir)? {
            DestinationDecision::Abort => {
                return Err(CreateError::DestinationNotEmpty {
                    path: job.dest_dir.clone(),
                })
            }
            DestinationDecision::Proceed => {
                debug!("proceeding into non-empty destination");
            }
        }
    }

    let sources = expand_files(&job.source_dir, &job.file_patterns, &job.ignore_patterns)?;
    let context = build_context(&job.args)?;
    let mut files_written = Vec::with_capacity(sources.len());

    for source in sources {
        let relative = source
            .strip_prefix(&job.source_dir)
            .map(normalize_relative)
            .unwrap_or_else(|_| normalize_relative(&source));

        let rendered = renderer.render_path(&relative, &context)?;
        let destination_relative = validate_rendered_path(&relative, &rendered)?;

        let mut file = FileJob {
            destination_absolute: job.dest_dir.join(&destination_relative),
            destination_relative: normalize_relative(&destination_relative),
            source_relative: relative,
            source_absolute: source,
            raw_content: None,
            processed_content: None,
        };
        debug!("{} -> {}", file.source_relative, file.destination_relative);

        let file_context = hooks.on_file(&file)?;

        hooks.on_before_read_file(&HookPayload { file: &file, context: &file_context })?;
        file.raw_content = Some(read_text(&file.source_absolute)?);
        hooks.on_after_read_file(&HookPayload { file: &file, context: &file_context })?;

        hooks.on_before_process_file(&HookPayload { file: &file, context: &file_context })?;
        let processed = renderer.render_content(
            &file.source_relative,
            file.raw_content.as_deref().unwrap_or_default(),
            &context,
        )?;
        file.processed_content = Some(processed);
        hooks.on_after_process_file(&HookPayload { file: &file, context: &file_context })?;

        hooks.on_before_write_file(&HookPayload { file: &file, context: &file_context })?;
        write_atomic(
            &file.destination_absolute,
            file.processed_content.as_deref().unwrap_or_default(),
        )?;
        hooks.on_after_write_file(&HookPayload { file: &file, context: &file_context })?;

        files_written.push(destination_relative);
    }

    Ok(ProcessReport {
        dest_dir: job.dest_dir.clone(),
        files_written,
    })
}

/// Expand `patterns` against the regular files below `source_dir`.
///
/// `*` does not cross `/`, `**` matches any depth, and a trailing `/**` also
/// matches the prefix itself (so `*/**` includes top-level files). Directories and
/// symlinks are never returned. Order: pattern order first, then file-name order
/// of the directory walk; a file matched by several patterns appears once.
pub fn expand_files(
    source_dir: &Path,
    patterns: &[String],
    ignore_patterns: &[String],
) -> Result<Vec<PathBuf>> {
    let matchers = patterns
        .iter()
        .map(|p| compile_pattern(p))
        .collect::<Result<Vec<_>>>()?;
    let ignore = build_glob_set(ignore_patterns)?;

    let mut candidates = Vec::new();
    for entry in WalkDir::new(source_dir)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| CreateError::Io {
            context: format!("walking {}", source_dir.display()),
            source: e.into(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(source_dir)
            .map(normalize_relative)
            .unwrap_or_default();
        if ignore.is_match(&relative) {
            debug!("ignoring {relative}");
            continue;
        }
        candidates.push((relative, entry.into_path()));
    }

    let mut seen = HashSet::new();
    let mut files = Vec::new();
    for pattern in &matchers {
        for (relative, path) in &candidates {
            if pattern.iter().any(|m| m.is_match(relative)) && seen.insert(path.clone()) {
                files.push(path.clone());
            }
        }
    }
    Ok(files)
}

pub(crate) fn clean_pattern(pattern: &str) -> &str {
    let pattern = pattern.strip_prefix("./").unwrap_or(pattern);
    pattern.trim_start_matches('/')
}

pub(crate) fn glob(pattern: &str) -> Result<globset::Glob> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|e| CreateError::GlobPattern {
            pattern: pattern.to_string(),
            source: e,
        })
}

fn compile_pattern(pattern: &str) -> Result<Vec<GlobMatcher>> {
    let pattern = clean_pattern(pattern);
    let mut matchers = vec![glob(pattern)?.compile_matcher()];
    if let Some(prefix) = pattern.strip_suffix("/**") {
        if !prefix.is_empty() {
            matchers.push(glob(prefix)?.compile_matcher());
        }
    }
    Ok(matchers)
}

pub(crate) fn build_glob_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(glob(clean_pattern(pattern))?);
    }
    builder.build().map_err(|e| CreateError::GlobPattern {
        pattern: "<combined>".into(),
        source: e,
    })
}
