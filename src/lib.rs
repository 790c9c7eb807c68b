pub mod answers;
pub mod case;
pub mod config;
pub mod error;
pub mod flags;
pub mod prompt;
pub mod registry;
pub mod render;
pub mod script;
pub mod ui;

use std::path::PathBuf;
use std::sync::Arc;

use log::debug;

use crate::answers::{resolve_answers, FlagMap};
use crate::config::{absolute_path, find_project_config};
use crate::error::{CreateError, Result};
use crate::prompt::Prompter;
use crate::registry::{discover_with, Discovery, TemplateConfig, DEFAULT_CONFIG_FILE};
use crate::render::{process, ProcessJob, ProcessReport};
use crate::script::create_engine;
use crate::ui::{Reporter, ReporterHooks, ReporterObserver};

/// Files inside a template directory that are never copied.
pub const IGNORED_TEMPLATE_FILES: &[&str] = &["**/create-config.rhai", "**/node_modules/**"];

pub struct GenerateOptions {
    /// Directory the command runs in; project config is searched upwards from here
    /// and it is the default destination.
    pub cwd: PathBuf,
    /// Requested template id; prompted for when missing or unknown.
    pub template: Option<String>,
    pub flags: FlagMap,
    /// Template patterns searched after the project's, e.g. from the user config.
    pub extra_patterns: Vec<String>,
    /// Write into a destination that already has entries.
    pub allow_non_empty: bool,
}

/// Find the project config above `cwd` and discover every template it points to.
///
/// Template scripts see `cwd` through their `cwd()` helper.
pub fn discover_templates(cwd: &std::path::Path, extra_patterns: &[String]) -> Result<Discovery> {
    let cwd = absolute_path(cwd)?;
    let workspace = find_project_config(&cwd)?;
    let mut patterns = workspace.config.templates.clone();
    patterns.extend(extra_patterns.iter().cloned());
    debug!(
        "discovering templates in {} with patterns {:?}",
        workspace.root.display(),
        patterns
    );
    let engine = Arc::new(create_engine(&cwd));
    Ok(discover_with(&engine, &workspace.root, &patterns, DEFAULT_CONFIG_FILE))
}

/// Main entry point: pick a template, collect answers and write its files.
pub fn generate(
    options: GenerateOptions,
    prompter: &dyn Prompter,
    reporter: &Reporter,
) -> Result<ProcessReport> {
    let cwd = options.cwd.display().to_string();
    reporter.start(&["Resolving templates from", &cwd]);

    // 1. Discover
    let discovery = discover_templates(&options.cwd, &options.extra_patterns)?;
    for warning in &discovery.warnings {
        reporter.warn(&[warning.as_str()]);
    }

    // 2. Select
    let template = reporter.suspend(|| {
        select_template(&discovery, options.template.as_deref(), prompter, &options.cwd)
    })?;
    let using = format!("Using template \"{}\"...", template.id);
    reporter.start(&[&using]);

    // 3. Answers
    let questions = template.resolve_questions(&options.flags)?;
    let observer = ReporterObserver::new(reporter, &template.id);
    let answers = reporter
        .suspend(|| resolve_answers(questions, &options.flags, &observer, prompter))?;

    // 4. Template behaviours
    let file_patterns = template.resolve_files(&answers, &options.flags)?;
    let args = template.create_template_args(&answers, &options.flags)?;
    let dest_dir = template.resolve_destination_folder(&answers, &options.flags, &options.cwd)?;

    // 5. Process
    let job = ProcessJob {
        source_dir: template.source_dir.clone(),
        dest_dir,
        file_patterns,
        ignore_patterns: IGNORED_TEMPLATE_FILES.iter().map(|s| s.to_string()).collect(),
        args,
    };
    let hooks = ReporterHooks::new(reporter, options.allow_non_empty);
    let report = process(&job, &hooks)?;

    let created = format!("Successfully created template \"{}\" in", template.id);
    reporter.succeed(&[&created, &report.dest_dir.display().to_string()]);
    reporter.finish();

    Ok(report)
}

/// The requested template, or one chosen interactively when the id is missing or unknown.
pub fn select_template<'a>(
    discovery: &'a Discovery,
    requested: Option<&str>,
    prompter: &dyn Prompter,
    cwd: &std::path::Path,
) -> Result<&'a TemplateConfig> {
    if discovery.is_empty() {
        return Err(CreateError::NoTemplates {
            cwd: cwd.to_path_buf(),
        });
    }

    if let Some(template) = requested.and_then(|id| discovery.get(id)) {
        return Ok(template);
    }

    let message = match requested {
        None => "Which template would you like to use?".to_string(),
        Some(id) => format!("No template found for id \"{id}\""),
    };
    let chosen = prompter.select(&ui::message(&[message.as_str()]), &discovery.ids())?;
    discovery
        .get(&chosen)
        .ok_or(CreateError::UnknownTemplate { id: chosen })
}
