#![allow(unused_assignments)]

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum CreateError {
    #[error("Failed to parse {path}: {reason}")]
    #[diagnostic(help("A .createrc file must be JSON or TOML with a `templates` list"))]
    ConfigParse { path: PathBuf, reason: String },

    #[error("No templates found in {cwd}")]
    #[diagnostic(help(
        "Configure template lookup with a .createrc file or a package.json[\"create-any-cli\"] property"
    ))]
    NoTemplates { cwd: PathBuf },

    #[error("No template found for id \"{id}\"")]
    #[diagnostic(help("Run `create-any list` to see the available templates"))]
    UnknownTemplate { id: String },

    #[error("Error returned from {template_id} {function}(): {message}")]
    #[diagnostic(help("Check the template's create-config.rhai script"))]
    TemplateFunction {
        template_id: String,
        function: String,
        message: String,
    },

    #[error("Template rendering failed for {file}")]
    #[diagnostic(help("Check your Tera template syntax and the available arguments"))]
    RenderError {
        file: String,
        #[source]
        source: tera::Error,
    },

    #[error("Failed to render filename: {filename}")]
    FilenameRenderError {
        filename: String,
        #[source]
        source: tera::Error,
    },

    #[error("Rendered path '{rendered}' (from '{source_path}') is not a valid relative path")]
    #[diagnostic(help("Rendered file paths must be non-empty, relative and must not contain '..'"))]
    InvalidRenderedPath {
        source_path: String,
        rendered: String,
    },

    #[error("Target folder {path} is not empty")]
    #[diagnostic(help("Choose an empty destination, or pass --allow-non-empty"))]
    DestinationNotEmpty { path: PathBuf },

    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Glob pattern error: {pattern}")]
    GlobPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Prompt cancelled by user")]
    PromptCancelled,
}

pub type Result<T> = std::result::Result<T, CreateError>;
