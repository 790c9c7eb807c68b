//! Terminal feedback: a spinner for progress plus hook and observer
//! implementations that report through it.

use std::cell::Cell;
use std::path::Path;
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;

use crate::answers::{AnswerObserver, Question};
use crate::error::Result;
use crate::render::{DestinationDecision, FileHooks, HookPayload};

pub const APP_NAME: &str = "create-any";

/// `create-any » part » part`, as shown in every status line and prompt.
pub fn message<S: AsRef<str>>(parts: &[S]) -> String {
    let mut out = style(APP_NAME).bold().to_string();
    for part in parts {
        out.push_str(" » ");
        out.push_str(part.as_ref());
    }
    out
}

/// Status line printer backed by a single spinner on stderr.
pub struct Reporter {
    bar: ProgressBar,
    quiet: bool,
    /// Set while the bar is suspended; the bar must not be touched then.
    suspended: Cell<bool>,
}

impl Reporter {
    /// A spinner on stderr; falls back to plain lines when stderr is not a terminal.
    pub fn new() -> Self {
        if !console::Term::stderr().is_term() {
            return Self {
                bar: ProgressBar::hidden(),
                quiet: false,
                suspended: Cell::new(false),
            };
        }
        let bar = ProgressBar::new_spinner();
        if let Ok(spinner) = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
            .template("{spinner:.cyan} {msg}")
        {
            bar.set_style(spinner);
        }
        Self {
            bar,
            quiet: false,
            suspended: Cell::new(false),
        }
    }

    /// Prints nothing at all.
    pub fn silent() -> Self {
        Self {
            bar: ProgressBar::hidden(),
            quiet: true,
            suspended: Cell::new(false),
        }
    }

    pub fn start(&self, parts: &[&str]) {
        if self.bar.is_hidden() || self.suspended.get() {
            self.line(style("-").dim().to_string(), parts);
            return;
        }
        self.bar.enable_steady_tick(Duration::from_millis(80));
        self.bar.set_message(message(parts));
    }

    pub fn succeed(&self, parts: &[&str]) {
        self.line(style("✔").green().to_string(), parts);
    }

    pub fn fail(&self, parts: &[&str]) {
        self.line(style("✖").red().to_string(), parts);
    }

    pub fn warn(&self, parts: &[&str]) {
        self.line(style("⚠").yellow().to_string(), parts);
    }

    pub fn info(&self, parts: &[&str]) {
        self.line(style("ℹ").blue().to_string(), parts);
    }

    /// Hide the spinner while `f` runs, e.g. for interactive prompts.
    pub fn suspend<R>(&self, f: impl FnOnce() -> R) -> R {
        if self.suspended.replace(true) {
            return f();
        }
        let result = self.bar.suspend(f);
        self.suspended.set(false);
        result
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    fn line(&self, symbol: String, parts: &[&str]) {
        if self.quiet {
            return;
        }
        let text = format!("{symbol} {}", message(parts));
        if self.bar.is_hidden() || self.suspended.get() {
            eprintln!("{text}");
        } else {
            self.bar.println(text);
        }
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Reports every file step through a [`Reporter`].
pub struct ReporterHooks<'a> {
    reporter: &'a Reporter,
    allow_non_empty: bool,
}

impl<'a> ReporterHooks<'a> {
    pub fn new(reporter: &'a Reporter, allow_non_empty: bool) -> Self {
        Self {
            reporter,
            allow_non_empty,
        }
    }
}

impl FileHooks for ReporterHooks<'_> {
    fn on_before_read_file(&self, payload: &HookPayload<'_>) -> Result<()> {
        self.reporter
            .start(&["Reading file", &payload.file.destination_relative]);
        Ok(())
    }

    fn on_before_process_file(&self, payload: &HookPayload<'_>) -> Result<()> {
        self.reporter
            .start(&["Processing file", &payload.file.destination_relative]);
        Ok(())
    }

    fn on_before_write_file(&self, payload: &HookPayload<'_>) -> Result<()> {
        self.reporter
            .start(&["Writing file", &payload.file.destination_relative]);
        Ok(())
    }

    fn on_after_write_file(&self, payload: &HookPayload<'_>) -> Result<()> {
        self.reporter
            .succeed(&["Writing file", &payload.file.destination_relative]);
        Ok(())
    }

    fn on_invalid_destination(&self, dest_dir: &Path) -> Result<DestinationDecision> {
        let path = dest_dir.display().to_string();
        if self.allow_non_empty {
            self.reporter
                .warn(&["Target folder", &path, "is not empty, writing into it anyway"]);
            Ok(DestinationDecision::Proceed)
        } else {
            self.reporter.fail(&[
                "Target folder",
                &path,
                "is not empty, skipping any further operations...",
            ]);
            Ok(DestinationDecision::Abort)
        }
    }
}

/// Reports flag-supplied answers and prefixes prompts with the template id.
pub struct ReporterObserver<'a> {
    reporter: &'a Reporter,
    template_id: &'a str,
}

impl<'a> ReporterObserver<'a> {
    pub fn new(reporter: &'a Reporter, template_id: &'a str) -> Self {
        Self {
            reporter,
            template_id,
        }
    }
}

impl AnswerObserver for ReporterObserver<'_> {
    fn on_implicit_answer(&self, question: &Question, value: &Value) {
        let shown = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        self.reporter
            .succeed(&[self.template_id, &question.message, &shown]);
    }

    fn on_interactive_question(&self, mut question: Question) -> Question {
        question.message = message(&[self.template_id, question.message.as_str()]);
        question
    }
}
