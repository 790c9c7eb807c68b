//! Lifecycle hooks fired by the file tree processor.
//!
//! Every hook defaults to a no-op. Implement [`FileHooks`] directly, or assemble
//! closures once with [`Hooks::builder`].

use std::path::Path;

use serde_json::{Map, Value};

use super::file::FileJob;
use crate::error::Result;

/// Per-file record returned by [`FileHooks::on_file`] and passed to every later hook
/// for the same file.
pub type FileContext = Map<String, Value>;

pub struct HookPayload<'a> {
    pub file: &'a FileJob,
    pub context: &'a FileContext,
}

/// What to do when the destination directory already has entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DestinationDecision {
    #[default]
    Abort,
    Proceed,
}

pub trait FileHooks {
    fn on_file(&self, _file: &FileJob) -> Result<FileContext> {
        Ok(FileContext::new())
    }

    fn on_before_read_file(&self, _payload: &HookPayload<'_>) -> Result<()> {
        Ok(())
    }

    fn on_after_read_file(&self, _payload: &HookPayload<'_>) -> Result<()> {
        Ok(())
    }

    fn on_before_process_file(&self, _payload: &HookPayload<'_>) -> Result<()> {
        Ok(())
    }

    fn on_after_process_file(&self, _payload: &HookPayload<'_>) -> Result<()> {
        Ok(())
    }

    fn on_before_write_file(&self, _payload: &HookPayload<'_>) -> Result<()> {
        Ok(())
    }

    fn on_after_write_file(&self, _payload: &HookPayload<'_>) -> Result<()> {
        Ok(())
    }

    fn on_invalid_destination(&self, _dest_dir: &Path) -> Result<DestinationDecision> {
        Ok(DestinationDecision::Abort)
    }
}

/// Hooks that do nothing and abort on a non-empty destination.
pub struct NoHooks;

impl FileHooks for NoHooks {}

type FileHook = Box<dyn Fn(&FileJob) -> Result<FileContext>>;
type PayloadHook = Box<dyn Fn(&HookPayload<'_>) -> Result<()>>;
type DestinationHook = Box<dyn Fn(&Path) -> Result<DestinationDecision>>;

/// Closure-backed hooks built with [`HooksBuilder`].
#[derive(Default)]
pub struct Hooks {
    on_file: Option<FileHook>,
    on_before_read_file: Option<PayloadHook>,
    on_after_read_file: Option<PayloadHook>,
    on_before_process_file: Option<PayloadHook>,
    on_after_process_file: Option<PayloadHook>,
    on_before_write_file: Option<PayloadHook>,
    on_after_write_file: Option<PayloadHook>,
    on_invalid_destination: Option<DestinationHook>,
}

impl Hooks {
    pub fn builder() -> HooksBuilder {
        HooksBuilder::default()
    }
}

fn call(hook: &Option<PayloadHook>, payload: &HookPayload<'_>) -> Result<()> {
    match hook {
        Some(f) => f(payload),
        None => Ok(()),
    }
}

impl FileHooks for Hooks {
    fn on_file(&self, file: &FileJob) -> Result<FileContext> {
        match &self.on_file {
            Some(f) => f(file),
            None => Ok(FileContext::new()),
        }
    }

    fn on_before_read_file(&self, payload: &HookPayload<'_>) -> Result<()> {
        call(&self.on_before_read_file, payload)
    }

    fn on_after_read_file(&self, payload: &HookPayload<'_>) -> Result<()> {
        call(&self.on_after_read_file, payload)
    }

    fn on_before_process_file(&self, payload: &HookPayload<'_>) -> Result<()> {
        call(&self.on_before_process_file, payload)
    }

    fn on_after_process_file(&self, payload: &HookPayload<'_>) -> Result<()> {
        call(&self.on_after_process_file, payload)
    }

    fn on_before_write_file(&self, payload: &HookPayload<'_>) -> Result<()> {
        call(&self.on_before_write_file, payload)
    }

    fn on_after_write_file(&self, payload: &HookPayload<'_>) -> Result<()> {
        call(&self.on_after_write_file, payload)
    }

    fn on_invalid_destination(&self, dest_dir: &Path) -> Result<DestinationDecision> {
        match &self.on_invalid_destination {
            Some(f) => f(dest_dir),
            None => Ok(DestinationDecision::Abort),
        }
    }
}

#[derive(Default)]
pub struct HooksBuilder {
    hooks: Hooks,
}

impl HooksBuilder {
    pub fn on_file(mut self, f: impl Fn(&FileJob) -> Result<FileContext> + 'static) -> Self {
        self.hooks.on_file = Some(Box::new(f));
        self
    }

    pub fn on_before_read_file(mut self, f: impl Fn(&HookPayload<'_>) -> Result<()> + 'static) -> Self {
        self.hooks.on_before_read_file = Some(Box::new(f));
        self
    }

    pub fn on_after_read_file(mut self, f: impl Fn(&HookPayload<'_>) -> Result<()> + 'static) -> Self {
        self.hooks.on_after_read_file = Some(Box::new(f));
        self
    }

    pub fn on_before_process_file(
        mut self,
        f: impl Fn(&HookPayload<'_>) -> Result<()> + 'static,
    ) -> Self {
        self.hooks.on_before_process_file = Some(Box::new(f));
        self
    }

    pub fn on_after_process_file(
        mut self,
        f: impl Fn(&HookPayload<'_>) -> Result<()> + 'static,
    ) -> Self {
        self.hooks.on_after_process_file = Some(Box::new(f));
        self
    }

    pub fn on_before_write_file(
        mut self,
        f: impl Fn(&HookPayload<'_>) -> Result<()> + 'static,
    ) -> Self {
        self.hooks.on_before_write_file = Some(Box::new(f));
        self
    }

    pub fn on_after_write_file(mut self, f: impl Fn(&HookPayload<'_>) -> Result<()> + 'static) -> Self {
        self.hooks.on_after_write_file = Some(Box::new(f));
        self
    }

    pub fn on_invalid_destination(
        mut self,
        f: impl Fn(&Path) -> Result<DestinationDecision> + 'static,
    ) -> Self {
        self.hooks.on_invalid_destination = Some(Box::new(f));
        self
    }

    pub fn build(self) -> Hooks {
        self.hooks
    }
}
