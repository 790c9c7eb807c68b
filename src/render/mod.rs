pub mod context;
pub mod engine;
pub mod file;
pub mod hooks;
pub mod walker;

pub use context::build_context;
pub use engine::Renderer;
pub use file::FileJob;
pub use hooks::{
    DestinationDecision, FileContext, FileHooks, HookPayload, Hooks, HooksBuilder, NoHooks,
};
pub use walker::{expand_files, process, process_with, ProcessJob, ProcessReport};
