pub mod engine;

pub use engine::{InquirePrompter, Prompter};
