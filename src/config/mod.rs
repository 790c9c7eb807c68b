pub mod project;
pub mod user;

pub use project::{absolute_path, find_project_config, ProjectConfig, Workspace};
pub use user::{load_user_config, UserConfig};
