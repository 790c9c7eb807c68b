use std::path::Path;
use std::sync::Arc;

use rhai::Engine;

use super::config::{apply_defaults, TemplateConfig};
use crate::script::Script;

/// Load one `create-config.rhai` file.
///
/// Failures come back as a warning message; a broken template never stops
/// discovery of the others.
pub fn load(engine: &Arc<Engine>, config_path: &Path) -> Result<TemplateConfig, String> {
    let source = std::fs::read_to_string(config_path)
        .map_err(|e| format!("Could not read {}: {e}", config_path.display()))?;
    load_source(engine, config_path, &source)
}

pub fn load_source(
    engine: &Arc<Engine>,
    config_path: &Path,
    source: &str,
) -> Result<TemplateConfig, String> {
    let location = config_path.display();
    let script = Script::compile(Arc::clone(engine), source)
        .map_err(|e| format!("Could not compile {location}: {e}"))?;
    let export = script
        .evaluate()
        .map_err(|e| format!("Could not evaluate {location}: {e}"))?;

    let export = export
        .try_cast::<rhai::Map>()
        .ok_or_else(|| format!("Unknown config type in {location}: expected an object map"))?;

    let id = export
        .get("id")
        .filter(|id| id.is_string())
        .map(|id| id.to_string())
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| format!("Template config {location} has no `id`"))?;

    let description = export
        .get("description")
        .filter(|d| d.is_string())
        .map(|d| d.to_string());

    let behaviours =
        apply_defaults(&export, &script).map_err(|e| format!("Invalid template {location}: {e}"))?;

    Ok(TemplateConfig::new(
        id,
        description,
        config_path.to_path_buf(),
        behaviours,
        script,
    ))
}
