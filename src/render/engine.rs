use std::collections::HashMap;

use tera::{Context, Tera, Value};

use crate::case::Case;
use crate::error::{CreateError, Result};

const INLINE_TEMPLATE: &str = "__inline__";

/// Tera environment used for both file paths and file contents.
///
/// Autoescaping is off and every case transform is available as a filter,
/// e.g. `{{ name | kebab_case }}`. Undefined variables are render errors.
#[derive(Clone)]
pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    pub fn new() -> Self {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        for case in Case::ALL {
            tera.register_filter(
                case.function_name(),
                move |value: &Value, _: &HashMap<String, Value>| -> tera::Result<Value> {
                    let input = match value {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    Ok(Value::String(case.apply(&input)))
                },
            );
        }
        Self { tera }
    }

    /// Render an inline template against a context.
    pub fn render(&self, template: &str, context: &Context) -> std::result::Result<String, tera::Error> {
        let mut tera = self.tera.clone();
        tera.add_raw_template(INLINE_TEMPLATE, template)?;
        tera.render(INLINE_TEMPLATE, context)
    }

    /// Render file contents; errors name the file being rendered.
    pub fn render_content(&self, file: &str, content: &str, context: &Context) -> Result<String> {
        self.render(content, context)
            .map_err(|e| CreateError::RenderError {
                file: file.to_string(),
                source: e,
            })
    }

    /// Render template expressions in a relative path (e.g. `{{ name }}/index.js`).
    pub fn render_path(&self, path: &str, context: &Context) -> Result<String> {
        self.render(path, context)
            .map_err(|e| CreateError::FilenameRenderError {
                filename: path.to_string(),
                source: e,
            })
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Renderer::new()
    }
}
