use serde_json::Value;
use tera::Context;

use crate::error::{CreateError, Result};

/// Build the tera context from template arguments. The arguments must be an object;
/// `null` is treated as an empty context.
pub fn build_context(args: &Value) -> Result<Context> {
    match args {
        Value::Null => Ok(Context::new()),
        Value::Object(_) => {
            Context::from_value(args.clone()).map_err(|e| CreateError::RenderError {
                file: "(template arguments)".into(),
                source: e,
            })
        }
        other => Err(CreateError::RenderError {
            file: "(template arguments)".into(),
            source: tera::Error::msg(format!(
                "template arguments must be an object, got {other}"
            )),
        }),
    }
}
