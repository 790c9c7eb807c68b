//! Sandboxed Rhai runtime for `create-config.rhai` template scripts.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use rhai::{CallFnOptions, Dynamic, Engine, EvalAltResult, FnPtr, Scope, AST};
use serde_json::Value;

use crate::case::{self, Case};

/// Create a sandboxed Rhai engine with the helpers template scripts can call.
///
/// `cwd` is what the script's `cwd()` helper reports: the directory the
/// command runs against, which may differ from the process working directory.
pub fn create_engine(cwd: &Path) -> Engine {
    let mut engine = Engine::new();

    // Limit recursion and operations for safety
    engine.set_max_call_levels(32);
    engine.set_max_operations(100_000);
    engine.set_max_string_size(10 * 1024 * 1024); // 10MB

    for case in Case::ALL {
        engine.register_fn(case.function_name(), move |s: &str| case.apply(s));
    }

    engine.register_fn("decorate", |answers: rhai::Map| -> rhai::Map {
        let values: BTreeMap<String, Value> = answers
            .iter()
            .map(|(k, v)| (k.to_string(), dynamic_to_value(v)))
            .collect();
        value_to_dynamic(&case::decorate_to_value(&values))
            .try_cast::<rhai::Map>()
            .unwrap_or_default()
    });

    engine.register_fn("join_path", |base: &str, child: &str| -> String {
        Path::new(base).join(child).display().to_string()
    });

    let cwd = cwd.display().to_string();
    engine.register_fn("cwd", move || -> String { cwd.clone() });

    engine.register_fn(
        "matches",
        |input: &str, pattern: &str| -> Result<bool, Box<EvalAltResult>> {
            let re = regex_lite::Regex::new(pattern).map_err(|e| e.to_string())?;
            Ok(re.is_match(input))
        },
    );

    engine
}

/// A compiled template script bound to the engine that compiled it.
#[derive(Clone)]
pub struct Script {
    engine: Arc<Engine>,
    ast: Arc<AST>,
}

impl Script {
    pub fn compile(engine: Arc<Engine>, source: &str) -> Result<Self, String> {
        let ast = engine.compile(source).map_err(|e| e.to_string())?;
        Ok(Self {
            engine,
            ast: Arc::new(ast),
        })
    }

    /// Run the top-level statements and return the value of the last expression.
    pub fn evaluate(&self) -> Result<Dynamic, String> {
        self.engine
            .eval_ast::<Dynamic>(&self.ast)
            .map_err(|e| e.to_string())
    }

    /// Parameter count of a script function, if the script defines it.
    pub fn function_arity(&self, name: &str) -> Option<usize> {
        self.ast
            .iter_functions()
            .filter(|f| f.name == name)
            .map(|f| f.params.len())
            .max()
    }

    /// Call a script function, passing only as many arguments as it declares.
    pub fn call(&self, name: &str, mut args: Vec<Dynamic>) -> Result<Dynamic, String> {
        let arity = self.function_arity(name).unwrap_or(0);
        args.truncate(arity);
        let options = CallFnOptions::new().eval_ast(false).rewind_scope(true);
        let mut scope = Scope::new();
        let result = self
            .engine
            .call_fn_with_options::<Dynamic>(options, &mut scope, &self.ast, name, args)
            .map_err(|e| e.to_string())?;
        returned_error(result)
    }

    /// Call a function pointer or closure found in the script's data.
    pub fn call_ptr(&self, function: &FnPtr, args: Vec<Dynamic>) -> Result<Dynamic, String> {
        let result = function
            .call::<Dynamic>(&self.engine, &self.ast, args)
            .map_err(|e| e.to_string())?;
        returned_error(result)
    }
}

/// A returned `#{ error: ... }` map counts as a failure, like a thrown error.
fn returned_error(value: Dynamic) -> Result<Dynamic, String> {
    if let Some(map) = value.read_lock::<rhai::Map>() {
        if map.len() == 1 {
            if let Some(error) = map.get("error") {
                return Err(error.to_string());
            }
        }
    }
    Ok(value)
}

pub fn value_to_dynamic(value: &Value) -> Dynamic {
    match value {
        Value::Null => Dynamic::UNIT,
        Value::Bool(b) => Dynamic::from(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Dynamic::from(i)
            } else {
                Dynamic::from(n.as_f64().unwrap_or_default())
            }
        }
        Value::String(s) => Dynamic::from(s.clone()),
        Value::Array(items) => Dynamic::from_array(items.iter().map(value_to_dynamic).collect()),
        Value::Object(map) => Dynamic::from_map(
            map.iter()
                .map(|(k, v)| (k.as_str().into(), value_to_dynamic(v)))
                .collect(),
        ),
    }
}

pub fn dynamic_to_value(value: &Dynamic) -> Value {
    if value.is_unit() {
        return Value::Null;
    }
    if let Ok(b) = value.as_bool() {
        return Value::Bool(b);
    }
    if let Ok(i) = value.as_int() {
        return Value::Number(i.into());
    }
    if let Ok(f) = value.as_float() {
        return serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null);
    }
    if value.is_string() || value.is_char() {
        return Value::String(value.to_string());
    }
    if let Some(items) = value.read_lock::<rhai::Array>() {
        return Value::Array(items.iter().map(dynamic_to_value).collect());
    }
    if let Some(map) = value.read_lock::<rhai::Map>() {
        return Value::Object(
            map.iter()
                .map(|(k, v)| (k.to_string(), dynamic_to_value(v)))
                .collect(),
        );
    }
    Value::String(value.to_string())
}

pub fn map_to_dynamic(values: &BTreeMap<String, Value>) -> Dynamic {
    Dynamic::from_map(
        values
            .iter()
            .map(|(k, v)| (k.as_str().into(), value_to_dynamic(v)))
            .collect(),
    )
}
