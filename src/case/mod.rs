//! Case variants of answer values, used as template arguments.

use std::collections::BTreeMap;

use heck::{ToKebabCase, ToLowerCamelCase, ToSnakeCase, ToTitleCase, ToUpperCamelCase};
use serde::Serialize;
use serde_json::Value;

/// A single string transformation exposed to templates and scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Case {
    Snake,
    Kebab,
    Camel,
    UpperCamel,
    Lower,
    Start,
    Upper,
}

impl Case {
    pub const ALL: [Case; 7] = [
        Case::Snake,
        Case::Kebab,
        Case::Camel,
        Case::UpperCamel,
        Case::Lower,
        Case::Start,
        Case::Upper,
    ];

    /// Name under which the transform is registered as a tera filter and Rhai function.
    pub fn function_name(self) -> &'static str {
        match self {
            Case::Snake => "snake_case",
            Case::Kebab => "kebab_case",
            Case::Camel => "camel_case",
            Case::UpperCamel => "upper_camel_case",
            Case::Lower => "lower_case",
            Case::Start => "start_case",
            Case::Upper => "upper_case",
        }
    }

    pub fn apply(self, input: &str) -> String {
        match self {
            Case::Snake => input.to_snake_case(),
            Case::Kebab => input.to_kebab_case(),
            Case::Camel => input.to_lower_camel_case(),
            Case::UpperCamel => input.to_upper_camel_case(),
            // Space separated words; title case does the word splitting.
            Case::Lower => input.to_title_case().to_lowercase(),
            Case::Start => input.to_title_case(),
            Case::Upper => input.to_title_case().to_uppercase(),
        }
    }
}

/// All variants of one raw answer value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseVariants {
    pub raw: String,
    pub snake_case: String,
    pub kebab_case: String,
    pub camel_case: String,
    pub upper_camel_case: String,
    pub lower_case: String,
    pub start_case: String,
    pub upper_case: String,
}

impl CaseVariants {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        Self {
            snake_case: Case::Snake.apply(&raw),
            kebab_case: Case::Kebab.apply(&raw),
            camel_case: Case::Camel.apply(&raw),
            upper_camel_case: Case::UpperCamel.apply(&raw),
            lower_case: Case::Lower.apply(&raw),
            start_case: Case::Start.apply(&raw),
            upper_case: Case::Upper.apply(&raw),
            raw,
        }
    }
}

pub type TemplateArgs = BTreeMap<String, CaseVariants>;

/// Coerce an answer to the string the case variants are computed from.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Decorate every answer with its case variants.
pub fn decorate(values: &BTreeMap<String, Value>) -> TemplateArgs {
    values
        .iter()
        .map(|(key, value)| (key.clone(), CaseVariants::new(stringify(value))))
        .collect()
}

/// [`decorate`] as the JSON object handed to the renderer.
pub fn decorate_to_value(values: &BTreeMap<String, Value>) -> Value {
    serde_json::to_value(decorate(values)).unwrap_or(Value::Null)
}
