use std::collections::HashSet;
use std::path::{Path, PathBuf};

use rhai::{Dynamic, FnPtr};
use serde_json::Value;

use crate::answers::{AnswerMap, FlagMap, PromptKind, Question, Validity};
use crate::case;
use crate::error::{CreateError, Result};
use crate::script::{dynamic_to_value, map_to_dynamic, value_to_dynamic, Script};

pub const RESOLVE_QUESTIONS: &str = "resolve_questions";
pub const RESOLVE_FILES: &str = "resolve_files";
pub const CREATE_TEMPLATE_ARGS: &str = "create_template_args";
pub const RESOLVE_DESTINATION_FOLDER: &str = "resolve_destination_folder";

/// Pattern used when a template says nothing about its files.
pub const DEFAULT_FILE_PATTERN: &str = "*/**";

#[derive(Clone)]
enum Questions {
    None,
    Static(Dynamic),
    Script,
}

#[derive(Clone)]
enum Files {
    Default,
    Static(Vec<String>),
    Script,
}

#[derive(Clone)]
enum Args {
    Decorate,
    Script,
}

#[derive(Clone)]
enum Destination {
    WorkingDirectory,
    Script,
}

/// The complete set of behaviours of one template, defaults already filled in.
#[derive(Clone)]
pub struct Behaviours {
    questions: Questions,
    files: Files,
    args: Args,
    destination: Destination,
}

/// Fill in the behaviours a template does not define from its exported map and
/// the functions its script declares.
pub fn apply_defaults(export: &rhai::Map, script: &Script) -> std::result::Result<Behaviours, String> {
    let questions = if script.function_arity(RESOLVE_QUESTIONS).is_some() {
        Questions::Script
    } else if let Some(list) = export.get("questions") {
        if !list.is_array() {
            return Err("`questions` must be an array".into());
        }
        Questions::Static(list.clone())
    } else {
        Questions::None
    };

    let files = if script.function_arity(RESOLVE_FILES).is_some() {
        Files::Script
    } else if let Some(list) = export.get("files") {
        Files::Static(string_list(list).ok_or("`files` must be an array of strings")?)
    } else {
        Files::Default
    };

    let args = if script.function_arity(CREATE_TEMPLATE_ARGS).is_some() {
        Args::Script
    } else {
        Args::Decorate
    };

    let destination = if script.function_arity(RESOLVE_DESTINATION_FOLDER).is_some() {
        Destination::Script
    } else {
        Destination::WorkingDirectory
    };

    Ok(Behaviours {
        questions,
        files,
        args,
        destination,
    })
}

/// One discovered template.
#[derive(Clone)]
pub struct TemplateConfig {
    pub id: String,
    pub description: Option<String>,
    /// Directory containing the config file; template files are resolved against it.
    pub source_dir: PathBuf,
    pub config_path: PathBuf,
    behaviours: Behaviours,
    script: Script,
}

impl std::fmt::Debug for TemplateConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateConfig")
            .field("id", &self.id)
            .field("description", &self.description)
            .field("source_dir", &self.source_dir)
            .field("config_path", &self.config_path)
            .finish()
    }
}

impl TemplateConfig {
    pub(crate) fn new(
        id: String,
        description: Option<String>,
        config_path: PathBuf,
        behaviours: Behaviours,
        script: Script,
    ) -> Self {
        let source_dir = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self {
            id,
            description,
            source_dir,
            config_path,
            behaviours,
            script,
        }
    }

    fn failure(&self, function: &str, message: impl Into<String>) -> CreateError {
        CreateError::TemplateFunction {
            template_id: self.id.clone(),
            function: function.to_string(),
            message: message.into(),
        }
    }

    fn call(&self, function: &str, args: Vec<Dynamic>) -> Result<Dynamic> {
        self.script
            .call(function, args)
            .map_err(|e| self.failure(function, e))
    }

    pub fn resolve_questions(&self, flags: &FlagMap) -> Result<Vec<Question>> {
        let list = match &self.behaviours.questions {
            Questions::None => return Ok(Vec::new()),
            Questions::Static(list) => list.clone(),
            Questions::Script => self.call(RESOLVE_QUESTIONS, vec![map_to_dynamic(flags)])?,
        };
        self.parse_questions(list)
            .map_err(|e| self.failure(RESOLVE_QUESTIONS, e))
    }

    pub fn resolve_files(&self, answers: &AnswerMap, flags: &FlagMap) -> Result<Vec<String>> {
        match &self.behaviours.files {
            Files::Default => Ok(vec![DEFAULT_FILE_PATTERN.to_string()]),
            Files::Static(patterns) => Ok(patterns.clone()),
            Files::Script => {
                let result = self.call(
                    RESOLVE_FILES,
                    vec![map_to_dynamic(answers), map_to_dynamic(flags)],
                )?;
                string_list(&result)
                    .ok_or_else(|| self.failure(RESOLVE_FILES, "expected an array of glob patterns"))
            }
        }
    }

    pub fn create_template_args(&self, answers: &AnswerMap, flags: &FlagMap) -> Result<Value> {
        match &self.behaviours.args {
            Args::Decorate => Ok(case::decorate_to_value(answers)),
            Args::Script => {
                let result = self.call(
                    CREATE_TEMPLATE_ARGS,
                    vec![map_to_dynamic(answers), map_to_dynamic(flags)],
                )?;
                match dynamic_to_value(&result) {
                    value @ Value::Object(_) => Ok(value),
                    _ => Err(self.failure(CREATE_TEMPLATE_ARGS, "expected an object map")),
                }
            }
        }
    }

    /// Destination directory; relative results are resolved against `cwd`.
    pub fn resolve_destination_folder(
        &self,
        answers: &AnswerMap,
        flags: &FlagMap,
        cwd: &Path,
    ) -> Result<PathBuf> {
        match &self.behaviours.destination {
            Destination::WorkingDirectory => Ok(cwd.to_path_buf()),
            Destination::Script => {
                let result = self.call(
                    RESOLVE_DESTINATION_FOLDER,
                    vec![map_to_dynamic(answers), map_to_dynamic(flags)],
                )?;
                if !result.is_string() {
                    return Err(self.failure(RESOLVE_DESTINATION_FOLDER, "expected a path string"));
                }
                let path = PathBuf::from(result.to_string());
                Ok(if path.is_absolute() { path } else { cwd.join(path) })
            }
        }
    }

    fn parse_questions(&self, list: Dynamic) -> std::result::Result<Vec<Question>, String> {
        let items = list
            .try_cast::<rhai::Array>()
            .ok_or("expected an array of questions")?;

        let mut seen = HashSet::new();
        let mut questions = Vec::with_capacity(items.len());
        for item in items {
            let question = self.parse_question(item)?;
            if !seen.insert(question.name.clone()) {
                return Err(format!("duplicate question name '{}'", question.name));
            }
            questions.push(question);
        }
        Ok(questions)
    }

    fn parse_question(&self, item: Dynamic) -> std::result::Result<Question, String> {
        let map = item
            .try_cast::<rhai::Map>()
            .ok_or("each question must be an object map")?;

        let name = map
            .get("name")
            .filter(|n| n.is_string())
            .map(|n| n.to_string())
            .filter(|n| !n.is_empty())
            .ok_or("question without a string `name`")?;
        let message = map
            .get("message")
            .map(|m| m.to_string())
            .unwrap_or_else(|| name.clone());
        let kind_name = map
            .get("type")
            .map(|t| t.to_string())
            .unwrap_or_else(|| "input".to_string());
        let choices = map.get("choices").and_then(string_list).unwrap_or_default();

        let kind = match kind_name.as_str() {
            "input" | "text" => PromptKind::Input,
            "password" => PromptKind::Password,
            "confirm" => PromptKind::Confirm,
            "number" => PromptKind::Number,
            "list" | "select" | "rawlist" => PromptKind::Select { choices },
            "checkbox" | "multiselect" => PromptKind::MultiSelect { choices },
            other => return Err(format!("question '{name}' has unknown type '{other}'")),
        };
        if let PromptKind::Select { choices } | PromptKind::MultiSelect { choices } = &kind {
            if choices.is_empty() {
                return Err(format!("question '{name}' needs a non-empty `choices` array"));
            }
        }

        let mut question = Question::new(name.clone(), message, kind);
        // `default` is a reserved word in Rhai, so it only parses as a quoted key.
        question.default = map
            .get("default_value")
            .or_else(|| map.get("default"))
            .map(dynamic_to_value);

        if let Some(filter) = self.callback(&map, "filter", &name)? {
            let script = self.script.clone();
            let fail = self.callback_failure("filter", &name);
            question = question.with_filter(move |value| {
                script
                    .call_ptr(&filter, vec![value_to_dynamic(value)])
                    .map(|v| dynamic_to_value(&v))
                    .map_err(|e| fail(e))
            });
        }

        if let Some(validate) = self.callback(&map, "validate", &name)? {
            let script = self.script.clone();
            let fail = self.callback_failure("validate", &name);
            question = question.with_validate(move |value| {
                let verdict = script
                    .call_ptr(&validate, vec![value_to_dynamic(value)])
                    .map_err(|e| fail(e))?;
                Ok(validity(&verdict))
            });
        }

        if let Some(when) = self.callback(&map, "when", &name)? {
            let script = self.script.clone();
            let fail = self.callback_failure("when", &name);
            question = question.with_when(move |answers| {
                let verdict = script
                    .call_ptr(&when, vec![map_to_dynamic(answers)])
                    .map_err(|e| fail(e))?;
                Ok(verdict.as_bool().unwrap_or(false))
            });
        }

        Ok(question)
    }

    fn callback(
        &self,
        map: &rhai::Map,
        key: &str,
        question: &str,
    ) -> std::result::Result<Option<FnPtr>, String> {
        match map.get(key) {
            None => Ok(None),
            Some(value) if value.is_unit() => Ok(None),
            Some(value) => value
                .clone()
                .try_cast::<FnPtr>()
                .map(Some)
                .ok_or_else(|| format!("`{key}` of question '{question}' must be a function")),
        }
    }

    fn callback_failure(&self, function: &str, question: &str) -> impl Fn(String) -> CreateError {
        let template_id = self.id.clone();
        let function = function.to_string();
        let question = question.to_string();
        move |message| CreateError::TemplateFunction {
            template_id: template_id.clone(),
            function: function.clone(),
            message: format!("question '{question}': {message}"),
        }
    }
}

/// `true` is valid, a string is an error message, anything else is invalid.
fn validity(verdict: &Dynamic) -> Validity {
    if let Ok(valid) = verdict.as_bool() {
        return if valid {
            Validity::Valid
        } else {
            Validity::Invalid("Invalid value, please try again".into())
        };
    }
    if verdict.is_string() {
        return Validity::Invalid(verdict.to_string());
    }
    Validity::Invalid("Invalid value, please try again".into())
}

fn string_list(value: &Dynamic) -> Option<Vec<String>> {
    let items = value.read_lock::<rhai::Array>()?;
    items
        .iter()
        .map(|item| item.is_string().then(|| item.to_string()))
        .collect()
}
