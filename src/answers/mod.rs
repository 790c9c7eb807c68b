//! Answer resolution: flags first, interactive prompting for the rest.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use log::debug;
use serde_json::Value;

use crate::error::Result;
use crate::prompt::Prompter;

/// Final answers keyed by question name.
pub type AnswerMap = BTreeMap<String, Value>;

/// Flat map of CLI flag values keyed by (camel-cased) flag name.
pub type FlagMap = BTreeMap<String, Value>;

pub type FilterFn = Arc<dyn Fn(&Value) -> Result<Value> + Send + Sync>;
pub type ValidateFn = Arc<dyn Fn(&Value) -> Result<Validity> + Send + Sync>;
pub type WhenFn = Arc<dyn Fn(&AnswerMap) -> Result<bool> + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validity {
    Valid,
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PromptKind {
    Input,
    Password,
    Confirm,
    Number,
    Select { choices: Vec<String> },
    MultiSelect { choices: Vec<String> },
}

/// One piece of information needed from the user.
#[derive(Clone)]
pub struct Question {
    pub name: String,
    pub message: String,
    pub kind: PromptKind,
    pub default: Option<Value>,
    pub filter: Option<FilterFn>,
    pub validate: Option<ValidateFn>,
    /// Asked only when this returns true for the answers collected so far.
    pub when: Option<WhenFn>,
}

impl Question {
    pub fn new(name: impl Into<String>, message: impl Into<String>, kind: PromptKind) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            kind,
            default: None,
            filter: None,
            validate: None,
            when: None,
        }
    }

    pub fn input(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(name, message, PromptKind::Input)
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_filter(mut self, filter: impl Fn(&Value) -> Result<Value> + Send + Sync + 'static) -> Self {
        self.filter = Some(Arc::new(filter));
        self
    }

    pub fn with_validate(
        mut self,
        validate: impl Fn(&Value) -> Result<Validity> + Send + Sync + 'static,
    ) -> Self {
        self.validate = Some(Arc::new(validate));
        self
    }

    pub fn with_when(mut self, when: impl Fn(&AnswerMap) -> Result<bool> + Send + Sync + 'static) -> Self {
        self.when = Some(Arc::new(when));
        self
    }

    /// Apply `filter` (identity when absent).
    pub fn apply_filter(&self, value: &Value) -> Result<Value> {
        match &self.filter {
            Some(filter) => filter(value),
            None => Ok(value.clone()),
        }
    }

    /// Apply `validate` (always valid when absent).
    pub fn check(&self, value: &Value) -> Result<Validity> {
        match &self.validate {
            Some(validate) => validate(value),
            None => Ok(Validity::Valid),
        }
    }

    pub fn is_asked(&self, answers: &AnswerMap) -> Result<bool> {
        match &self.when {
            Some(when) => when(answers),
            None => Ok(true),
        }
    }
}

impl fmt::Debug for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Question")
            .field("name", &self.name)
            .field("message", &self.message)
            .field("kind", &self.kind)
            .field("default", &self.default)
            .field("filter", &self.filter.is_some())
            .field("validate", &self.validate.is_some())
            .field("when", &self.when.is_some())
            .finish()
    }
}

/// Observes classification without changing it.
pub trait AnswerObserver {
    fn on_implicit_answer(&self, _question: &Question, _value: &Value) {}

    /// May decorate the question (e.g. its message); the name is kept regardless.
    fn on_interactive_question(&self, question: Question) -> Question {
        question
    }
}

pub struct SilentObserver;

impl AnswerObserver for SilentObserver {}

/// Truthiness used to decide whether a flag value answers a question.
///
/// `null`, `false` and the empty string do not count; `0`, `true`, non-empty
/// strings, arrays and objects do. An explicit `false` flag therefore falls
/// through to the interactive prompt.
pub fn is_supplied(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(_) | Value::Array(_) | Value::Object(_) => true,
    }
}

/// Questions split into flag-answered and still-to-ask.
pub struct Classified {
    pub answers: AnswerMap,
    pub interactive: Vec<Question>,
}

/// Classify each question, in order, as implicit (answered by a flag) or interactive.
pub fn classify(
    questions: Vec<Question>,
    flags: &FlagMap,
    observer: &dyn AnswerObserver,
) -> Result<Classified> {
    let mut answers = AnswerMap::new();
    let mut interactive = Vec::new();

    for question in questions {
        let raw = flags.get(&question.name).cloned().unwrap_or(Value::Null);
        let value = question.apply_filter(&raw)?;
        let valid = question.check(&value)? == Validity::Valid;

        if valid && is_supplied(&value) {
            debug!("'{}' answered by flag", question.name);
            observer.on_implicit_answer(&question, &value);
            answers.insert(question.name.clone(), value);
        } else {
            debug!("'{}' needs a prompt", question.name);
            let name = question.name.clone();
            let mut decorated = observer.on_interactive_question(question);
            decorated.name = name;
            interactive.push(decorated);
        }
    }

    Ok(Classified {
        answers,
        interactive,
    })
}

/// Resolve every question: flag values first, then one prompting session for the rest.
/// A key is only ever in one of the two groups, so flag answers are never overwritten.
pub fn resolve_answers(
    questions: Vec<Question>,
    flags: &FlagMap,
    observer: &dyn AnswerObserver,
    prompter: &dyn Prompter,
) -> Result<AnswerMap> {
    let Classified {
        mut answers,
        interactive,
    } = classify(questions, flags, observer)?;

    if !interactive.is_empty() {
        let prompted = prompter.prompt(&interactive, &answers)?;
        for (key, value) in prompted {
            answers.entry(key).or_insert(value);
        }
    }

    Ok(answers)
}
