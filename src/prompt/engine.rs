use serde_json::Value;

use crate::answers::{AnswerMap, PromptKind, Question, Validity};
use crate::case::stringify;
use crate::error::{CreateError, Result};

/// Interactive prompting session.
pub trait Prompter {
    /// Ask `questions` in order and return their answers. `answers` holds the values
    /// resolved before the session (used by `when` conditions).
    fn prompt(&self, questions: &[Question], answers: &AnswerMap) -> Result<AnswerMap>;

    /// Ask the user to pick one of `choices`.
    fn select(&self, message: &str, choices: &[String]) -> Result<String>;
}

/// Terminal prompts backed by inquire.
#[derive(Default)]
pub struct InquirePrompter;

impl InquirePrompter {
    pub fn new() -> Self {
        Self
    }
}

impl Prompter for InquirePrompter {
    fn prompt(&self, questions: &[Question], answers: &AnswerMap) -> Result<AnswerMap> {
        let mut context = answers.clone();
        let mut prompted = AnswerMap::new();

        for question in questions {
            if !question.is_asked(&context)? {
                continue;
            }

            let value = loop {
                let raw = ask(question)?;
                let value = question.apply_filter(&raw)?;
                match question.check(&value)? {
                    Validity::Valid => break value,
                    Validity::Invalid(message) => {
                        eprintln!(
                            "{} {}",
                            console::style(">>").red().bold(),
                            console::style(message).red()
                        );
                    }
                }
            };

            context.insert(question.name.clone(), value.clone());
            prompted.insert(question.name.clone(), value);
        }

        Ok(prompted)
    }

    fn select(&self, message: &str, choices: &[String]) -> Result<String> {
        inquire::Select::new(message, choices.to_vec())
            .prompt()
            .map_err(|_| CreateError::PromptCancelled)
    }
}

fn ask(question: &Question) -> Result<Value> {
    let message = question.message.as_str();

    match &question.kind {
        PromptKind::Input => {
            let default = question.default.as_ref().map(stringify);
            let mut prompt = inquire::Text::new(message);
            if let Some(default) = &default {
                prompt = prompt.with_default(default);
            }
            let answer = prompt.prompt().map_err(|_| CreateError::PromptCancelled)?;
            Ok(Value::String(answer))
        }
        PromptKind::Password => {
            let answer = inquire::Password::new(message)
                .without_confirmation()
                .prompt()
                .map_err(|_| CreateError::PromptCancelled)?;
            Ok(Value::String(answer))
        }
        PromptKind::Confirm => {
            let default = matches!(question.default, Some(Value::Bool(true)));
            let answer = inquire::Confirm::new(message)
                .with_default(default)
                .prompt()
                .map_err(|_| CreateError::PromptCancelled)?;
            Ok(Value::Bool(answer))
        }
        PromptKind::Number => {
            let mut prompt = inquire::CustomType::<f64>::new(message)
                .with_error_message("Please type a valid number");
            if let Some(default) = question.default.as_ref().and_then(Value::as_f64) {
                prompt = prompt.with_default(default);
            }
            let answer = prompt.prompt().map_err(|_| CreateError::PromptCancelled)?;
            Ok(number_value(answer))
        }
        PromptKind::Select { choices } => {
            let mut prompt = inquire::Select::new(message, choices.clone());
            if let Some(Value::String(default)) = &question.default {
                if let Some(idx) = choices.iter().position(|c| c == default) {
                    prompt = prompt.with_starting_cursor(idx);
                }
            }
            let answer = prompt.prompt().map_err(|_| CreateError::PromptCancelled)?;
            Ok(Value::String(answer))
        }
        PromptKind::MultiSelect { choices } => {
            let mut prompt = inquire::MultiSelect::new(message, choices.clone());
            let default_indices: Vec<usize> = match &question.default {
                Some(Value::Array(defaults)) => defaults
                    .iter()
                    .filter_map(|d| d.as_str())
                    .filter_map(|d| choices.iter().position(|c| c == d))
                    .collect(),
                _ => Vec::new(),
            };
            if !default_indices.is_empty() {
                prompt = prompt.with_default(&default_indices);
            }
            let answers = prompt.prompt().map_err(|_| CreateError::PromptCancelled)?;
            Ok(Value::Array(answers.into_iter().map(Value::String).collect()))
        }
    }
}

/// Whole numbers are stored as integers so templates print `3`, not `3.0`.
fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::Number((n as i64).into())
    } else {
        serde_json::Number::from_f64(n)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}
