//! Free-form `--key value` flags passed after the template id.

use heck::ToLowerCamelCase;
use serde_json::Value;

use crate::answers::FlagMap;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ParsedArgs {
    /// First positional argument: the requested template id.
    pub template: Option<String>,
    pub flags: FlagMap,
    /// Any further positional arguments.
    pub positionals: Vec<String>,
}

/// Parse trailing CLI arguments into a template id and a flag map.
///
/// `--key=value` and `--key value` give string values, a bare `--flag` is
/// `true` and `--no-flag` is `false`. Keys are lower-camel-cased, so
/// `--npm-scope` becomes `npmScope`. Everything after `--` is positional.
pub fn parse_flags(args: &[String]) -> ParsedArgs {
    let mut parsed = ParsedArgs::default();
    let mut positionals = Vec::new();
    let mut iter = args.iter().peekable();

    while let Some(arg) = iter.next() {
        if arg == "--" {
            positionals.extend(iter.by_ref().cloned());
            break;
        }

        let Some(body) = arg.strip_prefix("--").filter(|b| !b.is_empty()) else {
            positionals.push(arg.clone());
            continue;
        };

        if let Some((key, value)) = body.split_once('=') {
            parsed
                .flags
                .insert(key.to_lower_camel_case(), Value::String(value.to_string()));
            continue;
        }

        if let Some(negated) = body.strip_prefix("no-") {
            parsed
                .flags
                .insert(negated.to_lower_camel_case(), Value::Bool(false));
            continue;
        }

        let value = match iter.peek() {
            Some(next) if !next.starts_with("--") => {
                Value::String(iter.next().cloned().unwrap_or_default())
            }
            _ => Value::Bool(true),
        };
        parsed.flags.insert(body.to_lower_camel_case(), value);
    }

    let mut positionals = positionals.into_iter();
    parsed.template = positionals.next();
    parsed.positionals = positionals.collect();
    parsed
}
