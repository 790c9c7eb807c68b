use std::path::PathBuf;

use create_any::flags::parse_flags;
use create_any::prompt::InquirePrompter;
use create_any::ui::Reporter;
use create_any::GenerateOptions;
use log::debug;
use miette::Result;

use super::{user_patterns, working_dir};

pub fn run(cwd: Option<PathBuf>, allow_non_empty: bool, args: Vec<String>) -> Result<()> {
    let mut parsed = parse_flags(&args);
    // `--allow-non-empty` after the template id lands in the trailing args.
    let allow_non_empty = allow_non_empty
        || parsed
            .flags
            .remove("allowNonEmpty")
            .is_some_and(|v| v == serde_json::Value::Bool(true));
    debug!("template {:?}, flags {:?}", parsed.template, parsed.flags);
    if !parsed.positionals.is_empty() {
        debug!("ignoring extra arguments {:?}", parsed.positionals);
    }

    let options = GenerateOptions {
        cwd: working_dir(cwd)?,
        template: parsed.template,
        flags: parsed.flags,
        extra_patterns: user_patterns(),
        allow_non_empty,
    };

    let reporter = Reporter::new();
    let result = create_any::generate(options, &InquirePrompter::new(), &reporter);
    reporter.finish();
    result?;

    Ok(())
}
