use std::path::PathBuf;

use console::style;
use miette::Result;

use create_any::registry::TemplateConfig;

use super::{user_patterns, working_dir};

pub fn run(cwd: Option<PathBuf>) -> Result<()> {
    let cwd = working_dir(cwd)?;
    let discovery = create_any::discover_templates(&cwd, &user_patterns())?;

    for warning in &discovery.warnings {
        eprintln!(
            "{} {}",
            style("warning:").yellow().bold(),
            style(warning).yellow()
        );
    }

    if discovery.is_empty() {
        println!(
            "No templates found in {}. Configure template lookup with a '{}' file.",
            cwd.display(),
            style(".createrc").cyan()
        );
        return Ok(());
    }

    println!(
        "{} ({} template{})\n",
        style("Available templates").bold(),
        discovery.templates.len(),
        if discovery.templates.len() == 1 { "" } else { "s" }
    );

    for template in discovery.templates.values() {
        print_entry(template, &cwd);
    }

    Ok(())
}

fn print_entry(template: &TemplateConfig, cwd: &std::path::Path) {
    let location = template
        .source_dir
        .strip_prefix(cwd)
        .unwrap_or(&template.source_dir);

    println!("  {}", style(&template.id).green().bold());
    if let Some(description) = &template.description {
        println!("  {} {}", style("about:").dim(), description);
    }
    println!("  {}  {}", style("path:").dim(), location.display());
    println!();
}
