use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde_json::{json, Value};
use walkdir::WalkDir;

use create_any::answers::{AnswerMap, FlagMap, Question};
use create_any::error::{CreateError, Result};
use create_any::prompt::Prompter;
use create_any::registry::{discover, DEFAULT_CONFIG_FILE};
use create_any::render::{
    process, DestinationDecision, FileContext, HookPayload, Hooks, NoHooks, ProcessJob, Renderer,
};
use create_any::ui::Reporter;
use create_any::{generate, GenerateOptions};

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Copy a fixture into a scratch directory so generated files never touch the repo.
fn scratch_copy(name: &str) -> tempfile::TempDir {
    let source = fixture_path(name);
    let dir = tempfile::tempdir().unwrap();
    for entry in WalkDir::new(&source).min_depth(1) {
        let entry = entry.unwrap();
        let target = dir.path().join(entry.path().strip_prefix(&source).unwrap());
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).unwrap();
        } else {
            fs::copy(entry.path(), &target).unwrap();
        }
    }
    dir
}

fn demos_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos/templates")
}

fn write_source(dir: &Path, relative: &str, content: &str) {
    let path = dir.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn scenario_a_job(dest_dir: &Path) -> ProcessJob {
    ProcessJob {
        source_dir: fixture_path("scenario-a"),
        dest_dir: dest_dir.to_path_buf(),
        file_patterns: vec!["*/**".into()],
        ignore_patterns: vec![],
        args: json!({ "name": "My App" }),
    }
}

fn recorder(
    events: &Rc<RefCell<Vec<String>>>,
    name: &'static str,
) -> impl Fn(&HookPayload<'_>) -> Result<()> + 'static {
    let events = Rc::clone(events);
    move |payload| {
        events
            .borrow_mut()
            .push(format!("{name} {}", payload.file.destination_relative));
        Ok(())
    }
}

/// Records the `tag` each hook finds in its file context.
fn tag_reader(
    seen: &Rc<RefCell<Vec<(String, String)>>>,
    name: &'static str,
) -> impl Fn(&HookPayload<'_>) -> Result<()> + 'static {
    let seen = Rc::clone(seen);
    move |payload| {
        let tag = payload
            .context
            .get("tag")
            .and_then(Value::as_str)
            .unwrap_or("missing")
            .to_string();
        seen.borrow_mut().push((name.to_string(), tag));
        Ok(())
    }
}

/// Answers every prompt from a fixed table and records what it was asked.
#[derive(Default)]
struct ScriptedPrompter {
    answers: BTreeMap<String, Value>,
    choice: Option<String>,
    asked: RefCell<Vec<String>>,
    selections: RefCell<Vec<String>>,
}

impl ScriptedPrompter {
    fn answering(pairs: &[(&str, Value)]) -> Self {
        Self {
            answers: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            ..Default::default()
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn prompt(&self, questions: &[Question], _answers: &AnswerMap) -> Result<AnswerMap> {
        let mut out = AnswerMap::new();
        for question in questions {
            self.asked.borrow_mut().push(question.name.clone());
            let value = self
                .answers
                .get(&question.name)
                .cloned()
                .ok_or(CreateError::PromptCancelled)?;
            out.insert(question.name.clone(), value);
        }
        Ok(out)
    }

    fn select(&self, message: &str, choices: &[String]) -> Result<String> {
        self.selections.borrow_mut().push(message.to_string());
        self.choice
            .clone()
            .filter(|c| choices.contains(c))
            .ok_or(CreateError::PromptCancelled)
    }
}

/// Options that search the bundled demo templates from an unconfigured `cwd`.
fn demo_options(cwd: &Path, template: &str, flags: &[(&str, &str)]) -> GenerateOptions {
    GenerateOptions {
        extra_patterns: vec![demos_path().display().to_string()],
        ..options(cwd, Some(template), flags)
    }
}

fn options(cwd: &Path, template: Option<&str>, flags: &[(&str, &str)]) -> GenerateOptions {
    GenerateOptions {
        cwd: cwd.to_path_buf(),
        template: template.map(str::to_string),
        flags: flags
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect::<FlagMap>(),
        extra_patterns: vec![],
        allow_non_empty: false,
    }
}

// --- Processor tests ---

#[test]
fn test_renders_paths_and_contents() {
    let dest = tempfile::tempdir().unwrap();
    let report = process(&scenario_a_job(dest.path()), &NoHooks).unwrap();

    let package = fs::read_to_string(dest.path().join("package.json")).unwrap();
    assert_eq!(package.trim_end(), r#"{"name": "My App"}"#);

    let foo = fs::read_to_string(dest.path().join("My App/foo.txt")).unwrap();
    assert_eq!(foo.trim_end(), "The application name is: MY APP");

    assert_eq!(
        report.files_written,
        vec![PathBuf::from("package.json"), PathBuf::from("My App/foo.txt")]
    );
}

#[test]
fn test_written_paths_and_contents_match_renderer() {
    let dest = tempfile::tempdir().unwrap();
    let job = scenario_a_job(dest.path());
    let report = process(&job, &NoHooks).unwrap();

    let renderer = Renderer::new();
    let context = create_any::render::build_context(&job.args).unwrap();
    for (source, written) in [
        ("package.json", &report.files_written[0]),
        ("{{ name }}/foo.txt", &report.files_written[1]),
    ] {
        let expected_path = renderer.render_path(source, &context).unwrap();
        assert_eq!(written, &PathBuf::from(&expected_path));

        let raw = fs::read_to_string(job.source_dir.join(source)).unwrap();
        let expected_content = renderer.render_content(source, &raw, &context).unwrap();
        assert_eq!(
            fs::read_to_string(dest.path().join(written)).unwrap(),
            expected_content
        );
    }
}

#[test]
fn test_non_empty_destination_aborts_before_any_io() {
    let dest = tempfile::tempdir().unwrap();
    fs::write(dest.path().join("foo"), "keep me").unwrap();

    let invalid_calls = Rc::new(RefCell::new(Vec::<PathBuf>::new()));
    let io_calls = Rc::new(Cell::new(0usize));

    let hooks = {
        let invalid_calls = Rc::clone(&invalid_calls);
        let reads = Rc::clone(&io_calls);
        let writes = Rc::clone(&io_calls);
        Hooks::builder()
            .on_invalid_destination(move |path| {
                invalid_calls.borrow_mut().push(path.to_path_buf());
                Ok(DestinationDecision::Abort)
            })
            .on_before_read_file(move |_| {
                reads.set(reads.get() + 1);
                Ok(())
            })
            .on_before_write_file(move |_| {
                writes.set(writes.get() + 1);
                Ok(())
            })
            .build()
    };

    let err = process(&scenario_a_job(dest.path()), &hooks).unwrap_err();
    assert!(matches!(err, CreateError::DestinationNotEmpty { .. }));
    assert_eq!(*invalid_calls.borrow(), vec![dest.path().to_path_buf()]);
    assert_eq!(io_calls.get(), 0);

    let entries: Vec<_> = fs::read_dir(dest.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
    assert_eq!(fs::read_to_string(dest.path().join("foo")).unwrap(), "keep me");
}

#[test]
fn test_non_empty_destination_can_proceed() {
    let dest = tempfile::tempdir().unwrap();
    fs::write(dest.path().join("foo"), "keep me").unwrap();

    let hooks = Hooks::builder()
        .on_invalid_destination(|_| Ok(DestinationDecision::Proceed))
        .build();
    let report = process(&scenario_a_job(dest.path()), &hooks).unwrap();

    assert_eq!(report.files_written.len(), 2);
    assert_eq!(fs::read_to_string(dest.path().join("foo")).unwrap(), "keep me");
}

#[test]
fn test_hooks_see_every_step_in_order() {
    let dest = tempfile::tempdir().unwrap();
    let events = Rc::new(RefCell::new(Vec::<String>::new()));

    let hooks = Hooks::builder()
        .on_before_read_file(recorder(&events, "read"))
        .on_after_process_file(recorder(&events, "processed"))
        .on_after_write_file(recorder(&events, "written"))
        .build();

    let job = ProcessJob {
        file_patterns: vec!["package.json".into()],
        ..scenario_a_job(dest.path())
    };
    process(&job, &hooks).unwrap();

    assert_eq!(
        *events.borrow(),
        vec![
            "read package.json",
            "processed package.json",
            "written package.json"
        ]
    );
}

#[test]
fn test_render_error_stops_the_run_and_keeps_earlier_files() {
    let source = tempfile::tempdir().unwrap();
    write_source(source.path(), "a.txt", "hello {{ name }}");
    write_source(source.path(), "b.txt", "{{ missing }}");
    write_source(source.path(), "c.txt", "never rendered");
    let dest = tempfile::tempdir().unwrap();

    let job = ProcessJob {
        source_dir: source.path().to_path_buf(),
        dest_dir: dest.path().to_path_buf(),
        file_patterns: vec!["a.txt".into(), "b.txt".into(), "c.txt".into()],
        ignore_patterns: vec![],
        args: json!({ "name": "x" }),
    };
    let err = process(&job, &NoHooks).unwrap_err();

    assert!(matches!(&err, CreateError::RenderError { file, .. } if file == "b.txt"), "{err}");
    assert_eq!(fs::read_to_string(dest.path().join("a.txt")).unwrap(), "hello x");
    assert!(!dest.path().join("b.txt").exists());
    assert!(!dest.path().join("c.txt").exists());
}

#[test]
fn test_hook_error_stops_the_run() {
    let dest = tempfile::tempdir().unwrap();
    let hooks = Hooks::builder()
        .on_before_write_file(|payload| {
            if payload.file.destination_relative == "My App/foo.txt" {
                return Err(CreateError::PromptCancelled);
            }
            Ok(())
        })
        .build();

    let err = process(&scenario_a_job(dest.path()), &hooks).unwrap_err();
    assert!(matches!(err, CreateError::PromptCancelled));
    assert!(dest.path().join("package.json").is_file());
    assert!(!dest.path().join("My App").exists());
}

#[test]
fn test_hook_error_on_first_file_writes_nothing() {
    let dest = tempfile::tempdir().unwrap();
    let hooks = Hooks::builder()
        .on_after_read_file(|_| {
            Err(CreateError::Io {
                context: "hook refused".into(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "refused"),
            })
        })
        .build();

    let err = process(&scenario_a_job(dest.path()), &hooks).unwrap_err();
    assert_eq!(err.to_string(), "IO error: hook refused");
    assert_eq!(fs::read_dir(dest.path()).unwrap().count(), 0);
}

#[test]
fn test_file_context_reaches_every_later_hook() {
    let dest = tempfile::tempdir().unwrap();
    let seen = Rc::new(RefCell::new(Vec::<(String, String)>::new()));

    let tagger = |name| tag_reader(&seen, name);
    let hooks = Hooks::builder()
        .on_file(|file| {
            let mut context = FileContext::new();
            context.insert("tag".into(), json!(format!("for {}", file.source_relative)));
            Ok(context)
        })
        .on_before_read_file(tagger("before read"))
        .on_after_read_file(tagger("after read"))
        .on_before_process_file(tagger("before process"))
        .on_after_process_file(tagger("after process"))
        .on_before_write_file(tagger("before write"))
        .on_after_write_file(tagger("after write"))
        .build();

    let job = ProcessJob {
        file_patterns: vec!["package.json".into()],
        ..scenario_a_job(dest.path())
    };
    process(&job, &hooks).unwrap();

    let seen = seen.borrow();
    assert_eq!(seen.len(), 6);
    assert!(seen.iter().all(|(_, tag)| tag == "for package.json"), "{seen:?}");
    assert_eq!(seen[0].0, "before read");
    assert_eq!(seen[5].0, "after write");
}

#[test]
fn test_whitespace_in_rendered_names_is_kept() {
    let dest = tempfile::tempdir().unwrap();
    let job = ProcessJob {
        args: json!({ "name": " My App" }),
        ..scenario_a_job(dest.path())
    };
    let report = process(&job, &NoHooks).unwrap();

    assert!(report.files_written.contains(&PathBuf::from(" My App/foo.txt")));
    assert!(dest.path().join(" My App/foo.txt").is_file());
    assert!(!dest.path().join("My App").exists());
}

// --- Discovery tests ---

#[test]
fn test_discovery_keeps_first_duplicate_and_reports_both_paths() {
    let root = fixture_path("workspace");
    let patterns = vec!["templates".to_string(), "more-templates".to_string()];
    let discovery = discover(&root, &patterns, DEFAULT_CONFIG_FILE);

    assert_eq!(discovery.ids(), vec!["component", "failing"]);
    let component = discovery.get("component").unwrap();
    assert_eq!(component.source_dir, root.join("templates/component"));

    let duplicate = discovery
        .warnings
        .iter()
        .find(|w| w.contains("Duplicate template id"))
        .expect("duplicate warning");
    assert!(duplicate.contains("more-templates/component-copy"));
    assert!(duplicate.contains("templates/component/create-config.rhai"));

    assert!(discovery.warnings.iter().any(|w| w.contains("broken")));
}

#[test]
fn test_discovery_is_repeatable() {
    let root = fixture_path("workspace");
    let patterns = vec!["templates".to_string(), "more-templates".to_string()];
    for _ in 0..5 {
        let discovery = discover(&root, &patterns, DEFAULT_CONFIG_FILE);
        assert_eq!(
            discovery.get("component").unwrap().description.as_deref(),
            Some("A small JavaScript component")
        );
    }
}

#[test]
fn test_demo_templates_load_cleanly() {
    let root = demos_path();
    let discovery = discover(&root, &[".".to_string()], DEFAULT_CONFIG_FILE);

    assert_eq!(discovery.ids(), vec!["node-package", "react-component"]);
    assert!(discovery.warnings.is_empty(), "{:?}", discovery.warnings);
}

// --- End to end tests ---

#[test]
fn test_generate_answers_from_flags_and_prompts_the_rest() {
    let workspace = scratch_copy("workspace");
    let prompter = ScriptedPrompter::answering(&[("npmScope", json!("acme"))]);

    let report = generate(
        options(workspace.path(), Some("component"), &[("name", "Foo Bar")]),
        &prompter,
        &Reporter::silent(),
    )
    .unwrap();

    assert_eq!(*prompter.asked.borrow(), vec!["npmScope"]);
    assert!(prompter.selections.borrow().is_empty());

    let dest = workspace.path().join("components/foo-bar");
    assert_eq!(report.dest_dir, dest);

    let source = fs::read_to_string(dest.join("src/foo-bar.js")).unwrap();
    assert!(source.contains("// @acme/foo-bar"), "{source}");
    assert!(source.contains(r#"export const FooBar = () => "Foo Bar";"#), "{source}");

    let package = fs::read_to_string(dest.join("package.json")).unwrap();
    assert!(package.contains(r#""name": "@acme/foo-bar""#), "{package}");

    assert!(!dest.join("create-config.rhai").exists());
}

#[test]
fn test_generate_without_prompts_when_flags_answer_everything() {
    let workspace = scratch_copy("workspace");
    let prompter = ScriptedPrompter::default();

    generate(
        options(
            workspace.path(),
            Some("component"),
            &[("name", "button"), ("npmScope", "acme")],
        ),
        &prompter,
        &Reporter::silent(),
    )
    .unwrap();

    assert!(prompter.asked.borrow().is_empty());
    assert!(workspace.path().join("components/button/src/button.js").is_file());
}

#[test]
fn test_generate_prompts_for_unknown_template() {
    let workspace = scratch_copy("workspace");
    let prompter = ScriptedPrompter {
        choice: Some("component".into()),
        ..ScriptedPrompter::answering(&[("name", json!("x")), ("npmScope", json!("y"))])
    };

    generate(
        options(workspace.path(), Some("nope"), &[]),
        &prompter,
        &Reporter::silent(),
    )
    .unwrap();

    let selections = prompter.selections.borrow();
    assert_eq!(selections.len(), 1);
    assert!(selections[0].contains(r#"No template found for id "nope""#));
}

#[test]
fn test_generate_reports_template_function_errors() {
    let workspace = scratch_copy("workspace");

    let err = generate(
        options(workspace.path(), Some("failing"), &[]),
        &ScriptedPrompter::default(),
        &Reporter::silent(),
    )
    .unwrap_err();

    let message = err.to_string();
    assert!(
        message.starts_with("Error returned from failing resolve_files():"),
        "{message}"
    );
    assert!(message.contains("cannot decide which files to use"), "{message}");
}

#[test]
fn test_generate_refuses_non_empty_destination() {
    let workspace = scratch_copy("workspace");
    let dest = workspace.path().join("components/foo");
    fs::create_dir_all(&dest).unwrap();
    fs::write(dest.join("existing.txt"), "x").unwrap();

    let err = generate(
        options(workspace.path(), Some("component"), &[("name", "foo"), ("npmScope", "a")]),
        &ScriptedPrompter::default(),
        &Reporter::silent(),
    )
    .unwrap_err();

    assert!(matches!(err, CreateError::DestinationNotEmpty { path } if path == dest));
    assert!(!dest.join("package.json").exists());
}

#[test]
fn test_generate_without_templates() {
    let dir = tempfile::tempdir().unwrap();
    let err = generate(
        options(dir.path(), None, &[]),
        &ScriptedPrompter::default(),
        &Reporter::silent(),
    )
    .unwrap_err();

    assert!(matches!(err, CreateError::NoTemplates { .. }));
}

#[test]
fn test_react_demo_prompts_everything_without_flags() {
    let cwd = tempfile::tempdir().unwrap();
    let prompter = ScriptedPrompter::answering(&[
        ("name", json!("fancy button")),
        ("withStyles", json!(true)),
        ("styleLanguage", json!("scss")),
    ]);

    let report = generate(
        demo_options(cwd.path(), "react-component", &[]),
        &prompter,
        &Reporter::silent(),
    )
    .unwrap();

    assert_eq!(*prompter.asked.borrow(), vec!["name", "withStyles", "styleLanguage"]);

    let dest = cwd.path().join("src/components/FancyButton");
    assert_eq!(report.dest_dir, dest);
    assert_eq!(
        report.files_written,
        vec![
            PathBuf::from("index.js"),
            PathBuf::from("FancyButton.jsx"),
            PathBuf::from("styles.scss"),
        ]
    );
    let component = fs::read_to_string(dest.join("FancyButton.jsx")).unwrap();
    assert!(component.contains("import './styles.scss';"), "{component}");
    assert!(component.contains(r#"className="fancy-button""#), "{component}");
}

#[test]
fn test_react_demo_filters_the_name_flag() {
    let cwd = tempfile::tempdir().unwrap();
    let prompter = ScriptedPrompter::answering(&[
        ("withStyles", json!(false)),
        ("styleLanguage", json!("css")),
    ]);

    let report = generate(
        demo_options(cwd.path(), "react-component", &[("name", "  card  ")]),
        &prompter,
        &Reporter::silent(),
    )
    .unwrap();

    assert!(!prompter.asked.borrow().contains(&"name".to_string()));
    assert_eq!(report.dest_dir, cwd.path().join("src/components/Card"));
    assert_eq!(
        report.files_written,
        vec![PathBuf::from("index.js"), PathBuf::from("Card.jsx")]
    );
}

#[test]
fn test_node_package_demo_generates_from_prompts() {
    let cwd = tempfile::tempdir().unwrap();
    let prompter = ScriptedPrompter::answering(&[
        ("name", json!("my lib")),
        ("npmScope", json!("acme")),
        ("description", json!("A small library")),
    ]);

    let report = generate(
        demo_options(cwd.path(), "node-package", &[]),
        &prompter,
        &Reporter::silent(),
    )
    .unwrap();

    let dest = cwd.path().join("my-lib");
    assert_eq!(report.dest_dir, dest);
    let package = fs::read_to_string(dest.join("package.json")).unwrap();
    assert!(package.contains(r#""name": "@acme/my-lib""#), "{package}");
    assert!(package.contains(r#""description": "A small library""#), "{package}");
    assert!(dest.join("README.md").is_file());
    assert!(dest.join("src/index.js").is_file());
}
