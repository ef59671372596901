//! Unit tests for CLI commands

use crate::cli::{run_cli, Cli, Commands};
use clap::Parser;
use std::fs;

const MANIFEST: &str = "controllers:
  - name: home
    layouts: [default]
    actions: [index]
  - name: feed
    area: api
    sessionless: true
    actions:
      - name: refresh
        async: true
";

fn run(args: &[&str]) -> serde_json::Value {
    let cli = Cli::try_parse_from(args).unwrap();
    let mut out = Vec::new();
    run_cli(cli, &mut out).unwrap();
    serde_json::from_slice(&out).unwrap()
}

#[test]
fn test_select_command_parses() {
    let cli = Cli::try_parse_from([
        "monorail",
        "select",
        "--manifest",
        "controllers.yaml",
        "--controller",
        "home",
        "--action",
        "index",
    ])
    .unwrap();

    match cli.command {
        Commands::Select {
            manifest,
            area,
            controller,
            action,
            execute,
        } => {
            assert_eq!(manifest.to_string_lossy(), "controllers.yaml");
            assert_eq!(area, "");
            assert_eq!(controller, "home");
            assert_eq!(action, "index");
            assert!(!execute);
        }
        _ => panic!("Expected Select command"),
    }
}

#[test]
fn test_select_requires_controller() {
    assert!(Cli::try_parse_from(["monorail", "select", "-m", "x.yaml", "--action", "a"]).is_err());
}

#[test]
fn test_select_reports_standard_handler() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = dir.path().join("controllers.yaml");
    fs::write(&manifest, MANIFEST).unwrap();
    let manifest = manifest.to_string_lossy().to_string();

    let report = run(&[
        "monorail", "select", "-m", &manifest, "--controller", "home", "--action", "index",
    ]);
    assert_eq!(report["handler"], "standard");
    assert_eq!(report["requires_session"], true);
    assert_eq!(report["layouts"][0], "default");
}

#[test]
fn test_select_executes_async_sessionless_handler() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = dir.path().join("controllers.yaml");
    fs::write(&manifest, MANIFEST).unwrap();
    let manifest = manifest.to_string_lossy().to_string();

    let report = run(&[
        "monorail",
        "select",
        "-m",
        &manifest,
        "--area",
        "api",
        "--controller",
        "feed",
        "--action",
        "refresh",
        "--execute",
    ]);
    assert_eq!(report["handler"], "async_sessionless");
    assert_eq!(report["requires_session"], false);
    assert_eq!(report["response"]["status"], 200);
    assert_eq!(report["response"]["body"], "feed completed refresh");
}

#[test]
fn test_mail_command_renders_message() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("mail")).unwrap();
    fs::write(
        dir.path().join("mail/welcome.j2"),
        "to: {{ email }}\nsubject: Welcome {{ name }}\n\nHi {{ name }}",
    )
    .unwrap();
    let views = dir.path().to_string_lossy().to_string();

    let report = run(&[
        "monorail",
        "mail",
        "--views",
        &views,
        "--template",
        "welcome",
        "--params",
        r#"{"name": "Jane", "email": "jane@example.com"}"#,
    ]);
    assert_eq!(report["to"][0]["address"], "jane@example.com");
    assert_eq!(report["subject"], "Welcome Jane");
    assert_eq!(report["body"], "\nHi Jane\n");
}
