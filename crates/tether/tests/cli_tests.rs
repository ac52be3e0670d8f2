// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Commands driven end to end against a temporary project and the
//! in-memory backend.

use std::sync::Arc;

use tether::commands::{add, export, init, remove, status, sync, validate};
use tether::App;
use tether_config::TetherConfig;
use tether_core::{Answer, FormAnswers, TetherError};
use tether_output::writers::StreamWriter;
use tether_test_utils::{register_ledger, Ledger, ScriptedFormRunner, TestProject};

fn app(harness: &TestProject, env: &str) -> App {
    let config = TetherConfig::default();
    let registry =
        tether_vault::builtin_registry_with(&config, harness.backend().clone()).unwrap();
    App::with_parts(config, harness.workspace(), Some(env), registry, Arc::default()).unwrap()
}

/// App that also knows the `ledger` vault, which cannot list its store.
fn ledger_app(harness: &TestProject, ledger: Ledger) -> App {
    let config = TetherConfig::default();
    let mut registry =
        tether_vault::builtin_registry_with(&config, harness.backend().clone()).unwrap();
    register_ledger(&mut registry, ledger).unwrap();
    App::with_parts(config, harness.workspace(), Some(""), registry, Arc::default()).unwrap()
}

fn recorded_keys(app: &App, vault: &str) -> Vec<String> {
    let project = app.project().unwrap();
    project
        .vault(vault)
        .unwrap()
        .config
        .get("keys")
        .and_then(|keys| keys.as_array())
        .map(|keys| keys.iter().filter_map(|k| k.as_str().map(str::to_string)).collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn pull_then_export_renders_dotenv() {
    let harness = TestProject::new().unwrap();
    harness.with_bound_secret("").unwrap();
    let app = app(&harness, "");

    let pulled = sync::pull(&app).await.unwrap();
    assert_eq!(pulled.keys, vec!["MY_KEY"]);
    assert_eq!(harness.read_file(".env.secret").unwrap(), "MY_KEY=myvalue\n");

    let mut sink = StreamWriter::new(Vec::new());
    let format = export::export_into(&app, Some("stdout"), Some("auto"), &mut sink).unwrap();
    assert_eq!(format, "dotenv");
    assert_eq!(sink.into_inner(), b"MY_KEY=myvalue\n");
}

#[tokio::test]
async fn pulled_values_are_registered_for_redaction() {
    let harness = TestProject::new().unwrap();
    harness.with_bound_secret("").unwrap();
    let app = app(&harness, "");

    sync::pull(&app).await.unwrap();
    let secrets = app.secrets().read().unwrap();
    assert!(secrets.iter().any(|v| v == "myvalue"));
}

#[tokio::test]
async fn push_sends_local_values() {
    let harness = TestProject::new().unwrap();
    harness.with_bound_secret("").unwrap();
    harness.write_file(".env.secret", "MY_KEY=changed\nOTHER=1\n").unwrap();
    let app = app(&harness, "");

    let pushed = sync::push(&app).await.unwrap();
    assert_eq!(pushed, vec!["MY_KEY"]);

    std::fs::remove_file(harness.root().join(".env.secret")).unwrap();
    sync::pull(&app).await.unwrap();
    assert_eq!(harness.read_file(".env.secret").unwrap(), "MY_KEY=changed\n");
}

#[test]
fn export_refuses_undeclared_format() {
    let harness = TestProject::new().unwrap();
    harness.with_bound_secret("").unwrap();
    let app = app(&harness, "");

    let mut sink = StreamWriter::new(Vec::new());
    let err = export::export_into(&app, Some("github-env"), Some("json"), &mut sink).unwrap_err();
    assert!(err.is_validation());
    assert!(sink.into_inner().is_empty());
}

#[test]
fn init_creates_once() {
    let harness = TestProject::new().unwrap();
    let app = app(&harness, "dev");

    let project = init::run_init(&app, &mut ScriptedFormRunner::defaults()).unwrap();
    assert_eq!(project.path(), harness.root().join("dev.tether.toml"));
    assert!(project.options().use_dot_secret_file_for_secrets);

    let err = init::run_init(&app, &mut ScriptedFormRunner::defaults()).unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn init_applies_answers() {
    let harness = TestProject::new().unwrap();
    let app = app(&harness, "");

    let mut runner = ScriptedFormRunner::new().then(
        [
            ("hyphens_to_underscores", false),
            ("uppercase_locally", false),
            ("use_dot_secret_file_for_secrets", false),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.into()))
        .collect(),
    );
    let project = init::run_init(&app, &mut runner).unwrap();
    assert!(!project.options().uppercase_locally);
    assert_eq!(project.secret_env_path(), harness.root().join(".env"));
}

#[tokio::test]
async fn add_vault_then_bind_everything() {
    let harness = TestProject::new().unwrap();
    harness.create("").unwrap();
    let app = app(&harness, "");

    let mut runner = ScriptedFormRunner::new();
    let name = add::add_vault(
        &app,
        &mut runner,
        Some("test"),
        Some("other".into()),
        vec![("store".into(), "otherstore".into())],
    )
    .await
    .unwrap();
    assert_eq!(name, "other");
    assert!(runner.shown().is_empty());

    let report = add::add_secrets(&app, &mut ScriptedFormRunner::new(), None, true)
        .await
        .unwrap();
    assert_eq!(report.added, vec!["MYKEY"]);

    let project = app.project().unwrap();
    assert_eq!(project.vault("other").unwrap().kind, "test");
    assert_eq!(project.secrets()["MYKEY"].remote_key, "mykey");
}

#[tokio::test]
async fn add_vault_name_defaults_to_kind() {
    let harness = TestProject::new().unwrap();
    harness.create("").unwrap();
    let app = app(&harness, "");

    let mut runner = ScriptedFormRunner::defaults();
    let name = add::add_vault(&app, &mut runner, Some("test"), None, Vec::new())
        .await
        .unwrap();
    assert_eq!(name, "test");
    assert_eq!(runner.shown_ids(), vec!["vault-name", "store"]);
}

#[tokio::test]
async fn cancelled_add_leaves_project_untouched() {
    let harness = TestProject::new().unwrap();
    let before = harness.with_bound_secret("").unwrap();
    let app = app(&harness, "");

    let err = add::add_vault(&app, &mut ScriptedFormRunner::new(), None, None, Vec::new())
        .await
        .unwrap_err();
    assert!(matches!(err, TetherError::Cancelled));
    assert_eq!(app.project().unwrap().vaults(), before.vaults());
}

#[tokio::test]
async fn duplicate_vault_name_is_rejected() {
    let harness = TestProject::new().unwrap();
    harness.with_bound_secret("").unwrap();
    let app = app(&harness, "");

    let err = add::add_vault(
        &app,
        &mut ScriptedFormRunner::new(),
        Some("test"),
        Some("main".into()),
        vec![("store".into(), "mystore".into())],
    )
    .await
    .unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test]
async fn deselecting_removes_binding() {
    let harness = TestProject::new().unwrap();
    harness.with_bound_secret("").unwrap();
    let app = app(&harness, "");

    let runner = &mut ScriptedFormRunner::new().answer("secrets", Vec::<String>::new());
    let report = add::add_secrets(&app, runner, Some("main"), false).await.unwrap();
    assert_eq!(report.deselected, vec!["MY_KEY"]);
    assert!(app.project().unwrap().secrets().is_empty());
}

#[test]
fn remove_vault_drops_its_secrets() {
    let harness = TestProject::new().unwrap();
    harness.with_bound_secret("").unwrap();
    let app = app(&harness, "");

    assert_eq!(remove::remove_vault(&app, "main").unwrap(), vec!["MY_KEY"]);
    let project = app.project().unwrap();
    assert!(project.vaults().is_empty());
    assert!(project.secrets().is_empty());

    let err = remove::remove_secret(&app, "MY_KEY").unwrap_err();
    assert!(matches!(err, TetherError::NotFound { .. }));
}

#[tokio::test]
async fn status_tracks_local_values() {
    let harness = TestProject::new().unwrap();
    harness.with_bound_secret("").unwrap();
    let app = app(&harness, "");

    let report = status::build_report(&app, &app.project().unwrap()).unwrap();
    assert_eq!(report.vaults[0].summary, "test: mystore");
    assert_eq!(report.vaults[0].secrets, 1);
    assert!(!report.secrets[0].local);

    sync::pull(&app).await.unwrap();
    let report = status::build_report(&app, &app.project().unwrap()).unwrap();
    assert!(report.secrets[0].local);
}

#[test]
fn validate_reports_every_problem() {
    let harness = TestProject::new().unwrap();
    harness
        .write_file(
            ".tether.toml",
            "[vault.main]\ntype = \"keyvalt\"\n\n\
             [secret.MY_KEY]\nvault = \"nope\"\nremote_key = \"mykey\"\ncontent_type = \"text/plain\"\n",
        )
        .unwrap();
    let app = app(&harness, "");

    let errors = validate::check(&app).unwrap_err();
    assert_eq!(errors.len(), 2);
    assert!(validate::run_validate(&app).unwrap_err().is_validation());
}

#[test]
fn missing_project_is_not_found() {
    let harness = TestProject::new().unwrap();
    let app = app(&harness, "prod");
    assert!(matches!(app.project().unwrap_err(), TetherError::NotFound { .. }));
}

#[tokio::test]
async fn entered_secret_is_bound_and_remembered() {
    let harness = TestProject::new().unwrap();
    harness.create("").unwrap();
    let app = ledger_app(&harness, Ledger::default());

    add::add_vault(
        &app,
        &mut ScriptedFormRunner::new(),
        Some("ledger"),
        Some("book".into()),
        vec![("book".into(), "personal".into())],
    )
    .await
    .unwrap();
    assert!(recorded_keys(&app, "book").is_empty());

    let entry = FormAnswers::from([
        ("key".to_string(), Answer::from("API_TOKEN")),
        ("value".to_string(), Answer::from("s3cret")),
    ]);
    let mut runner = ScriptedFormRunner::new().then(entry);
    let report = add::add_secrets(&app, &mut runner, Some("book"), false).await.unwrap();
    assert_eq!(runner.shown_ids(), vec!["new-secret"]);
    assert_eq!(report.added, vec!["API_TOKEN"]);
    assert_eq!(recorded_keys(&app, "book"), vec!["API_TOKEN"]);
    assert_eq!(app.project().unwrap().secrets()["API_TOKEN"].remote_key, "API_TOKEN");

    // A fresh instance still lists the entry, so the binding survives.
    let report = add::add_secrets(&app, &mut ScriptedFormRunner::new(), Some("book"), true)
        .await
        .unwrap();
    assert!(report.pruned.is_empty());
    assert_eq!(report.retained, vec!["API_TOKEN"]);

    sync::pull(&app).await.unwrap();
    assert_eq!(harness.read_file(".env.secret").unwrap(), "API_TOKEN=s3cret\n");
}

#[tokio::test]
async fn push_records_keys_the_vault_cannot_list() {
    let harness = TestProject::new().unwrap();
    harness
        .write_file(
            ".tether.toml",
            "[vault.book]\ntype = \"ledger\"\nbook = \"personal\"\n\n\
             [secret.API_TOKEN]\nvault = \"book\"\nremote_key = \"API_TOKEN\"\n",
        )
        .unwrap();
    harness.write_file(".env.secret", "API_TOKEN=rotated\n").unwrap();
    let ledger = Ledger::default();
    let app = ledger_app(&harness, ledger.clone());

    assert_eq!(sync::push(&app).await.unwrap(), vec!["API_TOKEN"]);
    assert_eq!(recorded_keys(&app, "book"), vec!["API_TOKEN"]);
    assert_eq!(
        ledger.lock().unwrap().get(&("personal".to_string(), "API_TOKEN".to_string())),
        Some(&"rotated".to_string())
    );

    std::fs::remove_file(harness.root().join(".env.secret")).unwrap();
    sync::pull(&app).await.unwrap();
    assert_eq!(harness.read_file(".env.secret").unwrap(), "API_TOKEN=rotated\n");
}
