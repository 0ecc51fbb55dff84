//! Integration tests for the terminal host.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use scenetour_cli::config::CliConfig;
use scenetour_cli::error::AppError;
use scenetour_cli::host::{self, Output};
use scenetour_core::error::{ConfigError, TourError};
use scenetour_engine::application::session::TourOutcome;

const SCENE: &str = r##"{
  "steps": [
    { "type": "notice", "content": "Welcome aboard" },
    {
      "type": "inputChecker",
      "selector": "#email",
      "content": "Enter your email",
      "valueCollect": "#email",
      "rules": [ { "pattern": "@", "message": "must contain @" } ]
    },
    { "type": "carousel", "children": ["tip-1", "tip-2"] },
    { "type": "notice", "id": "tip-1", "content": "First tip" },
    { "type": "notice", "id": "tip-2", "content": "Second tip", "nextStepTrigger": "got-it" },
    { "type": "focus", "selector": ["#save", "#save-alt"], "position": "right", "content": "Save here" }
  ]
}"##;

fn config(dir: &Path, scene: &str) -> CliConfig {
    CliConfig {
        scene_dir: dir.to_path_buf(),
        scene: scene.to_owned(),
        poll_interval: Duration::from_millis(10),
        wait_timeout: None,
        present_selectors: Vec::new(),
    }
}

fn capture() -> (Output, Arc<Mutex<String>>) {
    let text = Arc::new(Mutex::new(String::new()));
    let sink = Arc::clone(&text);
    let output: Output = Arc::new(move |chunk: &str| sink.lock().unwrap().push_str(chunk));
    (output, text)
}

fn scene_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("onboarding.json"), SCENE).unwrap();
    dir
}

#[tokio::test]
async fn test_host_walks_scene_to_completion() {
    // Arrange
    let dir = scene_dir();
    let (output, text) = capture();
    let input: &'static [u8] =
        b"next\nnext nope\nnext me@example.com\nnext\nnext\ntrigger got-it\nnext\n";

    // Act
    let outcome = host::run(&config(dir.path(), "onboarding"), input, output)
        .await
        .unwrap();

    // Assert
    assert_eq!(outcome, TourOutcome::Finished);
    let text = text.lock().unwrap();
    assert!(text.contains("[1/4] notice\n  Welcome aboard"));
    assert!(text.contains("[2/4] inputChecker"));
    assert!(text.contains("  type `next <value>` to submit\n  must contain @\n"));
    assert!(text.contains("[3/4] carousel\n  (1/2)\n  First tip"));
    assert!(text.contains("  (2/2)\n  Second tip\n  waiting for `trigger got-it`"));
    assert!(text.contains(
        "[4/4] focus\n  Save here [right of #save, #save-alt]\n  `next` finishes the tour"
    ));
    assert!(text.ends_with("tour complete (4 steps)\n"));
    assert_eq!(text.matches("[2/4]").count(), 1);
}

#[tokio::test]
async fn test_rejected_input_prints_rule_message_and_keeps_step() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("code.yaml"),
        concat!(
            "steps:\n",
            "  - type: inputChecker\n",
            "    selector: \"#code\"\n",
            "    content: code\n",
            "    valueCollect: \"#code\"\n",
            "    rules:\n",
            "      - pattern: '^\\d+$'\n",
            "        message: digits only\n",
        ),
    )
    .unwrap();
    let (output, text) = capture();
    let input: &'static [u8] = b"next abc\nnext 123\n";

    // Act
    let outcome = host::run(&config(dir.path(), "code"), input, output)
        .await
        .unwrap();

    // Assert
    assert_eq!(outcome, TourOutcome::Finished);
    let text = text.lock().unwrap();
    assert!(text.contains("  digits only\n"));
    assert_eq!(text.matches("[1/1] inputChecker").count(), 1);
    assert!(text.ends_with("tour complete (1 steps)\n"));
}

#[tokio::test]
async fn test_end_of_input_cancels_the_tour() {
    let dir = scene_dir();
    let (output, text) = capture();

    let outcome = host::run(&config(dir.path(), "onboarding"), &b"next\n"[..], output)
        .await
        .unwrap();

    assert_eq!(outcome, TourOutcome::Cancelled);
    let text = text.lock().unwrap();
    assert!(text.ends_with("tour cancelled\n"));
    assert!(!text.contains("tour complete"));
}

#[tokio::test]
async fn test_unknown_command_prints_help() {
    let dir = scene_dir();
    let (output, text) = capture();

    host::run(&config(dir.path(), "onboarding"), &b"jump\ncancel\n"[..], output)
        .await
        .unwrap();

    assert!(text.lock().unwrap().contains("commands: next [value]"));
}

#[tokio::test]
async fn test_missing_scene_is_reported() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    let (output, _) = capture();

    // Act
    let result = host::run(&config(dir.path(), "nowhere"), &b""[..], output).await;

    // Assert
    match result.unwrap_err() {
        AppError::Tour(TourError::SceneNotFound(name)) => assert_eq!(name, "nowhere"),
        other => panic!("expected SceneNotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn test_invalid_scene_is_a_configuration_error() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("broken.yaml"),
        "steps:\n  - type: carousel\n    children: [ghost]\n",
    )
    .unwrap();
    let (output, _) = capture();

    let result = host::run(&config(dir.path(), "broken"), &b""[..], output).await;

    match result.unwrap_err() {
        err @ AppError::Tour(TourError::Configuration(ConfigError::UnresolvedChild { .. })) => {
            assert_eq!(err.exit_code(), 3);
        }
        other => panic!("expected UnresolvedChild, got {other:?}"),
    }
}
