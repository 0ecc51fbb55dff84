//! File-backed scene loading.
//!
//! Scene documents are JSON or YAML files named after the scene. The
//! [`DirectorySceneService`] resolves a scene name to `<dir>/<name>.json`,
//! `<dir>/<name>.yaml` or `<dir>/<name>.yml`, in that order.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use scenetour_core::error::{ConfigError, TourError};
use tracing::{debug, instrument};

use crate::application::service::SceneService;
use crate::domain::scene::SceneDef;

/// Encoding of a scene document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneFormat {
    Json,
    Yaml,
}

impl SceneFormat {
    /// File extensions tried for each format, in lookup order.
    const EXTENSIONS: [(&'static str, SceneFormat); 3] = [
        ("json", SceneFormat::Json),
        ("yaml", SceneFormat::Yaml),
        ("yml", SceneFormat::Yaml),
    ];
}

/// Decodes a scene document.
///
/// # Errors
///
/// Returns `ConfigError::Parse` if the document is not a valid scene.
pub fn parse_scene(source: &str, format: SceneFormat) -> Result<SceneDef, ConfigError> {
    match format {
        SceneFormat::Json => {
            serde_json::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))
        }
        SceneFormat::Yaml => {
            serde_yaml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))
        }
    }
}

/// A scene service reading scene documents from a directory.
#[derive(Debug, Clone)]
pub struct DirectorySceneService {
    root: PathBuf,
}

impl DirectorySceneService {
    /// Create a service rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

fn is_plain_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !name.contains('\0')
}

#[async_trait]
impl SceneService for DirectorySceneService {
    #[instrument(skip(self), fields(root = %self.root.display()))]
    async fn get_scene(&self, name: &str) -> Result<SceneDef, TourError> {
        if !is_plain_name(name) {
            return Err(TourError::SceneNotFound(name.to_owned()));
        }

        for (extension, format) in SceneFormat::EXTENSIONS {
            let path = self.root.join(format!("{name}.{extension}"));
            match tokio::fs::read_to_string(&path).await {
                Ok(source) => {
                    debug!(path = %path.display(), "loaded scene document");
                    return parse_scene(&source, format).map_err(TourError::from);
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(TourError::Service(format!(
                        "failed to read {}: {e}",
                        path.display()
                    )));
                }
            }
        }

        Err(TourError::SceneNotFound(name.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::step::StepKind;

    const YAML_SCENE: &str = r##"
steps:
  - type: notice
    content: Welcome aboard
  - type: focus
    selector: "#menu"
    position: right
    content: Open the menu
    nextStepTrigger: menu-opened
  - type: inputChecker
    selector: ["#email"]
    content: Enter your email
    valueCollect: "#email"
    rules:
      - pattern: "@"
        message: must contain @
theme:
  brandColor: "#0050ff"
"##;

    #[test]
    fn test_parse_scene_reads_yaml_documents() {
        // Act
        let scene = parse_scene(YAML_SCENE, SceneFormat::Yaml).unwrap();

        // Assert
        let kinds: Vec<StepKind> = scene.steps.iter().map(|s| s.kind()).collect();
        assert_eq!(
            kinds,
            vec![StepKind::Notice, StepKind::Focus, StepKind::InputChecker]
        );
        assert_eq!(scene.steps[1].next_step_trigger(), Some("menu-opened"));
        assert_eq!(
            scene.theme.unwrap().brand_color.as_deref(),
            Some("#0050ff")
        );
    }

    #[test]
    fn test_parse_scene_reports_malformed_json() {
        let result = parse_scene("{ \"steps\": [ { \"type\": 3 } ] }", SceneFormat::Json);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[tokio::test]
    async fn test_directory_service_loads_scene_by_name() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("onboarding.yaml"), YAML_SCENE).unwrap();
        let service = DirectorySceneService::new(dir.path());

        // Act
        let scene = service.get_scene("onboarding").await.unwrap();

        // Assert
        assert_eq!(scene.steps.len(), 3);
    }

    #[tokio::test]
    async fn test_directory_service_prefers_json_over_yaml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("intro.yaml"), YAML_SCENE).unwrap();
        std::fs::write(
            dir.path().join("intro.json"),
            r#"{ "steps": [ { "type": "base" } ] }"#,
        )
        .unwrap();
        let service = DirectorySceneService::new(dir.path());

        let scene = service.get_scene("intro").await.unwrap();

        assert_eq!(scene.steps.len(), 1);
    }

    #[tokio::test]
    async fn test_directory_service_returns_not_found_for_unknown_scene() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let service = DirectorySceneService::new(dir.path());

        // Act
        let result = service.get_scene("missing").await;

        // Assert
        match result.unwrap_err() {
            TourError::SceneNotFound(name) => assert_eq!(name, "missing"),
            other => panic!("expected SceneNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_directory_service_rejects_path_like_names() {
        let dir = tempfile::tempdir().unwrap();
        let service = DirectorySceneService::new(dir.path());

        for name in ["../secret", "a/b", "", ".."] {
            let result = service.get_scene(name).await;
            assert!(
                matches!(result, Err(TourError::SceneNotFound(_))),
                "{name:?} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn test_directory_service_surfaces_parse_errors_as_configuration() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.json"), "not json").unwrap();
        let service = DirectorySceneService::new(dir.path());

        let result = service.get_scene("broken").await;

        assert!(matches!(
            result,
            Err(TourError::Configuration(ConfigError::Parse(_)))
        ));
    }
}
