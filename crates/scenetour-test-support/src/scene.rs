//! Test scene services — mock `SceneService` implementations for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use scenetour_core::error::TourError;
use scenetour_scene::application::service::SceneService;
use scenetour_scene::domain::scene::SceneDef;

/// A scene service serving scenes from memory. Records every requested name.
#[derive(Debug, Default)]
pub struct StaticSceneService {
    scenes: HashMap<String, SceneDef>,
    requested: Mutex<Vec<String>>,
}

impl StaticSceneService {
    /// Create an empty service; every lookup returns `SceneNotFound`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `scene` under `name`.
    #[must_use]
    pub fn with_scene(mut self, name: &str, scene: SceneDef) -> Self {
        self.scenes.insert(name.to_owned(), scene);
        self
    }

    /// Returns the names passed to `get_scene`, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl SceneService for StaticSceneService {
    async fn get_scene(&self, name: &str) -> Result<SceneDef, TourError> {
        self.requested.lock().unwrap().push(name.to_owned());
        self.scenes
            .get(name)
            .cloned()
            .ok_or_else(|| TourError::SceneNotFound(name.to_owned()))
    }
}

/// A scene service that always returns a service error. Useful for testing
/// error-handling paths.
#[derive(Debug)]
pub struct FailingSceneService;

#[async_trait]
impl SceneService for FailingSceneService {
    async fn get_scene(&self, _name: &str) -> Result<SceneDef, TourError> {
        Err(TourError::Service("connection refused".into()))
    }
}
