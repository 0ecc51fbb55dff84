//! Scene service abstraction.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use scenetour_core::error::TourError;

use crate::domain::scene::SceneDef;

/// Fetches scene definitions by name. This is the only data-fetch boundary
/// of a tour.
#[async_trait]
pub trait SceneService: Send + Sync {
    /// Loads the scene called `name`.
    ///
    /// # Errors
    ///
    /// Returns `TourError::SceneNotFound` for unknown names and
    /// `TourError::Service` (or `TourError::Configuration` for undecodable
    /// documents) when the scene cannot be delivered.
    async fn get_scene(&self, name: &str) -> Result<SceneDef, TourError>;
}

/// Host-supplied configuration of the tour runtime.
#[derive(Clone)]
pub struct AppConfig {
    /// Where scenes come from.
    pub service: Arc<dyn SceneService>,
}

impl AppConfig {
    /// Create new application configuration.
    #[must_use]
    pub fn new(service: Arc<dyn SceneService>) -> Self {
        Self { service }
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig").finish_non_exhaustive()
    }
}
