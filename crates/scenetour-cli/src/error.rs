//! Scenetour CLI — error types.

use scenetour_core::error::TourError;
use thiserror::Error;

/// Startup and runtime errors for the terminal host.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable or argument is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The tour could not be opened or failed while running.
    #[error("tour error: {0}")]
    Tour(#[from] TourError),

    /// Reading input failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Process exit code for this error.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Config(_) => 2,
            AppError::Tour(TourError::SceneNotFound(_) | TourError::Configuration(_)) => 3,
            AppError::Tour(_) => 4,
            AppError::Io(_) => 5,
        }
    }
}
