//! Tour error types.

use thiserror::Error;

/// A scene definition that cannot produce a running tour.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The scene declares no steps at all.
    #[error("scene has no steps")]
    EmptyScene,

    /// Two steps declare the same identifier.
    #[error("duplicate step id {0:?}")]
    DuplicateStepId(String),

    /// A carousel references a child identifier no step declares.
    #[error("carousel at step {carousel} references unknown child {child:?}")]
    UnresolvedChild {
        /// Index of the carousel step in the scene.
        carousel: usize,
        /// The unresolved child identifier.
        child: String,
    },

    /// A carousel contains itself, directly or through nested carousels.
    #[error("carousel {0:?} contains itself")]
    CarouselCycle(String),

    /// A focus or input-checker step has an empty selector list.
    #[error("step {0} declares no selector")]
    MissingSelector(usize),

    /// An input rule pattern does not compile.
    #[error("step {step} rule pattern {pattern:?} is invalid: {reason}")]
    InvalidPattern {
        /// Index of the input-checker step in the scene.
        step: usize,
        /// The offending pattern source.
        pattern: String,
        /// Compiler diagnostic.
        reason: String,
    },

    /// The scene document could not be decoded.
    #[error("scene document is malformed: {0}")]
    Parse(String),
}

/// Top-level error type returned across crate boundaries.
#[derive(Debug, Error)]
pub enum TourError {
    /// The scene cannot be turned into a running tour.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// The scene service has no scene with the requested name.
    #[error("scene not found: {0}")]
    SceneNotFound(String),

    /// The scene service failed to deliver a scene.
    #[error("scene service error: {0}")]
    Service(String),

    /// Collected input failed an input-checker rule. The tour stays on the
    /// same step.
    #[error(
        "input rejected at step {step_index}: {}",
        message.as_deref().unwrap_or("value does not satisfy the step rules")
    )]
    Validation {
        /// Outer index of the step that rejected the input.
        step_index: usize,
        /// The failing rule's message, if it declares one.
        message: Option<String>,
    },

    /// The operation requires a running tour.
    #[error("tour is not running")]
    NotRunning,

    /// A tour is already running on this engine.
    #[error("tour is already running")]
    AlreadyRunning,

    /// A pending transition was invalidated before it was committed.
    #[error("transition is stale")]
    StaleTransition,

    /// The step being entered has not satisfied its wait condition yet.
    #[error("step is not ready")]
    StepNotReady,

    /// The wait condition of a step did not hold within the configured timeout.
    #[error(
        "timed out waiting for {}",
        selector.as_ref().map_or_else(|| "step delay".to_owned(), |s| format!("selector {s:?}"))
    )]
    ReadinessTimeout {
        /// The selector that never appeared. `None` when the timeout fired
        /// during a delay.
        selector: Option<String>,
    },
}
