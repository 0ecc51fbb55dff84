//! Shared test mocks and utilities for Scenetour.

mod clock;
mod probe;
mod recorder;
mod scene;

pub use clock::FixedClock;
pub use probe::ScriptedProbe;
pub use recorder::EventRecorder;
pub use scene::{FailingSceneService, StaticSceneService};
