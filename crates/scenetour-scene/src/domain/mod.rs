//! Domain layer for scene definitions.

pub mod scene;
pub mod step;
