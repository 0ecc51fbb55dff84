//! Scenetour — Scene definitions.
//!
//! Responsible for the scene data model, turning a scene document into a
//! validated [`application::compile::CompiledScene`], and the service seam
//! through which scenes are fetched by name.

pub mod application;
pub mod domain;
