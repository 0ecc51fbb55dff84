//! Scenetour — Tour progression.
//!
//! Responsible for deciding whether a step may be left, tracking the active
//! step (including nested carousel positions), publishing lifecycle events,
//! and running a tour session against its host.

pub mod application;
pub mod domain;
