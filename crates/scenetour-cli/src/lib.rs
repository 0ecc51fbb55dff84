//! Scenetour — terminal host.
//!
//! Loads a scene from a directory, renders each step as text and reads user
//! actions from a line-oriented input.

pub mod config;
pub mod error;
pub mod host;
pub mod input;
pub mod probe;
pub mod render;
