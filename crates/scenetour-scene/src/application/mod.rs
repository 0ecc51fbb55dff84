//! Application layer for scene definitions.

pub mod compile;
pub mod loader;
pub mod service;
