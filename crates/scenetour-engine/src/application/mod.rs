//! Application layer for tour progression.

pub mod props;
pub mod readiness;
pub mod session;
