//! Scenetour Core — shared abstractions.
//!
//! This crate defines the lifecycle topics and their event metadata, the
//! publish/subscribe center, the selector-probe seam, and the error taxonomy
//! every other crate depends on.
//! It contains no scene or engine logic.

pub mod error;
pub mod event;
pub mod probe;
pub mod pub_center;
