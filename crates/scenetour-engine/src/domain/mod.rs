//! Domain layer for tour progression.

pub mod cursor;
pub mod events;
pub mod tour;
pub mod validator;
