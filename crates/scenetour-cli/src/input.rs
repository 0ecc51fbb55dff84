//! Line-oriented user actions.

use scenetour_core::error::TourError;
use scenetour_engine::application::session::TourHandle;
use scenetour_engine::domain::tour::AdvanceOutcome;
use serde_json::Value;

/// Help text listing the accepted commands.
pub const HELP: &str = "commands: next [value] | trigger <id> | cancel | help";

/// A parsed input line.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCommand {
    /// Move on, optionally with the value collected for an input checker.
    Next(Option<Value>),
    Trigger(String),
    Cancel,
    Help,
}

/// Parses one input line. Blank lines and unknown commands yield `None`.
///
/// A `next` argument that is valid JSON is used as that value, so
/// `next {"email":"a@b.c"}` submits a record; anything else is a string.
#[must_use]
pub fn parse_line(line: &str) -> Option<HostCommand> {
    let line = line.trim();
    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(word, rest)| (word, rest.trim()));
    match word.to_ascii_lowercase().as_str() {
        "next" | "n" if rest.is_empty() => Some(HostCommand::Next(None)),
        "next" | "n" => Some(HostCommand::Next(Some(
            serde_json::from_str(rest).unwrap_or_else(|_| Value::String(rest.to_owned())),
        ))),
        "trigger" | "t" if !rest.is_empty() => Some(HostCommand::Trigger(rest.to_owned())),
        "cancel" | "quit" | "q" => Some(HostCommand::Cancel),
        "help" | "?" => Some(HostCommand::Help),
        _ => None,
    }
}

/// Forwards `command` to the session and waits until it was handled.
/// `Cancel` and `Help` yield `Ok(None)`.
///
/// # Errors
///
/// Returns the session's error for the command, such as
/// `TourError::Validation` for rejected input, and `TourError::NotRunning`
/// once the session has ended.
pub async fn dispatch(
    command: HostCommand,
    handle: &TourHandle,
) -> Result<Option<AdvanceOutcome>, TourError> {
    match command {
        HostCommand::Next(input) => handle.advance(input).await.map(Some),
        HostCommand::Trigger(id) => handle.trigger(id).await.map(Some),
        HostCommand::Cancel => {
            if handle.on_cancel() {
                Ok(None)
            } else {
                Err(TourError::NotRunning)
            }
        }
        HostCommand::Help if handle.is_closed() => Err(TourError::NotRunning),
        HostCommand::Help => Ok(None),
    }
}
