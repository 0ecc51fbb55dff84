//! Step validation.
//!
//! Pure decisions about a single step: may it be left given the incoming
//! signal and collected input, and is its display pre-condition satisfied.
//! Nothing here mutates tour state.

use scenetour_core::probe::SelectorProbe;
use scenetour_scene::application::compile::CompiledRule;
use scenetour_scene::domain::step::{InputCheckerStep, StepDef, WaitUntil};
use serde_json::Value;

/// What asked the tour to move on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal<'a> {
    /// The user asked for the next step (the renderer's `onNext`).
    Next,
    /// An external trigger fired.
    Trigger(&'a str),
}

/// Everything the validator looks at besides the step itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdvanceContext<'a> {
    pub signal: Signal<'a>,
    /// Value the host collected from the step's `valueCollect` source.
    pub input: Option<&'a Value>,
}

impl<'a> AdvanceContext<'a> {
    #[must_use]
    pub fn next() -> Self {
        Self {
            signal: Signal::Next,
            input: None,
        }
    }

    #[must_use]
    pub fn trigger(id: &'a str) -> Self {
        Self {
            signal: Signal::Trigger(id),
            input: None,
        }
    }

    #[must_use]
    pub fn with_input(mut self, input: &'a Value) -> Self {
        self.input = Some(input);
        self
    }
}

/// Why a step may not be left yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Blocked {
    /// The step waits for a trigger the signal did not carry.
    AwaitingTrigger { expected: String },
    /// A trigger fired for a step that only advances on `Next`.
    UnexpectedTrigger { received: String },
    /// Collected input failed a rule. `rule` is its position in `rules`.
    RuleFailed {
        rule: usize,
        message: Option<String>,
    },
}

/// Decides whether `step` may be left.
///
/// The trigger gate applies to every kind: a step declaring
/// `nextStepTrigger` is left only by a matching [`Signal::Trigger`], any
/// other step only by [`Signal::Next`]. Input checkers then evaluate `rules`
/// in order against the collected value; the first failing rule wins.
///
/// # Errors
///
/// Returns the [`Blocked`] reason when the step must stay active.
pub fn can_advance(
    step: &StepDef,
    rules: &[CompiledRule],
    ctx: &AdvanceContext<'_>,
) -> Result<(), Blocked> {
    match (step.next_step_trigger(), ctx.signal) {
        (Some(expected), Signal::Trigger(received)) if expected == received => {}
        (Some(expected), _) => {
            return Err(Blocked::AwaitingTrigger {
                expected: expected.to_owned(),
            });
        }
        (None, Signal::Trigger(received)) => {
            return Err(Blocked::UnexpectedTrigger {
                received: received.to_owned(),
            });
        }
        (None, Signal::Next) => {}
    }

    if let StepDef::InputChecker(checker) = step {
        let value = collected_value(checker, ctx.input);
        if let Some((index, rule)) = rules.iter().enumerate().find(|(_, r)| !r.accepts(&value)) {
            return Err(Blocked::RuleFailed {
                rule: index,
                message: rule.message().map(str::to_owned),
            });
        }
    }

    Ok(())
}

/// Reduces collected input to the string rules are matched against.
///
/// With `valueCollectField` set and a record as input, the field is picked
/// out. Strings are used as they are, missing values and `null` become the
/// empty string, other values use their JSON text.
#[must_use]
pub fn collected_value(checker: &InputCheckerStep, input: Option<&Value>) -> String {
    let Some(mut value) = input else {
        return String::new();
    };
    if let (Some(field), Value::Object(record)) = (&checker.value_collect_field, value) {
        value = record.get(field).unwrap_or(&Value::Null);
    }
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Returns `true` if the selector part of `wait` holds. Delays are the
/// caller's concern since they depend on elapsed time.
#[must_use]
pub fn selector_ready(wait: &WaitUntil, probe: &dyn SelectorProbe) -> bool {
    wait.selector
        .as_deref()
        .is_none_or(|selector| probe.is_present(selector))
}
