//! Renderer contract.
//!
//! Renderers never talk to the engine directly. They subscribe to the
//! session's `PubCenter`, receive one [`StepProps`] per displayed step and
//! call back through its `on_next` and `on_cancel` methods. Renderers that
//! need the result of an action, such as a rejected input's message, use
//! [`StepProps::advance`] from a task of their own.

use scenetour_core::error::TourError;
use scenetour_core::event::Topic;
use scenetour_core::pub_center::{PubCenter, TopicHandler, handler};
use scenetour_scene::domain::step::StepDef;
use serde_json::Value;
use tracing::debug;

use super::session::TourHandle;
use crate::domain::events::{ChildProgress, StepEntered, TourEvent};
use crate::domain::tour::AdvanceOutcome;

/// Everything a renderer needs to draw one step.
#[derive(Debug, Clone)]
pub struct StepProps {
    /// The outer step definition.
    pub data: StepDef,
    pub step_index: usize,
    pub step_total: usize,
    /// Active child when `data` is a carousel.
    pub progress_child: Option<ChildProgress>,
    handle: TourHandle,
}

impl StepProps {
    #[must_use]
    pub fn from_entered(entered: &StepEntered, handle: TourHandle) -> Self {
        Self {
            data: entered.step.clone(),
            step_index: entered.step_index,
            step_total: entered.step_total,
            progress_child: entered.progress_child.clone(),
            handle,
        }
    }

    /// The step whose content is on screen: the active carousel child, or
    /// `data` itself.
    #[must_use]
    pub fn displayed(&self) -> &StepDef {
        self.progress_child
            .as_ref()
            .map_or(&self.data, |child| &child.step)
    }

    /// Returns `true` on the last outer step.
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.step_index + 1 == self.step_total
    }

    pub fn on_next(&self) -> bool {
        self.handle.on_next()
    }

    /// Moves on with the value collected from the step's input.
    pub fn submit(&self, value: Value) -> bool {
        self.handle.submit(value)
    }

    pub fn on_cancel(&self) -> bool {
        self.handle.on_cancel()
    }

    /// Moves on, optionally with collected input, and waits for the result.
    ///
    /// Must not be awaited inside the `PubCenter` callback that received
    /// these props: the session handles the request only after that
    /// callback returns.
    ///
    /// # Errors
    ///
    /// Returns `TourError::Validation` carrying the failing rule's message
    /// when the input is rejected, and any other error of
    /// [`TourHandle::advance`].
    pub async fn advance(&self, input: Option<Value>) -> Result<AdvanceOutcome, TourError> {
        self.handle.advance(input).await
    }
}

/// Subscribes `render` to `init` and `nextStep` on `pub_center`. Returns the
/// registered handler so it can be unsubscribed later.
///
/// The binding keeps only a weak handle, so it does not hold the session
/// open. Steps entered after every [`TourHandle`] is gone are not rendered.
pub fn bind_renderer<F>(
    pub_center: &PubCenter<TourEvent>,
    handle: &TourHandle,
    render: F,
) -> TopicHandler<TourEvent>
where
    F: Fn(StepProps) + Send + Sync + 'static,
{
    let weak = handle.downgrade();
    let renderer = handler(move |_topic, event: &TourEvent| {
        let Some(entered) = event.entered() else {
            return;
        };
        match weak.upgrade() {
            Some(handle) => render(StepProps::from_entered(entered, handle)),
            None => debug!(step = entered.step_index, "no handle left, step not rendered"),
        }
    });
    pub_center
        .subscribe(Topic::Init, renderer.clone())
        .subscribe(Topic::NextStep, renderer.clone());
    renderer
}
