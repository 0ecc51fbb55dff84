//! Lifecycle events published by the tour engine.

use scenetour_core::event::{EventMetadata, Topic, TopicEvent};
use scenetour_scene::domain::scene::Theme;
use scenetour_scene::domain::step::StepDef;
use serde::{Deserialize, Serialize};

/// Progress through the innermost carousel of the active step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildProgress {
    /// Position of the active child within the carousel.
    pub index: usize,
    /// Number of children in the carousel.
    pub total: usize,
    /// The active child step.
    pub step: StepDef,
}

/// A step became the active step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepEntered {
    /// Position in the outer sequence.
    pub step_index: usize,
    /// Length of the outer sequence.
    pub step_total: usize,
    /// Positions of every cursor frame, outermost first.
    pub path: Vec<usize>,
    /// The active outer step.
    pub step: StepDef,
    /// Set when the outer step is a carousel with children.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress_child: Option<ChildProgress>,
}

/// Payload of `init`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TourStarted {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
    /// The first step.
    pub entry: StepEntered,
}

/// Payload of `finish`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TourFinished {
    /// Number of outer steps the tour walked through.
    pub steps_completed: usize,
}

/// Event payload variants, one per topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "topic", content = "data", rename_all = "camelCase")]
pub enum TourEventKind {
    Init(TourStarted),
    NextStep(StepEntered),
    Finish(TourFinished),
}

/// Event envelope published on the tour's `PubCenter`.
#[derive(Debug, Clone, PartialEq)]
pub struct TourEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Topic-specific payload.
    pub kind: TourEventKind,
}

impl TourEvent {
    /// The step this event shows, for `init` and `nextStep`.
    #[must_use]
    pub fn entered(&self) -> Option<&StepEntered> {
        match &self.kind {
            TourEventKind::Init(started) => Some(&started.entry),
            TourEventKind::NextStep(entered) => Some(entered),
            TourEventKind::Finish(_) => None,
        }
    }
}

impl TopicEvent for TourEvent {
    fn topic(&self) -> Topic {
        match &self.kind {
            TourEventKind::Init(_) => Topic::Init,
            TourEventKind::NextStep(_) => Topic::NextStep,
            TourEventKind::Finish(_) => Topic::Finish,
        }
    }

    fn to_payload(&self) -> serde_json::Value {
        // Every payload field serializes to JSON without error.
        serde_json::to_value(&self.kind).unwrap_or_default()
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
