//! Step descriptors.
//!
//! A step is one overlay unit of a scene. Steps are tagged by `type` and the
//! remaining fields are interpreted strictly by that tag.

use serde::{Deserialize, Serialize};

/// Width of a step overlay: pixels, or any CSS length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Width {
    /// Width in pixels.
    Pixels(f64),
    /// A CSS length such as `"40%"` or `"20rem"`.
    Css(String),
}

/// Pre-condition that must hold before a step is displayable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitUntil {
    /// A selector that must match an element in the host page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    /// Milliseconds to wait before the step is shown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<u64>,
}

impl WaitUntil {
    /// Returns `true` when the condition holds immediately.
    #[must_use]
    pub fn is_trivial(&self) -> bool {
        self.selector.is_none() && self.delay.unwrap_or(0) == 0
    }
}

/// Fields shared by every step kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepBase {
    /// Identifier used by carousels to reference this step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<Width>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_until: Option<WaitUntil>,
    /// When set, only an external trigger with this identifier advances the
    /// step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_step_trigger: Option<String>,
}

/// One selector or several.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Selector {
    One(String),
    Many(Vec<String>),
}

impl Selector {
    /// Iterates over every selector.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let slice = match self {
            Selector::One(one) => std::slice::from_ref(one),
            Selector::Many(many) => many.as_slice(),
        };
        slice.iter().map(String::as_str)
    }

    /// Returns `true` when no usable selector is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.iter().all(|s| s.trim().is_empty())
    }
}

/// Where a focus overlay sits relative to its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Position {
    Top,
    Left,
    Right,
    Bottom,
    BottomLeft,
}

/// Generic placeholder step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaseStep {
    #[serde(flatten)]
    pub base: StepBase,
}

/// Static informational overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoticeStep {
    #[serde(flatten)]
    pub base: StepBase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_offset: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_offset: Option<f64>,
    pub content: String,
}

/// Highlights one or more target elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusStep {
    #[serde(flatten)]
    pub base: StepBase,
    pub selector: Selector,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    pub content: String,
}

/// One input validation rule. A rule without a pattern always passes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Shown to the user when the pattern does not match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// A focus step that validates user input before it may be left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputCheckerStep {
    #[serde(flatten)]
    pub focus: FocusStep,
    /// Source the host collects the value from.
    pub value_collect: String,
    /// Field of the collected value to validate, when the value is a record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_collect_field: Option<String>,
    /// Evaluated in declared order; the first failing rule wins.
    #[serde(default)]
    pub rules: Vec<InputRule>,
}

/// A step holding a nested sequence of child steps referenced by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarouselStep {
    #[serde(flatten)]
    pub base: StepBase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_offset: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_offset: Option<f64>,
    #[serde(default)]
    pub children: Vec<String>,
}

/// Discriminant of a [`StepDef`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    Base,
    Notice,
    Focus,
    InputChecker,
    Carousel,
}

impl StepKind {
    /// Returns the `type` tag used in scene documents.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StepKind::Base => "base",
            StepKind::Notice => "notice",
            StepKind::Focus => "focus",
            StepKind::InputChecker => "inputChecker",
            StepKind::Carousel => "carousel",
        }
    }
}

/// A step of a scene, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StepDef {
    Base(BaseStep),
    Notice(NoticeStep),
    Focus(FocusStep),
    InputChecker(InputCheckerStep),
    Carousel(CarouselStep),
}

impl StepDef {
    /// Returns the discriminant.
    #[must_use]
    pub fn kind(&self) -> StepKind {
        match self {
            StepDef::Base(_) => StepKind::Base,
            StepDef::Notice(_) => StepKind::Notice,
            StepDef::Focus(_) => StepKind::Focus,
            StepDef::InputChecker(_) => StepKind::InputChecker,
            StepDef::Carousel(_) => StepKind::Carousel,
        }
    }

    /// Returns the fields shared by every kind.
    #[must_use]
    pub fn base(&self) -> &StepBase {
        match self {
            StepDef::Base(step) => &step.base,
            StepDef::Notice(step) => &step.base,
            StepDef::Focus(step) => &step.base,
            StepDef::InputChecker(step) => &step.focus.base,
            StepDef::Carousel(step) => &step.base,
        }
    }

    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.base().id.as_deref()
    }

    #[must_use]
    pub fn next_step_trigger(&self) -> Option<&str> {
        self.base().next_step_trigger.as_deref()
    }

    #[must_use]
    pub fn wait_until(&self) -> Option<&WaitUntil> {
        self.base().wait_until.as_ref()
    }

    /// Returns the anchor selector of focus-like steps.
    #[must_use]
    pub fn selector(&self) -> Option<&Selector> {
        match self {
            StepDef::Focus(step) => Some(&step.selector),
            StepDef::InputChecker(step) => Some(&step.focus.selector),
            StepDef::Base(_) | StepDef::Notice(_) | StepDef::Carousel(_) => None,
        }
    }
}
