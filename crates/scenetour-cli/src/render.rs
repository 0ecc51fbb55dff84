//! Plain-text step renderer.

use std::fmt::Write;

use scenetour_core::error::TourError;
use scenetour_engine::application::props::StepProps;
use scenetour_engine::domain::events::TourFinished;
use scenetour_scene::domain::step::{Position, Selector, StepDef};

fn position_name(position: Position) -> &'static str {
    match position {
        Position::Top => "above",
        Position::Left => "left of",
        Position::Right => "right of",
        Position::Bottom => "below",
        Position::BottomLeft => "below-left of",
    }
}

fn selectors(selector: &Selector) -> String {
    selector.iter().collect::<Vec<_>>().join(", ")
}

fn write_body(out: &mut String, step: &StepDef) {
    // Writing into a String cannot fail.
    match step {
        StepDef::Base(_) => {}
        StepDef::Notice(notice) => {
            let _ = writeln!(out, "  {}", notice.content);
        }
        StepDef::Focus(focus) => {
            let where_ = focus.position.map_or("at", position_name);
            let _ = writeln!(
                out,
                "  {} [{} {}]",
                focus.content,
                where_,
                selectors(&focus.selector)
            );
        }
        StepDef::InputChecker(checker) => {
            let _ = writeln!(
                out,
                "  {} [input {}]",
                checker.focus.content, checker.value_collect
            );
            let _ = writeln!(out, "  type `next <value>` to submit");
        }
        StepDef::Carousel(carousel) => {
            if carousel.children.is_empty() {
                let _ = writeln!(out, "  (carousel)");
            }
        }
    }
}

/// Renders one displayed step.
#[must_use]
pub fn render_step(props: &StepProps) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "[{}/{}] {}",
        props.step_index + 1,
        props.step_total,
        props.data.kind().as_str()
    );
    if let Some(child) = &props.progress_child {
        let _ = writeln!(out, "  ({}/{})", child.index + 1, child.total);
    }
    let displayed = props.displayed();
    write_body(&mut out, displayed);
    if let Some(trigger) = displayed.next_step_trigger() {
        let _ = writeln!(out, "  waiting for `trigger {trigger}`");
    } else if props.is_last() && props.progress_child.is_none() {
        let _ = writeln!(out, "  `next` finishes the tour");
    }
    out
}

/// Renders why a command did not move the tour.
#[must_use]
pub fn render_rejection(error: &TourError) -> String {
    match error {
        TourError::Validation {
            message: Some(message),
            ..
        } => format!("  {message}\n"),
        TourError::Validation { message: None, .. } => "  input rejected\n".to_owned(),
        TourError::StepNotReady => "  next step is not ready yet\n".to_owned(),
        other => format!("  {other}\n"),
    }
}

/// Renders the end of a finished tour.
#[must_use]
pub fn render_finish(finished: &TourFinished) -> String {
    format!("tour complete ({} steps)\n", finished.steps_completed)
}
