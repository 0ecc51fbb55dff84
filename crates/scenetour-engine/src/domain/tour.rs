//! The tour engine.
//!
//! `TourEngine` owns the position of a running tour and is the only
//! publisher on its [`PubCenter`]. States run
//! `Idle -> Running -> Finished | Cancelled`; a finished or cancelled engine
//! may start a new tour.
//!
//! Transitions are two-phase. `prepare_*` validates and computes the target
//! position without touching engine state; [`TourEngine::commit`] moves the
//! cursor and publishes in one step. Callers that gate display on a step's
//! `waitUntil` wait between the two phases. [`TourEngine::cancel`]
//! invalidates every outstanding pending transition, so a cancelled wait can
//! never publish.

use std::sync::Arc;

use scenetour_core::error::TourError;
use scenetour_core::event::{Clock, EventMetadata, Topic, TopicEvent};
use scenetour_core::pub_center::PubCenter;
use scenetour_scene::application::compile::CompiledScene;
use scenetour_scene::domain::scene::SceneDef;
use scenetour_scene::domain::step::{StepDef, WaitUntil};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::cursor::Cursor;
use super::events::{
    ChildProgress, StepEntered, TourEvent, TourEventKind, TourFinished, TourStarted,
};
use super::validator::{AdvanceContext, Blocked, can_advance};

/// Lifecycle state of a [`TourEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TourState {
    Idle,
    Running,
    Finished,
    Cancelled,
}

/// Result of a successful `advance` or `commit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// A step was entered and `init` or `nextStep` was published.
    Entered { step_index: usize, path: Vec<usize> },
    /// The tour ran past its last step and `finish` was published.
    Finished,
    /// The step waits for a different signal; nothing happened.
    Held,
}

#[derive(Debug)]
enum Target {
    Start {
        tour_id: Uuid,
        scene: Box<CompiledScene>,
        cursor: Cursor,
    },
    Step(Cursor),
    Finish,
}

/// A validated transition that has not been published yet.
#[derive(Debug)]
#[must_use = "a pending transition does nothing until it is committed"]
pub struct PendingTransition {
    generation: u64,
    target: Target,
    wait: Vec<WaitUntil>,
}

impl PendingTransition {
    /// Display conditions of the steps being entered, outermost first.
    /// Trivial conditions are left out.
    #[must_use]
    pub fn wait_conditions(&self) -> &[WaitUntil] {
        &self.wait
    }

    /// Returns `true` if committing ends the tour.
    #[must_use]
    pub fn is_finish(&self) -> bool {
        matches!(self.target, Target::Finish)
    }

    /// The tour id the transition belongs to, known for starts only.
    #[must_use]
    pub fn tour_id(&self) -> Option<Uuid> {
        match &self.target {
            Target::Start { tour_id, .. } => Some(*tour_id),
            Target::Step(_) | Target::Finish => None,
        }
    }
}

/// Step-progression state machine for a single tour at a time.
pub struct TourEngine {
    tour_id: Uuid,
    pub_center: Arc<PubCenter<TourEvent>>,
    clock: Arc<dyn Clock>,
    state: TourState,
    scene: Option<CompiledScene>,
    cursor: Option<Cursor>,
    sequence: i64,
    generation: u64,
}

impl TourEngine {
    /// Creates an idle engine publishing on `pub_center`.
    #[must_use]
    pub fn new(pub_center: Arc<PubCenter<TourEvent>>, clock: Arc<dyn Clock>) -> Self {
        Self {
            tour_id: Uuid::nil(),
            pub_center,
            clock,
            state: TourState::Idle,
            scene: None,
            cursor: None,
            sequence: 0,
            generation: 0,
        }
    }

    #[must_use]
    pub fn state(&self) -> TourState {
        self.state
    }

    /// Identifier of the current or most recent tour; nil before the first
    /// start.
    #[must_use]
    pub fn tour_id(&self) -> Uuid {
        self.tour_id
    }

    #[must_use]
    pub fn pub_center(&self) -> &Arc<PubCenter<TourEvent>> {
        &self.pub_center
    }

    /// Outer index of the active step while running.
    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        self.cursor.as_ref().map(Cursor::outer_index)
    }

    /// Cursor path of the active step while running.
    #[must_use]
    pub fn current_path(&self) -> Option<Vec<usize>> {
        self.cursor.as_ref().map(Cursor::path)
    }

    /// The innermost active step while running.
    #[must_use]
    pub fn current_step(&self) -> Option<&StepDef> {
        let scene = self.scene.as_ref()?;
        scene.step(self.cursor.as_ref()?.active())
    }

    /// Length of the outer sequence while running.
    #[must_use]
    pub fn step_total(&self) -> Option<usize> {
        self.scene.as_ref().map(|scene| scene.top_level().len())
    }

    /// Validates `scene` and prepares its first step.
    ///
    /// # Errors
    ///
    /// Returns `TourError::AlreadyRunning` while a tour runs, or
    /// `TourError::Configuration` if the scene is unusable.
    pub fn prepare_start(&self, scene: SceneDef) -> Result<PendingTransition, TourError> {
        if self.state == TourState::Running {
            return Err(TourError::AlreadyRunning);
        }
        let scene = CompiledScene::compile(scene)?;
        let cursor = Cursor::first(&scene);
        let wait = wait_conditions(&scene, &cursor, None);
        Ok(PendingTransition {
            generation: self.generation,
            target: Target::Start {
                tour_id: Uuid::new_v4(),
                scene: Box::new(scene),
                cursor,
            },
            wait,
        })
    }

    /// Starts a tour on `scene` and publishes `init` immediately.
    ///
    /// # Errors
    ///
    /// See [`TourEngine::prepare_start`]. Nothing is published on error.
    pub fn start(&mut self, scene: SceneDef) -> Result<AdvanceOutcome, TourError> {
        let pending = self.prepare_start(scene)?;
        self.commit(pending)
    }

    /// Validates leaving the active step and prepares the next position.
    ///
    /// Returns `Ok(None)` when the signal does not match the step's trigger.
    ///
    /// # Errors
    ///
    /// Returns `TourError::NotRunning` outside a running tour, or
    /// `TourError::Validation` when collected input fails a rule.
    pub fn prepare_advance(
        &self,
        ctx: &AdvanceContext<'_>,
    ) -> Result<Option<PendingTransition>, TourError> {
        let (Some(scene), Some(cursor)) = (&self.scene, &self.cursor) else {
            return Err(TourError::NotRunning);
        };
        if self.state != TourState::Running {
            return Err(TourError::NotRunning);
        }

        let active = cursor.active();
        let Some(step) = scene.step(active) else {
            return Err(TourError::NotRunning);
        };
        match can_advance(step, scene.rules(active), ctx) {
            Ok(()) => {}
            Err(blocked @ (Blocked::AwaitingTrigger { .. } | Blocked::UnexpectedTrigger { .. })) => {
                debug!(tour_id = %self.tour_id, step = active, ?blocked, "advance held");
                return Ok(None);
            }
            Err(Blocked::RuleFailed { rule, message }) => {
                warn!(
                    tour_id = %self.tour_id,
                    step = active,
                    rule,
                    message = message.as_deref().unwrap_or_default(),
                    "input rejected"
                );
                return Err(TourError::Validation {
                    step_index: cursor.outer_index(),
                    message,
                });
            }
        }

        let pending = match cursor.successor(scene) {
            Some(next) => PendingTransition {
                generation: self.generation,
                wait: wait_conditions(scene, &next, Some(cursor)),
                target: Target::Step(next),
            },
            None => PendingTransition {
                generation: self.generation,
                wait: Vec::new(),
                target: Target::Finish,
            },
        };
        Ok(Some(pending))
    }

    /// Leaves the active step and publishes the result immediately.
    ///
    /// # Errors
    ///
    /// See [`TourEngine::prepare_advance`]. The position never changes on
    /// error or when the advance is held.
    pub fn advance(&mut self, ctx: &AdvanceContext<'_>) -> Result<AdvanceOutcome, TourError> {
        match self.prepare_advance(ctx)? {
            Some(pending) => self.commit(pending),
            None => Ok(AdvanceOutcome::Held),
        }
    }

    /// Applies a prepared transition and publishes its event.
    ///
    /// # Errors
    ///
    /// Returns `TourError::StaleTransition` if another transition was
    /// committed, or the tour was cancelled, after `pending` was prepared.
    pub fn commit(&mut self, pending: PendingTransition) -> Result<AdvanceOutcome, TourError> {
        if pending.generation != self.generation {
            return Err(TourError::StaleTransition);
        }

        let (kind, outcome) = match pending.target {
            Target::Start {
                tour_id,
                scene,
                cursor,
            } => {
                if self.state == TourState::Running {
                    return Err(TourError::AlreadyRunning);
                }
                let entry = describe(&scene, &cursor);
                let outcome = AdvanceOutcome::Entered {
                    step_index: entry.step_index,
                    path: entry.path.clone(),
                };
                let started = TourStarted {
                    theme: scene.theme().cloned(),
                    entry,
                };
                self.tour_id = tour_id;
                self.sequence = 0;
                self.state = TourState::Running;
                info!(
                    tour_id = %tour_id,
                    steps = scene.top_level().len(),
                    "tour started"
                );
                self.scene = Some(*scene);
                self.cursor = Some(cursor);
                (TourEventKind::Init(started), outcome)
            }
            Target::Step(cursor) => {
                let Some(scene) = self.scene.as_ref().filter(|_| self.state == TourState::Running)
                else {
                    return Err(TourError::NotRunning);
                };
                let entered = describe(scene, &cursor);
                let outcome = AdvanceOutcome::Entered {
                    step_index: entered.step_index,
                    path: entered.path.clone(),
                };
                debug!(
                    tour_id = %self.tour_id,
                    step_index = entered.step_index,
                    path = ?entered.path,
                    "entered step"
                );
                self.cursor = Some(cursor);
                (TourEventKind::NextStep(entered), outcome)
            }
            Target::Finish => {
                if self.state != TourState::Running {
                    return Err(TourError::NotRunning);
                }
                let steps_completed = self.step_total().unwrap_or_default();
                self.state = TourState::Finished;
                self.scene = None;
                self.cursor = None;
                info!(tour_id = %self.tour_id, steps_completed, "tour finished");
                (
                    TourEventKind::Finish(TourFinished { steps_completed }),
                    AdvanceOutcome::Finished,
                )
            }
        };

        self.generation += 1;
        self.publish(kind);
        Ok(outcome)
    }

    /// Ends the tour early without publishing `finish`. Pending transitions
    /// become stale. Returns `true` if a running tour was cancelled.
    pub fn cancel(&mut self) -> bool {
        self.generation += 1;
        if self.state != TourState::Running {
            return false;
        }
        self.state = TourState::Cancelled;
        self.scene = None;
        self.cursor = None;
        info!(tour_id = %self.tour_id, "tour cancelled");
        true
    }

    fn publish(&mut self, kind: TourEventKind) {
        self.sequence += 1;
        let event = TourEvent {
            metadata: EventMetadata::stamp(self.tour_id, self.sequence, self.clock.as_ref()),
            kind,
        };
        let topic: Topic = event.topic();
        self.pub_center.publish(topic, &event);
    }
}

impl std::fmt::Debug for TourEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TourEngine")
            .field("tour_id", &self.tour_id)
            .field("state", &self.state)
            .field("path", &self.current_path())
            .field("sequence", &self.sequence)
            .finish_non_exhaustive()
    }
}

fn describe(scene: &CompiledScene, cursor: &Cursor) -> StepEntered {
    let step_of = |index: usize| scene.def().steps[index].clone();
    StepEntered {
        step_index: cursor.outer_index(),
        step_total: scene.top_level().len(),
        path: cursor.path(),
        step: step_of(cursor.outer_step()),
        progress_child: cursor
            .child_progress()
            .map(|(index, total)| ChildProgress {
                index,
                total,
                step: step_of(cursor.active()),
            }),
    }
}

fn wait_conditions(
    scene: &CompiledScene,
    cursor: &Cursor,
    previous: Option<&Cursor>,
) -> Vec<WaitUntil> {
    cursor
        .entered_since(previous)
        .into_iter()
        .filter_map(|index| scene.step(index)?.wait_until())
        .filter(|wait| !wait.is_trivial())
        .cloned()
        .collect()
}
