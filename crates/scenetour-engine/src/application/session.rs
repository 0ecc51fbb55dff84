//! Tour session runtime.
//!
//! A [`TourSession`] drives one tour against its host. It owns the engine,
//! gates every entered step on its `waitUntil` conditions, and serialises
//! user actions arriving through cloned [`TourHandle`]s. Handles may be used
//! from inside `PubCenter` subscribers: their commands are queued and handled
//! after the current dispatch returns.

use std::sync::Arc;

use scenetour_core::error::TourError;
use scenetour_core::probe::SelectorProbe;
use scenetour_scene::application::service::AppConfig;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::readiness::{ReadinessOptions, wait_until_ready};
use crate::domain::tour::{AdvanceOutcome, PendingTransition, TourEngine};
use crate::domain::validator::AdvanceContext;

type Reply = oneshot::Sender<Result<AdvanceOutcome, TourError>>;

/// A user action queued for a session.
#[derive(Debug)]
pub enum TourCommand {
    /// Leave the active step, optionally with collected input.
    Next {
        input: Option<Value>,
        reply: Option<Reply>,
    },
    /// An external trigger fired.
    Trigger { id: String, reply: Option<Reply> },
    /// End the tour without finishing it.
    Cancel,
}

impl TourCommand {
    fn reject(self, error: TourError) {
        match self {
            TourCommand::Next { reply, .. } | TourCommand::Trigger { reply, .. } => {
                respond(reply, Err(error));
            }
            TourCommand::Cancel => {}
        }
    }
}

fn respond(reply: Option<Reply>, result: Result<AdvanceOutcome, TourError>) {
    match reply {
        // The caller may have stopped waiting; nothing to do then.
        Some(reply) => {
            let _ = reply.send(result);
        }
        None => {
            if let Err(error) = result {
                warn!(%error, "queued action failed");
            }
        }
    }
}

/// Cheap, cloneable access to a running session.
///
/// The fire-and-forget methods return `false` once the session has ended.
#[derive(Debug, Clone)]
pub struct TourHandle {
    commands: mpsc::UnboundedSender<TourCommand>,
}

impl TourHandle {
    fn send(&self, command: TourCommand) -> bool {
        let sent = self.commands.send(command).is_ok();
        if !sent {
            debug!("session closed, command dropped");
        }
        sent
    }

    /// Asks for the next step.
    pub fn on_next(&self) -> bool {
        self.send(TourCommand::Next {
            input: None,
            reply: None,
        })
    }

    /// Asks for the next step with collected input.
    pub fn submit(&self, value: Value) -> bool {
        self.send(TourCommand::Next {
            input: Some(value),
            reply: None,
        })
    }

    /// Fires the trigger `id`.
    pub fn fire_trigger(&self, id: impl Into<String>) -> bool {
        self.send(TourCommand::Trigger {
            id: id.into(),
            reply: None,
        })
    }

    /// Ends the tour without publishing `finish`.
    pub fn on_cancel(&self) -> bool {
        self.send(TourCommand::Cancel)
    }

    /// Asks for the next step and waits until the session handled it.
    ///
    /// # Errors
    ///
    /// Returns the engine's error for the request, or
    /// `TourError::NotRunning` when the session has ended.
    pub async fn advance(&self, input: Option<Value>) -> Result<AdvanceOutcome, TourError> {
        let (reply, response) = oneshot::channel();
        self.request(
            TourCommand::Next {
                input,
                reply: Some(reply),
            },
            response,
        )
        .await
    }

    /// Fires the trigger `id` and waits until the session handled it.
    ///
    /// # Errors
    ///
    /// See [`TourHandle::advance`].
    pub async fn trigger(&self, id: impl Into<String>) -> Result<AdvanceOutcome, TourError> {
        let (reply, response) = oneshot::channel();
        self.request(
            TourCommand::Trigger {
                id: id.into(),
                reply: Some(reply),
            },
            response,
        )
        .await
    }

    async fn request(
        &self,
        command: TourCommand,
        response: oneshot::Receiver<Result<AdvanceOutcome, TourError>>,
    ) -> Result<AdvanceOutcome, TourError> {
        if !self.send(command) {
            return Err(TourError::NotRunning);
        }
        response.await.unwrap_or(Err(TourError::NotRunning))
    }

    /// Returns `true` once the session has ended.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    /// A handle that does not keep the session alive.
    #[must_use]
    pub fn downgrade(&self) -> WeakTourHandle {
        WeakTourHandle {
            commands: self.commands.downgrade(),
        }
    }
}

/// A [`TourHandle`] that does not count towards keeping the session open.
#[derive(Debug, Clone)]
pub struct WeakTourHandle {
    commands: mpsc::WeakUnboundedSender<TourCommand>,
}

impl WeakTourHandle {
    /// Returns a usable handle while some [`TourHandle`] still exists.
    #[must_use]
    pub fn upgrade(&self) -> Option<TourHandle> {
        self.commands
            .upgrade()
            .map(|commands| TourHandle { commands })
    }
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TourOutcome {
    Finished,
    Cancelled,
}

enum Settled {
    Committed(AdvanceOutcome),
    Cancelled,
}

/// One tour run from `init` to `finish` or cancellation.
pub struct TourSession {
    scene: String,
    tour_id: Uuid,
    engine: TourEngine,
    probe: Arc<dyn SelectorProbe>,
    options: ReadinessOptions,
    start: Option<PendingTransition>,
    commands: mpsc::UnboundedReceiver<TourCommand>,
}

impl TourSession {
    /// Fetches `scene` through the configured service and prepares its tour.
    /// Nothing is published until [`TourSession::run`] is awaited.
    ///
    /// # Errors
    ///
    /// Returns the service's error when the scene cannot be fetched, and
    /// `TourError::Configuration` or `TourError::AlreadyRunning` when the
    /// engine refuses the scene.
    #[instrument(skip(config, engine, probe, options))]
    pub async fn open(
        config: &AppConfig,
        scene: &str,
        engine: TourEngine,
        probe: Arc<dyn SelectorProbe>,
        options: ReadinessOptions,
    ) -> Result<(Self, TourHandle), TourError> {
        let definition = config.service.get_scene(scene).await?;
        let start = engine.prepare_start(definition)?;
        let (sender, commands) = mpsc::unbounded_channel();
        let session = Self {
            scene: scene.to_owned(),
            tour_id: start.tour_id().unwrap_or_default(),
            engine,
            probe,
            options,
            start: Some(start),
            commands,
        };
        Ok((session, TourHandle { commands: sender }))
    }

    /// Identifier the tour will publish under.
    #[must_use]
    pub fn tour_id(&self) -> Uuid {
        self.tour_id
    }

    /// Runs the tour until it finishes, is cancelled, or every
    /// [`TourHandle`] is dropped. Renderer bindings hold weak handles and do
    /// not keep the tour running.
    ///
    /// # Errors
    ///
    /// Returns `TourError::ReadinessTimeout` if the first step never becomes
    /// displayable; the tour is not started then.
    #[instrument(skip(self), fields(scene = %self.scene, tour_id = %self.tour_id))]
    pub async fn run(mut self) -> Result<TourOutcome, TourError> {
        let Some(start) = self.start.take() else {
            return Err(TourError::NotRunning);
        };
        match self.settle(start).await {
            Ok(Settled::Committed(_)) => {}
            Ok(Settled::Cancelled) => return Ok(TourOutcome::Cancelled),
            Err(error) => {
                self.engine.cancel();
                return Err(error);
            }
        }

        while let Some(command) = self.commands.recv().await {
            let (ctx_input, signal, reply) = match command {
                TourCommand::Cancel => {
                    self.engine.cancel();
                    return Ok(TourOutcome::Cancelled);
                }
                TourCommand::Next { input, reply } => (input, None, reply),
                TourCommand::Trigger { id, reply } => (None, Some(id), reply),
            };

            let ctx = match &signal {
                Some(id) => AdvanceContext::trigger(id),
                None => AdvanceContext::next(),
            };
            let ctx = match &ctx_input {
                Some(value) => ctx.with_input(value),
                None => ctx,
            };
            let pending = match self.engine.prepare_advance(&ctx) {
                Ok(Some(pending)) => pending,
                Ok(None) => {
                    respond(reply, Ok(AdvanceOutcome::Held));
                    continue;
                }
                Err(error) => {
                    respond(reply, Err(error));
                    continue;
                }
            };

            match self.settle(pending).await {
                Ok(Settled::Committed(AdvanceOutcome::Finished)) => {
                    respond(reply, Ok(AdvanceOutcome::Finished));
                    return Ok(TourOutcome::Finished);
                }
                Ok(Settled::Committed(outcome)) => respond(reply, Ok(outcome)),
                Ok(Settled::Cancelled) => {
                    respond(reply, Err(TourError::NotRunning));
                    return Ok(TourOutcome::Cancelled);
                }
                Err(error) => respond(reply, Err(error)),
            }
        }

        info!("every handle dropped, cancelling tour");
        self.engine.cancel();
        Ok(TourOutcome::Cancelled)
    }

    /// Waits for the transition's conditions, then commits it. Commands that
    /// arrive meanwhile are refused, except cancellation.
    async fn settle(&mut self, pending: PendingTransition) -> Result<Settled, TourError> {
        let conditions = pending.wait_conditions().to_vec();
        if !conditions.is_empty() {
            let ready = wait_until_ready(&conditions, self.probe.as_ref(), self.options);
            tokio::pin!(ready);
            loop {
                tokio::select! {
                    result = &mut ready => {
                        result?;
                        break;
                    }
                    command = self.commands.recv() => match command {
                        Some(TourCommand::Cancel) | None => {
                            self.engine.cancel();
                            return Ok(Settled::Cancelled);
                        }
                        Some(other) => other.reject(TourError::StepNotReady),
                    },
                }
            }
        }
        self.engine.commit(pending).map(Settled::Committed)
    }
}

impl std::fmt::Debug for TourSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TourSession")
            .field("scene", &self.scene)
            .field("tour_id", &self.tour_id)
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}
