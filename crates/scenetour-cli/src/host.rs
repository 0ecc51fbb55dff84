//! Wires a terminal session together.

use std::sync::Arc;

use scenetour_core::error::TourError;
use scenetour_core::event::{SystemClock, Topic};
use scenetour_core::pub_center::{PubCenter, handler};
use scenetour_engine::application::props::bind_renderer;
use scenetour_engine::application::session::{TourHandle, TourOutcome, TourSession};
use scenetour_engine::domain::events::{TourEvent, TourEventKind};
use scenetour_engine::domain::tour::TourEngine;
use scenetour_scene::application::loader::DirectorySceneService;
use scenetour_scene::application::service::AppConfig;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, instrument, warn};

use crate::config::CliConfig;
use crate::error::AppError;
use crate::input::{HELP, HostCommand, dispatch, parse_line};
use crate::probe::probe_for;
use crate::render::{render_finish, render_rejection, render_step};

/// Where rendered text goes.
pub type Output = Arc<dyn Fn(&str) + Send + Sync>;

/// Runs the configured scene, reading commands from `input` until the tour
/// ends. End of input cancels the tour.
///
/// # Errors
///
/// Returns `AppError::Tour` if the scene cannot be loaded or the first step
/// never becomes displayable.
#[instrument(skip(config, input, output), fields(scene = %config.scene))]
pub async fn run<R>(config: &CliConfig, input: R, output: Output) -> Result<TourOutcome, AppError>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    let app_config = AppConfig::new(Arc::new(DirectorySceneService::new(&config.scene_dir)));
    let pub_center = Arc::new(PubCenter::new());
    let engine = TourEngine::new(Arc::clone(&pub_center), Arc::new(SystemClock));
    let (session, handle) = TourSession::open(
        &app_config,
        &config.scene,
        engine,
        probe_for(&config.present_selectors),
        config.readiness(),
    )
    .await?;
    info!(tour_id = %session.tour_id(), "scene loaded");

    let render_output = Arc::clone(&output);
    bind_renderer(&pub_center, &handle, move |props| {
        render_output(&render_step(&props));
    });
    let finish_output = Arc::clone(&output);
    pub_center.subscribe(
        Topic::Finish,
        handler(move |_, event: &TourEvent| {
            if let TourEventKind::Finish(finished) = &event.kind {
                finish_output(&render_finish(finished));
            }
        }),
    );

    let reader = tokio::spawn(read_commands(input, handle, Arc::clone(&output)));
    let outcome = session.run().await;
    reader.abort();

    let outcome = outcome?;
    if outcome == TourOutcome::Cancelled {
        output("tour cancelled\n");
    }
    Ok(outcome)
}

async fn read_commands<R>(input: R, handle: TourHandle, output: Output)
where
    R: AsyncBufRead + Unpin,
{
    if let Err(error) = forward_lines(input, &handle, &output).await {
        warn!(%error, "failed to read input");
    }
    debug!("input closed, cancelling tour");
    handle.on_cancel();
}

async fn forward_lines<R>(input: R, handle: &TourHandle, output: &Output) -> Result<(), AppError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        match parse_line(&line) {
            Some(HostCommand::Help) => output(&format!("{HELP}\n")),
            Some(command) => match dispatch(command, handle).await {
                Ok(outcome) => debug!(?outcome, "command handled"),
                Err(TourError::NotRunning) => return Ok(()),
                Err(error) => output(&render_rejection(&error)),
            },
            None if line.trim().is_empty() => {}
            None => {
                warn!(line, "unrecognised command");
                output(&format!("{HELP}\n"));
            }
        }
    }
    Ok(())
}
