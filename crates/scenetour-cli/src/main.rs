//! Scenetour terminal host entry point.

use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use scenetour_cli::config::CliConfig;
use scenetour_cli::error::AppError;
use scenetour_cli::host;
use scenetour_engine::application::session::TourOutcome;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing subscriber. Stdout belongs to the renderer.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .with_writer(std::io::stderr)
        .init();

    match start().await {
        Ok(outcome) => {
            tracing::info!(?outcome, "scenetour exiting");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "scenetour failed");
            eprintln!("scenetour: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

async fn start() -> Result<TourOutcome, AppError> {
    // Read configuration from environment.
    let config = CliConfig::from_env()?;
    tracing::info!(
        scene = %config.scene,
        scene_dir = %config.scene_dir.display(),
        "Starting scenetour"
    );

    let stdout = Arc::new(|text: &str| {
        let mut out = std::io::stdout().lock();
        // A closed stdout only loses rendering; the tour itself goes on.
        let _ = out.write_all(text.as_bytes());
        let _ = out.flush();
    });
    host::run(&config, BufReader::new(tokio::io::stdin()), stdout).await
}
