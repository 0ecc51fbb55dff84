//! Host configuration read from the environment.

use std::path::PathBuf;
use std::time::Duration;

use scenetour_engine::application::readiness::ReadinessOptions;

use crate::error::AppError;

const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Settings of one CLI run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// Directory holding scene documents.
    pub scene_dir: PathBuf,
    /// Name of the scene to run.
    pub scene: String,
    pub poll_interval: Duration,
    pub wait_timeout: Option<Duration>,
    /// Selectors the terminal reports as present. Empty means all.
    pub present_selectors: Vec<String>,
}

impl CliConfig {
    /// Reads the process environment and the first positional argument.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is missing or malformed.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(std::env::args().nth(1), |key| std::env::var(key).ok())
    }

    /// Builds the configuration from `scene` and a variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is missing or malformed.
    pub fn from_lookup(
        scene: Option<String>,
        var: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        let scene = scene
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| AppError::Config("usage: scenetour <scene-name>".to_string()))?;
        let scene_dir = var("SCENETOUR_SCENE_DIR")
            .map(PathBuf::from)
            .ok_or_else(|| {
                AppError::Config("SCENETOUR_SCENE_DIR environment variable must be set".to_string())
            })?;
        let poll_interval = match var("SCENETOUR_POLL_INTERVAL_MS") {
            Some(raw) => Duration::from_millis(parse_millis("SCENETOUR_POLL_INTERVAL_MS", &raw)?),
            None => Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        };
        if poll_interval.is_zero() {
            return Err(AppError::Config(
                "SCENETOUR_POLL_INTERVAL_MS must be greater than zero".to_string(),
            ));
        }
        let wait_timeout = var("SCENETOUR_WAIT_TIMEOUT_MS")
            .map(|raw| parse_millis("SCENETOUR_WAIT_TIMEOUT_MS", &raw))
            .transpose()?
            .map(Duration::from_millis);
        let present_selectors = var("SCENETOUR_PRESENT_SELECTORS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            scene_dir,
            scene,
            poll_interval,
            wait_timeout,
            present_selectors,
        })
    }

    #[must_use]
    pub fn readiness(&self) -> ReadinessOptions {
        ReadinessOptions {
            poll_interval: self.poll_interval,
            timeout: self.wait_timeout,
        }
    }
}

fn parse_millis(key: &str, raw: &str) -> Result<u64, AppError> {
    raw.trim()
        .parse()
        .map_err(|e| AppError::Config(format!("{key} must be a number of milliseconds: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_minimal_configuration_uses_defaults() {
        // Act
        let config = CliConfig::from_lookup(
            Some("onboarding".into()),
            lookup(&[("SCENETOUR_SCENE_DIR", "/srv/scenes")]),
        )
        .unwrap();

        // Assert
        assert_eq!(config.scene, "onboarding");
        assert_eq!(config.scene_dir, PathBuf::from("/srv/scenes"));
        assert_eq!(config.readiness(), ReadinessOptions::default());
        assert!(config.present_selectors.is_empty());
    }

    #[test]
    fn test_all_variables_are_read() {
        let config = CliConfig::from_lookup(
            Some("intro".into()),
            lookup(&[
                ("SCENETOUR_SCENE_DIR", "scenes"),
                ("SCENETOUR_POLL_INTERVAL_MS", "25"),
                ("SCENETOUR_WAIT_TIMEOUT_MS", "3000"),
                ("SCENETOUR_PRESENT_SELECTORS", "#menu, #save,,"),
            ]),
        )
        .unwrap();

        assert_eq!(config.poll_interval, Duration::from_millis(25));
        assert_eq!(config.wait_timeout, Some(Duration::from_secs(3)));
        assert_eq!(config.present_selectors, vec!["#menu", "#save"]);
    }

    #[test]
    fn test_missing_scene_dir_is_rejected() {
        let result = CliConfig::from_lookup(Some("intro".into()), lookup(&[]));

        match result.unwrap_err() {
            AppError::Config(message) => assert!(message.contains("SCENETOUR_SCENE_DIR")),
            other => panic!("expected Config, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_scene_name_is_rejected() {
        let result = CliConfig::from_lookup(None, lookup(&[("SCENETOUR_SCENE_DIR", "scenes")]));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_malformed_numbers_are_rejected() {
        for (key, value) in [
            ("SCENETOUR_POLL_INTERVAL_MS", "fast"),
            ("SCENETOUR_POLL_INTERVAL_MS", "0"),
            ("SCENETOUR_WAIT_TIMEOUT_MS", "-1"),
        ] {
            let result = CliConfig::from_lookup(
                Some("intro".into()),
                lookup(&[("SCENETOUR_SCENE_DIR", "scenes"), (key, value)]),
            );
            assert!(
                matches!(result, Err(AppError::Config(_))),
                "{key}={value} should be rejected"
            );
        }
    }
}
