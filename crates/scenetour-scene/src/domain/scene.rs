//! Scene definitions.

use serde::{Deserialize, Serialize};

use super::step::StepDef;

/// Visual theme of a scene, handed to renderers untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_color: Option<String>,
}

/// A complete guided tour: an ordered sequence of steps plus theme.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDef {
    /// Steps in traversal order.
    pub steps: Vec<StepDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
}

impl SceneDef {
    /// Creates a scene without a theme.
    #[must_use]
    pub fn new(steps: Vec<StepDef>) -> Self {
        Self { steps, theme: None }
    }

    /// Sets the theme.
    #[must_use]
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = Some(theme);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_theme_round_trips_brand_color() {
        let doc = serde_json::json!({
            "steps": [{ "type": "base" }],
            "theme": { "brandColor": "#ff6600" }
        });

        let scene: SceneDef = serde_json::from_value(doc).unwrap();

        assert_eq!(scene.steps.len(), 1);
        assert_eq!(
            scene.theme.and_then(|t| t.brand_color).as_deref(),
            Some("#ff6600")
        );
    }
}
