//! Engine configuration.
//!
//! Every section falls back to its defaults when missing from the JSON
//! source, so hosts only need to spell out what they change.

use kurbo::Vec2;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Viewport (zoom/pan) settings. Zoom values are percentages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub default_zoom: f64,
    /// Increment used by zoom in/out commands and zoom-tool clicks.
    pub zoom_step: f64,
    /// Screen-space margin kept around content by fit-to-screen.
    pub fit_padding: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_zoom: 25.0,
            max_zoom: 200.0,
            default_zoom: 100.0,
            zoom_step: 10.0,
            fit_padding: 0.0,
        }
    }
}

/// Selection operation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// World-space offset applied to pasted elements.
    pub paste_offset: Vec2,
    /// Degrees added by a single rotate.
    pub rotation_step: f64,
    pub nudge_fine: f64,
    pub nudge_fast: f64,
    /// Screen pixels the pointer must travel before a press becomes a drag.
    pub drag_threshold: f64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            paste_offset: Vec2::new(20.0, 20.0),
            rotation_step: 90.0,
            nudge_fine: 1.0,
            nudge_fast: 10.0,
            drag_threshold: 3.0,
        }
    }
}

/// Keyboard shortcut settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShortcutConfig {
    /// How long a "tool changed" notice stays live.
    pub notice_duration_ms: u64,
}

impl Default for ShortcutConfig {
    fn default() -> Self {
        Self {
            notice_duration_ms: 2000,
        }
    }
}

impl ShortcutConfig {
    pub fn notice_duration(&self) -> Duration {
        Duration::from_millis(self.notice_duration_ms)
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub viewport: ViewportConfig,
    pub selection: SelectionConfig,
    pub shortcuts: ShortcutConfig,
}

impl EngineConfig {
    /// Parse and validate a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check that the values are usable by the engine.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let vp = &self.viewport;
        if !(vp.min_zoom > 0.0 && vp.min_zoom <= vp.max_zoom) {
            return Err(ConfigError::Invalid(format!(
                "zoom bounds {}..{} must be positive and ordered",
                vp.min_zoom, vp.max_zoom
            )));
        }
        if !(vp.min_zoom..=vp.max_zoom).contains(&vp.default_zoom) {
            return Err(ConfigError::Invalid(format!(
                "default zoom {} outside {}..{}",
                vp.default_zoom, vp.min_zoom, vp.max_zoom
            )));
        }
        if vp.zoom_step <= 0.0 || vp.fit_padding < 0.0 {
            return Err(ConfigError::Invalid(
                "zoom step must be positive and fit padding non-negative".to_string(),
            ));
        }
        let sel = &self.selection;
        if sel.nudge_fine <= 0.0 || sel.nudge_fast <= 0.0 || sel.drag_threshold < 0.0 {
            return Err(ConfigError::Invalid(
                "nudge steps must be positive and drag threshold non-negative".to_string(),
            ));
        }
        Ok(())
    }
}
