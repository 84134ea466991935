//! Application configuration.
//!
//! Layered as defaults → optional JSON file → environment → command line.

use crate::transport::HttpMethod;
use glyphpad_core::stroke::SerializableColor;
use kurbo::Size;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Environment variable overriding the API base URL.
pub const ENV_BASE_URL: &str = "GLYPHPAD_BASE_URL";
/// Environment variable overriding the upload method (`put` or `post`).
pub const ENV_SUBMIT_METHOD: &str = "GLYPHPAD_SUBMIT_METHOD";
/// Environment variable providing a bearer token.
pub const ENV_TOKEN: &str = "GLYPHPAD_TOKEN";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Failed to parse config: {0}")]
    Parse(String),
    #[error("Invalid stroke color: {0}")]
    InvalidColor(String),
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the scoring API.
    pub base_url: String,
    pub submit_method: HttpMethod,
    pub request_timeout_secs: u64,
    /// How long the current progress stays cached.
    pub progress_stale_secs: u64,
    /// Logical canvas size.
    pub canvas_width: f64,
    pub canvas_height: f64,
    pub stroke_width: f64,
    /// Pen color as a CSS hex string.
    pub stroke_color: String,
    /// Travel before a move sample is recorded.
    pub min_move_distance: f64,
    /// Maximum undo depth; unbounded when absent.
    pub history_limit: Option<usize>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5001/api".to_string(),
            submit_method: HttpMethod::Put,
            request_timeout_secs: 30,
            progress_stale_secs: 60,
            canvas_width: 360.0,
            canvas_height: 380.0,
            stroke_width: 8.0,
            stroke_color: "#000000".to_string(),
            min_move_distance: 1.0,
            history_limit: None,
        }
    }
}

impl AppConfig {
    /// Load a JSON config file; missing keys keep their defaults.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> ConfigResult<Self> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) -> ConfigResult<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<()> {
        if let Some(url) = lookup(ENV_BASE_URL).filter(|v| !v.is_empty()) {
            self.base_url = url;
        }
        if let Some(method) = lookup(ENV_SUBMIT_METHOD) {
            self.submit_method = match method.to_ascii_lowercase().as_str() {
                "put" => HttpMethod::Put,
                "post" => HttpMethod::Post,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: ENV_SUBMIT_METHOD.to_string(),
                        value: method,
                    });
                }
            };
        }
        Ok(())
    }

    /// The pen color.
    pub fn stroke_color(&self) -> ConfigResult<SerializableColor> {
        SerializableColor::from_hex(&self.stroke_color)
            .ok_or_else(|| ConfigError::InvalidColor(self.stroke_color.clone()))
    }

    pub fn canvas_size(&self) -> Size {
        Size::new(self.canvas_width, self.canvas_height)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn progress_stale_time(&self) -> Duration {
        Duration::from_secs(self.progress_stale_secs)
    }
}
