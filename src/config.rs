use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::normalize::DEFAULT_SCALE_FRACTION;

/// Application configuration (user settings).
///
/// Loaded at startup, written back on exit. Unknown or missing fields fall
/// back to defaults so old settings files keep working across versions.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    // === Backend ===
    /// Inference endpoint accepting `{"audio_data": "<base64>"}`.
    pub endpoint_url: String,

    // === Panel Geometry ===
    /// Waveform/spectrogram panel size in panel-local units.
    pub panel_width: f32,
    pub panel_height: f32,

    /// Fraction of panel height the waveform trace may occupy above/below
    /// center (margin so peaks never touch the edge).
    pub trace_scale_fraction: f32,

    // === Visual Settings ===
    /// Named gradient theme for feature-map cells.
    pub theme_name: String,

    /// Show the per-frame stats overlay.
    pub show_stats: bool,

    // === Window Settings ===
    pub window_size: [f32; 2],
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint_url:
                "https://nikosdk3--audio-cnn-inference-audioclassifier-inference.modal.run/"
                    .to_string(),
            panel_width: 600.0,
            panel_height: 300.0,
            trace_scale_fraction: DEFAULT_SCALE_FRACTION,
            theme_name: "Inferno".to_string(),
            show_stats: false,
            window_size: [1280.0, 860.0],
        }
    }
}

impl AppConfig {
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("dev", "EarScope", "earscope")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }

    /// Load saved settings, falling back to defaults on any problem. A
    /// missing file is the normal first-run case and is not worth a warning.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        match fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(config) => {
                    tracing::info!("[Config] Loaded settings from {:?}", path);
                    config
                }
                Err(e) => {
                    tracing::warn!("[Config] Ignoring unreadable settings file: {}", e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path().context("no platform config directory")?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating config dir {:?}", parent))?;
        }

        let text = serde_json::to_string_pretty(self)?;
        fs::write(&path, text).with_context(|| format!("writing {:?}", path))?;
        tracing::debug!("[Config] Saved settings to {:?}", path);
        Ok(())
    }
}
