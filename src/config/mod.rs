// SPDX-License-Identifier: MPL-2.0
//! This module handles the crate's configuration, including loading and saving
//! user preferences to a `settings.toml` file.
//!
//! # Configuration Sections
//!
//! - `[output]` - Exported raster size and encoding
//! - `[preview]` - On-screen viewport geometry and overlay opacity
//! - `[capture]` - Camera mirroring, retake policy and overlay location
//!
//! # Path Resolution
//!
//! The config file location can be customized for testing or portable deployments:
//! 1. Use `load_from_path()`/`save_to_path()` with explicit path
//! 2. Set `PROFILE_FRAME_CONFIG_DIR` environment variable
//! 3. Falls back to platform-specific config directory
//!
//! # Examples
//!
//! ```no_run
//! use profile_frame::config::{self, RetakePolicy};
//!
//! let (mut config, _warning) = config::load();
//! config.capture.retake_policy = Some(RetakePolicy::Preserve);
//! config::save(&config).expect("Failed to save config");
//! ```

pub mod defaults;

pub use defaults::*;

use crate::app::paths;
use crate::error::{Error, Result};
use crate::media::ExportFormat;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "settings.toml";

// =============================================================================
// Enums
// =============================================================================

/// What happens to the transform when a captured result is discarded.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RetakePolicy {
    /// Start over from the identity transform (same as loading a new source).
    #[default]
    Reset,
    /// Keep the framing the user had when capturing.
    Preserve,
}

// =============================================================================
// Section Structs
// =============================================================================

/// Exported raster settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputConfig {
    /// Side length of the square output, in pixels.
    #[serde(default = "default_output_diameter", skip_serializing_if = "Option::is_none")]
    pub diameter: Option<u32>,

    /// Encoding used when saving the captured result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<ExportFormat>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            diameter: default_output_diameter(),
            format: Some(ExportFormat::default()),
        }
    }
}

/// Live preview settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PreviewConfig {
    /// Diameter of the circular viewport. Pan offsets are measured in these units.
    #[serde(default = "default_preview_diameter", skip_serializing_if = "Option::is_none")]
    pub diameter: Option<f32>,

    /// Viewport border width, subtracted from pointer positions.
    #[serde(default = "default_border_width", skip_serializing_if = "Option::is_none")]
    pub border_width: Option<f32>,

    /// Overlay opacity in the preview (0.0 to 1.0).
    #[serde(default = "default_overlay_opacity", skip_serializing_if = "Option::is_none")]
    pub overlay_opacity: Option<f32>,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            diameter: default_preview_diameter(),
            border_width: default_border_width(),
            overlay_opacity: default_overlay_opacity(),
        }
    }
}

/// Capture flow settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaptureConfig {
    /// Mirror camera frames horizontally, in the preview and in the export.
    #[serde(default = "default_mirror_camera", skip_serializing_if = "Option::is_none")]
    pub mirror_camera: Option<bool>,

    /// Transform handling on retake.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retake_policy: Option<RetakePolicy>,

    /// Overlay template image (raster or SVG).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlay_path: Option<PathBuf>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            mirror_camera: default_mirror_camera(),
            retake_policy: Some(RetakePolicy::default()),
            overlay_path: None,
        }
    }
}

// =============================================================================
// Main Config Struct (Sectioned)
// =============================================================================

/// Crate configuration with logical sections.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub preview: PreviewConfig,

    #[serde(default)]
    pub capture: CaptureConfig,
}

impl Config {
    /// Output diameter, clamped to the supported range.
    #[must_use]
    pub fn output_diameter(&self) -> u32 {
        self.output
            .diameter
            .unwrap_or(DEFAULT_OUTPUT_DIAMETER)
            .clamp(MIN_OUTPUT_DIAMETER, MAX_OUTPUT_DIAMETER)
    }

    /// Preview diameter, falling back to the default for non-positive values.
    #[must_use]
    pub fn preview_diameter(&self) -> f32 {
        match self.preview.diameter {
            Some(d) if d.is_finite() && d > 0.0 => d,
            _ => DEFAULT_PREVIEW_DIAMETER,
        }
    }

    #[must_use]
    pub fn border_width(&self) -> f32 {
        match self.preview.border_width {
            Some(w) if w.is_finite() && w >= 0.0 => w,
            _ => DEFAULT_PREVIEW_BORDER_WIDTH,
        }
    }

    #[must_use]
    pub fn overlay_opacity(&self) -> f32 {
        match self.preview.overlay_opacity {
            Some(o) if o.is_finite() => o.clamp(0.0, 1.0),
            _ => DEFAULT_OVERLAY_PREVIEW_OPACITY,
        }
    }

    #[must_use]
    pub fn export_format(&self) -> ExportFormat {
        self.output.format.unwrap_or_default()
    }

    #[must_use]
    pub fn mirror_camera(&self) -> bool {
        self.capture.mirror_camera.unwrap_or(true)
    }

    #[must_use]
    pub fn retake_policy(&self) -> RetakePolicy {
        self.capture.retake_policy.unwrap_or_default()
    }
}

// =============================================================================
// Default Value Functions
// =============================================================================

fn default_output_diameter() -> Option<u32> {
    Some(DEFAULT_OUTPUT_DIAMETER)
}

fn default_preview_diameter() -> Option<f32> {
    Some(DEFAULT_PREVIEW_DIAMETER)
}

fn default_border_width() -> Option<f32> {
    Some(DEFAULT_PREVIEW_BORDER_WIDTH)
}

fn default_overlay_opacity() -> Option<f32> {
    Some(DEFAULT_OVERLAY_PREVIEW_OPACITY)
}

fn default_mirror_camera() -> Option<bool> {
    Some(true)
}

// =============================================================================
// Config Path Resolution
// =============================================================================

/// Returns the config file path with an optional override.
fn get_config_path_with_override(base_dir: Option<PathBuf>) -> Option<PathBuf> {
    paths::get_app_config_dir_with_override(base_dir).map(|mut path| {
        path.push(CONFIG_FILE);
        path
    })
}

// =============================================================================
// Load Functions
// =============================================================================

/// Loads the configuration from the default path.
///
/// Returns a tuple of (config, optional_warning). If loading fails, returns
/// default config with a warning key explaining what went wrong.
pub fn load() -> (Config, Option<String>) {
    load_with_override(None)
}

/// Loads the configuration from a custom directory.
pub fn load_with_override(base_dir: Option<PathBuf>) -> (Config, Option<String>) {
    if let Some(path) = get_config_path_with_override(base_dir) {
        if path.exists() {
            match load_from_path(&path) {
                Ok(config) => return (config, None),
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "ignoring unreadable config");
                    return (
                        Config::default(),
                        Some("notification-config-load-error".to_string()),
                    );
                }
            }
        }
    }
    (Config::default(), None)
}

/// Loads configuration from a specific path.
pub fn load_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}

// =============================================================================
// Save Functions
// =============================================================================

/// Saves the configuration to the default path.
pub fn save(config: &Config) -> Result<()> {
    save_with_override(config, None)
}

/// Saves the configuration to a custom directory.
pub fn save_with_override(config: &Config, base_dir: Option<PathBuf>) -> Result<()> {
    if let Some(path) = get_config_path_with_override(base_dir) {
        return save_to_path(config, &path);
    }
    Ok(())
}

/// Saves configuration to a specific path.
pub fn save_to_path(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config).map_err(Error::from)?;
    fs::write(path, content)?;
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use tempfile::tempdir;

    #[test]
    fn save_and_load_round_trip_preserves_settings() {
        let config = Config {
            output: OutputConfig {
                diameter: Some(512),
                format: Some(ExportFormat::WebP),
            },
            preview: PreviewConfig {
                diameter: Some(320.0),
                border_width: Some(2.0),
                overlay_opacity: Some(0.5),
            },
            capture: CaptureConfig {
                mirror_camera: Some(false),
                retake_policy: Some(RetakePolicy::Preserve),
                overlay_path: Some(PathBuf::from("/tmp/frame.png")),
            },
        };
        let temp_dir = tempdir().expect("failed to create temp dir");
        let config_path = temp_dir.path().join("nested").join("settings.toml");

        save_to_path(&config, &config_path).expect("failed to save config");
        let loaded = load_from_path(&config_path).expect("failed to load config");

        assert_eq!(loaded, config);
    }

    #[test]
    fn load_from_path_invalid_toml_errors() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let config_path = temp_dir.path().join("settings.toml");
        fs::write(&config_path, "not = valid = toml").expect("failed to write invalid toml");

        match load_from_path(&config_path) {
            Err(Error::Config(_)) => {}
            other => panic!("expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let config_path = temp_dir.path().join("settings.toml");
        fs::write(&config_path, "[output]\ndiameter = 720\n").expect("failed to write toml");

        let loaded = load_from_path(&config_path).expect("failed to load config");
        assert_eq!(loaded.output_diameter(), 720);
        assert_eq!(loaded.preview, PreviewConfig::default());
        assert_eq!(loaded.retake_policy(), RetakePolicy::Reset);
    }

    #[test]
    fn load_with_override_reports_broken_file() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        fs::write(temp_dir.path().join(CONFIG_FILE), "[output\n").expect("failed to write");

        let (config, warning) = load_with_override(Some(temp_dir.path().to_path_buf()));
        assert_eq!(config, Config::default());
        assert_eq!(warning.as_deref(), Some("notification-config-load-error"));
    }

    #[test]
    fn load_with_override_without_file_is_default() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let (config, warning) = load_with_override(Some(temp_dir.path().to_path_buf()));
        assert_eq!(config, Config::default());
        assert!(warning.is_none());
    }

    #[test]
    fn accessors_sanitize_values() {
        let config = Config {
            output: OutputConfig {
                diameter: Some(1),
                format: None,
            },
            preview: PreviewConfig {
                diameter: Some(-3.0),
                border_width: Some(f32::NAN),
                overlay_opacity: Some(4.0),
            },
            capture: CaptureConfig::default(),
        };
        assert_eq!(config.output_diameter(), MIN_OUTPUT_DIAMETER);
        assert_eq!(config.preview_diameter(), DEFAULT_PREVIEW_DIAMETER);
        assert_eq!(config.border_width(), DEFAULT_PREVIEW_BORDER_WIDTH);
        assert_eq!(config.overlay_opacity(), 1.0);
        assert_eq!(config.export_format(), ExportFormat::Png);
    }

    #[test]
    fn retake_policy_uses_kebab_case() {
        let content = toml::to_string(&CaptureConfig {
            mirror_camera: None,
            retake_policy: Some(RetakePolicy::Preserve),
            overlay_path: None,
        })
        .expect("serialize");
        assert!(content.contains("retake_policy = \"preserve\""));
    }
}
