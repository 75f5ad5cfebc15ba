// SPDX-License-Identifier: MPL-2.0
//! Discrete control actions (buttons and presets).
//!
//! Every action goes through the clamped [`Transform`] mutators, so buttons
//! can never push the scale out of range.

use crate::config::{
    LARGE_PRESET_SCALE, MEDIUM_PRESET_SCALE, ROTATION_STEP_DEGREES, SCALE_STEP,
    SMALL_PRESET_SCALE,
};
use crate::domain::{Transform, Vector};
use std::fmt;
use std::str::FromStr;

/// Tolerance within which the medium preset counts as selected.
const MEDIUM_PRESET_TOLERANCE: f32 = 0.1;

/// Upper bound of the scale range highlighted as "small".
const SMALL_PRESET_CEILING: f32 = 0.8;

/// Lower bound of the scale range highlighted as "large".
const LARGE_PRESET_FLOOR: f32 = 1.2;

/// Fixed-size zoom presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizePreset {
    Small,
    Medium,
    Large,
}

impl SizePreset {
    #[must_use]
    pub fn all() -> &'static [SizePreset] {
        &[SizePreset::Small, SizePreset::Medium, SizePreset::Large]
    }

    /// Absolute scale this preset sets.
    #[must_use]
    pub fn value(self) -> f32 {
        match self {
            SizePreset::Small => SMALL_PRESET_SCALE,
            SizePreset::Medium => MEDIUM_PRESET_SCALE,
            SizePreset::Large => LARGE_PRESET_SCALE,
        }
    }

    /// Whether the preset button should be highlighted for `scale`.
    ///
    /// Ranges are wide enough that a preset stays selected after small wheel
    /// or pinch adjustments.
    #[must_use]
    pub fn is_active(self, scale: f32) -> bool {
        match self {
            SizePreset::Small => scale < SMALL_PRESET_CEILING,
            SizePreset::Medium => (scale - MEDIUM_PRESET_SCALE).abs() < MEDIUM_PRESET_TOLERANCE,
            SizePreset::Large => scale > LARGE_PRESET_FLOOR,
        }
    }

    /// The highlighted preset for `scale`, if any.
    #[must_use]
    pub fn active_for(scale: f32) -> Option<SizePreset> {
        Self::all().iter().copied().find(|p| p.is_active(scale))
    }
}

impl fmt::Display for SizePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SizePreset::Small => "small",
            SizePreset::Medium => "medium",
            SizePreset::Large => "large",
        };
        f.write_str(name)
    }
}

impl FromStr for SizePreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "small" | "s" => Ok(SizePreset::Small),
            "medium" | "m" => Ok(SizePreset::Medium),
            "large" | "l" => Ok(SizePreset::Large),
            other => Err(format!("unknown size preset '{other}'")),
        }
    }
}

/// A discrete adjustment triggered by a button or a scripted host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlAction {
    RotateCounterClockwise,
    RotateClockwise,
    ZoomIn,
    ZoomOut,
    Preset(SizePreset),
    Reset,
    /// Relative rotation in degrees.
    RotateBy(f32),
    /// Absolute scale target.
    ScaleTo(f32),
    /// Relative pan in preview-space units.
    PanBy(Vector),
}

impl ControlAction {
    /// Applies the action to `transform`.
    #[must_use]
    pub fn apply(self, transform: Transform) -> Transform {
        match self {
            ControlAction::RotateCounterClockwise => {
                transform.apply_rotation_delta(-ROTATION_STEP_DEGREES)
            }
            ControlAction::RotateClockwise => transform.apply_rotation_delta(ROTATION_STEP_DEGREES),
            ControlAction::ZoomIn => transform.apply_scale_step(SCALE_STEP),
            ControlAction::ZoomOut => transform.apply_scale_step(-SCALE_STEP),
            ControlAction::Preset(preset) => transform.with_scale(preset.value()),
            ControlAction::Reset => transform.reset(),
            ControlAction::RotateBy(degrees) => transform.apply_rotation_delta(degrees),
            ControlAction::ScaleTo(scale) => transform.with_scale(scale),
            ControlAction::PanBy(delta) => transform.apply_pan(delta),
        }
    }
}
