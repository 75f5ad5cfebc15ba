// SPDX-License-Identifier: MPL-2.0
//! Centralized default values for all configuration constants.
//!
//! This module serves as the single source of truth for default values
//! used across the crate. Constants are organized by category.
//!
//! # Categories
//!
//! - **Scale**: Zoom bounds, button step, wheel factors and size presets
//! - **Rotation**: Rotate button step
//! - **Geometry**: Preview and output diameters
//! - **Preview**: Overlay opacity and viewport border

use crate::domain::scale_bounds;

// ==========================================================================
// Scale Defaults
// ==========================================================================

/// Minimum user scale.
pub const MIN_SCALE: f32 = scale_bounds::MIN;

/// Maximum user scale.
pub const MAX_SCALE: f32 = scale_bounds::MAX;

/// Scale of a freshly loaded source.
pub const DEFAULT_SCALE: f32 = scale_bounds::DEFAULT;

/// Additive scale change per zoom button press.
pub const SCALE_STEP: f32 = 0.1;

/// Wheel zoom multiplier when scrolling down (away from the user).
pub const WHEEL_ZOOM_OUT_FACTOR: f32 = 0.9;

/// Wheel zoom multiplier when scrolling up.
pub const WHEEL_ZOOM_IN_FACTOR: f32 = 1.1;

/// "Small" size preset.
pub const SMALL_PRESET_SCALE: f32 = 0.7;

/// "Medium" size preset.
pub const MEDIUM_PRESET_SCALE: f32 = 1.0;

/// "Large" size preset.
pub const LARGE_PRESET_SCALE: f32 = 1.3;

// ==========================================================================
// Rotation Defaults
// ==========================================================================

/// Rotation change per rotate button press, in degrees.
pub const ROTATION_STEP_DEGREES: f32 = 5.0;

// ==========================================================================
// Geometry Defaults
// ==========================================================================

/// Diameter of the on-screen circular viewport. Defines preview space.
pub const DEFAULT_PREVIEW_DIAMETER: f32 = 288.0;

/// Side of the exported square raster (and diameter of its clip circle).
pub const DEFAULT_OUTPUT_DIAMETER: u32 = 1080;

/// Smallest accepted output diameter.
pub const MIN_OUTPUT_DIAMETER: u32 = 16;

/// Largest accepted output diameter.
pub const MAX_OUTPUT_DIAMETER: u32 = 8192;

// ==========================================================================
// Preview Defaults
// ==========================================================================

/// Opacity of the overlay template in the live preview (not in the export).
pub const DEFAULT_OVERLAY_PREVIEW_OPACITY: f32 = 0.6;

/// Border drawn around the preview viewport, in pointer units.
pub const DEFAULT_PREVIEW_BORDER_WIDTH: f32 = 4.0;

// ==========================================================================
// Compile-time Validation
// ==========================================================================

const _: () = {
    assert!(MIN_SCALE > 0.0);
    assert!(MIN_SCALE < DEFAULT_SCALE);
    assert!(MAX_SCALE > DEFAULT_SCALE);
    assert!(SCALE_STEP > 0.0);
    assert!(WHEEL_ZOOM_OUT_FACTOR < 1.0);
    assert!(WHEEL_ZOOM_IN_FACTOR > 1.0);

    assert!(SMALL_PRESET_SCALE >= MIN_SCALE);
    assert!(LARGE_PRESET_SCALE <= MAX_SCALE);
    assert!(SMALL_PRESET_SCALE < MEDIUM_PRESET_SCALE);
    assert!(MEDIUM_PRESET_SCALE < LARGE_PRESET_SCALE);

    assert!(ROTATION_STEP_DEGREES > 0.0);

    assert!(DEFAULT_PREVIEW_DIAMETER > 0.0);
    assert!(DEFAULT_OUTPUT_DIAMETER >= MIN_OUTPUT_DIAMETER);
    assert!(DEFAULT_OUTPUT_DIAMETER <= MAX_OUTPUT_DIAMETER);

    assert!(DEFAULT_OVERLAY_PREVIEW_OPACITY > 0.0);
    assert!(DEFAULT_OVERLAY_PREVIEW_OPACITY <= 1.0);
    assert!(DEFAULT_PREVIEW_BORDER_WIDTH >= 0.0);
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_defaults_are_valid() {
        assert_eq!(MIN_SCALE, 0.5);
        assert_eq!(MAX_SCALE, 3.0);
        assert_eq!(DEFAULT_SCALE, 1.0);
    }

    #[test]
    fn canonical_geometry() {
        assert_eq!(DEFAULT_PREVIEW_DIAMETER, 288.0);
        assert_eq!(DEFAULT_OUTPUT_DIAMETER, 1080);
    }

    #[test]
    fn presets_are_ordered() {
        assert!(SMALL_PRESET_SCALE < MEDIUM_PRESET_SCALE);
        assert!(MEDIUM_PRESET_SCALE < LARGE_PRESET_SCALE);
    }
}
