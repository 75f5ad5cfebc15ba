// SPDX-License-Identifier: MPL-2.0
//! Transform model for the user-adjusted source layer.
//!
//! A [`Transform`] holds the user's zoom, rotation and pan. Every mutator is a
//! pure function of `(current, delta) -> new`, and the zoom always passes
//! through [`Scale::new`], so an out-of-range scale cannot be constructed.
//!
//! The translation is expressed in *preview space*: units of the on-screen
//! circular viewport. Renderers working at another diameter rescale it with
//! [`coordinate_ratio`].

use super::geometry::Vector;

// =============================================================================
// Scale Bounds
// =============================================================================

/// Zoom bounds applied on every scale mutation.
pub mod scale_bounds {
    /// Minimum user scale.
    pub const MIN: f32 = 0.5;
    /// Maximum user scale.
    pub const MAX: f32 = 3.0;
    /// Identity scale.
    pub const DEFAULT: f32 = 1.0;
}

// =============================================================================
// Scale
// =============================================================================

/// User zoom multiplier, guaranteed to be within `[0.5, 3.0]`.
///
/// Non-finite inputs fall back to the identity scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale(f32);

impl Scale {
    /// Creates a new scale, clamping the value to the valid range.
    #[must_use]
    pub fn new(value: f32) -> Self {
        if !value.is_finite() {
            return Self::default();
        }
        Self(value.clamp(scale_bounds::MIN, scale_bounds::MAX))
    }

    /// Returns the raw multiplier.
    #[must_use]
    pub fn value(self) -> f32 {
        self.0
    }

    /// Returns whether the scale is at the minimum value.
    #[must_use]
    pub fn is_min(self) -> bool {
        self.0 <= scale_bounds::MIN
    }

    /// Returns whether the scale is at the maximum value.
    #[must_use]
    pub fn is_max(self) -> bool {
        self.0 >= scale_bounds::MAX
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self(scale_bounds::DEFAULT)
    }
}

/// Clamps a raw scale value to `[0.5, 3.0]`.
///
/// Convenience wrapper over [`Scale::new`].
#[must_use]
pub fn clamp_scale(value: f32) -> f32 {
    Scale::new(value).value()
}

/// Ratio between a render diameter and the preview diameter.
///
/// A translation measured in preview space is multiplied by this ratio when
/// drawn at `target_diameter`. Returns `1.0` for a degenerate preview diameter.
#[must_use]
pub fn coordinate_ratio(target_diameter: f32, preview_diameter: f32) -> f32 {
    if preview_diameter > 0.0 && preview_diameter.is_finite() && target_diameter.is_finite() {
        target_diameter / preview_diameter
    } else {
        1.0
    }
}

// =============================================================================
// Transform
// =============================================================================

/// Zoom, rotation and pan applied to the source layer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Transform {
    /// Zoom multiplier on top of the base fit.
    pub scale: Scale,
    /// Clockwise rotation in degrees. Accumulates without wraparound.
    pub rotation_degrees: f32,
    /// Pan offset in preview-space units.
    pub translation: Vector,
}

impl Transform {
    /// `{ scale: 1, rotation: 0, translation: (0, 0) }`.
    pub const IDENTITY: Self = Self {
        scale: Scale(scale_bounds::DEFAULT),
        rotation_degrees: 0.0,
        translation: Vector::ZERO,
    };

    #[must_use]
    pub fn identity() -> Self {
        Self::IDENTITY
    }

    #[must_use]
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Multiplies the scale by `factor` (wheel and pinch style zoom).
    ///
    /// Non-positive or non-finite factors leave the transform untouched.
    #[must_use]
    pub fn apply_zoom_delta(self, factor: f32) -> Self {
        if !factor.is_finite() || factor <= 0.0 {
            return self;
        }
        Self {
            scale: Scale::new(self.scale.value() * factor),
            ..self
        }
    }

    /// Adds `step` to the scale (zoom buttons).
    #[must_use]
    pub fn apply_scale_step(self, step: f32) -> Self {
        if !step.is_finite() {
            return self;
        }
        Self {
            scale: Scale::new(self.scale.value() + step),
            ..self
        }
    }

    /// Replaces the scale with an absolute target (size presets).
    #[must_use]
    pub fn with_scale(self, value: f32) -> Self {
        if !value.is_finite() {
            return self;
        }
        Self {
            scale: Scale::new(value),
            ..self
        }
    }

    /// Adds `degrees` to the rotation.
    #[must_use]
    pub fn apply_rotation_delta(self, degrees: f32) -> Self {
        if !degrees.is_finite() {
            return self;
        }
        Self {
            rotation_degrees: self.rotation_degrees + degrees,
            ..self
        }
    }

    /// Moves the layer by `delta` preview-space units.
    #[must_use]
    pub fn apply_pan(self, delta: Vector) -> Self {
        if !delta.is_finite() {
            return self;
        }
        Self {
            translation: self.translation + delta,
            ..self
        }
    }

    /// Replaces the translation (used when re-deriving from a gesture snapshot).
    #[must_use]
    pub fn with_translation(self, translation: Vector) -> Self {
        if !translation.is_finite() {
            return self;
        }
        Self {
            translation,
            ..self
        }
    }

    /// Returns the identity transform, whatever the current state.
    #[must_use]
    pub fn reset(self) -> Self {
        Self::IDENTITY
    }

    /// Translation rescaled for rendering at `target_diameter`.
    #[must_use]
    pub fn translation_at(&self, target_diameter: f32, preview_diameter: f32) -> Vector {
        self.translation * coordinate_ratio(target_diameter, preview_diameter)
    }

    /// Rotation in radians.
    #[must_use]
    pub fn rotation_radians(&self) -> f32 {
        self.rotation_degrees.to_radians()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::assert_abs_diff_eq;

    #[test]
    fn scale_new_clamps_to_bounds() {
        assert_eq!(Scale::new(0.1).value(), scale_bounds::MIN);
        assert_eq!(Scale::new(10.0).value(), scale_bounds::MAX);
        assert_eq!(Scale::new(1.7).value(), 1.7);
        assert!(Scale::new(0.5).is_min());
        assert!(Scale::new(3.0).is_max());
    }

    #[test]
    fn scale_new_rejects_non_finite() {
        assert_eq!(Scale::new(f32::NAN), Scale::default());
        assert_eq!(Scale::new(f32::INFINITY), Scale::default());
    }

    #[test]
    fn clamp_is_idempotent() {
        for raw in [-5.0, 0.0, 0.49, 0.5, 1.0, 2.99, 3.0, 3.01, 1e9] {
            let once = clamp_scale(raw);
            assert_eq!(clamp_scale(once), once);
            assert!((scale_bounds::MIN..=scale_bounds::MAX).contains(&once));
        }
    }

    #[test]
    fn repeated_mutations_stay_in_range() {
        let mut transform = Transform::identity();
        let deltas = [1.1, 1.1, 5.0, 0.9, 0.01, 0.9, 3.0, 3.0, 1.1];
        for (i, factor) in deltas.iter().enumerate() {
            transform = transform.apply_zoom_delta(*factor);
            if i % 2 == 0 {
                transform = transform.apply_scale_step(0.1);
            } else {
                transform = transform.apply_scale_step(-0.1);
            }
            let value = transform.scale.value();
            assert!((scale_bounds::MIN..=scale_bounds::MAX).contains(&value));
        }
    }

    #[test]
    fn zoom_delta_ignores_invalid_factors() {
        let transform = Transform::identity().with_scale(2.0);
        assert_eq!(transform.apply_zoom_delta(0.0), transform);
        assert_eq!(transform.apply_zoom_delta(-1.0), transform);
        assert_eq!(transform.apply_zoom_delta(f32::NAN), transform);
    }

    #[test]
    fn rotation_accumulates_past_full_turn() {
        let mut transform = Transform::identity();
        for _ in 0..80 {
            transform = transform.apply_rotation_delta(5.0);
        }
        assert_abs_diff_eq!(transform.rotation_degrees, 400.0);
    }

    #[test]
    fn pan_adds_delta() {
        let transform = Transform::identity()
            .apply_pan(Vector::new(20.0, 15.0))
            .apply_pan(Vector::new(-5.0, 5.0));
        assert_eq!(transform.translation, Vector::new(15.0, 20.0));
    }

    #[test]
    fn reset_always_yields_identity() {
        let transform = Transform::identity()
            .with_scale(2.5)
            .apply_rotation_delta(-725.0)
            .apply_pan(Vector::new(33.0, -12.0));
        assert!(!transform.is_identity());
        assert_eq!(transform.reset(), Transform::IDENTITY);
        assert!(transform.reset().is_identity());
    }

    #[test]
    fn translation_rescales_to_output() {
        let transform = Transform::identity().apply_pan(Vector::new(10.0, 10.0));
        let output = transform.translation_at(1080.0, 288.0);
        assert_abs_diff_eq!(coordinate_ratio(1080.0, 288.0), 3.75);
        assert_abs_diff_eq!(output.x, 37.5);
        assert_abs_diff_eq!(output.y, 37.5);
    }

    #[test]
    fn coordinate_ratio_guards_zero_preview() {
        assert_eq!(coordinate_ratio(1080.0, 0.0), 1.0);
    }
}
