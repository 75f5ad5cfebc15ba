// SPDX-License-Identifier: MPL-2.0
//! Mapping of the user transform onto a circular canvas of a given diameter.
//!
//! The preview and the compositor both go through [`layer_transform`], so the
//! exported picture is the preview scaled by `output / preview`.

use crate::domain::{coordinate_ratio, Transform};

/// Zoom that makes a `width x height` raster cover a circle of `diameter`.
///
/// The shorter side fills the diameter exactly; the longer side overflows
/// and is clipped. Returns `1.0` for empty rasters.
#[must_use]
pub fn base_fit_scale(width: u32, height: u32, diameter: f32) -> f32 {
    let shorter = width.min(height);
    if shorter == 0 || !diameter.is_finite() || diameter <= 0.0 {
        return 1.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let shorter = shorter as f32;
    diameter / shorter
}

/// Matrix placing a `width x height` source on a canvas of `diameter`.
///
/// Applied right to left: center the raster on the origin, flip it for
/// mirrored camera frames, scale by `scale * base_fit`, rotate, then move it
/// to the canvas center plus the translation rescaled from preview space.
#[must_use]
pub fn layer_transform(
    width: u32,
    height: u32,
    transform: &Transform,
    diameter: f32,
    preview_diameter: f32,
    mirrored: bool,
) -> tiny_skia::Transform {
    let center = diameter / 2.0;
    let offset = transform.translation * coordinate_ratio(diameter, preview_diameter);
    let scale = transform.scale.value() * base_fit_scale(width, height, diameter);

    #[allow(clippy::cast_precision_loss)]
    let (half_w, half_h) = (width as f32 / 2.0, height as f32 / 2.0);

    let mut matrix = tiny_skia::Transform::from_translate(center + offset.x, center + offset.y)
        .pre_concat(tiny_skia::Transform::from_rotate(transform.rotation_degrees))
        .pre_scale(scale, scale);
    if mirrored {
        matrix = matrix.pre_scale(-1.0, 1.0);
    }
    matrix.pre_translate(-half_w, -half_h)
}
