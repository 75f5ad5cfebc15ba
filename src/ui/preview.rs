// SPDX-License-Identifier: MPL-2.0
//! Preview renderer for the circular viewport.
//!
//! Hosts with a retained-mode UI position the source element with
//! [`PreviewLayout`] and let their compositor apply the affine. Hosts without
//! one can rasterize a frame with [`render_preview`]. Both go through the same
//! base fit and transform order as the export pipeline, at `k = 1`.

use crate::config::{
    Config, DEFAULT_OVERLAY_PREVIEW_OPACITY, DEFAULT_PREVIEW_BORDER_WIDTH,
    DEFAULT_PREVIEW_DIAMETER,
};
use crate::domain::Transform;
use crate::error::{Error, Result};
use crate::media::compositor::{circle_mask, layer_paint, stretch_to};
use crate::media::image::pixmap_to_rgba;
use crate::media::mapping::{base_fit_scale, layer_transform};
use crate::media::{OverlayTemplate, SourceImage};
use image_rs::RgbaImage;
use tiny_skia::Pixmap;

/// Geometry and look of the preview viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewSettings {
    /// Diameter of the circular content area. Defines preview space.
    pub diameter: f32,
    /// Border drawn around the content area.
    pub border_width: f32,
    /// Overlay opacity while adjusting.
    pub overlay_opacity: f32,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            diameter: DEFAULT_PREVIEW_DIAMETER,
            border_width: DEFAULT_PREVIEW_BORDER_WIDTH,
            overlay_opacity: DEFAULT_OVERLAY_PREVIEW_OPACITY,
        }
    }
}

impl From<&Config> for PreviewSettings {
    fn from(config: &Config) -> Self {
        Self {
            diameter: config.preview_diameter(),
            border_width: config.border_width(),
            overlay_opacity: config.overlay_opacity(),
        }
    }
}

/// Placement of the source element inside the viewport.
///
/// The element is sized to `base_width x base_height`, placed at
/// `(left, top)` and transformed about its own center, which coincides with
/// the viewport center.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewLayout {
    pub base_width: f32,
    pub base_height: f32,
    pub left: f32,
    pub top: f32,
    /// CSS-style transform list, outermost first.
    pub transform: String,
    pub mirrored: bool,
    pub overlay_opacity: f32,
}

impl PreviewLayout {
    /// Computes the layout of `source` under `transform`.
    #[must_use]
    pub fn compute(source: &SourceImage, transform: &Transform, settings: &PreviewSettings) -> Self {
        let fit = base_fit_scale(source.width(), source.height(), settings.diameter);
        #[allow(clippy::cast_precision_loss)]
        let (base_width, base_height) = (source.width() as f32 * fit, source.height() as f32 * fit);

        let mut css = format!(
            "translate({}px, {}px) rotate({}deg) scale({})",
            transform.translation.x,
            transform.translation.y,
            transform.rotation_degrees,
            transform.scale.value()
        );
        if source.is_mirrored() {
            css.push_str(" scaleX(-1)");
        }

        Self {
            base_width,
            base_height,
            left: (settings.diameter - base_width) / 2.0,
            top: (settings.diameter - base_height) / 2.0,
            transform: css,
            mirrored: source.is_mirrored(),
            overlay_opacity: settings.overlay_opacity,
        }
    }
}

/// Rasterizes one preview frame at the viewport diameter.
///
/// Both layers are clipped to the circle. The overlay is drawn translucent so
/// the framing underneath stays visible; it is skipped while still loading.
///
/// # Errors
///
/// Returns [`Error::Render`] if the frame cannot be allocated.
pub fn render_preview(
    source: &SourceImage,
    transform: &Transform,
    overlay: Option<&OverlayTemplate>,
    settings: &PreviewSettings,
) -> Result<RgbaImage> {
    let diameter = settings.diameter;
    if !diameter.is_finite() || diameter < 1.0 {
        return Err(Error::Render(format!("invalid preview diameter {diameter}")));
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let size = diameter.ceil() as u32;

    let mut frame = Pixmap::new(size, size)
        .ok_or_else(|| Error::Render(format!("cannot allocate {size}x{size} preview")))?;
    let mask = circle_mask(size, size, diameter)?;

    let matrix = layer_transform(
        source.width(),
        source.height(),
        transform,
        diameter,
        diameter,
        source.is_mirrored(),
    );
    frame.draw_pixmap(
        0,
        0,
        source.to_pixmap()?.as_ref(),
        &layer_paint(1.0),
        matrix,
        Some(&mask),
    );

    if let Some(overlay) = overlay {
        frame.draw_pixmap(
            0,
            0,
            overlay.to_pixmap()?.as_ref(),
            &layer_paint(settings.overlay_opacity.clamp(0.0, 1.0)),
            stretch_to(overlay.width(), overlay.height(), diameter),
            Some(&mask),
        );
    }

    Ok(pixmap_to_rgba(&frame))
}
