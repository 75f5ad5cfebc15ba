// SPDX-License-Identifier: MPL-2.0
//! Flattening of the source and the overlay into the exported raster.
//!
//! Layers are drawn with tiny-skia onto a transparent square canvas:
//!
//! 1. the source, mapped with [`layer_transform`] and clipped to the circle
//!    inscribed in the canvas
//! 2. the overlay template, stretched to the full canvas and left unclipped
//!    so decorations outside the circle survive
//!
//! Compositing is a pure function of its inputs. The same source, transform
//! and overlay always produce bit-identical output.

use crate::config::{DEFAULT_OUTPUT_DIAMETER, DEFAULT_PREVIEW_DIAMETER};
use crate::domain::Transform;
use crate::error::{Error, Result};
use crate::media::export::CapturedResult;
use crate::media::image::{OverlayTemplate, SourceImage};
use crate::media::mapping::layer_transform;
use tiny_skia::{FillRule, FilterQuality, Mask, PathBuilder, Pixmap, PixmapPaint};

/// Renders captured results at a fixed output diameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Compositor {
    output_diameter: u32,
    preview_diameter: f32,
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_DIAMETER, DEFAULT_PREVIEW_DIAMETER)
    }
}

impl Compositor {
    /// `preview_diameter` is the viewport size the transform was authored in.
    #[must_use]
    pub fn new(output_diameter: u32, preview_diameter: f32) -> Self {
        Self {
            output_diameter,
            preview_diameter,
        }
    }

    #[must_use]
    pub fn output_diameter(&self) -> u32 {
        self.output_diameter
    }

    #[must_use]
    pub fn preview_diameter(&self) -> f32 {
        self.preview_diameter
    }

    /// Flattens `source` under `transform` with `overlay` on top.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`] if the canvas cannot be allocated.
    #[tracing::instrument(skip_all, fields(diameter = self.output_diameter))]
    pub fn compose(
        &self,
        source: &SourceImage,
        transform: &Transform,
        overlay: &OverlayTemplate,
    ) -> Result<CapturedResult> {
        let size = self.output_diameter;
        let mut canvas = Pixmap::new(size, size)
            .ok_or_else(|| Error::Render(format!("cannot allocate {size}x{size} canvas")))?;

        #[allow(clippy::cast_precision_loss)]
        let diameter = size as f32;

        let mask = circle_mask(size, size, diameter)?;
        let source_pixmap = source.to_pixmap()?;
        let matrix = layer_transform(
            source.width(),
            source.height(),
            transform,
            diameter,
            self.preview_diameter,
            source.is_mirrored(),
        );
        canvas.draw_pixmap(
            0,
            0,
            source_pixmap.as_ref(),
            &layer_paint(1.0),
            matrix,
            Some(&mask),
        );

        let overlay_pixmap = overlay.to_pixmap()?;
        canvas.draw_pixmap(
            0,
            0,
            overlay_pixmap.as_ref(),
            &layer_paint(1.0),
            stretch_to(overlay.width(), overlay.height(), diameter),
            None,
        );

        tracing::debug!(
            source = ?source.dimensions(),
            overlay = ?overlay.dimensions(),
            "composited result"
        );
        Ok(CapturedResult::from_pixmap(&canvas))
    }
}

/// Paint for drawing a full layer with high quality resampling.
pub(crate) fn layer_paint(opacity: f32) -> PixmapPaint {
    PixmapPaint {
        opacity,
        quality: FilterQuality::Bicubic,
        ..PixmapPaint::default()
    }
}

/// Scale stretching a `width x height` raster over a `diameter` square.
pub(crate) fn stretch_to(width: u32, height: u32, diameter: f32) -> tiny_skia::Transform {
    #[allow(clippy::cast_precision_loss)]
    tiny_skia::Transform::from_scale(diameter / width.max(1) as f32, diameter / height.max(1) as f32)
}

/// Anti-aliased mask of the circle of `diameter` centered in a `width x height` canvas.
pub(crate) fn circle_mask(width: u32, height: u32, diameter: f32) -> Result<Mask> {
    let mut mask = Mask::new(width, height)
        .ok_or_else(|| Error::Render(format!("cannot allocate {width}x{height} mask")))?;

    let radius = diameter / 2.0;
    #[allow(clippy::cast_precision_loss)]
    let (cx, cy) = (width as f32 / 2.0, height as f32 / 2.0);
    let circle = PathBuilder::from_circle(cx, cy, radius)
        .ok_or_else(|| Error::Render(format!("invalid clip circle of diameter {diameter}")))?;

    mask.fill_path(&circle, FillRule::Winding, true, tiny_skia::Transform::identity());
    Ok(mask)
}
