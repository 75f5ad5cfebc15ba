// SPDX-License-Identifier: MPL-2.0
//! Decoded rasters used by the compositor: the user's source photo and the
//! fixed overlay template.
//!
//! Both are immutable once built and share their pixels through an `Arc`, so
//! handing them to the preview and the compositor never copies pixel data.

use crate::error::{AcquisitionError, Error, Result};
use crate::media::slot::ImageSlot;
use image_rs::RgbaImage;
use resvg::usvg;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tiny_skia::{ColorU8, Pixmap};

/// Where a source image came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Decoded from a user-selected file.
    File,
    /// Grabbed from a live camera stream.
    Camera {
        /// Whether the live preview shows this stream mirrored.
        mirrored: bool,
    },
}

// =============================================================================
// SourceImage
// =============================================================================

/// The user's photo: a decoded RGBA raster with known dimensions.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pixels: Arc<RgbaImage>,
    kind: SourceKind,
}

impl SourceImage {
    /// Wraps decoded pixels. Fails for empty rasters.
    pub fn from_rgba(pixels: RgbaImage, kind: SourceKind) -> Result<Self> {
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(Error::Decode("source image has empty dimensions".into()));
        }
        Ok(Self {
            pixels: Arc::new(pixels),
            kind,
        })
    }

    /// Decodes an encoded image (PNG, JPEG, WebP, ...).
    ///
    /// # Errors
    ///
    /// Returns [`AcquisitionError::UnreadableFile`] if the bytes cannot be decoded.
    pub fn decode(bytes: &[u8], kind: SourceKind) -> Result<Self> {
        let img = image_rs::load_from_memory(bytes)
            .map_err(|e| AcquisitionError::UnreadableFile(e.to_string()))?;
        Self::from_rgba(img.to_rgba8(), kind)
    }

    /// Reads and decodes an image file.
    pub fn load<P: AsRef<Path>>(path: P, kind: SourceKind) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| {
            AcquisitionError::UnreadableFile(format!("{}: {e}", path.display()))
        })?;
        Self::decode(&bytes, kind)
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    #[must_use]
    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    /// Whether the source must be flipped horizontally before any user transform.
    #[must_use]
    pub fn is_mirrored(&self) -> bool {
        matches!(self.kind, SourceKind::Camera { mirrored: true })
    }

    #[must_use]
    pub fn rgba(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Premultiplied copy for drawing with tiny-skia.
    pub(crate) fn to_pixmap(&self) -> Result<Pixmap> {
        rgba_to_pixmap(&self.pixels)
    }
}

// =============================================================================
// OverlayTemplate
// =============================================================================

/// Fixed decorative frame drawn above the source.
#[derive(Debug, Clone)]
pub struct OverlayTemplate {
    pixels: Arc<RgbaImage>,
}

impl OverlayTemplate {
    pub fn from_rgba(pixels: RgbaImage) -> Result<Self> {
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(Error::TemplateLoad("overlay has empty dimensions".into()));
        }
        Ok(Self {
            pixels: Arc::new(pixels),
        })
    }

    /// Decodes a raster overlay from encoded bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let img =
            image_rs::load_from_memory(bytes).map_err(|e| Error::TemplateLoad(e.to_string()))?;
        Self::from_rgba(img.to_rgba8())
    }

    /// Loads an overlay from disk.
    ///
    /// SVG templates are rasterized at their intrinsic size with resvg;
    /// everything else goes through the `image` crate.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TemplateLoad`] if the file cannot be read or decoded.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let extension = path.extension().and_then(|s| s.to_str()).unwrap_or("");
        let bytes = fs::read(path)
            .map_err(|e| Error::TemplateLoad(format!("{}: {e}", path.display())))?;

        if extension.eq_ignore_ascii_case("svg") {
            Self::from_svg(&bytes)
        } else {
            Self::decode(&bytes)
        }
    }

    /// Rasterizes SVG data at its intrinsic size.
    pub fn from_svg(svg_data: &[u8]) -> Result<Self> {
        let tree = usvg::Tree::from_data(svg_data, &usvg::Options::default())
            .map_err(|e| Error::Svg(e.to_string()))?;

        let pixmap_size = tree.size().to_int_size();
        let width = pixmap_size.width();
        let height = pixmap_size.height();
        if width == 0 || height == 0 {
            return Err(Error::Svg("SVG has empty dimensions".into()));
        }

        let mut pixmap = Pixmap::new(width, height)
            .ok_or_else(|| Error::Svg("Failed to allocate SVG pixmap".into()))?;

        resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

        Self::from_rgba(pixmap_to_rgba(&pixmap))
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    #[must_use]
    pub fn rgba(&self) -> &RgbaImage {
        &self.pixels
    }

    pub(crate) fn to_pixmap(&self) -> Result<Pixmap> {
        rgba_to_pixmap(&self.pixels)
    }
}

// =============================================================================
// Pixel Conversion
// =============================================================================

/// Converts straight-alpha RGBA into a premultiplied pixmap.
pub(crate) fn rgba_to_pixmap(image: &RgbaImage) -> Result<Pixmap> {
    let (width, height) = image.dimensions();
    let mut pixmap = Pixmap::new(width, height)
        .ok_or_else(|| Error::Decode(format!("cannot allocate {width}x{height} pixmap")))?;

    for (dst, px) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
        let [r, g, b, a] = px.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }

    Ok(pixmap)
}

/// Converts a premultiplied pixmap back to straight-alpha RGBA.
pub(crate) fn pixmap_to_rgba(pixmap: &Pixmap) -> RgbaImage {
    let mut out = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, px) in out.pixels_mut().zip(pixmap.pixels()) {
        let c = px.demultiply();
        *dst = image_rs::Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    out
}

// =============================================================================
// Background Loading
// =============================================================================

/// Decodes `bytes` on the blocking pool and returns a slot that resolves once.
///
/// Must be called from within a tokio runtime.
pub fn spawn_decode_source(bytes: Vec<u8>, kind: SourceKind) -> ImageSlot<SourceImage> {
    let (slot, sender) = ImageSlot::pending();
    tokio::task::spawn_blocking(move || {
        sender.resolve(SourceImage::decode(&bytes, kind));
    });
    slot
}

/// Loads an overlay template file on the blocking pool.
///
/// Must be called from within a tokio runtime.
pub fn spawn_load_overlay(path: PathBuf) -> ImageSlot<OverlayTemplate> {
    let (slot, sender) = ImageSlot::pending();
    tokio::task::spawn_blocking(move || {
        sender.resolve(OverlayTemplate::load(&path));
    });
    slot
}

#[cfg(test)]
mod tests {
    use super::*;
    use image_rs::{ImageFormat, Rgba};
    use std::io::Cursor;
    use tempfile::tempdir;

    fn encode_png(image: &RgbaImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .expect("encode png");
        bytes
    }

    #[test]
    fn decode_png_returns_expected_dimensions() {
        let bytes = encode_png(&RgbaImage::from_pixel(4, 2, Rgba([255, 0, 0, 255])));
        let source = SourceImage::decode(&bytes, SourceKind::File).expect("decode");
        assert_eq!(source.dimensions(), (4, 2));
        assert_eq!(source.kind(), SourceKind::File);
        assert!(!source.is_mirrored());
    }

    #[test]
    fn decode_garbage_is_acquisition_failure() {
        let err = SourceImage::decode(b"definitely not an image", SourceKind::File)
            .expect_err("garbage must not decode");
        assert!(matches!(
            err,
            Error::Acquisition(AcquisitionError::UnreadableFile(_))
        ));
    }

    #[test]
    fn load_missing_file_is_acquisition_failure() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let err = SourceImage::load(temp_dir.path().join("missing.png"), SourceKind::File)
            .expect_err("missing file");
        assert!(matches!(err, Error::Acquisition(_)));
    }

    #[test]
    fn empty_raster_is_rejected() {
        assert!(SourceImage::from_rgba(RgbaImage::new(0, 5), SourceKind::File).is_err());
        assert!(OverlayTemplate::from_rgba(RgbaImage::new(5, 0)).is_err());
    }

    #[test]
    fn camera_source_reports_mirroring() {
        let source = SourceImage::from_rgba(
            RgbaImage::new(2, 2),
            SourceKind::Camera { mirrored: true },
        )
        .expect("source");
        assert!(source.is_mirrored());
    }

    #[test]
    fn overlay_load_failure_is_template_error() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let err = OverlayTemplate::load(temp_dir.path().join("frame.png")).expect_err("missing");
        assert!(matches!(err, Error::TemplateLoad(_)));
    }

    #[test]
    fn overlay_svg_is_rasterized() {
        let svg = br#"<svg xmlns="http://www.w3.org/2000/svg" width="20" height="10">
            <rect width="20" height="10" fill="red"/></svg>"#;
        let overlay = OverlayTemplate::from_svg(svg).expect("svg overlay");
        assert_eq!(overlay.dimensions(), (20, 10));
        assert_eq!(overlay.rgba().get_pixel(5, 5), &Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn pixmap_conversion_preserves_opaque_pixels() {
        let mut image = RgbaImage::new(2, 1);
        image.put_pixel(0, 0, Rgba([10, 20, 30, 255]));
        image.put_pixel(1, 0, Rgba([0, 0, 0, 0]));

        let pixmap = rgba_to_pixmap(&image).expect("pixmap");
        let back = pixmap_to_rgba(&pixmap);
        assert_eq!(back.get_pixel(0, 0), &Rgba([10, 20, 30, 255]));
        assert_eq!(back.get_pixel(1, 0)[3], 0);
    }

    #[tokio::test]
    async fn spawn_decode_resolves_slot() {
        let bytes = encode_png(&RgbaImage::from_pixel(3, 3, Rgba([0, 255, 0, 255])));
        let mut slot = spawn_decode_source(bytes, SourceKind::File);
        slot.resolve().await;
        let source = slot.get().expect("decoded source");
        assert_eq!(source.dimensions(), (3, 3));
    }
}
