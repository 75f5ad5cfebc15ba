// SPDX-License-Identifier: MPL-2.0
//! Export of the composited profile picture.
//!
//! A [`CapturedResult`] is the square raster produced by the compositor. It
//! can be encoded to PNG, JPEG or WebP in memory or written straight to disk.

use crate::error::{Error, Result};
use crate::media::image::pixmap_to_rgba;
use image_rs::{DynamicImage, ImageFormat, RgbaImage};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use tiny_skia::Pixmap;

/// Supported encodings for the captured result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// PNG format (lossless, keeps the transparent corners).
    #[default]
    Png,
    /// JPEG format (no alpha; transparent pixels become black).
    Jpeg,
    /// WebP format (lossless encoder of the `image` crate).
    WebP,
}

impl ExportFormat {
    /// Returns the file extension for this format.
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
            ExportFormat::WebP => "webp",
        }
    }

    /// MIME type, for hosts that upload the bytes.
    #[must_use]
    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg => "image/jpeg",
            ExportFormat::WebP => "image/webp",
        }
    }

    fn image_format(self) -> ImageFormat {
        match self {
            ExportFormat::Png => ImageFormat::Png,
            ExportFormat::Jpeg => ImageFormat::Jpeg,
            ExportFormat::WebP => ImageFormat::WebP,
        }
    }

    #[must_use]
    pub fn all() -> &'static [ExportFormat] {
        &[ExportFormat::Png, ExportFormat::Jpeg, ExportFormat::WebP]
    }

    /// Detects format from file extension.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<ExportFormat> {
        match ext.to_lowercase().as_str() {
            "png" => Some(ExportFormat::Png),
            "jpg" | "jpeg" => Some(ExportFormat::Jpeg),
            "webp" => Some(ExportFormat::WebP),
            _ => None,
        }
    }

    /// Detects format from file path extension.
    pub fn from_path(path: &Path) -> Option<ExportFormat> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

/// The flattened output raster: `diameter x diameter` RGBA, transparent
/// outside the clip circle wherever the overlay is transparent.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedResult {
    image: Arc<RgbaImage>,
}

impl CapturedResult {
    #[must_use]
    pub fn new(image: RgbaImage) -> Self {
        Self {
            image: Arc::new(image),
        }
    }

    pub(crate) fn from_pixmap(pixmap: &Pixmap) -> Self {
        Self::new(pixmap_to_rgba(pixmap))
    }

    #[must_use]
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Encodes the raster in memory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encode`] if the encoder rejects the image.
    pub fn encode(&self, format: ExportFormat) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        let mut cursor = Cursor::new(&mut bytes);

        // JPEG has no alpha channel
        let written = if format == ExportFormat::Jpeg {
            DynamicImage::ImageRgba8((*self.image).clone())
                .to_rgb8()
                .write_to(&mut cursor, format.image_format())
        } else {
            self.image.write_to(&mut cursor, format.image_format())
        };

        written.map_err(|e| Error::Encode(format!("Failed to encode result: {e}")))?;
        Ok(bytes)
    }

    /// Writes the raster to `path`.
    ///
    /// The format is taken from the file extension when not given, falling
    /// back to PNG.
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be encoded or written to disk.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P, format: Option<ExportFormat>) -> Result<()> {
        let path = path.as_ref();
        let format = format
            .or_else(|| ExportFormat::from_path(path))
            .unwrap_or_default();

        let bytes = self.encode(format)?;
        std::fs::write(path, bytes)
            .map_err(|e| Error::Io(format!("Failed to save result to {}: {e}", path.display())))
    }
}

/// Default file name for a freshly captured result.
///
/// Format: `profile-{unix_millis}.{ext}`
#[must_use]
pub fn suggested_file_name(format: ExportFormat) -> String {
    format!(
        "profile-{}.{}",
        chrono::Utc::now().timestamp_millis(),
        format.extension()
    )
}
