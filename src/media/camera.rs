// SPDX-License-Identifier: MPL-2.0
//! Live camera grabbing through nokhwa (`camera` feature).
//!
//! The stream is opened on construction and stopped on [`FrameGrabber::release`]
//! or on drop, whichever comes first.

use crate::error::{AcquisitionError, Result};
use crate::media::grabber::FrameGrabber;
use crate::media::image::{SourceImage, SourceKind};
use image_rs::RgbaImage;
use nokhwa::{
    pixel_format::RgbFormat,
    utils::{
        CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
    },
    Camera,
};

/// Requested stream frame rate.
const TARGET_FPS: u32 = 30;

/// An open camera stream.
pub struct CameraGrabber {
    camera: Camera,
    mirrored: bool,
    released: bool,
}

impl CameraGrabber {
    /// Opens camera `index` asking for a resolution close to `width x height`.
    ///
    /// `mirrored` records whether the host shows the live stream flipped, so
    /// grabbed frames are exported the way the user saw them.
    ///
    /// # Errors
    ///
    /// Returns [`AcquisitionError::PermissionDenied`] or
    /// [`AcquisitionError::DeviceUnavailable`] when the device cannot be opened.
    pub fn open(index: u32, width: u32, height: u32, mirrored: bool) -> Result<Self> {
        let format = CameraFormat::new(Resolution::new(width, height), FrameFormat::YUYV, TARGET_FPS);
        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(format));

        let mut camera = Camera::new(CameraIndex::Index(index), requested)
            .map_err(|e| AcquisitionError::from_camera_message(&e.to_string()))?;
        camera
            .open_stream()
            .map_err(|e| AcquisitionError::from_camera_message(&e.to_string()))?;

        let actual = camera.resolution();
        tracing::info!(
            index,
            width = actual.width(),
            height = actual.height(),
            "camera stream opened"
        );

        Ok(Self {
            camera,
            mirrored,
            released: false,
        })
    }

    /// Resolution the device actually delivers.
    #[must_use]
    pub fn resolution(&self) -> (u32, u32) {
        let actual = self.camera.resolution();
        (actual.width(), actual.height())
    }
}

impl FrameGrabber for CameraGrabber {
    fn grab_frame(&mut self) -> Result<SourceImage> {
        if self.released {
            return Err(AcquisitionError::DeviceUnavailable.into());
        }

        let frame = self
            .camera
            .frame()
            .map_err(|e| AcquisitionError::FrameUnavailable(e.to_string()))?;
        let rgb = frame
            .decode_image::<RgbFormat>()
            .map_err(|e| AcquisitionError::FrameUnavailable(e.to_string()))?;

        let (width, height) = rgb.dimensions();
        let mut rgba = Vec::with_capacity(width as usize * height as usize * 4);
        for px in rgb.into_raw().chunks_exact(3) {
            rgba.extend_from_slice(&[px[0], px[1], px[2], u8::MAX]);
        }
        let pixels = RgbaImage::from_raw(width, height, rgba).ok_or_else(|| {
            AcquisitionError::FrameUnavailable(format!("short frame buffer for {width}x{height}"))
        })?;

        SourceImage::from_rgba(
            pixels,
            SourceKind::Camera {
                mirrored: self.mirrored,
            },
        )
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Err(e) = self.camera.stop_stream() {
            tracing::warn!(error = %e, "failed to stop camera stream");
        } else {
            tracing::info!("camera stream released");
        }
    }

    fn is_released(&self) -> bool {
        self.released
    }
}

impl Drop for CameraGrabber {
    fn drop(&mut self) {
        self.release();
    }
}
