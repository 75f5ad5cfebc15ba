// SPDX-License-Identifier: MPL-2.0
//! Frame grabbing from live sources.
//!
//! A [`FrameGrabber`] owns a device stream for as long as the user is looking
//! at the live preview. Grabbing a frame turns the current picture into a
//! [`SourceImage`]; releasing the grabber stops the stream.

use crate::error::{AcquisitionError, Result};
use crate::media::image::SourceImage;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A live stream that can produce still source images.
pub trait FrameGrabber {
    /// Grabs the current frame as a source image.
    ///
    /// # Errors
    ///
    /// Returns an [`AcquisitionError`] if the stream cannot deliver a frame,
    /// or if the grabber was already released.
    fn grab_frame(&mut self) -> Result<SourceImage>;

    /// Stops the underlying stream. Calling it more than once is harmless.
    fn release(&mut self);

    /// Whether [`FrameGrabber::release`] has been called.
    fn is_released(&self) -> bool;
}

/// Grabber replaying one fixed frame.
///
/// Stands in for a device on hosts without camera support and in tests. The
/// released flag is shared so callers can observe the release after handing
/// the grabber over.
#[derive(Debug, Clone)]
pub struct StillFrameGrabber {
    frame: SourceImage,
    released: Arc<AtomicBool>,
}

impl StillFrameGrabber {
    #[must_use]
    pub fn new(frame: SourceImage) -> Self {
        Self {
            frame,
            released: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Handle reporting whether this grabber (or a clone) was released.
    #[must_use]
    pub fn release_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.released)
    }
}

impl FrameGrabber for StillFrameGrabber {
    fn grab_frame(&mut self) -> Result<SourceImage> {
        if self.is_released() {
            return Err(AcquisitionError::DeviceUnavailable.into());
        }
        Ok(self.frame.clone())
    }

    fn release(&mut self) {
        self.released.store(true, Ordering::SeqCst);
    }

    fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}
