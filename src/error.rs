// SPDX-License-Identifier: MPL-2.0
//! Crate-wide error type.
//!
//! Only genuine resource problems live here. Routine input conditions such as
//! a zero-distance pinch or a capture request before the overlay is ready are
//! reported as outcomes by the gesture controller and the capture session.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("I/O Error: {0}")]
    Io(String),

    #[error("Decode Error: {0}")]
    Decode(String),

    #[error("SVG Error: {0}")]
    Svg(String),

    #[error("Config Error: {0}")]
    Config(String),

    #[error("Encode Error: {0}")]
    Encode(String),

    #[error("Render Error: {0}")]
    Render(String),

    #[error("Usage Error: {0}")]
    Usage(String),

    #[error("Acquisition Error: {0}")]
    Acquisition(AcquisitionError),

    #[error("Template Error: {0}")]
    TemplateLoad(String),
}

/// Why a source image could not be acquired.
///
/// Surfaced to the user as-is; the session never retries on its own.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AcquisitionError {
    /// The user or the platform refused camera access.
    #[error("camera permission denied")]
    PermissionDenied,

    /// No camera is present, or it is held by another process.
    #[error("camera not available")]
    DeviceUnavailable,

    /// The camera stream is open but did not deliver a usable frame.
    #[error("camera frame unavailable: {0}")]
    FrameUnavailable(String),

    /// The selected file could not be read or decoded.
    #[error("unreadable image file: {0}")]
    UnreadableFile(String),

    /// The loader went away before delivering a result.
    #[error("image load cancelled")]
    Cancelled,
}

impl AcquisitionError {
    /// Returns the stable message key for this error, for user-facing text.
    #[must_use]
    pub fn message_key(&self) -> &'static str {
        match self {
            AcquisitionError::PermissionDenied => "error-acquire-permission-denied",
            AcquisitionError::DeviceUnavailable => "error-acquire-device-unavailable",
            AcquisitionError::FrameUnavailable(_) => "error-acquire-frame-unavailable",
            AcquisitionError::UnreadableFile(_) => "error-acquire-unreadable-file",
            AcquisitionError::Cancelled => "error-acquire-cancelled",
        }
    }

    /// Categorizes a raw camera backend message.
    #[must_use]
    pub fn from_camera_message(msg: &str) -> Self {
        let msg_lower = msg.to_lowercase();

        if msg_lower.contains("permission") || msg_lower.contains("denied") {
            return AcquisitionError::PermissionDenied;
        }

        if msg_lower.contains("not found")
            || msg_lower.contains("no device")
            || msg_lower.contains("busy")
            || msg_lower.contains("in use")
        {
            return AcquisitionError::DeviceUnavailable;
        }

        AcquisitionError::FrameUnavailable(msg.to_string())
    }
}

impl From<AcquisitionError> for Error {
    fn from(err: AcquisitionError) -> Self {
        Error::Acquisition(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<image_rs::ImageError> for Error {
    fn from(err: image_rs::ImageError) -> Self {
        Error::Decode(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<pico_args::Error> for Error {
    fn from(err: pico_args::Error) -> Self {
        Error::Usage(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
