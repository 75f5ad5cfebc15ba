// SPDX-License-Identifier: MPL-2.0
//! Raster side of the crate: decoded images, their async loading slots, the
//! transform-to-canvas mapping, the compositor and result export.
//!
//! Live camera grabbing is available behind the `camera` feature.

#[cfg(feature = "camera")]
pub mod camera;
pub mod compositor;
pub mod export;
pub mod grabber;
pub mod image;
pub mod mapping;
pub mod slot;

// Re-export commonly used types
#[cfg(feature = "camera")]
pub use camera::CameraGrabber;
pub use compositor::Compositor;
pub use export::{suggested_file_name, CapturedResult, ExportFormat};
pub use grabber::{FrameGrabber, StillFrameGrabber};
pub use image::{
    spawn_decode_source, spawn_load_overlay, OverlayTemplate, SourceImage, SourceKind,
};
pub use mapping::{base_fit_scale, layer_transform};
pub use slot::{ImageSlot, SlotSender, SlotStatus};
