// SPDX-License-Identifier: MPL-2.0
//! `profile_frame` composes circular profile pictures.
//!
//! A source photo (uploaded file or live camera frame) is panned, zoomed and
//! rotated inside a circular preview, then flattened under a fixed overlay
//! template into a square raster. The preview and the export share one
//! mapping, so the exported picture is the preview at a higher pixel density.
//!
//! # Layers
//!
//! - [`domain`] - Transform model and geometry (no I/O)
//! - [`ui`] - Gesture state machine, discrete controls and preview rendering
//! - [`media`] - Image loading slots, compositor and export
//! - [`app`] - Capture session orchestration and config paths
//! - [`config`] - Defaults and `settings.toml`
//!
//! # Example
//!
//! ```no_run
//! use profile_frame::app::{CaptureSession, SessionSettings};
//! use profile_frame::media::{ImageSlot, OverlayTemplate, SourceImage, SourceKind};
//! use profile_frame::ui::state::{ControlAction, SizePreset};
//!
//! let overlay = OverlayTemplate::load("frame.png").expect("overlay");
//! let mut session = CaptureSession::new(SessionSettings::default(), ImageSlot::ready(overlay));
//! session.load_source(SourceImage::load("me.jpg", SourceKind::File).expect("photo"));
//! session.apply_control(ControlAction::Preset(SizePreset::Large));
//! session.capture().expect("capture");
//! ```

pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod media;
pub mod ui;

#[cfg(test)]
pub(crate) mod test_utils;

pub use error::{Error, Result};
