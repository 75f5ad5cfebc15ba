// SPDX-License-Identifier: MPL-2.0
//! Interaction state for the preview viewport
//!
//! Gesture sessions, viewport placement and discrete controls live here,
//! separate from the capture session that owns the transform.

pub mod controls;
pub mod gesture;
pub mod viewport;

// Re-export commonly used types for convenience
pub use controls::{ControlAction, SizePreset};
pub use gesture::{GestureController, GestureOutcome, GestureSession, IgnoreReason, InputEvent};
pub use viewport::ViewportState;
