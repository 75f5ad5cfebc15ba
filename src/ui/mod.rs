// SPDX-License-Identifier: MPL-2.0
//! Interactive side of the crate.
//!
//! - [`state`] - Gesture state machine, viewport placement and discrete controls
//! - [`preview`] - Cheap on-screen rendering of the current framing

pub mod preview;
pub mod state;

pub use preview::{render_preview, PreviewLayout, PreviewSettings};
