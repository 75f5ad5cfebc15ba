// SPDX-License-Identifier: MPL-2.0
//! Session orchestration and application paths.
//!
//! [`session::CaptureSession`] drives one acquire, adjust, capture cycle.
//! [`paths`] resolves where the settings file lives.

pub mod paths;
pub mod session;

pub use session::{CaptureOutcome, CaptureSession, CaptureState, NotReadyReason, SessionSettings};
