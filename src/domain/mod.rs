// SPDX-License-Identifier: MPL-2.0
//! Domain layer - core value types with ZERO external dependencies.
//!
//! This module contains the pure transform model shared by the gesture
//! controller, the preview renderer and the compositor.
//!
//! # Modules
//!
//! - [`geometry`]: [`Point`](geometry::Point), [`Vector`](geometry::Vector),
//!   [`Rect`](geometry::Rect)
//! - [`transform`]: [`Scale`](transform::Scale), [`Transform`](transform::Transform)

pub mod geometry;
pub mod transform;

pub use geometry::{Point, Rect, Vector};
pub use transform::{clamp_scale, coordinate_ratio, scale_bounds, Scale, Transform};
