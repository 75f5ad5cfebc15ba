// SPDX-License-Identifier: MPL-2.0
//! Viewport state management
//!
//! Tracks where the circular preview sits on screen so pointer positions can
//! be converted into viewport-local coordinates.

use crate::config::{DEFAULT_PREVIEW_BORDER_WIDTH, DEFAULT_PREVIEW_DIAMETER};
use crate::domain::{Point, Rect};

/// On-screen placement of the circular preview.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportState {
    /// Bounding box of the viewport widget, border included.
    pub bounds: Option<Rect>,

    /// Width of the border drawn inside the bounding box.
    pub border_width: f32,

    /// Diameter of the circular content area (preview space).
    pub diameter: f32,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self::new(DEFAULT_PREVIEW_DIAMETER, DEFAULT_PREVIEW_BORDER_WIDTH)
    }
}

impl ViewportState {
    #[must_use]
    pub fn new(diameter: f32, border_width: f32) -> Self {
        Self {
            bounds: None,
            border_width,
            diameter,
        }
    }

    /// Records the latest layout bounds. Returns true if they changed.
    pub fn update_bounds(&mut self, bounds: Rect) -> bool {
        let changed = self.bounds != Some(bounds);
        self.bounds = Some(bounds);
        changed
    }

    /// Converts a client position into coordinates relative to the content
    /// area's top-left corner.
    ///
    /// Before the first layout the viewport is assumed to sit at the client
    /// origin.
    #[must_use]
    pub fn to_local(&self, client: Point) -> Point {
        let origin = self.bounds.map_or(Point::ORIGIN, Rect::origin);
        Point::new(
            client.x - origin.x - self.border_width,
            client.y - origin.y - self.border_width,
        )
    }

    /// Center of the content area in local coordinates.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.diameter / 2.0, self.diameter / 2.0)
    }
}
