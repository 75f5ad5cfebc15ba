// SPDX-License-Identifier: MPL-2.0
//! Gesture state machine
//!
//! Turns raw pointer, touch and wheel events into [`Transform`] updates.
//!
//! ```text
//!            pointer-down / 1 touch            2nd touch
//!   Idle ─────────────────────────▶ Panning ─────────────▶ Pinching
//!    ▲  ◀──────────────────────────    │                      │
//!    │   pointer-up / leave / 0 touch  │                      │
//!    └─────────────────────────────────┴──────────────────────┘
//!                                           < 2 touches
//! ```
//!
//! Panning applies deltas incrementally against the last position. Pinching
//! re-derives scale and translation from the snapshot taken when the second
//! touch landed, so rounding never accumulates over a long gesture.
//!
//! Only one session exists at a time; a pinch supersedes a pan.

use super::viewport::ViewportState;
use crate::config::{WHEEL_ZOOM_IN_FACTOR, WHEEL_ZOOM_OUT_FACTOR};
use crate::domain::{clamp_scale, Point, Transform};

/// Pinches whose start distance is below this are treated as degenerate.
const MIN_PINCH_DISTANCE: f32 = f32::EPSILON;

/// Raw input in client coordinates.
///
/// Touch events carry every touch that is still active after the event, the
/// way browsers and most windowing toolkits report them.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown(Point),
    PointerMove(Point),
    PointerUp,
    PointerLeave,
    TouchStart(Vec<Point>),
    TouchMove(Vec<Point>),
    TouchEnd(Vec<Point>),
    /// Scroll wheel; positive `delta_y` scrolls down and zooms out.
    Wheel {
        delta_y: f32,
    },
}

/// The active interaction, if any.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GestureSession {
    #[default]
    Idle,
    Panning {
        /// Last pointer position in viewport-local coordinates.
        last: Point,
    },
    Pinching {
        /// Local touch positions when the pinch began.
        start_touches: [Point; 2],
        /// Transform when the pinch began.
        start: Transform,
    },
}

/// Why an event was dropped without changing the transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// No source image is loaded.
    NoSource,
    /// The session is not accepting adjustments (a result is captured).
    NotAdjusting,
    /// The pinch started with both touches on the same spot.
    DegeneratePinch,
    /// A touch event carried a count the current state cannot use.
    MalformedTouches,
}

/// Result of feeding one event to the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureOutcome {
    /// The transform changed.
    Updated(Transform),
    /// The event was consumed (session bookkeeping only).
    Unchanged,
    /// The event was a routine no-op input condition.
    Ignored(IgnoreReason),
}

impl GestureOutcome {
    /// The new transform, if the event produced one.
    #[must_use]
    pub fn transform(self) -> Option<Transform> {
        match self {
            GestureOutcome::Updated(transform) => Some(transform),
            _ => None,
        }
    }
}

/// Owns the single gesture session and the viewport geometry it maps through.
#[derive(Debug, Clone, Default)]
pub struct GestureController {
    session: GestureSession,
    viewport: ViewportState,
}

impl GestureController {
    #[must_use]
    pub fn new(viewport: ViewportState) -> Self {
        Self {
            session: GestureSession::Idle,
            viewport,
        }
    }

    #[must_use]
    pub fn session(&self) -> GestureSession {
        self.session
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.session != GestureSession::Idle
    }

    #[must_use]
    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut ViewportState {
        &mut self.viewport
    }

    /// Drops any running session.
    pub fn cancel(&mut self) {
        self.session = GestureSession::Idle;
    }

    /// Feeds one event. `current` is the transform the event applies to.
    ///
    /// Without a loaded source, starting events are ignored and any running
    /// session is dropped.
    pub fn handle(
        &mut self,
        event: &InputEvent,
        current: Transform,
        source_loaded: bool,
    ) -> GestureOutcome {
        if !source_loaded {
            self.cancel();
            return GestureOutcome::Ignored(IgnoreReason::NoSource);
        }

        match event {
            InputEvent::PointerDown(position) => self.pointer_down(*position),
            InputEvent::PointerMove(position) => self.pointer_move(*position, current),
            InputEvent::PointerUp | InputEvent::PointerLeave => self.pointer_up(),
            InputEvent::TouchStart(touches) => self.touch_start(touches, current),
            InputEvent::TouchMove(touches) => self.touch_move(touches, current),
            InputEvent::TouchEnd(touches) => self.touch_end(touches),
            InputEvent::Wheel { delta_y } => Self::wheel(*delta_y, current),
        }
    }

    // =========================================================================
    // Pointer
    // =========================================================================

    fn pointer_down(&mut self, position: Point) -> GestureOutcome {
        // A mouse press does not interrupt a running pinch
        if matches!(self.session, GestureSession::Pinching { .. }) {
            return GestureOutcome::Unchanged;
        }
        self.session = GestureSession::Panning {
            last: self.viewport.to_local(position),
        };
        GestureOutcome::Unchanged
    }

    fn pointer_move(&mut self, position: Point, current: Transform) -> GestureOutcome {
        match self.session {
            GestureSession::Panning { last } => {
                let local = self.viewport.to_local(position);
                self.session = GestureSession::Panning { last: local };
                GestureOutcome::Updated(current.apply_pan(local - last))
            }
            _ => GestureOutcome::Unchanged,
        }
    }

    fn pointer_up(&mut self) -> GestureOutcome {
        if matches!(self.session, GestureSession::Panning { .. }) {
            self.session = GestureSession::Idle;
        }
        GestureOutcome::Unchanged
    }

    // =========================================================================
    // Touch
    // =========================================================================

    fn touch_start(&mut self, touches: &[Point], current: Transform) -> GestureOutcome {
        match touches {
            [single] => {
                if !matches!(self.session, GestureSession::Pinching { .. }) {
                    self.session = GestureSession::Panning {
                        last: self.viewport.to_local(*single),
                    };
                }
                GestureOutcome::Unchanged
            }
            [first, second] => {
                self.session = GestureSession::Pinching {
                    start_touches: [
                        self.viewport.to_local(*first),
                        self.viewport.to_local(*second),
                    ],
                    start: current,
                };
                GestureOutcome::Unchanged
            }
            _ => GestureOutcome::Ignored(IgnoreReason::MalformedTouches),
        }
    }

    fn touch_move(&mut self, touches: &[Point], current: Transform) -> GestureOutcome {
        match (self.session, touches) {
            (GestureSession::Panning { .. }, [single]) => self.pointer_move(*single, current),
            (
                GestureSession::Pinching {
                    start_touches,
                    start,
                },
                [first, second],
            ) => {
                let now = [
                    self.viewport.to_local(*first),
                    self.viewport.to_local(*second),
                ];
                pinch(start_touches, start, now)
            }
            (GestureSession::Idle, _) => GestureOutcome::Unchanged,
            _ => GestureOutcome::Ignored(IgnoreReason::MalformedTouches),
        }
    }

    fn touch_end(&mut self, remaining: &[Point]) -> GestureOutcome {
        match (self.session, remaining.len()) {
            (GestureSession::Pinching { .. }, n) if n >= 2 => {}
            _ => self.session = GestureSession::Idle,
        }
        GestureOutcome::Unchanged
    }

    // =========================================================================
    // Wheel
    // =========================================================================

    fn wheel(delta_y: f32, current: Transform) -> GestureOutcome {
        if !delta_y.is_finite() {
            return GestureOutcome::Unchanged;
        }
        let factor = if delta_y > 0.0 {
            WHEEL_ZOOM_OUT_FACTOR
        } else {
            WHEEL_ZOOM_IN_FACTOR
        };
        GestureOutcome::Updated(current.apply_zoom_delta(factor))
    }
}

/// Derives the pinch transform from the pinch-start snapshot.
fn pinch(start_touches: [Point; 2], start: Transform, now: [Point; 2]) -> GestureOutcome {
    let start_distance = start_touches[0].distance(start_touches[1]);
    if start_distance < MIN_PINCH_DISTANCE {
        return GestureOutcome::Ignored(IgnoreReason::DegeneratePinch);
    }

    let current_distance = now[0].distance(now[1]);
    let new_scale = clamp_scale(start.scale.value() * current_distance / start_distance);

    let start_mid = start_touches[0].midpoint(start_touches[1]);
    let current_mid = now[0].midpoint(now[1]);
    let delta = (current_mid - start_mid) / new_scale;

    GestureOutcome::Updated(
        start
            .with_scale(new_scale)
            .with_translation(start.translation + delta),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Rect, Vector};
    use crate::test_utils::assert_abs_diff_eq;

    fn controller() -> GestureController {
        GestureController::new(ViewportState::new(288.0, 0.0))
    }

    fn feed(
        controller: &mut GestureController,
        transform: &mut Transform,
        event: InputEvent,
    ) -> GestureOutcome {
        let outcome = controller.handle(&event, *transform, true);
        if let Some(updated) = outcome.transform() {
            *transform = updated;
        }
        outcome
    }

    #[test]
    fn pan_adds_pointer_delta() {
        let mut c = controller();
        let mut t = Transform::IDENTITY;

        feed(&mut c, &mut t, InputEvent::PointerDown(Point::new(50.0, 50.0)));
        feed(&mut c, &mut t, InputEvent::PointerMove(Point::new(70.0, 65.0)));

        assert_eq!(t.translation, Vector::new(20.0, 15.0));
        assert_eq!(t.scale.value(), 1.0);
    }

    #[test]
    fn pan_is_incremental() {
        let mut c = controller();
        let mut t = Transform::IDENTITY;

        feed(&mut c, &mut t, InputEvent::PointerDown(Point::new(0.0, 0.0)));
        feed(&mut c, &mut t, InputEvent::PointerMove(Point::new(10.0, 0.0)));
        feed(&mut c, &mut t, InputEvent::PointerMove(Point::new(15.0, 5.0)));

        assert_eq!(t.translation, Vector::new(15.0, 5.0));
    }

    #[test]
    fn pan_is_independent_of_viewport_offset() {
        let mut c = GestureController::new(ViewportState::new(288.0, 4.0));
        c.viewport_mut()
            .update_bounds(Rect::new(300.0, 200.0, 296.0, 296.0));
        let mut t = Transform::IDENTITY;

        feed(&mut c, &mut t, InputEvent::PointerDown(Point::new(350.0, 250.0)));
        assert_eq!(
            c.session(),
            GestureSession::Panning {
                last: Point::new(46.0, 46.0)
            }
        );
        feed(&mut c, &mut t, InputEvent::PointerMove(Point::new(370.0, 265.0)));
        assert_eq!(t.translation, Vector::new(20.0, 15.0));
    }

    #[test]
    fn move_without_press_does_nothing() {
        let mut c = controller();
        let mut t = Transform::IDENTITY;
        let outcome = feed(&mut c, &mut t, InputEvent::PointerMove(Point::new(70.0, 65.0)));
        assert_eq!(outcome, GestureOutcome::Unchanged);
        assert!(t.is_identity());
    }

    #[test]
    fn pointer_up_and_leave_end_pan() {
        let mut c = controller();
        let mut t = Transform::IDENTITY;

        feed(&mut c, &mut t, InputEvent::PointerDown(Point::new(0.0, 0.0)));
        feed(&mut c, &mut t, InputEvent::PointerUp);
        assert!(!c.is_active());

        feed(&mut c, &mut t, InputEvent::PointerDown(Point::new(0.0, 0.0)));
        feed(&mut c, &mut t, InputEvent::PointerLeave);
        assert!(!c.is_active());
    }

    #[test]
    fn pinch_doubles_scale() {
        let mut c = controller();
        let mut t = Transform::IDENTITY;

        feed(
            &mut c,
            &mut t,
            InputEvent::TouchStart(vec![Point::new(100.0, 100.0), Point::new(200.0, 100.0)]),
        );
        feed(
            &mut c,
            &mut t,
            InputEvent::TouchMove(vec![Point::new(50.0, 100.0), Point::new(250.0, 100.0)]),
        );

        assert_abs_diff_eq!(t.scale.value(), 2.0);
        assert_eq!(t.translation, Vector::ZERO);
    }

    #[test]
    fn pinch_rederives_from_snapshot() {
        let mut c = controller();
        let mut t = Transform::IDENTITY;

        feed(
            &mut c,
            &mut t,
            InputEvent::TouchStart(vec![Point::new(100.0, 100.0), Point::new(200.0, 100.0)]),
        );
        for _ in 0..5 {
            feed(
                &mut c,
                &mut t,
                InputEvent::TouchMove(vec![Point::new(50.0, 100.0), Point::new(250.0, 100.0)]),
            );
        }

        assert_abs_diff_eq!(t.scale.value(), 2.0);
    }

    #[test]
    fn pinch_midpoint_pans_divided_by_scale() {
        let mut c = controller();
        let mut t = Transform::IDENTITY;

        feed(
            &mut c,
            &mut t,
            InputEvent::TouchStart(vec![Point::new(100.0, 100.0), Point::new(200.0, 100.0)]),
        );
        // Distance doubles, midpoint moves by (40, 20)
        feed(
            &mut c,
            &mut t,
            InputEvent::TouchMove(vec![Point::new(90.0, 120.0), Point::new(290.0, 120.0)]),
        );

        assert_abs_diff_eq!(t.scale.value(), 2.0);
        assert_abs_diff_eq!(t.translation.x, 20.0);
        assert_abs_diff_eq!(t.translation.y, 10.0);
    }

    #[test]
    fn pinch_scale_is_clamped() {
        let mut c = controller();
        let mut t = Transform::IDENTITY;

        feed(
            &mut c,
            &mut t,
            InputEvent::TouchStart(vec![Point::new(100.0, 100.0), Point::new(110.0, 100.0)]),
        );
        feed(
            &mut c,
            &mut t,
            InputEvent::TouchMove(vec![Point::new(0.0, 100.0), Point::new(500.0, 100.0)]),
        );

        assert_eq!(t.scale.value(), 3.0);
    }

    #[test]
    fn degenerate_pinch_is_ignored() {
        let mut c = controller();
        let mut t = Transform::IDENTITY.with_scale(1.5);

        feed(
            &mut c,
            &mut t,
            InputEvent::TouchStart(vec![Point::new(100.0, 100.0), Point::new(100.0, 100.0)]),
        );
        let outcome = feed(
            &mut c,
            &mut t,
            InputEvent::TouchMove(vec![Point::new(50.0, 100.0), Point::new(250.0, 100.0)]),
        );

        assert_eq!(
            outcome,
            GestureOutcome::Ignored(IgnoreReason::DegeneratePinch)
        );
        assert_eq!(t.scale.value(), 1.5);
    }

    #[test]
    fn second_touch_supersedes_pan() {
        let mut c = controller();
        let mut t = Transform::IDENTITY;

        feed(&mut c, &mut t, InputEvent::TouchStart(vec![Point::new(10.0, 10.0)]));
        assert!(matches!(c.session(), GestureSession::Panning { .. }));

        feed(
            &mut c,
            &mut t,
            InputEvent::TouchStart(vec![Point::new(10.0, 10.0), Point::new(60.0, 10.0)]),
        );
        assert!(matches!(c.session(), GestureSession::Pinching { .. }));

        feed(&mut c, &mut t, InputEvent::TouchEnd(vec![Point::new(10.0, 10.0)]));
        assert_eq!(c.session(), GestureSession::Idle);
    }

    #[test]
    fn single_touch_pans() {
        let mut c = controller();
        let mut t = Transform::IDENTITY;

        feed(&mut c, &mut t, InputEvent::TouchStart(vec![Point::new(50.0, 50.0)]));
        feed(&mut c, &mut t, InputEvent::TouchMove(vec![Point::new(70.0, 65.0)]));
        feed(&mut c, &mut t, InputEvent::TouchEnd(vec![]));

        assert_eq!(t.translation, Vector::new(20.0, 15.0));
        assert!(!c.is_active());
    }

    #[test]
    fn malformed_touch_counts_are_ignored() {
        let mut c = controller();
        let mut t = Transform::IDENTITY;

        let three = vec![Point::ORIGIN, Point::new(1.0, 1.0), Point::new(2.0, 2.0)];
        assert_eq!(
            feed(&mut c, &mut t, InputEvent::TouchStart(three)),
            GestureOutcome::Ignored(IgnoreReason::MalformedTouches)
        );

        feed(&mut c, &mut t, InputEvent::TouchStart(vec![Point::ORIGIN]));
        assert_eq!(
            feed(
                &mut c,
                &mut t,
                InputEvent::TouchMove(vec![Point::ORIGIN, Point::new(5.0, 5.0)])
            ),
            GestureOutcome::Ignored(IgnoreReason::MalformedTouches)
        );
        assert!(t.is_identity());
    }

    #[test]
    fn wheel_zooms_by_fixed_factors() {
        let mut c = controller();
        let mut t = Transform::IDENTITY;

        feed(&mut c, &mut t, InputEvent::Wheel { delta_y: 120.0 });
        assert_abs_diff_eq!(t.scale.value(), 0.9);

        feed(&mut c, &mut t, InputEvent::Wheel { delta_y: -120.0 });
        assert_abs_diff_eq!(t.scale.value(), 0.99, epsilon = 1e-6);

        for _ in 0..50 {
            feed(&mut c, &mut t, InputEvent::Wheel { delta_y: 1.0 });
        }
        assert_eq!(t.scale.value(), 0.5);
    }

    #[test]
    fn events_without_source_are_ignored() {
        let mut c = controller();
        let outcome = c.handle(
            &InputEvent::PointerDown(Point::new(1.0, 1.0)),
            Transform::IDENTITY,
            false,
        );
        assert_eq!(outcome, GestureOutcome::Ignored(IgnoreReason::NoSource));
        assert!(!c.is_active());

        let outcome = c.handle(
            &InputEvent::Wheel { delta_y: 1.0 },
            Transform::IDENTITY,
            false,
        );
        assert_eq!(outcome, GestureOutcome::Ignored(IgnoreReason::NoSource));
    }
}
