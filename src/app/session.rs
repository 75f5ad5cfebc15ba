// SPDX-License-Identifier: MPL-2.0
//! Capture session: the acquire, adjust, capture and retake cycle.
//!
//! ```text
//!   AwaitingSource ──load──▶ Adjusting ──capture──▶ Captured
//!                               ▲  ▲                   │
//!                               │  └──────retake───────┘
//!                               └── load (fresh transform) from any state
//! ```
//!
//! The session owns the single [`Transform`], the gesture controller, both
//! image slots and the optional live camera. Routine conditions (gestures
//! without a source, capture before the overlay is ready) come back as
//! outcomes; only resource failures are returned as errors.

use crate::config::{Config, RetakePolicy, DEFAULT_OUTPUT_DIAMETER};
use crate::domain::Transform;
use crate::error::{AcquisitionError, Result};
use crate::media::{
    Compositor, CapturedResult, FrameGrabber, ImageSlot, OverlayTemplate, SlotStatus,
    SourceImage, SourceKind,
};
use crate::ui::state::{
    ControlAction, GestureController, GestureOutcome, IgnoreReason, InputEvent, ViewportState,
};
use crate::ui::{render_preview, PreviewLayout, PreviewSettings};
use image_rs::RgbaImage;
use std::sync::Arc;

/// Where the session is in the capture cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// No source image yet.
    AwaitingSource,
    /// A source is loaded and no result exists.
    Adjusting,
    /// A result exists.
    Captured,
}

/// Why [`CaptureSession::capture`] did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotReadyReason {
    NoSource,
    /// The overlay template is still loading.
    OverlayPending,
    /// The overlay template failed to load; capture stays disabled.
    OverlayUnavailable,
    AlreadyCaptured,
}

/// Result of a capture request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    Captured,
    NotReady(NotReadyReason),
}

/// Session-wide settings, usually derived from [`Config`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSettings {
    pub output_diameter: u32,
    pub preview: PreviewSettings,
    pub retake_policy: RetakePolicy,
    /// Whether live camera frames are shown (and exported) mirrored.
    pub mirror_camera: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            output_diameter: DEFAULT_OUTPUT_DIAMETER,
            preview: PreviewSettings::default(),
            retake_policy: RetakePolicy::default(),
            mirror_camera: true,
        }
    }
}

impl From<&Config> for SessionSettings {
    fn from(config: &Config) -> Self {
        Self {
            output_diameter: config.output_diameter(),
            preview: PreviewSettings::from(config),
            retake_policy: config.retake_policy(),
            mirror_camera: config.mirror_camera(),
        }
    }
}

/// One profile-picture session.
pub struct CaptureSession {
    settings: SessionSettings,
    state: CaptureState,
    source: Option<Arc<SourceImage>>,
    pending_source: ImageSlot<SourceImage>,
    overlay: ImageSlot<OverlayTemplate>,
    overlay_failure_logged: bool,
    transform: Transform,
    gestures: GestureController,
    camera: Option<Box<dyn FrameGrabber>>,
    result: Option<CapturedResult>,
}

impl std::fmt::Debug for CaptureSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureSession")
            .field("state", &self.state)
            .field("transform", &self.transform)
            .field("overlay", &self.overlay)
            .field("camera_attached", &self.camera.is_some())
            .finish_non_exhaustive()
    }
}

impl CaptureSession {
    /// Starts a session. `overlay` is usually a pending slot filled in the
    /// background.
    #[must_use]
    pub fn new(settings: SessionSettings, overlay: ImageSlot<OverlayTemplate>) -> Self {
        let viewport = ViewportState::new(settings.preview.diameter, settings.preview.border_width);
        Self {
            settings,
            state: CaptureState::AwaitingSource,
            source: None,
            pending_source: ImageSlot::empty(),
            overlay,
            overlay_failure_logged: false,
            transform: Transform::IDENTITY,
            gestures: GestureController::new(viewport),
            camera: None,
            result: None,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    #[must_use]
    pub fn state(&self) -> CaptureState {
        self.state
    }

    #[must_use]
    pub fn transform(&self) -> Transform {
        self.transform
    }

    #[must_use]
    pub fn source(&self) -> Option<&Arc<SourceImage>> {
        self.source.as_ref()
    }

    #[must_use]
    pub fn overlay_status(&self) -> SlotStatus {
        self.overlay.status()
    }

    #[must_use]
    pub fn result(&self) -> Option<&CapturedResult> {
        self.result.as_ref()
    }

    #[must_use]
    pub fn has_camera(&self) -> bool {
        self.camera.is_some()
    }

    pub fn viewport_mut(&mut self) -> &mut ViewportState {
        self.gestures.viewport_mut()
    }

    // =========================================================================
    // Source Acquisition
    // =========================================================================

    /// Installs a decoded source and starts adjusting with a fresh transform.
    ///
    /// A file source ends any live camera stream.
    pub fn load_source(&mut self, source: SourceImage) {
        if source.kind() == SourceKind::File {
            self.release_camera();
        }

        tracing::info!(
            width = source.width(),
            height = source.height(),
            kind = ?source.kind(),
            "source loaded"
        );
        self.source = Some(Arc::new(source));
        self.pending_source = ImageSlot::empty();
        self.transform = Transform::IDENTITY;
        self.result = None;
        self.gestures.cancel();
        self.state = CaptureState::Adjusting;
    }

    /// Tracks a source being decoded in the background. It replaces the
    /// current source once [`Self::poll`] or [`Self::settle`] sees it ready.
    pub fn begin_source_load(&mut self, slot: ImageSlot<SourceImage>) {
        self.pending_source = slot;
    }

    /// Hands a live camera stream to the session, releasing any previous one.
    pub fn attach_camera(&mut self, grabber: Box<dyn FrameGrabber>) {
        self.release_camera();
        self.camera = Some(grabber);
        tracing::debug!("camera attached");
    }

    /// Takes the camera's current frame as the source.
    ///
    /// # Errors
    ///
    /// Returns an [`AcquisitionError`] if no camera is attached or no frame
    /// could be grabbed. The camera is released on failure and the session
    /// state is left unchanged.
    pub fn grab_camera_frame(&mut self) -> Result<()> {
        let Some(camera) = self.camera.as_mut() else {
            return Err(AcquisitionError::DeviceUnavailable.into());
        };

        match camera.grab_frame() {
            Ok(frame) => {
                self.load_source(frame);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "camera frame grab failed");
                self.release_camera();
                Err(e)
            }
        }
    }

    /// Picks up finished background loads without blocking.
    ///
    /// # Errors
    ///
    /// Returns the acquisition error of a failed source load. The previous
    /// state is kept.
    pub fn poll(&mut self) -> Result<()> {
        self.overlay.poll();
        self.pending_source.poll();
        self.absorb_loads()
    }

    /// Waits for every pending background load, then behaves like [`Self::poll`].
    ///
    /// # Errors
    ///
    /// Same as [`Self::poll`].
    pub async fn settle(&mut self) -> Result<()> {
        self.overlay.resolve().await;
        self.pending_source.resolve().await;
        self.absorb_loads()
    }

    fn absorb_loads(&mut self) -> Result<()> {
        if self.overlay.is_failed() && !self.overlay_failure_logged {
            self.overlay_failure_logged = true;
            if let Some(e) = self.overlay.error() {
                tracing::warn!(error = %e, "overlay template unavailable, capture disabled");
            }
        }

        match self.pending_source.status() {
            SlotStatus::Ready => {
                if let Some(source) = self.pending_source.get() {
                    let source = SourceImage::clone(source);
                    self.load_source(source);
                }
                Ok(())
            }
            SlotStatus::Failed => {
                let slot = std::mem::take(&mut self.pending_source);
                match slot.error() {
                    Some(e) => {
                        tracing::warn!(error = %e, "source load failed");
                        Err(e.clone())
                    }
                    None => Ok(()),
                }
            }
            SlotStatus::Empty | SlotStatus::Pending => Ok(()),
        }
    }

    // =========================================================================
    // Adjustment
    // =========================================================================

    /// Routes a pointer, touch or wheel event to the gesture controller.
    pub fn handle_input(&mut self, event: &InputEvent) -> GestureOutcome {
        if let Some(reason) = self.adjust_blocker() {
            self.gestures.cancel();
            return GestureOutcome::Ignored(reason);
        }

        let outcome = self.gestures.handle(event, self.transform, true);
        if let GestureOutcome::Updated(transform) = outcome {
            self.transform = transform;
        }
        outcome
    }

    /// Applies a button or preset action.
    pub fn apply_control(&mut self, action: ControlAction) -> GestureOutcome {
        if let Some(reason) = self.adjust_blocker() {
            return GestureOutcome::Ignored(reason);
        }
        self.transform = action.apply(self.transform);
        GestureOutcome::Updated(self.transform)
    }

    fn adjust_blocker(&self) -> Option<IgnoreReason> {
        match self.state {
            CaptureState::AwaitingSource => Some(IgnoreReason::NoSource),
            CaptureState::Adjusting => None,
            CaptureState::Captured => Some(IgnoreReason::NotAdjusting),
        }
    }

    /// Placement of the source element for retained-mode hosts.
    #[must_use]
    pub fn preview_layout(&self) -> Option<PreviewLayout> {
        self.source
            .as_ref()
            .map(|source| PreviewLayout::compute(source, &self.transform, &self.settings.preview))
    }

    /// Rasterized preview frame, or `None` before a source is loaded.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame cannot be rendered.
    pub fn render_preview(&self) -> Result<Option<RgbaImage>> {
        let Some(source) = self.source.as_ref() else {
            return Ok(None);
        };
        let overlay = self.overlay.get().map(|overlay| &**overlay);
        render_preview(source, &self.transform, overlay, &self.settings.preview).map(Some)
    }

    // =========================================================================
    // Capture
    // =========================================================================

    /// Whether [`Self::capture`] would produce a result right now.
    #[must_use]
    pub fn can_capture(&self) -> bool {
        self.state == CaptureState::Adjusting && self.source.is_some() && self.overlay.is_ready()
    }

    /// Composites the current framing into the output raster.
    ///
    /// Does nothing (and reports why) unless a source is being adjusted and
    /// the overlay is ready. On success the camera stream is released.
    ///
    /// # Errors
    ///
    /// Returns an error only if rendering itself fails; the state is then
    /// left unchanged.
    pub fn capture(&mut self) -> Result<CaptureOutcome> {
        self.overlay.poll();

        let source = match (self.state, self.source.as_ref()) {
            (CaptureState::Captured, _) => {
                return Ok(CaptureOutcome::NotReady(NotReadyReason::AlreadyCaptured))
            }
            (_, None) | (CaptureState::AwaitingSource, _) => {
                return Ok(CaptureOutcome::NotReady(NotReadyReason::NoSource))
            }
            (CaptureState::Adjusting, Some(source)) => Arc::clone(source),
        };

        let overlay = match self.overlay.status() {
            SlotStatus::Ready => match self.overlay.get() {
                Some(overlay) => Arc::clone(overlay),
                None => return Ok(CaptureOutcome::NotReady(NotReadyReason::OverlayUnavailable)),
            },
            SlotStatus::Pending => {
                tracing::debug!("capture ignored, overlay still loading");
                return Ok(CaptureOutcome::NotReady(NotReadyReason::OverlayPending));
            }
            SlotStatus::Empty | SlotStatus::Failed => {
                return Ok(CaptureOutcome::NotReady(NotReadyReason::OverlayUnavailable))
            }
        };

        let compositor = Compositor::new(self.settings.output_diameter, self.settings.preview.diameter);
        let result = compositor.compose(&source, &self.transform, &overlay)?;

        tracing::info!(
            diameter = self.settings.output_diameter,
            scale = self.transform.scale.value(),
            rotation = self.transform.rotation_degrees,
            "captured result"
        );
        self.result = Some(result);
        self.state = CaptureState::Captured;
        self.gestures.cancel();
        self.release_camera();
        Ok(CaptureOutcome::Captured)
    }

    /// Discards the result and goes back to adjusting the same source.
    ///
    /// The transform is reset or kept according to the retake policy.
    /// Returns `false` when there was nothing to retake.
    pub fn retake(&mut self) -> bool {
        if self.state != CaptureState::Captured {
            return false;
        }

        self.result = None;
        self.state = CaptureState::Adjusting;
        if self.settings.retake_policy == RetakePolicy::Reset {
            self.transform = Transform::IDENTITY;
        }
        tracing::debug!(policy = ?self.settings.retake_policy, "retake");
        true
    }

    fn release_camera(&mut self) {
        if let Some(mut camera) = self.camera.take() {
            camera.release();
            tracing::debug!("camera released");
        }
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.release_camera();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Point, Vector};
    use crate::error::Error;
    use crate::media::StillFrameGrabber;
    use crate::ui::state::SizePreset;
    use image_rs::Rgba;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Stream that opens fine but never delivers a frame.
    struct FailingGrabber {
        released: Arc<AtomicBool>,
    }

    impl FrameGrabber for FailingGrabber {
        fn grab_frame(&mut self) -> Result<SourceImage> {
            Err(AcquisitionError::FrameUnavailable("timeout".into()).into())
        }

        fn release(&mut self) {
            self.released.store(true, Ordering::SeqCst);
        }

        fn is_released(&self) -> bool {
            self.released.load(Ordering::SeqCst)
        }
    }

    fn settings() -> SessionSettings {
        SessionSettings {
            output_diameter: 64,
            preview: PreviewSettings {
                diameter: 32.0,
                border_width: 0.0,
                overlay_opacity: 0.6,
            },
            ..SessionSettings::default()
        }
    }

    fn source(kind: SourceKind) -> SourceImage {
        SourceImage::from_rgba(RgbaImage::from_pixel(8, 6, Rgba([200, 10, 10, 255])), kind)
            .expect("source")
    }

    fn overlay() -> OverlayTemplate {
        OverlayTemplate::from_rgba(RgbaImage::new(8, 8)).expect("overlay")
    }

    fn ready_session() -> CaptureSession {
        CaptureSession::new(settings(), ImageSlot::ready(overlay()))
    }

    #[test]
    fn new_session_awaits_source() {
        let mut session = ready_session();
        assert_eq!(session.state(), CaptureState::AwaitingSource);
        assert!(!session.can_capture());
        assert_eq!(
            session.capture().expect("capture"),
            CaptureOutcome::NotReady(NotReadyReason::NoSource)
        );
    }

    #[test]
    fn gestures_need_a_source() {
        let mut session = ready_session();
        let outcome = session.handle_input(&InputEvent::Wheel { delta_y: 1.0 });
        assert_eq!(outcome, GestureOutcome::Ignored(IgnoreReason::NoSource));
        assert!(session.transform().is_identity());
    }

    #[test]
    fn loading_resets_transform_and_result() {
        let mut session = ready_session();
        session.load_source(source(SourceKind::File));
        session.apply_control(ControlAction::Preset(SizePreset::Large));
        session.capture().expect("capture");
        assert_eq!(session.state(), CaptureState::Captured);

        session.load_source(source(SourceKind::File));
        assert_eq!(session.state(), CaptureState::Adjusting);
        assert!(session.transform().is_identity());
        assert!(session.result().is_none());
    }

    #[test]
    fn pan_gesture_moves_transform() {
        let mut session = ready_session();
        session.load_source(source(SourceKind::File));

        session.handle_input(&InputEvent::PointerDown(Point::new(50.0, 50.0)));
        session.handle_input(&InputEvent::PointerMove(Point::new(70.0, 65.0)));
        session.handle_input(&InputEvent::PointerUp);

        assert_eq!(session.transform().translation, Vector::new(20.0, 15.0));
    }

    #[test]
    fn capture_is_noop_while_overlay_pending() {
        let (slot, _sender) = ImageSlot::pending();
        let mut session = CaptureSession::new(settings(), slot);
        session.load_source(source(SourceKind::File));

        assert!(!session.can_capture());
        assert_eq!(
            session.capture().expect("capture"),
            CaptureOutcome::NotReady(NotReadyReason::OverlayPending)
        );
        assert_eq!(session.state(), CaptureState::Adjusting);
    }

    #[test]
    fn capture_picks_up_overlay_delivered_meanwhile() {
        let (slot, sender) = ImageSlot::pending();
        let mut session = CaptureSession::new(settings(), slot);
        session.load_source(source(SourceKind::File));

        sender.resolve(Ok(overlay()));
        assert_eq!(session.capture().expect("capture"), CaptureOutcome::Captured);
    }

    #[test]
    fn failed_overlay_disables_capture() {
        let mut session = CaptureSession::new(
            settings(),
            ImageSlot::failed(Error::TemplateLoad("missing".into())),
        );
        session.load_source(source(SourceKind::File));
        session.poll().expect("poll");

        assert_eq!(
            session.capture().expect("capture"),
            CaptureOutcome::NotReady(NotReadyReason::OverlayUnavailable)
        );
    }

    #[test]
    fn capture_locks_adjustments_until_retake() {
        let mut session = ready_session();
        session.load_source(source(SourceKind::File));
        session.apply_control(ControlAction::RotateClockwise);

        assert_eq!(session.capture().expect("capture"), CaptureOutcome::Captured);
        assert_eq!(session.result().map(CapturedResult::width), Some(64));
        assert_eq!(
            session.apply_control(ControlAction::ZoomIn),
            GestureOutcome::Ignored(IgnoreReason::NotAdjusting)
        );
        assert_eq!(
            session.capture().expect("capture"),
            CaptureOutcome::NotReady(NotReadyReason::AlreadyCaptured)
        );

        assert!(session.retake());
        assert_eq!(session.state(), CaptureState::Adjusting);
        assert!(session.source().is_some());
        assert!(session.result().is_none());
        assert!(session.transform().is_identity());
        assert!(!session.retake());
    }

    #[test]
    fn retake_can_preserve_transform() {
        let mut session = CaptureSession::new(
            SessionSettings {
                retake_policy: RetakePolicy::Preserve,
                ..settings()
            },
            ImageSlot::ready(overlay()),
        );
        session.load_source(source(SourceKind::File));
        session.apply_control(ControlAction::Preset(SizePreset::Small));
        session.capture().expect("capture");
        session.retake();

        assert_eq!(session.transform().scale.value(), 0.7);
    }

    #[test]
    fn camera_is_released_on_capture() {
        let grabber = StillFrameGrabber::new(source(SourceKind::Camera { mirrored: true }));
        let released = grabber.release_flag();

        let mut session = ready_session();
        session.attach_camera(Box::new(grabber));
        session.grab_camera_frame().expect("grab");
        assert_eq!(session.state(), CaptureState::Adjusting);
        assert!(session.has_camera());
        assert!(!released.load(Ordering::SeqCst));

        session.capture().expect("capture");
        assert!(!session.has_camera());
        assert!(released.load(Ordering::SeqCst));
    }

    #[test]
    fn camera_is_released_on_grab_failure() {
        let released = Arc::new(AtomicBool::new(false));
        let mut session = ready_session();
        session.attach_camera(Box::new(FailingGrabber {
            released: Arc::clone(&released),
        }));

        let err = session.grab_camera_frame().expect_err("failing grabber");
        assert!(matches!(
            err,
            Error::Acquisition(AcquisitionError::FrameUnavailable(_))
        ));
        assert_eq!(session.state(), CaptureState::AwaitingSource);
        assert!(!session.has_camera());
        assert!(released.load(Ordering::SeqCst));
    }

    #[test]
    fn camera_is_released_when_session_ends() {
        let grabber = StillFrameGrabber::new(source(SourceKind::Camera { mirrored: true }));
        let released = grabber.release_flag();
        {
            let mut session = ready_session();
            session.attach_camera(Box::new(grabber));
        }
        assert!(released.load(Ordering::SeqCst));
    }

    #[test]
    fn grab_without_camera_fails() {
        let mut session = ready_session();
        assert!(matches!(
            session.grab_camera_frame(),
            Err(Error::Acquisition(AcquisitionError::DeviceUnavailable))
        ));
    }

    #[test]
    fn failed_source_load_keeps_state() {
        let mut session = ready_session();
        let (slot, sender) = ImageSlot::pending();
        session.begin_source_load(slot);
        sender.resolve(Err(AcquisitionError::UnreadableFile("bad".into()).into()));

        assert!(session.poll().is_err());
        assert_eq!(session.state(), CaptureState::AwaitingSource);
        assert!(session.source().is_none());
        assert!(session.poll().is_ok());
    }

    #[test]
    fn pending_source_is_installed_on_poll() {
        let mut session = ready_session();
        let (slot, sender) = ImageSlot::pending();
        session.begin_source_load(slot);
        session.poll().expect("poll");
        assert_eq!(session.state(), CaptureState::AwaitingSource);

        sender.resolve(Ok(source(SourceKind::File)));
        session.poll().expect("poll");
        assert_eq!(session.state(), CaptureState::Adjusting);
    }

    #[test]
    fn preview_follows_source() {
        let mut session = ready_session();
        assert!(session.render_preview().expect("preview").is_none());
        assert!(session.preview_layout().is_none());

        session.load_source(source(SourceKind::File));
        let frame = session.render_preview().expect("preview").expect("frame");
        assert_eq!(frame.dimensions(), (32, 32));
        assert!(session.preview_layout().is_some());
    }
}
