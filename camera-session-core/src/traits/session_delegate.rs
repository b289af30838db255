use crate::models::artifact::RecordingArtifact;
use crate::models::error::CameraError;
use crate::models::frame::CapturedFrame;
use crate::models::state::SessionState;

/// Completion callback for a still capture.
pub type CaptureCallback = Box<dyn FnOnce(Result<CapturedFrame, CameraError>) + Send + 'static>;

/// Completion callback for `start_recording`; fires once the encoder is
/// running (or the rebuild rolled back).
pub type RecordingStartCallback = Box<dyn FnOnce(Result<(), CameraError>) + Send + 'static>;

/// Completion callback for `stop_recording`, carrying the finalized
/// artifact.
pub type RecordingStopCallback =
    Box<dyn FnOnce(Result<RecordingArtifact, CameraError>) + Send + 'static>;

/// Observation channel for session lifecycle events.
///
/// All methods are invoked from the session worker thread, never the
/// caller's. Implementations should marshal to their own context and
/// must not block; calling back into the controller is allowed (the
/// controller only enqueues).
pub trait SessionDelegate: Send + Sync {
    /// Called after every state transition.
    fn on_state_changed(&self, state: &SessionState);

    /// Called for every failure the session reports, alongside the state
    /// transition it caused (if any).
    fn on_error(&self, error: &CameraError);
}
