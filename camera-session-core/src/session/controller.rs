use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;

use crate::models::config::{RecordingConfig, SessionConfig};
use crate::models::controls::{FlashMode, FocusPoint};
use crate::models::error::CameraError;
use crate::models::state::SessionState;
use crate::traits::device_registry::DeviceRegistry;
use crate::traits::encoder::EncoderFactory;
use crate::traits::session_delegate::{
    CaptureCallback, RecordingStartCallback, RecordingStopCallback, SessionDelegate,
};

use super::commands::{Command, SessionMessage};
use super::surfaces::SurfaceInfo;
use super::worker::SessionWorker;

/// The operation currently holding the session exclusively. At most one
/// exists; while it does, neither a capture nor a recording start is
/// admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExclusiveOp {
    StillCapture,
    RecordingStart,
}

impl ExclusiveOp {
    fn describe(&self) -> &'static str {
        match self {
            ExclusiveOp::StillCapture => "a still capture is already in flight",
            ExclusiveOp::RecordingStart => "a recording start is already in flight",
        }
    }
}

/// Snapshot shared between the call boundary and the worker. The worker
/// is the only writer of `state`; the boundary sets `exclusive` when
/// admitting an exclusive operation and the worker clears it when that
/// operation resolves. Admission check and flag set happen under one
/// lock hold, so two racing callers cannot both pass.
pub(crate) struct Shared {
    pub(crate) state: SessionState,
    pub(crate) exclusive: Option<ExclusiveOp>,
}

/// Arbitrates a single capture device among live preview, still capture,
/// and video recording.
///
/// All hardware objects live on a dedicated worker thread; every method
/// here validates against the published snapshot and enqueues a command
/// for that thread, so calls are cheap and safe from any thread,
/// including delegate callbacks. Commands and hardware completions share
/// one queue and are applied strictly in arrival order.
///
/// A typical session:
///
/// - [`surface_ready`](Self::surface_ready) hands over the render target,
///   [`open`](Self::open) acquires the device; the session settles in
///   `PreviewActive`.
/// - [`capture`](Self::capture) and
///   [`start_recording`](Self::start_recording) each claim the session
///   exclusively until their outcome is delivered.
/// - [`close`](Self::close) (or dropping the controller) releases
///   everything; a hardware failure parks the session in `Faulted`, and
///   a later `open()` starts over.
///
/// Outcomes of asynchronous operations arrive on the worker thread via
/// the per-call callback; lifecycle news arrives via the
/// [`SessionDelegate`].
pub struct SessionController {
    tx: Sender<SessionMessage>,
    shared: Arc<Mutex<Shared>>,
    registry: Arc<dyn DeviceRegistry>,
    config: SessionConfig,
    worker: Option<JoinHandle<()>>,
}

impl SessionController {
    /// Creates the controller and spawns its worker thread. The session
    /// starts `Closed`; nothing is acquired until [`open`](Self::open).
    pub fn new(
        registry: Arc<dyn DeviceRegistry>,
        encoders: Arc<dyn EncoderFactory>,
        delegate: Arc<dyn SessionDelegate>,
        config: SessionConfig,
    ) -> Result<Self, CameraError> {
        config.validate().map_err(CameraError::ConfigurationFailed)?;

        let (tx, rx) = mpsc::channel();
        let shared = Arc::new(Mutex::new(Shared {
            state: SessionState::Closed,
            exclusive: None,
        }));
        let worker = SessionWorker::new(
            rx,
            tx.clone(),
            Arc::clone(&shared),
            Arc::clone(&registry),
            encoders,
            delegate,
            config.clone(),
        );
        let handle = thread::Builder::new()
            .name("camera-session".to_string())
            .spawn(move || worker.run())
            .expect("failed to spawn camera session thread");

        Ok(Self {
            tx,
            shared,
            registry,
            config,
            worker: Some(handle),
        })
    }

    /// The current lifecycle state, as last published by the worker.
    pub fn state(&self) -> SessionState {
        self.shared.lock().state
    }

    /// Begins acquiring the configured device. No-op when a session is
    /// already live; fails fast when the registry lists no devices.
    /// Progress is reported through the delegate, ending in
    /// `PreviewActive` or `Faulted`.
    pub fn open(&self) -> Result<(), CameraError> {
        {
            let shared = self.shared.lock();
            if shared.state.holds_device() {
                log::debug!("open ignored, session already {:?}", shared.state);
                return Ok(());
            }
        }
        if self.registry.list_devices().is_empty() {
            return Err(CameraError::NoDeviceAvailable);
        }
        self.submit(Command::Open {
            selector: self.config.device_selector.clone(),
        });
        Ok(())
    }

    /// Begins teardown. Safe in any state and idempotent; the delegate
    /// sees `Closing` then `Closed` when there was a session to close.
    pub fn close(&self) {
        self.submit(Command::Close);
    }

    /// Requests one high-resolution still. Admitted only from
    /// `PreviewActive` with nothing else in flight; the preview stream
    /// halts for the duration and is restored afterwards no matter how
    /// the capture ends. `on_frame` is invoked exactly once, from the
    /// worker thread.
    pub fn capture(&self, on_frame: CaptureCallback) -> Result<(), CameraError> {
        {
            let mut shared = self.shared.lock();
            if shared.state != SessionState::PreviewActive {
                return Err(CameraError::InvalidState(format!(
                    "capture requires an active preview, session is {:?}",
                    shared.state
                )));
            }
            if let Some(op) = shared.exclusive {
                return Err(CameraError::InvalidState(op.describe().to_string()));
            }
            shared.exclusive = Some(ExclusiveOp::StillCapture);
        }
        self.submit(Command::Capture { on_frame });
        Ok(())
    }

    /// Rebuilds the stream for recording and starts the encoder.
    /// Admitted only from `PreviewActive` with nothing else in flight.
    /// On failure the session is rolled back to `PreviewActive` and
    /// `on_started` receives the cause.
    pub fn start_recording(
        &self,
        config: RecordingConfig,
        on_started: RecordingStartCallback,
    ) -> Result<(), CameraError> {
        config.validate().map_err(CameraError::ConfigurationFailed)?;
        {
            let mut shared = self.shared.lock();
            if shared.state != SessionState::PreviewActive {
                return Err(CameraError::InvalidState(format!(
                    "recording requires an active preview, session is {:?}",
                    shared.state
                )));
            }
            if let Some(op) = shared.exclusive {
                return Err(CameraError::InvalidState(op.describe().to_string()));
            }
            shared.exclusive = Some(ExclusiveOp::RecordingStart);
        }
        self.submit(Command::StartRecording { config, on_started });
        Ok(())
    }

    /// Finalizes the active recording and delivers the artifact to
    /// `on_stopped`; the preview stream is rebuilt afterwards. A stop
    /// issued while the start is still settling is queued behind it.
    pub fn stop_recording(&self, on_stopped: RecordingStopCallback) -> Result<(), CameraError> {
        {
            let shared = self.shared.lock();
            let starting = shared.exclusive == Some(ExclusiveOp::RecordingStart);
            if shared.state != SessionState::Recording && !starting {
                return Err(CameraError::NotRecording);
            }
        }
        self.submit(Command::StopRecording { on_stopped });
        Ok(())
    }

    /// Sets the zoom ratio. Sticky: stored even without a live stream
    /// and folded into every request built from then on; clamped to the
    /// device range on application.
    pub fn set_zoom(&self, level: f32) -> Result<(), CameraError> {
        if !level.is_finite() {
            return Err(CameraError::ConfigurationFailed(
                "zoom ratio must be finite".into(),
            ));
        }
        self.submit(Command::SetZoom { level });
        Ok(())
    }

    /// Sets the metering region from a tap in normalized surface
    /// coordinates. Sticky, like zoom.
    pub fn set_focus_point(&self, point: FocusPoint) -> Result<(), CameraError> {
        if !point.x.is_finite() || !point.y.is_finite() {
            return Err(CameraError::ConfigurationFailed(
                "focus point must be finite".into(),
            ));
        }
        self.submit(Command::SetFocus { point });
        Ok(())
    }

    /// Sets the flash mode. Sticky, like zoom.
    pub fn set_flash_mode(&self, mode: FlashMode) -> Result<(), CameraError> {
        self.submit(Command::SetFlash { mode });
        Ok(())
    }

    /// Closes the current device and opens the next one the registry
    /// lists, cycling in enumeration order. With a single device the
    /// session is re-opened on it and `SingleDeviceOnly` is returned so
    /// the caller can say why nothing changed.
    pub fn switch_device(&self) -> Result<(), CameraError> {
        {
            let shared = self.shared.lock();
            if !shared.state.holds_device() {
                return Err(CameraError::InvalidState(format!(
                    "no session to switch, session is {:?}",
                    shared.state
                )));
            }
        }
        self.submit(Command::SwitchDevice);
        if self.registry.list_devices().len() < 2 {
            return Err(CameraError::SingleDeviceOnly);
        }
        Ok(())
    }

    /// Hands the render surface to the session. Before `open()` the
    /// surface is simply remembered; during `Opening` it unblocks
    /// configuration.
    pub fn surface_ready(&self, info: SurfaceInfo) {
        self.submit(Command::SurfaceReady(info));
    }

    /// Reports a size or rotation change of the render surface. The new
    /// geometry is used for the next configuration and for orienting
    /// captures.
    pub fn surface_resized(&self, info: SurfaceInfo) {
        self.submit(Command::SurfaceResized(info));
    }

    /// Reports that the render surface is gone. Forces a close: preview
    /// cannot outlive its target.
    pub fn surface_destroyed(&self) {
        self.submit(Command::SurfaceDestroyed);
    }

    // --- Internal helpers ---

    fn submit(&self, command: Command) {
        if self.tx.send(SessionMessage::Command(command)).is_err() {
            log::error!("session worker is gone, command dropped");
        }
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        let _ = self.tx.send(SessionMessage::Command(Command::Shutdown));
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                log::error!("session worker panicked during shutdown");
            }
        }
    }
}
