use std::collections::VecDeque;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;

use crate::models::config::{RecordingConfig, SessionConfig};
use crate::models::controls::{
    FlashMode, FocusPoint, RepeatingRequest, RequestTemplate, StillRequest,
};
use crate::models::device::{DeviceIdentity, DeviceSelector, SizePx};
use crate::models::error::CameraError;
use crate::models::frame::SensorFrame;
use crate::models::state::SessionState;
use crate::pipeline::capture::CapturePipeline;
use crate::pipeline::recording::RecordingPipeline;
use crate::processing::metering;
use crate::processing::sizing;
use crate::traits::device_handle::{DeviceHandle, HardwareEvent, HardwareEvents};
use crate::traits::device_registry::DeviceRegistry;
use crate::traits::encoder::EncoderFactory;
use crate::traits::session_delegate::{
    CaptureCallback, RecordingStartCallback, RecordingStopCallback, SessionDelegate,
};

use super::commands::{Command, SessionMessage};
use super::controller::Shared;
use super::surfaces::{ActiveSurfaceSet, SurfaceInfo, SurfaceKind};

/// An open device plus everything derived from its identity.
struct OpenDevice {
    handle: Box<dyn DeviceHandle>,
    identity: DeviceIdentity,
    pipeline: CapturePipeline,
}

/// Sticky user controls, re-applied to every request the session builds.
#[derive(Debug, Clone)]
struct Controls {
    zoom: f32,
    flash: FlashMode,
    focus: Option<FocusPoint>,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            flash: FlashMode::Off,
            focus: None,
        }
    }
}

enum ControlChange {
    Zoom(f32),
    Focus(FocusPoint),
    Flash(FlashMode),
}

/// The hardware round-trip currently in flight. While one exists, client
/// commands are parked and replayed in order once it resolves; only
/// teardown preempts it.
enum PendingOp {
    /// Awaiting `Opened`.
    Opening,
    /// Awaiting `Configured` for the initial preview set.
    ConfiguringPreview,
    /// Awaiting `StillFrame` (or the capture deadline).
    StillCapture { on_frame: CaptureCallback },
    /// Awaiting `Configured` for the recording surface set.
    RecordingStart {
        pipeline: RecordingPipeline,
        on_started: RecordingStartCallback,
    },
    /// A recording rebuild failed; awaiting `Configured` for the restored
    /// preview set before reporting `cause`.
    RecordingRollback {
        cause: CameraError,
        on_started: RecordingStartCallback,
    },
    /// Awaiting `Configured` for the preview set after a stop.
    PreviewRestore,
}

/// The worker execution context: a single thread that owns the device
/// handle, the surface set, and the recording pipeline, and is the only
/// writer of the session state.
///
/// One queue carries client commands and epoch-stamped hardware events;
/// processing order is arrival order, so no locking exists between the
/// two beyond the published snapshot.
pub(crate) struct SessionWorker {
    rx: Receiver<SessionMessage>,
    tx: Sender<SessionMessage>,
    shared: Arc<Mutex<Shared>>,
    registry: Arc<dyn DeviceRegistry>,
    encoders: Arc<dyn EncoderFactory>,
    delegate: Arc<dyn SessionDelegate>,
    config: SessionConfig,

    /// Bumped on every acquisition and teardown; events stamped with an
    /// older epoch are discarded.
    epoch: u64,
    device: Option<OpenDevice>,
    surface: Option<SurfaceInfo>,
    surfaces: Option<ActiveSurfaceSet>,
    controls: Controls,
    recording: Option<RecordingPipeline>,

    pending: Option<PendingOp>,
    parked: VecDeque<Command>,
    /// Bounded wait for the in-flight still capture.
    deadline: Option<Instant>,
}

impl SessionWorker {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        rx: Receiver<SessionMessage>,
        tx: Sender<SessionMessage>,
        shared: Arc<Mutex<Shared>>,
        registry: Arc<dyn DeviceRegistry>,
        encoders: Arc<dyn EncoderFactory>,
        delegate: Arc<dyn SessionDelegate>,
        config: SessionConfig,
    ) -> Self {
        Self {
            rx,
            tx,
            shared,
            registry,
            encoders,
            delegate,
            config,
            epoch: 0,
            device: None,
            surface: None,
            surfaces: None,
            controls: Controls::default(),
            recording: None,
            pending: None,
            parked: VecDeque::new(),
            deadline: None,
        }
    }

    pub(crate) fn run(mut self) {
        log::debug!("session worker started");
        loop {
            let message = match self.deadline {
                Some(at) => {
                    let now = Instant::now();
                    if at <= now {
                        self.on_capture_deadline();
                        continue;
                    }
                    match self.rx.recv_timeout(at - now) {
                        Ok(message) => message,
                        Err(RecvTimeoutError::Timeout) => {
                            self.on_capture_deadline();
                            continue;
                        }
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                None => match self.rx.recv() {
                    Ok(message) => message,
                    Err(_) => break,
                },
            };

            match message {
                SessionMessage::Command(Command::Shutdown) => {
                    self.teardown(None);
                    break;
                }
                SessionMessage::Command(command) => self.accept_command(command),
                SessionMessage::Hardware { epoch, event } => self.accept_hardware(epoch, event),
            }
        }
        log::debug!("session worker exited");
    }

    // --- Queue discipline ---

    fn accept_command(&mut self, command: Command) {
        if self.pending.is_some() && !command.is_teardown() {
            log::debug!("{:?} parked behind an in-flight transition", command);
            self.parked.push_back(command);
            return;
        }
        self.handle_command(command);
    }

    fn accept_hardware(&mut self, epoch: u64, event: HardwareEvent) {
        if epoch != self.epoch {
            log::debug!(
                "discarding stale hardware event from epoch {} (current {}): {:?}",
                epoch,
                self.epoch,
                event
            );
            return;
        }
        self.handle_hardware(event);
        self.drain_parked();
    }

    fn drain_parked(&mut self) {
        while self.pending.is_none() {
            let Some(command) = self.parked.pop_front() else {
                break;
            };
            log::debug!("replaying parked {:?}", command);
            self.handle_command(command);
        }
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Open { selector } => self.handle_open(selector),
            Command::SurfaceReady(info) | Command::SurfaceResized(info) => {
                self.handle_surface_change(info)
            }
            Command::SurfaceDestroyed => {
                log::info!("render surface destroyed, closing session");
                self.surface = None;
                self.teardown(None);
            }
            Command::Capture { on_frame } => self.handle_capture(on_frame),
            Command::StartRecording { config, on_started } => {
                self.handle_start_recording(config, on_started)
            }
            Command::StopRecording { on_stopped } => {
                let state = self.shared.lock().state;
                if state != SessionState::Recording {
                    on_stopped(Err(CameraError::NotRecording));
                    return;
                }
                self.handle_stop_recording(on_stopped);
            }
            Command::SetZoom { level } => self.handle_control(ControlChange::Zoom(level)),
            Command::SetFocus { point } => self.handle_control(ControlChange::Focus(point)),
            Command::SetFlash { mode } => self.handle_control(ControlChange::Flash(mode)),
            Command::SwitchDevice => self.handle_switch_device(),
            Command::Close => self.teardown(None),
            // Intercepted in run(); never parked.
            Command::Shutdown => {}
        }
    }

    fn handle_hardware(&mut self, event: HardwareEvent) {
        match event {
            HardwareEvent::Opened => self.on_opened(),
            HardwareEvent::OpenFailed(err) => self.fault(err),
            HardwareEvent::Configured => self.on_configured(),
            HardwareEvent::ConfigureFailed(err) => self.on_configure_failed(err),
            HardwareEvent::StillFrame(frame) => self.on_still_frame(frame),
            HardwareEvent::Disconnected => self.on_disconnected(),
            HardwareEvent::Fault(err) => self.fault(err),
        }
    }

    // --- Opening and configuration ---

    fn handle_open(&mut self, selector: DeviceSelector) {
        {
            let state = self.shared.lock().state;
            if state.holds_device() {
                log::debug!("open ignored, session already {:?}", state);
                return;
            }
        }
        let devices = self.registry.list_devices();
        let Some(identity) = selector.pick(&devices).cloned() else {
            log::warn!("open failed: registry lists no usable device");
            self.delegate.on_error(&CameraError::NoDeviceAvailable);
            return;
        };
        self.open_identity(identity);
    }

    fn open_identity(&mut self, identity: DeviceIdentity) {
        self.epoch += 1;
        self.set_state(SessionState::Opening);
        self.pending = Some(PendingOp::Opening);

        log::info!("opening device {} ({})", identity.id, identity.name);
        let sink = self.event_sink();
        match self.registry.open_device(&identity.id, sink) {
            Ok(handle) => {
                self.device = Some(OpenDevice {
                    pipeline: CapturePipeline::new(identity.sensor_orientation),
                    handle,
                    identity,
                });
            }
            Err(err) => self.fault(err),
        }
    }

    fn event_sink(&self) -> HardwareEvents {
        let tx = self.tx.clone();
        HardwareEvents::new(
            self.epoch,
            Arc::new(move |epoch, event| {
                let _ = tx.send(SessionMessage::Hardware { epoch, event });
            }),
        )
    }

    fn handle_surface_change(&mut self, info: SurfaceInfo) {
        log::debug!(
            "render surface now {}x{} at {:?}",
            info.width,
            info.height,
            info.rotation
        );
        self.surface = Some(info);
        let state = self.shared.lock().state;
        if state == SessionState::Opening && self.device.is_some() {
            self.begin_preview_configure();
        }
    }

    fn on_opened(&mut self) {
        if !matches!(self.pending, Some(PendingOp::Opening)) {
            log::debug!("unexpected Opened event ignored");
            return;
        }
        self.pending = None;
        if self.surface.is_some() {
            self.begin_preview_configure();
        } else {
            log::debug!("device open, waiting for the render surface");
        }
    }

    fn begin_preview_configure(&mut self) {
        self.set_state(SessionState::Configuring);
        match self.configure_preview_set() {
            Ok(()) => self.pending = Some(PendingOp::ConfiguringPreview),
            Err(err) => self.fault(err),
        }
    }

    /// Selects sizes and asks the device to bind the preview-only set.
    /// The previous binding is dropped first; completion arrives as
    /// `Configured`.
    fn configure_preview_set(&mut self) -> Result<(), CameraError> {
        let Some(surface) = self.surface else {
            return Err(CameraError::ConfigurationFailed(
                "render surface is gone".into(),
            ));
        };
        let output_sizes = match &self.device {
            Some(device) => device.identity.output_sizes.clone(),
            None => return Err(CameraError::DeviceAccessError("no open device".into())),
        };

        let request = sizing::cap_request(surface.size(), self.config.preview_size_cap);
        let no_sizes = || CameraError::ConfigurationFailed("device reports no output sizes".into());
        let preview = sizing::select_output_size(&output_sizes, request).ok_or_else(no_sizes)?;
        let still = sizing::select_still_size(&output_sizes).ok_or_else(no_sizes)?;

        log::info!("binding preview surface set: preview {}, still {}", preview, still);
        self.surfaces = None;
        let set = ActiveSurfaceSet::preview(preview, still);
        let result = match self.device.as_mut() {
            Some(device) => device.handle.configure(set.specs()),
            None => return Err(CameraError::DeviceAccessError("no open device".into())),
        };
        result?;
        self.surfaces = Some(set);
        Ok(())
    }

    fn on_configured(&mut self) {
        match self.pending.take() {
            Some(PendingOp::ConfiguringPreview) => {
                match self.install_repeating(RequestTemplate::Preview) {
                    Ok(()) => self.set_state(SessionState::PreviewActive),
                    Err(err) => self.fault(err),
                }
            }
            Some(PendingOp::RecordingStart { pipeline, on_started }) => {
                self.on_recording_surfaces_bound(pipeline, on_started);
            }
            Some(PendingOp::RecordingRollback { cause, on_started }) => {
                match self.install_repeating(RequestTemplate::Preview) {
                    Ok(()) => {
                        // state never left PreviewActive
                        self.clear_exclusive();
                        log::warn!("recording start rolled back: {}", cause);
                        self.delegate.on_error(&cause);
                        on_started(Err(cause));
                    }
                    Err(err) => {
                        on_started(Err(cause));
                        self.fault(err);
                    }
                }
            }
            Some(PendingOp::PreviewRestore) => {
                match self.install_repeating(RequestTemplate::Preview) {
                    Ok(()) => self.set_state(SessionState::PreviewActive),
                    Err(err) => self.fault(err),
                }
            }
            other => {
                log::debug!("unexpected Configured event ignored");
                self.pending = other;
            }
        }
    }

    fn on_configure_failed(&mut self, err: CameraError) {
        match self.pending.take() {
            Some(PendingOp::ConfiguringPreview) | Some(PendingOp::PreviewRestore) => {
                self.fault(err)
            }
            Some(PendingOp::RecordingStart { pipeline, on_started }) => {
                self.rollback_recording_start(pipeline, on_started, err);
            }
            Some(PendingOp::RecordingRollback { cause, on_started }) => {
                on_started(Err(cause));
                self.fault(err);
            }
            other => {
                log::debug!("unexpected ConfigureFailed event ignored: {}", err);
                self.pending = other;
            }
        }
    }

    fn install_repeating(&mut self, template: RequestTemplate) -> Result<(), CameraError> {
        let request = match &self.device {
            Some(device) => build_repeating(template, &self.controls, &device.identity),
            None => return Err(CameraError::DeviceAccessError("no open device".into())),
        };
        match self.device.as_mut() {
            Some(device) => device.handle.set_repeating(&request),
            None => Err(CameraError::DeviceAccessError("no open device".into())),
        }
    }

    // --- Still capture ---

    fn handle_capture(&mut self, on_frame: CaptureCallback) {
        let state = self.shared.lock().state;
        if state != SessionState::PreviewActive {
            // the boundary admits captures only from PreviewActive, but
            // the state can change while the command sits in the queue
            self.clear_exclusive();
            on_frame(Err(CameraError::InvalidState(format!(
                "capture aborted, session is {:?}",
                state
            ))));
            return;
        }

        let still_size = self.surfaces.as_ref().and_then(|set| {
            set.specs()
                .iter()
                .find(|s| s.kind == SurfaceKind::StillImage)
                .map(|s| s.size)
        });
        let request = match (still_size, self.device.as_ref()) {
            (Some(size), Some(device)) => {
                let zoom = metering::clamp_zoom(self.controls.zoom, device.identity.max_zoom);
                StillRequest {
                    size,
                    crop: metering::zoom_crop(device.identity.active_area, zoom),
                    flash: self.controls.flash,
                }
            }
            _ => {
                self.clear_exclusive();
                on_frame(Err(CameraError::DeviceAccessError(
                    "no still target bound".into(),
                )));
                return;
            }
        };

        self.set_state(SessionState::Capturing);
        let halted = match self.device.as_mut() {
            Some(device) => device.handle.stop_repeating(),
            None => Ok(()),
        };
        if let Err(err) = halted {
            log::warn!("failed to halt preview for capture: {}", err);
        }

        let issued = match self.device.as_mut() {
            Some(device) => device.handle.issue_still(&request),
            None => Err(CameraError::DeviceAccessError("no open device".into())),
        };
        match issued {
            Ok(()) => {
                self.pending = Some(PendingOp::StillCapture { on_frame });
                self.deadline = Some(Instant::now() + self.config.capture_timeout);
            }
            Err(err) => {
                on_frame(Err(err.clone()));
                self.fault(err);
            }
        }
    }

    fn on_still_frame(&mut self, frame: SensorFrame) {
        match self.pending.take() {
            Some(PendingOp::StillCapture { on_frame }) => {
                self.deadline = None;
                let display = self.surface.map(|s| s.rotation).unwrap_or_default();
                let decoded = match &self.device {
                    Some(device) => device.pipeline.process(frame, display),
                    None => Err(CameraError::DeviceAccessError("no open device".into())),
                };

                // preview comes back regardless of how the decode went
                let restored = self.install_repeating(RequestTemplate::Preview);
                self.clear_exclusive();
                self.set_state(SessionState::PreviewActive);

                if let Err(err) = &decoded {
                    self.delegate.on_error(err);
                }
                on_frame(decoded);

                if let Err(err) = restored {
                    self.fault(err);
                }
            }
            other => {
                log::debug!("late still frame discarded");
                self.pending = other;
            }
        }
    }

    fn on_capture_deadline(&mut self) {
        self.deadline = None;
        match self.pending.take() {
            Some(PendingOp::StillCapture { on_frame }) => {
                log::warn!(
                    "no frame within {:?}, restoring preview",
                    self.config.capture_timeout
                );
                let restored = self.install_repeating(RequestTemplate::Preview);
                self.clear_exclusive();
                self.set_state(SessionState::PreviewActive);

                self.delegate.on_error(&CameraError::CaptureTimeout);
                on_frame(Err(CameraError::CaptureTimeout));

                if let Err(err) = restored {
                    self.fault(err);
                }
            }
            other => self.pending = other,
        }
        self.drain_parked();
    }

    // --- Recording ---

    fn handle_start_recording(
        &mut self,
        config: RecordingConfig,
        on_started: RecordingStartCallback,
    ) {
        let state = self.shared.lock().state;
        if state != SessionState::PreviewActive {
            self.clear_exclusive();
            on_started(Err(CameraError::InvalidState(format!(
                "recording requires an active preview, session is {:?}",
                state
            ))));
            return;
        }

        let preview_size = self.bound_preview_size();
        let Some(preview_size) = preview_size else {
            self.clear_exclusive();
            on_started(Err(CameraError::DeviceAccessError(
                "no preview surface bound".into(),
            )));
            return;
        };

        let pipeline = match RecordingPipeline::new(
            self.encoders.as_ref(),
            config,
            &self.config.output_directory,
        ) {
            Ok(pipeline) => pipeline,
            Err(err) => {
                self.clear_exclusive();
                log::warn!("encoder creation failed: {}", err);
                self.delegate.on_error(&err);
                on_started(Err(err));
                return;
            }
        };

        self.surfaces = None;
        let set = ActiveSurfaceSet::recording(preview_size, pipeline.input_surface());
        let result = match self.device.as_mut() {
            Some(device) => device.handle.configure(set.specs()),
            None => Err(CameraError::DeviceAccessError("no open device".into())),
        };
        match result {
            Ok(()) => {
                self.surfaces = Some(set);
                self.pending = Some(PendingOp::RecordingStart { pipeline, on_started });
            }
            Err(err) => self.rollback_recording_start(pipeline, on_started, err),
        }
    }

    fn on_recording_surfaces_bound(
        &mut self,
        mut pipeline: RecordingPipeline,
        on_started: RecordingStartCallback,
    ) {
        if let Err(err) = self.install_repeating(RequestTemplate::Record) {
            self.rollback_recording_start(pipeline, on_started, err);
            return;
        }
        match pipeline.start() {
            Ok(()) => {
                self.recording = Some(pipeline);
                // state first so a stop issued from the callback passes
                // the boundary check
                self.set_state(SessionState::Recording);
                self.clear_exclusive();
                on_started(Ok(()));
            }
            Err(err) => self.rollback_recording_start(pipeline, on_started, err),
        }
    }

    /// Releases the encoder and rebinds the preview set. The causal error
    /// is reported once the rollback configure completes; the published
    /// state never leaves PreviewActive.
    fn rollback_recording_start(
        &mut self,
        pipeline: RecordingPipeline,
        on_started: RecordingStartCallback,
        cause: CameraError,
    ) {
        log::warn!("recording start failed, rolling back to preview: {}", cause);
        pipeline.abort();
        match self.configure_preview_set() {
            Ok(()) => self.pending = Some(PendingOp::RecordingRollback { cause, on_started }),
            Err(err) => {
                on_started(Err(cause));
                self.fault(err);
            }
        }
    }

    fn handle_stop_recording(&mut self, on_stopped: RecordingStopCallback) {
        let Some(pipeline) = self.recording.take() else {
            on_stopped(Err(CameraError::NotRecording));
            return;
        };

        // the encoder must stop receiving frames before the container is
        // sealed
        let halted = match self.device.as_mut() {
            Some(device) => device.handle.stop_repeating(),
            None => Ok(()),
        };
        if let Err(err) = halted {
            log::warn!("failed to halt repeating request before finalize: {}", err);
        }

        match pipeline.finish() {
            Ok(artifact) => {
                log::info!(
                    "recording finalized: {} ({:.2}s, {} bytes)",
                    artifact.file_path.display(),
                    artifact.duration_secs,
                    artifact.bytes_written
                );
                on_stopped(Ok(artifact));
                match self.configure_preview_set() {
                    Ok(()) => self.pending = Some(PendingOp::PreviewRestore),
                    Err(err) => self.fault(err),
                }
            }
            Err(err) => {
                on_stopped(Err(err.clone()));
                self.fault(err);
            }
        }
    }

    // --- Controls ---

    /// Controls are sticky: the value is stored unconditionally and
    /// folded into every request built from then on. Re-issuing the
    /// stream only makes sense while one exists.
    fn handle_control(&mut self, change: ControlChange) {
        match change {
            ControlChange::Zoom(level) => self.controls.zoom = level,
            ControlChange::Focus(point) => self.controls.focus = Some(point),
            ControlChange::Flash(mode) => self.controls.flash = mode,
        }

        let state = self.shared.lock().state;
        if !state.accepts_controls() {
            log::debug!("control stored, no repeating stream in state {:?}", state);
            return;
        }

        let template = if state == SessionState::Recording {
            RequestTemplate::Record
        } else {
            RequestTemplate::Preview
        };
        if let Err(err) = self.install_repeating(template) {
            self.fault(err);
        }
    }

    // --- Device switching ---

    fn handle_switch_device(&mut self) {
        let Some(current_id) = self.device.as_ref().map(|d| d.identity.id.clone()) else {
            log::debug!("switch ignored, no open device");
            return;
        };
        let devices = self.registry.list_devices();

        let next = if devices.len() < 2 {
            log::warn!("switch requested with a single device, re-opening {}", current_id);
            devices.iter().find(|d| d.id == current_id).cloned()
        } else {
            let index = devices
                .iter()
                .position(|d| d.id == current_id)
                .unwrap_or(0);
            Some(devices[(index + 1) % devices.len()].clone())
        };

        let Some(next) = next else {
            log::warn!("switch failed: current device is no longer enumerated");
            self.teardown(Some(CameraError::NoDeviceAvailable));
            return;
        };

        self.close_device();
        self.open_identity(next);
    }

    // --- Teardown ---

    /// Closes the session: cancel whatever is in flight, release in the
    /// fixed order, publish Closing then Closed. Parked commands survive
    /// only when the caller (switch) immediately re-opens.
    fn close_device(&mut self) {
        self.epoch += 1;
        self.cancel_pending();
        self.clear_exclusive();
        self.set_state(SessionState::Closing);
        self.release_everything();
        self.set_state(SessionState::Closed);
    }

    fn teardown(&mut self, report: Option<CameraError>) {
        if self.shared.lock().state.is_closed() {
            log::debug!("close ignored, session already closed");
            return;
        }
        self.close_device();
        self.cancel_parked();
        if let Some(err) = report {
            self.delegate.on_error(&err);
        }
    }

    fn on_disconnected(&mut self) {
        log::warn!("capture device disconnected");
        self.teardown(Some(CameraError::DeviceAccessError(
            "device disconnected".into(),
        )));
    }

    /// Unrecoverable hardware failure: release everything, publish
    /// Faulted, report the cause. A later `open()` starts over.
    fn fault(&mut self, err: CameraError) {
        if !self.shared.lock().state.holds_device() {
            log::warn!("fault reported with no live session: {}", err);
            self.delegate.on_error(&err);
            return;
        }
        log::error!("session fault: {}", err);
        self.epoch += 1;
        self.cancel_pending();
        self.cancel_parked();
        self.clear_exclusive();
        self.release_everything();
        self.set_state(SessionState::Faulted);
        self.delegate.on_error(&err);
    }

    /// Completes the in-flight operation's callback; its hardware
    /// completion, if it ever arrives, is already stale by epoch.
    fn cancel_pending(&mut self) {
        self.deadline = None;
        let Some(op) = self.pending.take() else {
            return;
        };
        let cancelled = CameraError::DeviceAccessError("session closed before completion".into());
        match op {
            PendingOp::StillCapture { on_frame } => on_frame(Err(cancelled)),
            PendingOp::RecordingStart { pipeline, on_started } => {
                pipeline.abort();
                on_started(Err(cancelled));
            }
            PendingOp::RecordingRollback { on_started, .. } => on_started(Err(cancelled)),
            PendingOp::Opening | PendingOp::ConfiguringPreview | PendingOp::PreviewRestore => {}
        }
    }

    fn cancel_parked(&mut self) {
        let cancelled = CameraError::DeviceAccessError("session closed before completion".into());
        while let Some(command) = self.parked.pop_front() {
            match command {
                Command::Capture { on_frame } => on_frame(Err(cancelled.clone())),
                Command::StartRecording { on_started, .. } => on_started(Err(cancelled.clone())),
                Command::StopRecording { on_stopped } => on_stopped(Err(cancelled.clone())),
                other => log::debug!("{:?} dropped by teardown", other),
            }
        }
    }

    /// Release order: device handle and its session, then the encoder,
    /// then the surface set. Each at most once; all best-effort.
    fn release_everything(&mut self) {
        if let Some(mut device) = self.device.take() {
            device.handle.release();
        }
        if let Some(pipeline) = self.recording.take() {
            pipeline.abort();
        }
        self.surfaces = None;
    }

    // --- Shared snapshot ---

    fn set_state(&self, new_state: SessionState) {
        {
            let mut shared = self.shared.lock();
            debug_assert!(
                shared.state.can_transition_to(&new_state),
                "illegal transition {:?} -> {:?}",
                shared.state,
                new_state
            );
            shared.state = new_state;
        }
        self.delegate.on_state_changed(&new_state);
    }

    fn clear_exclusive(&self) {
        self.shared.lock().exclusive = None;
    }

    fn bound_preview_size(&self) -> Option<SizePx> {
        self.surfaces.as_ref().and_then(|set| {
            set.specs()
                .iter()
                .find(|s| s.kind == SurfaceKind::Preview)
                .map(|s| s.size)
        })
    }
}

fn build_repeating(
    template: RequestTemplate,
    controls: &Controls,
    identity: &DeviceIdentity,
) -> RepeatingRequest {
    let zoom = metering::clamp_zoom(controls.zoom, identity.max_zoom);
    RepeatingRequest {
        template,
        zoom,
        crop: metering::zoom_crop(identity.active_area, zoom),
        flash: controls.flash,
        focus: controls
            .focus
            .map(|point| metering::focus_region(point, identity.active_area)),
    }
}

#[cfg(test)]
mod tests {
    use crate::models::device::Facing;

    use super::*;

    fn identity() -> DeviceIdentity {
        DeviceIdentity {
            id: "cam".into(),
            name: "test camera".into(),
            facing: Facing::Back,
            max_zoom: 4.0,
            sensor_orientation: 90,
            active_area: SizePx::new(4000, 3000),
            output_sizes: vec![SizePx::new(1280, 720)],
        }
    }

    #[test]
    fn repeating_request_carries_clamped_zoom_and_crop() {
        let controls = Controls {
            zoom: 100.0,
            flash: FlashMode::Torch,
            focus: None,
        };
        let request = build_repeating(RequestTemplate::Record, &controls, &identity());
        assert_eq!(request.zoom, 4.0);
        assert_eq!(request.crop.width, 1000);
        assert_eq!(request.flash, FlashMode::Torch);
        assert_eq!(request.template, RequestTemplate::Record);
        assert!(request.focus.is_none());
    }

    #[test]
    fn focus_point_becomes_a_sensor_region() {
        let controls = Controls {
            zoom: 1.0,
            flash: FlashMode::Off,
            focus: Some(FocusPoint { x: 0.5, y: 0.5 }),
        };
        let request = build_repeating(RequestTemplate::Preview, &controls, &identity());
        let region = request.focus.unwrap();
        assert!(region.x > 0 && region.y > 0);
        assert!(region.x + region.width <= 4000);
        assert!(region.y + region.height <= 3000);
    }
}
