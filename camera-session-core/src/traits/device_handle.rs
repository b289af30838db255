use std::fmt;
use std::sync::Arc;

use crate::models::controls::{RepeatingRequest, StillRequest};
use crate::models::error::CameraError;
use crate::models::frame::SensorFrame;
use crate::session::surfaces::SurfaceSpec;

/// Asynchronous completions and spontaneous events a device backend
/// reports for an open device.
#[derive(Debug)]
pub enum HardwareEvent {
    /// The device connection is established and ready to configure.
    Opened,
    /// The acquisition started by `open_device` failed.
    OpenFailed(CameraError),
    /// The surface set passed to `configure` is bound and streaming.
    Configured,
    /// Session negotiation for the last `configure` call was rejected.
    ConfigureFailed(CameraError),
    /// A still frame for the last `issue_still` call.
    StillFrame(SensorFrame),
    /// The device was taken away (unplugged, claimed by another client).
    Disconnected,
    /// Unrecoverable device failure.
    Fault(CameraError),
}

/// Epoch-stamped event sink handed to a backend at open time.
///
/// Every event posted through this sink carries the session epoch it was
/// minted under; the worker discards events whose epoch no longer
/// matches, which is what makes completions arriving after `close()`
/// harmless. Cheap to clone; backends may post from any thread.
#[derive(Clone)]
pub struct HardwareEvents {
    epoch: u64,
    post: Arc<dyn Fn(u64, HardwareEvent) + Send + Sync>,
}

impl HardwareEvents {
    /// Normally minted by the session for each acquisition; public so
    /// backends can drive their handles in tests without a session.
    pub fn new(epoch: u64, post: Arc<dyn Fn(u64, HardwareEvent) + Send + Sync>) -> Self {
        Self { epoch, post }
    }

    /// The session epoch this sink was minted under.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Delivers an event to the session worker.
    pub fn post(&self, event: HardwareEvent) {
        (self.post)(self.epoch, event);
    }
}

impl fmt::Debug for HardwareEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HardwareEvents")
            .field("epoch", &self.epoch)
            .finish()
    }
}

/// The live, exclusive connection to one capture device.
///
/// Only the session worker touches a handle, so implementations need
/// `Send` but never `Sync`. Methods return synchronous failures only;
/// anything that completes later arrives through the `HardwareEvents`
/// sink the handle was opened with.
pub trait DeviceHandle: Send {
    /// (Re)binds the hardware session to a surface set, releasing any
    /// previously bound set first. Completion: `Configured` or
    /// `ConfigureFailed`.
    fn configure(&mut self, surfaces: &[SurfaceSpec]) -> Result<(), CameraError>;

    /// Installs or replaces the repeating request driving preview.
    fn set_repeating(&mut self, request: &RepeatingRequest) -> Result<(), CameraError>;

    /// Halts the repeating request ahead of a still capture.
    fn stop_repeating(&mut self) -> Result<(), CameraError>;

    /// Issues a single still request. Completion: `StillFrame`, or
    /// nothing at all if the sensor never produces one.
    fn issue_still(&mut self, request: &StillRequest) -> Result<(), CameraError>;

    /// Releases the capture session and the device connection.
    /// Best-effort; called exactly once, after which the handle is dropped.
    fn release(&mut self);
}

impl fmt::Debug for dyn DeviceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("dyn DeviceHandle")
    }
}
