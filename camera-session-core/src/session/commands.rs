use std::fmt;

use crate::models::config::RecordingConfig;
use crate::models::controls::{FlashMode, FocusPoint};
use crate::models::device::DeviceSelector;
use crate::traits::device_handle::HardwareEvent;
use crate::traits::session_delegate::{
    CaptureCallback, RecordingStartCallback, RecordingStopCallback,
};

use super::surfaces::SurfaceInfo;

/// A client intent accepted at the API boundary, executed by the worker
/// in strict submission order.
pub(crate) enum Command {
    Open { selector: DeviceSelector },
    SurfaceReady(SurfaceInfo),
    SurfaceResized(SurfaceInfo),
    SurfaceDestroyed,
    Capture { on_frame: CaptureCallback },
    StartRecording {
        config: RecordingConfig,
        on_started: RecordingStartCallback,
    },
    StopRecording { on_stopped: RecordingStopCallback },
    SetZoom { level: f32 },
    SetFocus { point: FocusPoint },
    SetFlash { mode: FlashMode },
    SwitchDevice,
    Close,
    Shutdown,
}

impl Command {
    /// Whether this command preempts an in-flight hardware round-trip
    /// instead of queuing behind it. Teardown is the one exception to
    /// FIFO: it cancels whatever is outstanding.
    pub(crate) fn is_teardown(&self) -> bool {
        matches!(self, Self::Close | Self::SurfaceDestroyed | Self::Shutdown)
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Open { .. } => "Open",
            Self::SurfaceReady(_) => "SurfaceReady",
            Self::SurfaceResized(_) => "SurfaceResized",
            Self::SurfaceDestroyed => "SurfaceDestroyed",
            Self::Capture { .. } => "Capture",
            Self::StartRecording { .. } => "StartRecording",
            Self::StopRecording { .. } => "StopRecording",
            Self::SetZoom { .. } => "SetZoom",
            Self::SetFocus { .. } => "SetFocus",
            Self::SetFlash { .. } => "SetFlash",
            Self::SwitchDevice => "SwitchDevice",
            Self::Close => "Close",
            Self::Shutdown => "Shutdown",
        };
        f.write_str(name)
    }
}

/// Everything that flows through the worker's queue: client commands and
/// epoch-stamped hardware events, serialized by arrival order.
pub(crate) enum SessionMessage {
    Command(Command),
    Hardware { epoch: u64, event: HardwareEvent },
}
