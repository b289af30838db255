use crate::models::device::DeviceIdentity;
use crate::models::error::CameraError;

use super::device_handle::{DeviceHandle, HardwareEvents};

/// Enumerates capture devices and opens exclusive connections to them.
///
/// Pure query plus acquisition; a registry holds no session state.
/// Implemented by platform backends and by `camera-session-virtual` for
/// hosts without camera hardware.
pub trait DeviceRegistry: Send + Sync {
    /// All currently attached capture devices with their static
    /// characteristics. Order is stable within a process and defines the
    /// cycling order used by `switch_device`.
    fn list_devices(&self) -> Vec<DeviceIdentity>;

    /// Begins an exclusive acquisition of a device.
    ///
    /// Returns the handle immediately; readiness arrives as `Opened` (or
    /// `OpenFailed`) through `events`. Synchronous errors are reserved
    /// for failures the backend can detect up front, e.g. a revoked
    /// permission or an unknown id.
    fn open_device(
        &self,
        id: &str,
        events: HardwareEvents,
    ) -> Result<Box<dyn DeviceHandle>, CameraError>;
}
