use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use camera_session_core::{
    CameraError, DeviceHandle, DeviceIdentity, DeviceRegistry, Facing, HardwareEvent,
    HardwareEvents, SizePx,
};

use crate::device::VirtualDevice;

/// Fault-injection switches shared by a registry and every device it
/// opens. Flips take effect on the next relevant call, so scenarios can
/// be rearranged mid-session.
#[derive(Default)]
pub struct VirtualKnobs {
    /// Refuse `open_device` with `PermissionDenied`.
    pub deny_permission: AtomicBool,
    /// Reject every surface-set bind.
    pub reject_configure: AtomicBool,
    /// Swallow still requests so captures run into their deadline.
    pub starve_still: AtomicBool,
    sinks: Mutex<Vec<HardwareEvents>>,
}

impl VirtualKnobs {
    /// Simulates unplugging: every sink ever handed out hears
    /// `Disconnected`. Sessions that have since closed discard the
    /// event by epoch.
    pub fn disconnect_all(&self) {
        for sink in self.sinks.lock().iter() {
            sink.post(HardwareEvent::Disconnected);
        }
    }

    pub(crate) fn remember(&self, sink: HardwareEvents) {
        self.sinks.lock().push(sink);
    }
}

/// An in-memory device registry with the same enumeration and
/// acquisition shape as a hardware backend.
pub struct VirtualRegistry {
    devices: Vec<DeviceIdentity>,
    knobs: Arc<VirtualKnobs>,
}

impl VirtualRegistry {
    pub fn with_devices(devices: Vec<DeviceIdentity>) -> Self {
        Self {
            devices,
            knobs: Arc::new(VirtualKnobs::default()),
        }
    }

    /// One back-facing camera, the baseline phone layout.
    pub fn single_camera() -> Self {
        Self::with_devices(vec![Self::camera("virtual-back", Facing::Back, 90)])
    }

    /// Back plus front camera, for switch flows.
    pub fn dual_camera() -> Self {
        Self::with_devices(vec![
            Self::camera("virtual-back", Facing::Back, 90),
            Self::camera("virtual-front", Facing::Front, 270),
        ])
    }

    /// Handle to the shared fault-injection switches.
    pub fn knobs(&self) -> Arc<VirtualKnobs> {
        Arc::clone(&self.knobs)
    }

    fn camera(id: &str, facing: Facing, sensor_orientation: u32) -> DeviceIdentity {
        DeviceIdentity {
            id: id.to_string(),
            name: format!("Virtual {:?} Camera", facing),
            facing,
            max_zoom: 4.0,
            sensor_orientation,
            active_area: SizePx::new(4000, 3000),
            output_sizes: vec![
                SizePx::new(320, 240),
                SizePx::new(640, 480),
                SizePx::new(1280, 720),
            ],
        }
    }
}

impl DeviceRegistry for VirtualRegistry {
    fn list_devices(&self) -> Vec<DeviceIdentity> {
        self.devices.clone()
    }

    fn open_device(
        &self,
        id: &str,
        events: HardwareEvents,
    ) -> Result<Box<dyn DeviceHandle>, CameraError> {
        if self.knobs.deny_permission.load(Ordering::SeqCst) {
            return Err(CameraError::PermissionDenied);
        }
        if !self.devices.iter().any(|d| d.id == id) {
            return Err(CameraError::DeviceAccessError(format!(
                "unknown device id {}",
                id
            )));
        }
        log::debug!("virtual device {} opened", id);
        self.knobs.remember(events.clone());
        events.post(HardwareEvent::Opened);
        Ok(Box::new(VirtualDevice::new(
            id.to_string(),
            events,
            Arc::clone(&self.knobs),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dual_layout_lists_back_before_front() {
        let registry = VirtualRegistry::dual_camera();
        let devices = registry.list_devices();
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].facing, Facing::Back);
        assert_eq!(devices[1].facing, Facing::Front);
    }

    #[test]
    fn unknown_id_is_a_device_access_error() {
        let registry = VirtualRegistry::single_camera();
        let sink = sink_stub();
        let err = registry.open_device("no-such-device", sink).unwrap_err();
        assert!(matches!(err, CameraError::DeviceAccessError(_)));
    }

    #[test]
    fn denied_permission_blocks_every_open() {
        let registry = VirtualRegistry::single_camera();
        registry.knobs().deny_permission.store(true, Ordering::SeqCst);
        let err = registry.open_device("virtual-back", sink_stub()).unwrap_err();
        assert_eq!(err, CameraError::PermissionDenied);
    }

    fn sink_stub() -> HardwareEvents {
        HardwareEvents::new(0, Arc::new(|_, _| {}))
    }
}
