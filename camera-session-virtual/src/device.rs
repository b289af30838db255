use std::io::Cursor;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use image::{Rgb, RgbImage};

use camera_session_core::{
    CameraError, DeviceHandle, HardwareEvent, HardwareEvents, RepeatingRequest, SensorFrame,
    SizePx, StillRequest, SurfaceSpec,
};

use crate::registry::VirtualKnobs;

/// A camera that exists only in memory. It honors the full device
/// contract — asynchronous configure completion, stills delivered
/// through the event sink — so a session driven against it exercises
/// the same paths as against hardware.
pub struct VirtualDevice {
    id: String,
    events: HardwareEvents,
    knobs: Arc<VirtualKnobs>,
    repeating: Option<RepeatingRequest>,
    frames_produced: u64,
}

impl VirtualDevice {
    pub(crate) fn new(id: String, events: HardwareEvents, knobs: Arc<VirtualKnobs>) -> Self {
        Self {
            id,
            events,
            knobs,
            repeating: None,
            frames_produced: 0,
        }
    }
}

impl DeviceHandle for VirtualDevice {
    fn configure(&mut self, surfaces: &[SurfaceSpec]) -> Result<(), CameraError> {
        if self.knobs.reject_configure.load(Ordering::SeqCst) {
            log::debug!(
                "virtual device {} rejecting a {}-surface set",
                self.id,
                surfaces.len()
            );
            self.events.post(HardwareEvent::ConfigureFailed(
                CameraError::ConfigurationFailed("virtual device rejected the surface set".into()),
            ));
        } else {
            log::debug!(
                "virtual device {} bound a {}-surface set",
                self.id,
                surfaces.len()
            );
            self.events.post(HardwareEvent::Configured);
        }
        Ok(())
    }

    fn set_repeating(&mut self, request: &RepeatingRequest) -> Result<(), CameraError> {
        log::trace!("virtual device {} repeating: {:?}", self.id, request);
        self.repeating = Some(request.clone());
        Ok(())
    }

    fn stop_repeating(&mut self) -> Result<(), CameraError> {
        if let Some(request) = self.repeating.take() {
            log::trace!(
                "virtual device {} halted its {:?} stream",
                self.id,
                request.template
            );
        }
        Ok(())
    }

    fn issue_still(&mut self, request: &StillRequest) -> Result<(), CameraError> {
        if self.knobs.starve_still.load(Ordering::SeqCst) {
            log::debug!("virtual device {} starving the still request", self.id);
            return Ok(());
        }
        self.frames_produced += 1;
        let frame = synthesize_frame(request.size, self.frames_produced);
        self.events.post(HardwareEvent::StillFrame(frame));
        Ok(())
    }

    fn release(&mut self) {
        log::debug!("virtual device {} released", self.id);
    }
}

/// A deterministic gradient tagged with the frame number, compressed
/// the way a sensor ISP would hand it over.
fn synthesize_frame(size: SizePx, frame_number: u64) -> SensorFrame {
    let tint = (frame_number * 29 % 256) as u8;
    let image = RgbImage::from_fn(size.width, size.height, |x, y| {
        Rgb([
            (x * 255 / size.width.max(1)) as u8,
            (y * 255 / size.height.max(1)) as u8,
            tint,
        ])
    });
    let mut bytes = Cursor::new(Vec::new());
    if let Err(err) = image.write_to(&mut bytes, image::ImageFormat::Jpeg) {
        log::error!("frame synthesis failed: {}", err);
        return SensorFrame {
            data: Vec::new(),
            width: size.width,
            height: size.height,
        };
    }
    SensorFrame {
        data: bytes.into_inner(),
        width: size.width,
        height: size.height,
    }
}
