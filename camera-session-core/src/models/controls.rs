use super::device::SizePx;

/// Flash behavior for preview and still capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FlashMode {
    /// Emitter never fires.
    #[default]
    Off,
    /// Emitter fires on every still capture.
    On,
    /// Emitter fires when metering calls for it.
    Auto,
    /// Continuous emitter, e.g. for video or framing in the dark.
    Torch,
}

/// A tap point in normalized surface coordinates, `(0, 0)` top-left to
/// `(1, 1)` bottom-right. Out-of-range values are clamped when mapped
/// onto the sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocusPoint {
    pub x: f32,
    pub y: f32,
}

/// An axis-aligned rectangle in sensor active-array coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl SensorRect {
    /// The full active array as a rectangle.
    pub fn full(active_area: SizePx) -> Self {
        Self {
            x: 0,
            y: 0,
            width: active_area.width,
            height: active_area.height,
        }
    }
}

/// Which hardware template a repeating request is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestTemplate {
    Preview,
    Record,
}

/// The continuously re-issued parameter set that drives live preview
/// (and the encoder feed while recording). Re-issued in full whenever a
/// control changes.
#[derive(Debug, Clone, PartialEq)]
pub struct RepeatingRequest {
    pub template: RequestTemplate,
    /// Applied zoom ratio, already clamped to the device range.
    pub zoom: f32,
    /// Sensor crop implementing the zoom ratio.
    pub crop: SensorRect,
    pub flash: FlashMode,
    /// Metering region from the last focus tap, if any.
    pub focus: Option<SensorRect>,
}

/// Parameters for a single high-resolution still request.
#[derive(Debug, Clone, PartialEq)]
pub struct StillRequest {
    pub size: SizePx,
    pub crop: SensorRect,
    pub flash: FlashMode,
}
