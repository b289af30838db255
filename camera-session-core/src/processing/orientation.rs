//! Orientation correction for still captures.
//!
//! Sensors are mounted at a fixed angle relative to the device's natural
//! orientation; the display rotates independently. A still frame comes
//! out sensor-native and must be rotated by the combination of the two
//! before it is handed to the caller.

use image::RgbaImage;

/// Rotation of the display surface relative to the device's natural
/// orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayRotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl DisplayRotation {
    pub fn degrees(&self) -> u32 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    /// Maps arbitrary degrees to the nearest quadrant, normalizing
    /// negatives and multiples of 360.
    pub fn from_degrees(degrees: i32) -> Self {
        match degrees.rem_euclid(360) {
            45..=134 => Self::Deg90,
            135..=224 => Self::Deg180,
            225..=314 => Self::Deg270,
            _ => Self::Deg0,
        }
    }

    /// Whether this rotation swaps width and height.
    pub fn swaps_dimensions(&self) -> bool {
        matches!(self, Self::Deg90 | Self::Deg270)
    }
}

/// Clockwise correction angle for a still frame, from the sensor mounting
/// orientation and the current display rotation.
pub fn still_orientation(sensor_orientation: u32, display: DisplayRotation) -> u32 {
    (sensor_orientation + display.degrees()) % 360
}

/// Applies a quadrant rotation to a decoded frame. Angles that are not a
/// multiple of 90 are rounded down to the containing quadrant.
pub fn rotate_rgba(frame: RgbaImage, degrees: u32) -> RgbaImage {
    match (degrees % 360) / 90 {
        1 => image::imageops::rotate90(&frame),
        2 => image::imageops::rotate180(&frame),
        3 => image::imageops::rotate270(&frame),
        _ => frame,
    }
}
