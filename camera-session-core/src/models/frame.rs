use std::fmt;

use chrono::{DateTime, Utc};

/// Raw still-capture output as delivered by a device backend.
///
/// `data` holds the encoded bytes from the still target (JPEG); `width`
/// and `height` are the sensor-native dimensions before any orientation
/// correction.
#[derive(Clone, PartialEq, Eq)]
pub struct SensorFrame {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl fmt::Debug for SensorFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SensorFrame")
            .field("bytes", &self.data.len())
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

/// A decoded, orientation-corrected still frame.
///
/// `data` is tightly packed RGBA8 (`width * height * 4` bytes) with the
/// correction already applied; `orientation_applied` records the clockwise
/// rotation that was baked in. Ownership transfers to the caller on
/// delivery; the pipeline keeps no reference.
#[derive(Clone, PartialEq)]
pub struct CapturedFrame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub orientation_applied: u32,
    pub timestamp: DateTime<Utc>,
}

impl fmt::Debug for CapturedFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapturedFrame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.data.len())
            .field("orientation_applied", &self.orientation_applied)
            .field("timestamp", &self.timestamp)
            .finish()
    }
}
