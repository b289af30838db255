use serde::{Deserialize, Serialize};

/// Which way a capture device faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    Front,
    Back,
    External,
}

/// A pixel dimension pair (always sensor-native orientation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SizePx {
    pub width: u32,
    pub height: u32,
}

impl SizePx {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            return 0.0;
        }
        self.width as f32 / self.height as f32
    }
}

impl std::fmt::Display for SizePx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A capture device and its static characteristics.
///
/// Immutable; fetched from the `DeviceRegistry` once per open attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    pub id: String,
    pub name: String,
    pub facing: Facing,
    /// Maximum digital zoom ratio (>= 1.0).
    pub max_zoom: f32,
    /// Mounting orientation of the sensor in degrees (0, 90, 180, 270).
    pub sensor_orientation: u32,
    /// Active sensor array dimensions, the coordinate space for crop and
    /// metering rectangles.
    pub active_area: SizePx,
    /// Output resolutions the device can produce.
    pub output_sizes: Vec<SizePx>,
}

/// How `open()` picks a device from the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceSelector {
    /// Prefer the back-facing device, falling back to the first enumerated.
    Auto,
    /// Prefer a device with the given facing, falling back to the first.
    Facing(Facing),
    /// A specific device by id; no fallback.
    Id(String),
}

impl Default for DeviceSelector {
    fn default() -> Self {
        Self::Auto
    }
}

impl DeviceSelector {
    /// Picks a device from an enumeration, or `None` when nothing matches
    /// (always `None` on an empty list).
    pub fn pick<'a>(&self, devices: &'a [DeviceIdentity]) -> Option<&'a DeviceIdentity> {
        match self {
            Self::Auto => devices
                .iter()
                .find(|d| d.facing == Facing::Back)
                .or_else(|| devices.first()),
            Self::Facing(facing) => devices
                .iter()
                .find(|d| d.facing == *facing)
                .or_else(|| devices.first()),
            Self::Id(id) => devices.iter().find(|d| d.id == *id),
        }
    }
}
