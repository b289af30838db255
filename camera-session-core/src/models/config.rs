use std::path::PathBuf;
use std::time::Duration;

use super::device::{DeviceSelector, SizePx};

/// Construction-time options for a session controller.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Device preference applied by `open()` (default: back-facing).
    pub device_selector: DeviceSelector,

    /// Directory where recording files and sidecars are written.
    pub output_directory: PathBuf,

    /// Bounded wait for a still frame before `CaptureTimeout` (default: 3s).
    pub capture_timeout: Duration,

    /// Upper bound applied to the preview resolution request before size
    /// selection, `None` for uncapped (default: 1920x1080).
    pub preview_size_cap: Option<SizePx>,
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.capture_timeout.is_zero() {
            return Err("capture timeout must be non-zero".into());
        }
        if let Some(cap) = self.preview_size_cap {
            if cap.width == 0 || cap.height == 0 {
                return Err(format!("degenerate preview size cap: {}", cap));
            }
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            device_selector: DeviceSelector::Auto,
            output_directory: PathBuf::from("."),
            capture_timeout: Duration::from_secs(3),
            preview_size_cap: Some(SizePx::new(1920, 1080)),
        }
    }
}

/// Encoder parameters for a video recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingConfig {
    /// Target video bitrate in bits per second (default: 5 Mbps).
    pub bitrate: u32,

    /// Target frame rate (default: 30).
    pub frame_rate: u32,

    /// Encoder output resolution (default: 1280x720).
    pub resolution: SizePx,
}

impl RecordingConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.bitrate == 0 {
            return Err("bitrate must be positive".into());
        }
        if self.frame_rate == 0 {
            return Err("frame rate must be positive".into());
        }
        if self.resolution.width == 0 || self.resolution.height == 0 {
            return Err(format!("degenerate resolution: {}", self.resolution));
        }
        Ok(())
    }
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            bitrate: 5_000_000,
            frame_rate: 30,
            resolution: SizePx::new(1280, 720),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(SessionConfig::default().validate().is_ok());
        assert!(RecordingConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_timeout() {
        let config = SessionConfig {
            capture_timeout: Duration::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_degenerate_recording_parameters() {
        let config = RecordingConfig {
            bitrate: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err("bitrate must be positive".into()));

        let config = RecordingConfig {
            resolution: SizePx::new(1280, 0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
