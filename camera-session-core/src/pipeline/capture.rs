use chrono::Utc;

use crate::models::error::CameraError;
use crate::models::frame::{CapturedFrame, SensorFrame};
use crate::processing::orientation::{self, DisplayRotation};

/// Turns raw sensor buffers into display-ready frames.
///
/// One pipeline exists per open device; it carries the sensor mounting
/// angle so every frame leaves here already upright for the display that
/// requested it.
pub struct CapturePipeline {
    sensor_orientation: u32,
}

impl CapturePipeline {
    pub fn new(sensor_orientation: u32) -> Self {
        Self { sensor_orientation }
    }

    /// Decodes the compressed sensor buffer, rotates it upright, and
    /// stamps it. An empty or undecodable buffer counts as a missed
    /// frame, which callers treat like a capture that never arrived.
    pub fn process(
        &self,
        frame: SensorFrame,
        display: DisplayRotation,
    ) -> Result<CapturedFrame, CameraError> {
        if frame.data.is_empty() {
            log::warn!("empty sensor buffer, treating as a missed frame");
            return Err(CameraError::CaptureTimeout);
        }

        let decoded = image::load_from_memory(&frame.data).map_err(|err| {
            log::warn!(
                "undecodable sensor buffer ({} bytes): {}",
                frame.data.len(),
                err
            );
            CameraError::CaptureTimeout
        })?;

        let angle = orientation::still_orientation(self.sensor_orientation, display);
        let rotated = orientation::rotate_rgba(decoded.to_rgba8(), angle);

        Ok(CapturedFrame {
            width: rotated.width(),
            height: rotated.height(),
            orientation_applied: angle,
            data: rotated.into_raw(),
            timestamp: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{DynamicImage, Rgba, RgbaImage};

    use super::*;

    fn jpeg_frame(width: u32, height: u32) -> SensorFrame {
        let image = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
        });
        let mut bytes = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(image)
            .to_rgb8()
            .write_to(&mut bytes, image::ImageFormat::Jpeg)
            .unwrap();
        SensorFrame {
            data: bytes.into_inner(),
            width,
            height,
        }
    }

    #[test]
    fn upright_sensor_passes_dimensions_through() {
        let pipeline = CapturePipeline::new(0);
        let frame = pipeline
            .process(jpeg_frame(64, 48), DisplayRotation::Deg0)
            .unwrap();
        assert_eq!((frame.width, frame.height), (64, 48));
        assert_eq!(frame.orientation_applied, 0);
        assert_eq!(frame.data.len(), 64 * 48 * 4);
    }

    #[test]
    fn sensor_mounting_angle_rotates_the_output() {
        let pipeline = CapturePipeline::new(90);
        let frame = pipeline
            .process(jpeg_frame(64, 48), DisplayRotation::Deg0)
            .unwrap();
        assert_eq!((frame.width, frame.height), (48, 64));
        assert_eq!(frame.orientation_applied, 90);
    }

    #[test]
    fn display_rotation_compounds_with_the_sensor_angle() {
        let pipeline = CapturePipeline::new(90);
        let frame = pipeline
            .process(jpeg_frame(64, 48), DisplayRotation::Deg270)
            .unwrap();
        // 90 + 270 wraps to a full turn
        assert_eq!(frame.orientation_applied, 0);
        assert_eq!((frame.width, frame.height), (64, 48));
    }

    #[test]
    fn empty_buffer_is_a_missed_frame() {
        let pipeline = CapturePipeline::new(0);
        let result = pipeline.process(
            SensorFrame {
                data: Vec::new(),
                width: 0,
                height: 0,
            },
            DisplayRotation::Deg0,
        );
        assert_eq!(result.unwrap_err(), CameraError::CaptureTimeout);
    }

    #[test]
    fn garbage_buffer_is_a_missed_frame() {
        let pipeline = CapturePipeline::new(0);
        let result = pipeline.process(
            SensorFrame {
                data: vec![0xde, 0xad, 0xbe, 0xef],
                width: 2,
                height: 2,
            },
            DisplayRotation::Deg0,
        );
        assert_eq!(result.unwrap_err(), CameraError::CaptureTimeout);
    }
}
