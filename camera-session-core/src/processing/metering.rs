//! Sensor-space geometry for zoom and tap-to-focus.
//!
//! Zoom is realized as a centered crop of the active array; focus taps
//! arrive in normalized surface coordinates and become clamped metering
//! rectangles on the same array.

use crate::models::controls::{FocusPoint, SensorRect};
use crate::models::device::SizePx;

/// Fraction of each active-array axis covered by a focus metering region.
const FOCUS_REGION_FRACTION: f32 = 0.15;

/// Clamps a requested zoom ratio to the device range. Non-finite input
/// resolves to 1.0.
pub fn clamp_zoom(level: f32, max_zoom: f32) -> f32 {
    if !level.is_finite() {
        return 1.0;
    }
    level.clamp(1.0, max_zoom.max(1.0))
}

/// Centered crop rectangle implementing a zoom ratio: the crop spans
/// `active / zoom` on each axis. A ratio of 1.0 yields the full array.
pub fn zoom_crop(active_area: SizePx, zoom: f32) -> SensorRect {
    let zoom = clamp_zoom(zoom, f32::MAX);
    let width = ((active_area.width as f32 / zoom) as u32).max(1);
    let height = ((active_area.height as f32 / zoom) as u32).max(1);
    SensorRect {
        x: (active_area.width - width) / 2,
        y: (active_area.height - height) / 2,
        width,
        height,
    }
}

/// Maps a normalized tap point onto the active array as a metering
/// rectangle, clamped so the region never leaves the array.
pub fn focus_region(point: FocusPoint, active_area: SizePx) -> SensorRect {
    let width = ((active_area.width as f32 * FOCUS_REGION_FRACTION) as u32).max(1);
    let height = ((active_area.height as f32 * FOCUS_REGION_FRACTION) as u32).max(1);

    let x = point.x.clamp(0.0, 1.0) * active_area.width as f32;
    let y = point.y.clamp(0.0, 1.0) * active_area.height as f32;

    let max_x = active_area.width.saturating_sub(width);
    let max_y = active_area.height.saturating_sub(height);

    SensorRect {
        x: ((x as u32).saturating_sub(width / 2)).min(max_x),
        y: ((y as u32).saturating_sub(height / 2)).min(max_y),
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    const ACTIVE: SizePx = SizePx::new(4000, 3000);

    #[test]
    fn zoom_clamps_to_device_range() {
        assert_relative_eq!(clamp_zoom(0.5, 8.0), 1.0);
        assert_relative_eq!(clamp_zoom(4.0, 8.0), 4.0);
        assert_relative_eq!(clamp_zoom(100.0, 8.0), 8.0);
        assert_relative_eq!(clamp_zoom(f32::NAN, 8.0), 1.0);
        assert_relative_eq!(clamp_zoom(f32::INFINITY, 8.0), 1.0);
    }

    #[test]
    fn unit_zoom_is_full_array() {
        let crop = zoom_crop(ACTIVE, 1.0);
        assert_eq!(crop, SensorRect::full(ACTIVE));
    }

    #[test]
    fn double_zoom_crops_center_half() {
        let crop = zoom_crop(ACTIVE, 2.0);
        assert_eq!(crop.width, 2000);
        assert_eq!(crop.height, 1500);
        assert_eq!(crop.x, 1000);
        assert_eq!(crop.y, 750);
    }

    #[test]
    fn centered_tap_centers_the_region() {
        let region = focus_region(FocusPoint { x: 0.5, y: 0.5 }, ACTIVE);
        assert_eq!(region.width, 600);
        assert_eq!(region.height, 450);
        assert_eq!(region.x, 2000 - 300);
        assert_eq!(region.y, 1500 - 225);
    }

    #[test]
    fn corner_taps_are_clamped_inside_the_array() {
        let top_left = focus_region(FocusPoint { x: 0.0, y: 0.0 }, ACTIVE);
        assert_eq!((top_left.x, top_left.y), (0, 0));

        let bottom_right = focus_region(FocusPoint { x: 1.0, y: 1.0 }, ACTIVE);
        assert_eq!(bottom_right.x + bottom_right.width, ACTIVE.width);
        assert_eq!(bottom_right.y + bottom_right.height, ACTIVE.height);

        let out_of_range = focus_region(FocusPoint { x: 7.0, y: -3.0 }, ACTIVE);
        assert!(out_of_range.x + out_of_range.width <= ACTIVE.width);
        assert!(out_of_range.y + out_of_range.height <= ACTIVE.height);
    }
}
