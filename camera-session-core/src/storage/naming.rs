use chrono::{DateTime, Local};

/// File name for a finished recording, e.g. `VID_20260823_143502.mp4`.
/// Wall-clock based so files sort chronologically in a directory
/// listing.
pub fn video_file_name(at: DateTime<Local>) -> String {
    format!("VID_{}.mp4", at.format("%Y%m%d_%H%M%S"))
}

/// File name for a saved still, e.g. `IMG_1774202102938.jpg`.
/// Millisecond precision keeps burst saves from colliding.
pub fn still_file_name(at: DateTime<Local>) -> String {
    format!("IMG_{}.jpg", at.timestamp_millis())
}
