use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Finished recording output, valid only after a successful stop.
///
/// The container is finalized before this value exists; serializable for
/// the JSON sidecar written next to the media file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingArtifact {
    pub id: String,
    pub file_path: PathBuf,
    pub duration_secs: f64,
    pub width: u32,
    pub height: u32,
    pub bytes_written: u64,
    pub created_at: String,
}

impl RecordingArtifact {
    pub fn new(
        file_path: PathBuf,
        duration_secs: f64,
        width: u32,
        height: u32,
        bytes_written: u64,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            file_path,
            duration_secs,
            width,
            height,
            bytes_written,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
