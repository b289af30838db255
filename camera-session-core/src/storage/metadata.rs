use std::fs;
use std::path::{Path, PathBuf};

use crate::models::artifact::RecordingArtifact;
use crate::models::error::CameraError;

/// Sidecar path for a media file:
/// `VID_x.mp4` becomes `VID_x.metadata.json`.
pub fn sidecar_path(media_path: &Path) -> PathBuf {
    media_path.with_extension("metadata.json")
}

/// Writes the artifact description next to its media file and returns
/// the sidecar path.
pub fn write_sidecar(artifact: &RecordingArtifact) -> Result<PathBuf, CameraError> {
    let path = sidecar_path(&artifact.file_path);
    let json = serde_json::to_string_pretty(artifact).map_err(|err| {
        CameraError::EncoderError(format!("failed to serialize artifact metadata: {}", err))
    })?;
    fs::write(&path, json).map_err(|err| {
        CameraError::EncoderError(format!(
            "failed to write artifact metadata to {}: {}",
            path.display(),
            err
        ))
    })?;
    Ok(path)
}

/// Loads the artifact description for a media file from its sidecar.
pub fn read_sidecar(media_path: &Path) -> Result<RecordingArtifact, CameraError> {
    let path = sidecar_path(media_path);
    let json = fs::read_to_string(&path).map_err(|err| {
        CameraError::EncoderError(format!(
            "failed to read artifact metadata from {}: {}",
            path.display(),
            err
        ))
    })?;
    serde_json::from_str(&json).map_err(|err| {
        CameraError::EncoderError(format!("failed to parse artifact metadata: {}", err))
    })
}
