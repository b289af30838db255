use std::fmt;
use std::path::Path;

use crate::models::config::RecordingConfig;
use crate::models::error::CameraError;
use crate::session::surfaces::SurfaceSpec;

/// What an encoder reports once its container is finalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedOutput {
    /// Total bytes written to the output file, container included.
    pub bytes_written: u64,
}

/// A video encoder session bound into the capture session while
/// recording.
///
/// Lifecycle: created by an `EncoderFactory`, its `input_surface` bound
/// via `DeviceHandle::configure`, then `start` → `finalize` → `release`.
/// `finalize` MUST complete before `release`, otherwise the container is
/// corrupt; `RecordingPipeline` owns that ordering.
pub trait VideoEncoder: Send {
    /// The surface the device feeds frames into while recording.
    fn input_surface(&self) -> SurfaceSpec;

    /// Starts consuming frames and writing the output file.
    fn start(&mut self) -> Result<(), CameraError>;

    /// Stops encoding and finalizes the output container.
    fn finalize(&mut self) -> Result<EncodedOutput, CameraError>;

    /// Releases the encoder and its input surface. Best-effort; called
    /// exactly once, after `finalize` on the success path.
    fn release(&mut self);
}

impl fmt::Debug for dyn VideoEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("dyn VideoEncoder")
    }
}

/// Creates encoder sessions. Injected at controller construction; no
/// process-wide encoder state.
pub trait EncoderFactory: Send + Sync {
    fn create(
        &self,
        config: &RecordingConfig,
        output: &Path,
    ) -> Result<Box<dyn VideoEncoder>, CameraError>;
}
