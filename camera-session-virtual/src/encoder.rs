use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use camera_session_core::{
    CameraError, EncodedOutput, EncoderFactory, RecordingConfig, SizePx, SurfaceKind, SurfaceSpec,
    VideoEncoder,
};

/// Container magic for the stub files the virtual encoder emits; enough
/// for a file sniffer to call them MP4.
const CONTAINER_HEADER: [u8; 12] = [
    0x00, 0x00, 0x00, 0x0c, b'f', b't', b'y', b'p', b'm', b'p', b'4', b'2',
];

/// Writes a placeholder container sized by recording duration and
/// bitrate. No codec runs; the point is exercising every lifecycle edge
/// around one.
pub struct VirtualEncoder {
    output: PathBuf,
    resolution: SizePx,
    bitrate: u32,
    started_at: Option<Instant>,
    finalized: bool,
}

impl VideoEncoder for VirtualEncoder {
    fn input_surface(&self) -> SurfaceSpec {
        SurfaceSpec {
            kind: SurfaceKind::EncoderInput,
            size: self.resolution,
        }
    }

    fn start(&mut self) -> Result<(), CameraError> {
        self.started_at = Some(Instant::now());
        Ok(())
    }

    fn finalize(&mut self) -> Result<EncodedOutput, CameraError> {
        let Some(started_at) = self.started_at else {
            return Err(CameraError::EncoderError("finalize before start".into()));
        };
        let elapsed = started_at.elapsed().as_secs_f64();
        let payload = ((elapsed * f64::from(self.bitrate) / 8.0) as usize).clamp(1024, 1 << 20);

        let mut bytes = Vec::with_capacity(CONTAINER_HEADER.len() + payload);
        bytes.extend_from_slice(&CONTAINER_HEADER);
        bytes.resize(CONTAINER_HEADER.len() + payload, 0);
        fs::write(&self.output, &bytes).map_err(|err| {
            CameraError::EncoderError(format!(
                "failed to write {}: {}",
                self.output.display(),
                err
            ))
        })?;

        self.finalized = true;
        Ok(EncodedOutput {
            bytes_written: bytes.len() as u64,
        })
    }

    fn release(&mut self) {
        // an unsealed recording leaves no file behind
        if !self.finalized {
            let _ = fs::remove_file(&self.output);
        }
    }
}

/// Creates [`VirtualEncoder`]s. The output directory must already
/// exist, mirroring how a hardware muxer fails at creation rather than
/// at the end of a recording.
#[derive(Debug, Default)]
pub struct VirtualEncoderFactory;

impl EncoderFactory for VirtualEncoderFactory {
    fn create(
        &self,
        config: &RecordingConfig,
        output: &Path,
    ) -> Result<Box<dyn VideoEncoder>, CameraError> {
        let Some(parent) = output.parent() else {
            return Err(CameraError::EncoderError(format!(
                "output path {} has no parent directory",
                output.display()
            )));
        };
        if !parent.as_os_str().is_empty() && !parent.is_dir() {
            return Err(CameraError::EncoderError(format!(
                "output directory {} does not exist",
                parent.display()
            )));
        }
        log::debug!("virtual encoder ready for {}", output.display());
        Ok(Box::new(VirtualEncoder {
            output: output.to_path_buf(),
            resolution: config.resolution,
            bitrate: config.bitrate,
            started_at: None,
            finalized: false,
        }))
    }
}
