use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Local;

use crate::models::artifact::RecordingArtifact;
use crate::models::config::RecordingConfig;
use crate::models::error::CameraError;
use crate::session::surfaces::SurfaceSpec;
use crate::storage::{metadata, naming};
use crate::traits::encoder::{EncoderFactory, VideoEncoder};

/// One recording from encoder creation to a finalized artifact.
///
/// The encoder is released exactly once, on every path: `finish` seals
/// the container before releasing, `abort` releases without sealing, and
/// dropping a pipeline that did neither releases as a last resort.
pub struct RecordingPipeline {
    encoder: Option<Box<dyn VideoEncoder>>,
    input_surface: SurfaceSpec,
    config: RecordingConfig,
    output_path: PathBuf,
    started_at: Option<Instant>,
}

impl RecordingPipeline {
    /// Creates the encoder for a timestamp-named file in `output_dir`.
    /// Nothing is written until frames flow and `finish` runs.
    pub fn new(
        factory: &dyn EncoderFactory,
        config: RecordingConfig,
        output_dir: &Path,
    ) -> Result<Self, CameraError> {
        let output_path = output_dir.join(naming::video_file_name(Local::now()));
        let encoder = factory.create(&config, &output_path)?;
        let input_surface = encoder.input_surface();
        log::info!(
            "encoder ready for {} ({} bps, {} fps)",
            output_path.display(),
            config.bitrate,
            config.frame_rate
        );
        Ok(Self {
            encoder: Some(encoder),
            input_surface,
            config,
            output_path,
            started_at: None,
        })
    }

    /// The surface the device must feed while this recording runs.
    pub fn input_surface(&self) -> SurfaceSpec {
        self.input_surface
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Starts the encoder clock. Called once the recording surface set
    /// is bound and streaming.
    pub fn start(&mut self) -> Result<(), CameraError> {
        match self.encoder.as_mut() {
            Some(encoder) => {
                encoder.start()?;
                self.started_at = Some(Instant::now());
                Ok(())
            }
            None => Err(CameraError::EncoderError("encoder already released".into())),
        }
    }

    /// Seals the container, releases the encoder, and describes the
    /// artifact. The container must be sealed before the encoder goes
    /// away; the release itself happens even when sealing fails.
    pub fn finish(mut self) -> Result<RecordingArtifact, CameraError> {
        let Some(mut encoder) = self.encoder.take() else {
            return Err(CameraError::EncoderError("encoder already released".into()));
        };
        let duration_secs = self
            .started_at
            .map(|at| at.elapsed().as_secs_f64())
            .unwrap_or(0.0);

        let finalized = encoder.finalize();
        encoder.release();
        let output = finalized?;

        let artifact = RecordingArtifact::new(
            self.output_path.clone(),
            duration_secs,
            self.config.resolution.width,
            self.config.resolution.height,
            output.bytes_written,
        );
        // the artifact is valid without its sidecar
        if let Err(err) = metadata::write_sidecar(&artifact) {
            log::warn!("failed to write artifact sidecar: {}", err);
        }
        Ok(artifact)
    }

    /// Discards the recording: releases the encoder without sealing.
    pub fn abort(mut self) {
        if let Some(mut encoder) = self.encoder.take() {
            log::warn!("recording aborted, discarding {}", self.output_path.display());
            encoder.release();
        }
    }
}

impl Drop for RecordingPipeline {
    fn drop(&mut self) {
        if let Some(mut encoder) = self.encoder.take() {
            log::warn!("recording pipeline dropped while live, releasing encoder");
            encoder.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use parking_lot::Mutex;

    use crate::models::device::SizePx;
    use crate::session::surfaces::SurfaceKind;
    use crate::traits::encoder::EncodedOutput;

    use super::*;

    #[derive(Default)]
    struct CallLog {
        events: Mutex<Vec<&'static str>>,
        releases: AtomicUsize,
        fail_finalize: std::sync::atomic::AtomicBool,
    }

    struct LoggingEncoder {
        log: Arc<CallLog>,
        size: SizePx,
    }

    impl VideoEncoder for LoggingEncoder {
        fn input_surface(&self) -> SurfaceSpec {
            SurfaceSpec {
                kind: SurfaceKind::EncoderInput,
                size: self.size,
            }
        }

        fn start(&mut self) -> Result<(), CameraError> {
            self.log.events.lock().push("start");
            Ok(())
        }

        fn finalize(&mut self) -> Result<EncodedOutput, CameraError> {
            self.log.events.lock().push("finalize");
            if self.log.fail_finalize.load(Ordering::SeqCst) {
                return Err(CameraError::EncoderError("muxer failed".into()));
            }
            Ok(EncodedOutput {
                bytes_written: 4_096,
            })
        }

        fn release(&mut self) {
            self.log.events.lock().push("release");
            self.log.releases.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct LoggingFactory {
        log: Arc<CallLog>,
    }

    impl EncoderFactory for LoggingFactory {
        fn create(
            &self,
            config: &RecordingConfig,
            _output: &Path,
        ) -> Result<Box<dyn VideoEncoder>, CameraError> {
            Ok(Box::new(LoggingEncoder {
                log: Arc::clone(&self.log),
                size: config.resolution,
            }))
        }
    }

    fn pipeline(log: &Arc<CallLog>) -> RecordingPipeline {
        let factory = LoggingFactory {
            log: Arc::clone(log),
        };
        RecordingPipeline::new(&factory, RecordingConfig::default(), &std::env::temp_dir())
            .unwrap()
    }

    fn remove_sidecar(artifact: &RecordingArtifact) {
        let _ = fs::remove_file(metadata::sidecar_path(&artifact.file_path));
    }

    #[test]
    fn finish_seals_before_releasing() {
        let log = Arc::new(CallLog::default());
        let mut recording = pipeline(&log);
        recording.start().unwrap();
        thread::sleep(Duration::from_millis(5));

        let artifact = recording.finish().unwrap();
        assert_eq!(*log.events.lock(), vec!["start", "finalize", "release"]);
        assert_eq!(log.releases.load(Ordering::SeqCst), 1);
        assert!(artifact.duration_secs > 0.0);
        assert_eq!(artifact.bytes_written, 4_096);
        assert_eq!((artifact.width, artifact.height), (1280, 720));
        remove_sidecar(&artifact);
    }

    #[test]
    fn failed_finalize_still_releases() {
        let log = Arc::new(CallLog::default());
        log.fail_finalize.store(true, Ordering::SeqCst);
        let mut recording = pipeline(&log);
        recording.start().unwrap();

        let err = recording.finish().unwrap_err();
        assert!(matches!(err, CameraError::EncoderError(_)));
        assert_eq!(log.releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn abort_releases_without_sealing() {
        let log = Arc::new(CallLog::default());
        let recording = pipeline(&log);
        recording.abort();
        assert_eq!(*log.events.lock(), vec!["release"]);
        assert_eq!(log.releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dropping_a_live_pipeline_releases_once() {
        let log = Arc::new(CallLog::default());
        {
            let mut recording = pipeline(&log);
            recording.start().unwrap();
        }
        assert_eq!(log.releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn output_file_name_is_timestamped_video() {
        let log = Arc::new(CallLog::default());
        let recording = pipeline(&log);
        let name = recording
            .output_path()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .to_string();
        assert!(name.starts_with("VID_") && name.ends_with(".mp4"), "{}", name);
        recording.abort();
    }
}
