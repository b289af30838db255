use thiserror::Error;

/// Errors that can occur while driving a camera session.
///
/// Sequencing errors (`InvalidState`, `NotRecording`, `SingleDeviceOnly`)
/// are returned synchronously by the public API and never reach the worker.
/// Hardware-originated errors fault the session and are also reported via
/// `SessionDelegate::on_error`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CameraError {
    #[error("no capture device available")]
    NoDeviceAvailable,

    #[error("permission denied")]
    PermissionDenied,

    #[error("device access error: {0}")]
    DeviceAccessError(String),

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    #[error("capture timed out")]
    CaptureTimeout,

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("not recording")]
    NotRecording,

    #[error("only one capture device present")]
    SingleDeviceOnly,

    #[error("encoder error: {0}")]
    EncoderError(String),
}

impl CameraError {
    /// Whether this error faults the session when raised by hardware,
    /// as opposed to being recoverable in place (`CaptureTimeout`) or a
    /// synchronous rejection that never touched the hardware.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::PermissionDenied
                | Self::DeviceAccessError(_)
                | Self::ConfigurationFailed(_)
                | Self::EncoderError(_)
        )
    }
}
