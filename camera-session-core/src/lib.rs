//! # camera-session-core
//!
//! Platform-agnostic camera session management: one controller that
//! arbitrates a capture device among live preview, still capture, and
//! video recording. Hardware is reached only through narrow traits, so
//! the full lifecycle is testable without a camera.
//!
//! ```text
//! camera-session-core
//! ├── models/       shared data types: states, errors, configs, frames
//! ├── traits/       platform seams: registry, device handle, encoder
//! ├── session/      the controller boundary and its worker thread
//! ├── pipeline/     still-capture processing and recording lifecycle
//! ├── processing/   pure helpers: sizing, orientation, metering
//! └── storage/      file naming and artifact sidecar metadata
//! ```
//!
//! Platform crates (such as `camera-session-virtual`) implement
//! [`DeviceRegistry`], [`DeviceHandle`], and [`EncoderFactory`]. Hosts
//! construct a [`SessionController`] with those implementations, drive
//! it from any thread, and observe it through a [`SessionDelegate`].

pub mod models;
pub mod pipeline;
pub mod processing;
pub mod session;
pub mod storage;
pub mod traits;

pub use models::artifact::RecordingArtifact;
pub use models::config::{RecordingConfig, SessionConfig};
pub use models::controls::{
    FlashMode, FocusPoint, RepeatingRequest, RequestTemplate, SensorRect, StillRequest,
};
pub use models::device::{DeviceIdentity, DeviceSelector, Facing, SizePx};
pub use models::error::CameraError;
pub use models::frame::{CapturedFrame, SensorFrame};
pub use models::state::SessionState;
pub use processing::orientation::DisplayRotation;
pub use session::controller::SessionController;
pub use session::surfaces::{ActiveSurfaceSet, SurfaceInfo, SurfaceKind, SurfaceSpec};
pub use traits::device_handle::{DeviceHandle, HardwareEvent, HardwareEvents};
pub use traits::device_registry::DeviceRegistry;
pub use traits::encoder::{EncodedOutput, EncoderFactory, VideoEncoder};
pub use traits::session_delegate::{
    CaptureCallback, RecordingStartCallback, RecordingStopCallback, SessionDelegate,
};
