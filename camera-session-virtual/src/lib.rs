//! # camera-session-virtual
//!
//! In-memory backend for camera-session-core: deterministic devices and
//! encoders with the same asynchronous shape as real hardware.
//!
//! Provides:
//! - `VirtualRegistry` — device enumeration and acquisition
//! - `VirtualDevice` — synthesizes JPEG stills, honors the event-sink contract
//! - `VirtualEncoderFactory` / `VirtualEncoder` — write stub container files
//! - `VirtualKnobs` — fault injection: denied permission, rejected
//!   configuration, starved captures, surprise disconnects
//!
//! ## Usage
//! ```ignore
//! use std::sync::Arc;
//! use camera_session_core::{SessionConfig, SessionController};
//! use camera_session_virtual::{VirtualEncoderFactory, VirtualRegistry};
//!
//! let registry = VirtualRegistry::dual_camera();
//! let controller = SessionController::new(
//!     Arc::new(registry),
//!     Arc::new(VirtualEncoderFactory::default()),
//!     delegate,
//!     SessionConfig::default(),
//! )?;
//! controller.open()?;
//! ```

pub mod device;
pub mod encoder;
pub mod registry;

pub use device::VirtualDevice;
pub use encoder::{VirtualEncoder, VirtualEncoderFactory};
pub use registry::{VirtualKnobs, VirtualRegistry};
