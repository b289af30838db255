//! On-disk conventions for finished media: file naming and artifact
//! sidecar metadata.

pub mod metadata;
pub mod naming;
