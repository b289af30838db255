//! Media pipelines layered on an open session: still-capture
//! post-processing and the recording lifecycle.

pub mod capture;
pub mod recording;
