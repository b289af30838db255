pub mod artifact;
pub mod config;
pub mod controls;
pub mod device;
pub mod error;
pub mod frame;
pub mod state;
