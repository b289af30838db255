pub mod device_handle;
pub mod device_registry;
pub mod encoder;
pub mod session_delegate;
