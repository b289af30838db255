pub mod metering;
pub mod orientation;
pub mod sizing;
