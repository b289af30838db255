//! Session orchestration: the public controller boundary, the worker
//! thread that owns all hardware objects, and the surface bookkeeping
//! they share.

mod commands;
mod worker;

pub mod controller;
pub mod surfaces;
