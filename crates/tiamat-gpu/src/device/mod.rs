//! Device/adapter bootstrap.
//!
//! This module is responsible for:
//! - creating the wgpu Instance
//! - asynchronous adapter/device negotiation
//! - reporting driver availability to the layer above

mod bootstrap;
mod init;

pub use bootstrap::{negotiate, probe, DeviceHandles};
pub use init::DeviceInit;
