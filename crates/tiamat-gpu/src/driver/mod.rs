//! Process-wide driver state and the upward driver contract.

mod info;
mod state;

pub use info::{DriverInfo, ShaderFormat, DRIVER_INFO};
pub use state::Renderer;
