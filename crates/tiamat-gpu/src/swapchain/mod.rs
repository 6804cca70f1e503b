//! Per-window swapchain management.
//!
//! This module is responsible for:
//! - creating & configuring the surface (swapchain) for a claimed window
//! - owning the depth-stencil and multisample color attachments
//! - lazy teardown/recreate when the window is resized

mod error;
mod manager;
mod params;
mod targets;

pub use error::SurfaceErrorAction;
pub use manager::{SwapchainTarget, WindowSwapchain};
pub use params::{PresentMode, SurfaceParams};

pub(crate) use targets::DEPTH_FORMAT;
