//! tiamat GPU driver crate.
//!
//! WebGPU backend for an abstract GPU layer. This crate owns the pieces
//! that sit between the abstract command API and the native objects:
//! device bootstrap, per-window swapchains, multiply-buffered resource
//! containers, and command buffer submission.

pub mod command;
pub mod device;
pub mod driver;
pub mod resource;
pub mod swapchain;

pub mod logging;
