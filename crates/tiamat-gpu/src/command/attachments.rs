//! Abstract render-pass attachment descriptors.

use crate::resource::TextureHandle;
use crate::swapchain::SwapchainTarget;

/// Load behavior for an attachment at pass begin.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoadOp {
    /// Preserve the previous contents.
    Load,
    /// Clear to the attachment's clear value.
    Clear,
    /// Contents are irrelevant; the pass overwrites everything.
    DontCare,
}

/// Store behavior for an attachment at pass end.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum StoreOp {
    Store,
    DontCare,
}

/// RGBA clear color, linear components.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const BLACK: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };

    pub fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }
}

/// Where a color attachment renders to.
pub enum ColorTarget<'a> {
    /// The window's presentable target; resolves implicitly when it is a
    /// multisample target.
    Swapchain(&'a SwapchainTarget),
    /// One (layer, mip) slice of a container texture.
    Texture {
        texture: &'a TextureHandle,
        layer: u32,
        mip: u32,
    },
}

/// One abstract color attachment.
pub struct ColorAttachment<'a> {
    pub target: ColorTarget<'a>,
    pub load_op: LoadOp,
    pub store_op: StoreOp,
    pub clear_color: Color,
}

impl<'a> ColorAttachment<'a> {
    /// Clear-and-store attachment on the swapchain target, the common case.
    pub fn clear_swapchain(target: &'a SwapchainTarget, clear_color: Color) -> Self {
        Self {
            target: ColorTarget::Swapchain(target),
            load_op: LoadOp::Clear,
            store_op: StoreOp::Store,
            clear_color,
        }
    }
}

/// Where a depth-stencil attachment renders to.
pub enum DepthStencilTarget<'a> {
    Swapchain(&'a SwapchainTarget),
    Texture {
        texture: &'a TextureHandle,
        layer: u32,
        mip: u32,
    },
}

/// One abstract depth-stencil attachment.
///
/// Depth and stencil carry independent load/store ops; a pass that only
/// cares about depth leaves the stencil ops at their defaults.
pub struct DepthStencilAttachment<'a> {
    pub target: DepthStencilTarget<'a>,
    pub depth_load_op: LoadOp,
    pub depth_store_op: StoreOp,
    pub clear_depth: f32,
    pub stencil_load_op: LoadOp,
    pub stencil_store_op: StoreOp,
    pub clear_stencil: u32,
}

impl<'a> DepthStencilAttachment<'a> {
    /// Clear-and-discard attachment on the swapchain's depth target.
    pub fn clear_swapchain(target: &'a SwapchainTarget) -> Self {
        Self {
            target: DepthStencilTarget::Swapchain(target),
            depth_load_op: LoadOp::Clear,
            depth_store_op: StoreOp::DontCare,
            clear_depth: 1.0,
            stencil_load_op: LoadOp::Clear,
            stencil_store_op: StoreOp::DontCare,
            clear_stencil: 0,
        }
    }
}
