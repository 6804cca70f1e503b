//! Command buffer recording and submission.
//!
//! Wraps native command encoding: render-pass begin/end against abstract
//! attachment descriptors, and fire-and-forget submission with deferred
//! release of the resources a recording touched.

mod attachments;
mod convert;
mod encoder;

pub use attachments::{
    Color, ColorAttachment, ColorTarget, DepthStencilAttachment, DepthStencilTarget, LoadOp,
    StoreOp,
};
pub use encoder::CommandBuffer;
