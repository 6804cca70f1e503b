//! Multiply-buffered GPU resource containers.
//!
//! Containers decouple a logical resource identity (what the application
//! holds) from the physical backings the GPU executes against. Acquiring a
//! writable backing cycles to a fresh allocation instead of stalling on one
//! still referenced by an in-flight frame; release of a backing is deferred
//! until its last reference drains.

mod buffer;
mod pool;
mod texture;

pub use buffer::{BufferContainer, BufferDesc, BufferHandle, PhysicalBuffer};
pub use texture::{
    PhysicalTexture, TextureContainer, TextureDesc, TextureHandle, TextureSubresource,
};
