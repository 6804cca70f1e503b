use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{ensure, Result};

use super::pool::CyclePool;

/// Creation parameters for a buffer container.
#[derive(Debug, Clone)]
pub struct BufferDesc {
    pub size: u64,
    pub usage: wgpu::BufferUsages,
}

/// Handle to a buffer backing.
///
/// Cloning tracks one in-flight reference; the backing is released when the
/// last handle drops.
pub type BufferHandle = Arc<PhysicalBuffer>;

/// One GPU-visible buffer allocation.
///
/// Shared by reference count across handles whose frame lifetimes overlap.
pub struct PhysicalBuffer {
    raw: wgpu::Buffer,
    size: u64,
    usage: wgpu::BufferUsages,
    label: String,
    marked_for_destroy: AtomicBool,
}

impl PhysicalBuffer {
    pub fn raw(&self) -> &wgpu::Buffer {
        &self.raw
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn usage(&self) -> wgpu::BufferUsages {
        self.usage
    }

    /// Writes `data` at `offset` through the queue's staging path.
    pub fn write(&self, queue: &wgpu::Queue, offset: u64, data: &[u8]) -> Result<()> {
        ensure!(
            offset + data.len() as u64 <= self.size,
            "write of {} bytes at offset {offset} overflows buffer '{}' ({} bytes)",
            data.len(),
            self.label,
            self.size,
        );
        queue.write_buffer(&self.raw, offset, data);
        Ok(())
    }

    pub(crate) fn mark_for_destroy(&self) {
        self.marked_for_destroy.store(true, Ordering::Release);
    }
}

impl Drop for PhysicalBuffer {
    fn drop(&mut self) {
        if self.marked_for_destroy.load(Ordering::Acquire) {
            log::trace!("buffer '{}' drained, releasing {} bytes", self.label, self.size);
        }
    }
}

/// A logical buffer identity with cycle semantics.
///
/// The container always has an active backing; acquiring a writable backing
/// cycles to a fresh allocation when every existing one is still referenced
/// by an in-flight frame.
pub struct BufferContainer {
    pool: CyclePool<PhysicalBuffer>,
    desc: BufferDesc,
}

impl BufferContainer {
    pub(crate) fn new(device: &wgpu::Device, desc: BufferDesc, label: &str) -> Result<Self> {
        let mut pool = CyclePool::new(label);
        // Allocate the first backing eagerly so `active` is always valid.
        pool.acquire_writable(|| allocate(device, &desc, label))?;
        Ok(Self { pool, desc })
    }

    pub fn desc(&self) -> &BufferDesc {
        &self.desc
    }

    pub fn label(&self) -> &str {
        self.pool.label()
    }

    /// The active backing, without cycling.
    pub fn active(&self) -> Option<BufferHandle> {
        self.pool.active()
    }

    /// Returns a backing safe to write this frame.
    ///
    /// Reuses an existing drained backing when possible; otherwise
    /// allocates a fresh one and makes it active. An allocation error fails
    /// only this call; existing backings and the container stay usable.
    pub fn acquire_writable(&mut self, device: &wgpu::Device) -> Result<BufferHandle> {
        let desc = self.desc.clone();
        let label = self.pool.label().to_string();
        self.pool.acquire_writable(|| allocate(device, &desc, &label))
    }

    /// Flags every backing for destruction and drops the container's
    /// references.
    ///
    /// Physical release happens when each backing's outstanding handles
    /// drain, never synchronously while the GPU may still read it.
    pub fn mark_for_destroy(&mut self) {
        for backing in self.pool.backings() {
            backing.mark_for_destroy();
        }
        self.pool.clear();
    }
}

fn allocate(device: &wgpu::Device, desc: &BufferDesc, label: &str) -> Result<PhysicalBuffer> {
    ensure!(desc.size > 0, "buffer '{label}' must have a nonzero size");
    let max = device.limits().max_buffer_size;
    ensure!(
        desc.size <= max,
        "buffer '{label}' of {} bytes exceeds the device limit of {max} bytes",
        desc.size,
    );

    let raw = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: desc.size,
        usage: desc.usage,
        mapped_at_creation: false,
    });

    Ok(PhysicalBuffer {
        raw,
        size: desc.size,
        usage: desc.usage,
        label: label.to_string(),
        marked_for_destroy: AtomicBool::new(false),
    })
}
