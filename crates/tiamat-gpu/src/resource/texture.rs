use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use anyhow::{ensure, Result};

use super::pool::CyclePool;

/// Creation parameters for a texture container.
#[derive(Debug, Clone)]
pub struct TextureDesc {
    pub width: u32,
    pub height: u32,
    pub layer_count: u32,
    pub mip_count: u32,
    pub sample_count: u32,
    pub format: wgpu::TextureFormat,
    pub usage: wgpu::TextureUsages,
}

impl TextureDesc {
    /// Single-layer, single-mip 2D texture.
    pub fn d2(width: u32, height: u32, format: wgpu::TextureFormat, usage: wgpu::TextureUsages) -> Self {
        Self {
            width,
            height,
            layer_count: 1,
            mip_count: 1,
            sample_count: 1,
            format,
            usage,
        }
    }
}

/// Handle to a texture backing.
///
/// Cloning tracks one in-flight reference; the backing is released when the
/// last handle drops.
pub type TextureHandle = Arc<PhysicalTexture>;

/// One (layer, mip) slice of a physical texture.
///
/// Attachment and storage views are created on first use and cached for the
/// backing's lifetime. The first-use flag tracks whether the slice has
/// already been prepared in the current recording session, so per-pass
/// preparation runs once per session instead of once per pass.
pub struct TextureSubresource {
    layer: u32,
    mip: u32,
    render_view: OnceLock<wgpu::TextureView>,
    storage_view: OnceLock<wgpu::TextureView>,
    depth_stencil_view: OnceLock<wgpu::TextureView>,
    first_use_done: AtomicBool,
}

impl TextureSubresource {
    fn new(layer: u32, mip: u32) -> Self {
        Self {
            layer,
            mip,
            render_view: OnceLock::new(),
            storage_view: OnceLock::new(),
            depth_stencil_view: OnceLock::new(),
            first_use_done: AtomicBool::new(false),
        }
    }

    pub fn layer(&self) -> u32 {
        self.layer
    }

    pub fn mip(&self) -> u32 {
        self.mip
    }

    /// Marks this slice as used in the current recording session.
    ///
    /// Returns `true` on the first call of the session; callers skip
    /// redundant preparation on subsequent uses within the same session.
    pub(crate) fn note_first_use(&self) -> bool {
        !self.first_use_done.swap(true, Ordering::AcqRel)
    }

    pub(crate) fn end_session(&self) {
        self.first_use_done.store(false, Ordering::Release);
    }
}

fn subresource_index(layer: u32, mip: u32, layer_count: u32, mip_count: u32) -> Option<usize> {
    if layer >= layer_count || mip >= mip_count {
        return None;
    }
    Some((layer * mip_count + mip) as usize)
}

/// One GPU-visible texture allocation plus its subresource table.
pub struct PhysicalTexture {
    raw: wgpu::Texture,
    desc: TextureDesc,
    label: String,
    subresources: Vec<TextureSubresource>,
    marked_for_destroy: AtomicBool,
}

impl PhysicalTexture {
    pub fn raw(&self) -> &wgpu::Texture {
        &self.raw
    }

    pub fn desc(&self) -> &TextureDesc {
        &self.desc
    }

    /// Looks up the (layer, mip) slice.
    pub fn subresource(&self, layer: u32, mip: u32) -> Option<&TextureSubresource> {
        let idx = subresource_index(layer, mip, self.desc.layer_count, self.desc.mip_count)?;
        self.subresources.get(idx)
    }

    /// Render-target view for a slice, created on first use and cached.
    pub fn render_view(&self, layer: u32, mip: u32) -> Option<&wgpu::TextureView> {
        let sub = self.subresource(layer, mip)?;
        Some(
            sub.render_view
                .get_or_init(|| self.create_slice_view(sub, "render")),
        )
    }

    /// Storage (compute-write) view for a slice, created on first use.
    pub fn storage_view(&self, layer: u32, mip: u32) -> Option<&wgpu::TextureView> {
        let sub = self.subresource(layer, mip)?;
        Some(
            sub.storage_view
                .get_or_init(|| self.create_slice_view(sub, "storage")),
        )
    }

    /// Depth-stencil attachment view for a slice, created on first use.
    pub fn depth_stencil_view(&self, layer: u32, mip: u32) -> Option<&wgpu::TextureView> {
        let sub = self.subresource(layer, mip)?;
        Some(
            sub.depth_stencil_view
                .get_or_init(|| self.create_slice_view(sub, "depth-stencil")),
        )
    }

    fn create_slice_view(&self, sub: &TextureSubresource, what: &str) -> wgpu::TextureView {
        let label = format!(
            "{} {what} view (layer {}, mip {})",
            self.label,
            sub.layer(),
            sub.mip()
        );
        self.raw.create_view(&wgpu::TextureViewDescriptor {
            label: Some(&label),
            dimension: Some(wgpu::TextureViewDimension::D2),
            base_mip_level: sub.mip(),
            mip_level_count: Some(1),
            base_array_layer: sub.layer(),
            array_layer_count: Some(1),
            ..Default::default()
        })
    }

    /// Clears per-session first-use flags on every slice.
    ///
    /// Called when a recording session that touched this texture is
    /// submitted.
    pub(crate) fn end_recording_session(&self) {
        for sub in &self.subresources {
            sub.end_session();
        }
    }

    pub(crate) fn mark_for_destroy(&self) {
        self.marked_for_destroy.store(true, Ordering::Release);
    }
}

impl Drop for PhysicalTexture {
    fn drop(&mut self) {
        if self.marked_for_destroy.load(Ordering::Acquire) {
            log::trace!(
                "texture '{}' drained, releasing {}x{} {:?}",
                self.label,
                self.desc.width,
                self.desc.height,
                self.desc.format,
            );
        }
    }
}

/// A logical texture identity with cycle semantics.
pub struct TextureContainer {
    pool: CyclePool<PhysicalTexture>,
    desc: TextureDesc,
}

impl TextureContainer {
    pub(crate) fn new(device: &wgpu::Device, desc: TextureDesc, label: &str) -> Result<Self> {
        let mut pool = CyclePool::new(label);
        // Allocate the first backing eagerly so `active` is always valid.
        pool.acquire_writable(|| allocate(device, &desc, label))?;
        Ok(Self { pool, desc })
    }

    pub fn desc(&self) -> &TextureDesc {
        &self.desc
    }

    pub fn label(&self) -> &str {
        self.pool.label()
    }

    /// The active backing, without cycling.
    pub fn active(&self) -> Option<TextureHandle> {
        self.pool.active()
    }

    /// Returns a backing safe to write this frame.
    ///
    /// Reuses an existing drained backing when possible; otherwise
    /// allocates a fresh one and makes it active.
    pub fn acquire_writable(&mut self, device: &wgpu::Device) -> Result<TextureHandle> {
        let desc = self.desc.clone();
        let label = self.pool.label().to_string();
        self.pool.acquire_writable(|| allocate(device, &desc, &label))
    }

    /// Flags every backing for destruction and drops the container's
    /// references. Physical release waits for in-flight frames to drain.
    pub fn mark_for_destroy(&mut self) {
        for backing in self.pool.backings() {
            backing.mark_for_destroy();
        }
        self.pool.clear();
    }
}

fn allocate(device: &wgpu::Device, desc: &TextureDesc, label: &str) -> Result<PhysicalTexture> {
    ensure!(
        desc.width > 0 && desc.height > 0,
        "texture '{label}' must have a nonzero extent"
    );
    ensure!(
        desc.layer_count > 0 && desc.mip_count > 0,
        "texture '{label}' must have at least one layer and one mip level"
    );
    let max = device.limits().max_texture_dimension_2d;
    ensure!(
        desc.width <= max && desc.height <= max,
        "texture '{label}' of {}x{} exceeds the device limit of {max}",
        desc.width,
        desc.height,
    );

    let raw = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: desc.width,
            height: desc.height,
            depth_or_array_layers: desc.layer_count,
        },
        mip_level_count: desc.mip_count,
        sample_count: desc.sample_count,
        dimension: wgpu::TextureDimension::D2,
        format: desc.format,
        usage: desc.usage,
        view_formats: &[],
    });

    let mut subresources = Vec::with_capacity((desc.layer_count * desc.mip_count) as usize);
    for layer in 0..desc.layer_count {
        for mip in 0..desc.mip_count {
            subresources.push(TextureSubresource::new(layer, mip));
        }
    }

    Ok(PhysicalTexture {
        raw,
        desc: desc.clone(),
        label: label.to_string(),
        subresources,
        marked_for_destroy: AtomicBool::new(false),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── subresource table ────────────────────────────────────────────────

    #[test]
    fn subresource_index_is_layer_major() {
        assert_eq!(subresource_index(0, 0, 2, 3), Some(0));
        assert_eq!(subresource_index(0, 2, 2, 3), Some(2));
        assert_eq!(subresource_index(1, 0, 2, 3), Some(3));
        assert_eq!(subresource_index(1, 2, 2, 3), Some(5));
    }

    #[test]
    fn out_of_range_slice_is_none() {
        assert_eq!(subresource_index(2, 0, 2, 3), None);
        assert_eq!(subresource_index(0, 3, 2, 3), None);
    }

    // ── first-use tracking ───────────────────────────────────────────────

    #[test]
    fn first_use_fires_once_per_session() {
        let sub = TextureSubresource::new(0, 0);

        assert!(sub.note_first_use());
        assert!(!sub.note_first_use());

        sub.end_session();
        assert!(sub.note_first_use());
    }
}
