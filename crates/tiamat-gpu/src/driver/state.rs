use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use winit::dpi::PhysicalSize;
use winit::window::{Window, WindowId};

use crate::command::CommandBuffer;
use crate::device::{negotiate, DeviceHandles, DeviceInit};
use crate::resource::{BufferContainer, BufferDesc, TextureContainer, TextureDesc};
use crate::swapchain::{SurfaceParams, SwapchainTarget, WindowSwapchain};

use super::info::{DriverInfo, DRIVER_INFO};

/// Per-device driver state.
///
/// Owns the negotiated device handles and every claimed window. Containers
/// created through it allocate against its device. One renderer per logical
/// device; it lives until drop, and everything claimed under it is torn
/// down with it.
pub struct Renderer {
    handles: DeviceHandles,
    windows: HashMap<WindowId, WindowSwapchain>,
}

impl Renderer {
    /// Negotiates an adapter and device asynchronously.
    ///
    /// Nothing may run against a renderer that failed to construct; on
    /// failure no `Renderer` value exists.
    pub async fn new_async(init: DeviceInit) -> Result<Self> {
        let handles = negotiate(init).await?;
        Ok(Self {
            handles,
            windows: HashMap::new(),
        })
    }

    /// Blocking construction for embedders without an executor.
    pub fn new(init: DeviceInit) -> Result<Self> {
        pollster::block_on(Self::new_async(init))
    }

    pub fn driver_info(&self) -> DriverInfo {
        DRIVER_INFO
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.handles.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.handles.queue
    }

    pub fn adapter(&self) -> &wgpu::Adapter {
        &self.handles.adapter
    }

    /// Claims a window: builds its surface, swapchain, and attachments at
    /// the window's current dimensions.
    ///
    /// Fails when the window is already claimed or surface creation fails;
    /// the renderer stays usable either way.
    pub fn claim_window(&mut self, window: Arc<Window>, params: SurfaceParams) -> Result<()> {
        let id = window.id();
        anyhow::ensure!(
            !self.windows.contains_key(&id),
            "window {id:?} is already claimed"
        );

        let swapchain = WindowSwapchain::create(
            &self.handles.instance,
            &self.handles.adapter,
            &self.handles.device,
            window,
            params,
        )
        .context("failed to create swapchain for claimed window")?;

        self.windows.insert(id, swapchain);
        log::info!("claimed window {id:?}");
        Ok(())
    }

    /// Releases a claimed window, tearing its swapchain down.
    pub fn release_window(&mut self, id: WindowId) -> bool {
        match self.windows.remove(&id) {
            Some(mut swapchain) => {
                swapchain.destroy();
                log::info!("released window {id:?}");
                true
            }
            None => {
                log::warn!("release_window for unclaimed window {id:?}");
                false
            }
        }
    }

    /// Routes a resize notification to the window's swapchain.
    ///
    /// The swapchain rebuild happens at the next acquire, never mid-frame.
    pub fn notify_window_resized(&mut self, id: WindowId, new_size: PhysicalSize<u32>) {
        match self.windows.get_mut(&id) {
            Some(swapchain) => swapchain.request_recreate(new_size),
            None => log::warn!("resize notification for unclaimed window {id:?}"),
        }
    }

    /// Allocates a one-shot recording context.
    pub fn acquire_command_buffer(&self) -> CommandBuffer {
        CommandBuffer::new(&self.handles.device)
    }

    /// Acquires the presentable texture for a claimed window, consuming any
    /// pending recreate first.
    ///
    /// Returns `None` when acquisition fails; the caller skips the frame
    /// and tries again next frame. The acquired surface texture is handed
    /// to `cmd` and presented when `cmd` is submitted.
    pub fn acquire_swapchain_texture(
        &mut self,
        cmd: &mut CommandBuffer,
        id: WindowId,
    ) -> Option<SwapchainTarget> {
        let Some(swapchain) = self.windows.get_mut(&id) else {
            log::error!("acquire_swapchain_texture for unclaimed window {id:?}");
            return None;
        };

        let (target, surface_texture) =
            swapchain.acquire(&self.handles.instance, &self.handles.device)?;
        cmd.push_present(surface_texture);
        Some(target)
    }

    /// Submits recorded work and presents any acquired swapchain textures.
    ///
    /// Fire-and-forget: no completion handle. Backings retained by the
    /// command buffer drain when the queue signals completion.
    pub fn submit(&self, cmd: CommandBuffer) {
        cmd.finish_and_submit(&self.handles.queue);
    }

    /// Creates a buffer container against this renderer's device.
    pub fn create_buffer(&self, desc: BufferDesc, label: &str) -> Result<BufferContainer> {
        BufferContainer::new(&self.handles.device, desc, label)
    }

    /// Creates a texture container against this renderer's device.
    pub fn create_texture(&self, desc: TextureDesc, label: &str) -> Result<TextureContainer> {
        TextureContainer::new(&self.handles.device, desc, label)
    }

    /// Diagnostic: teardown/recreate cycles a window's swapchain has done.
    pub fn swapchain_recreate_count(&self, id: WindowId) -> Option<u64> {
        self.windows.get(&id).map(|sc| sc.recreate_count())
    }

    /// Diagnostic: a claimed window's current swapchain extent.
    pub fn swapchain_extent(&self, id: WindowId) -> Option<(u32, u32)> {
        self.windows.get(&id).map(|sc| sc.extent())
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        for swapchain in self.windows.values_mut() {
            swapchain.destroy();
        }
    }
}
