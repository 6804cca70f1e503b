use std::sync::Arc;

use anyhow::{Context, Result};
use winit::dpi::PhysicalSize;
use winit::window::Window;

use super::error::{map_surface_error, SurfaceErrorAction};
use super::params::{
    choose_alpha_mode, choose_present_mode, choose_surface_format, PendingResize, SurfaceParams,
};
use super::targets::AuxTargets;

/// One acquired presentable frame plus the attachment views to render into.
///
/// With multisampling enabled, `view` is the multisample color target and
/// `resolve_target` is the presentable surface view; the render pass
/// resolves into it implicitly. Without multisampling, `view` is the
/// presentable view itself.
pub struct SwapchainTarget {
    pub view: wgpu::TextureView,
    pub resolve_target: Option<wgpu::TextureView>,
    pub depth_view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
    pub sample_count: u32,
    pub format: wgpu::TextureFormat,
}

/// Swapchain and auxiliary attachments for one claimed window.
///
/// Lifecycle: configured at claim time, torn down and rebuilt when a resize
/// notification is consumed, destroyed when the window is released. The
/// rebuild is always lazy: it happens at the next acquire, never mid-frame.
pub struct WindowSwapchain {
    window: Arc<Window>,
    surface: Option<wgpu::Surface<'static>>,
    config: wgpu::SurfaceConfiguration,
    params: SurfaceParams,
    targets: AuxTargets,
    pending_resize: PendingResize,
    recreate_count: u64,
}

impl WindowSwapchain {
    /// Builds the surface, swapchain configuration, and attachments for a
    /// freshly claimed window, sized to its current dimensions.
    pub(crate) fn create(
        instance: &wgpu::Instance,
        adapter: &wgpu::Adapter,
        device: &wgpu::Device,
        window: Arc<Window>,
        params: SurfaceParams,
    ) -> Result<Self> {
        let size = window.inner_size();

        let surface = instance
            .create_surface(window.clone())
            .context("failed to create wgpu surface")?;

        let caps = surface.get_capabilities(adapter);
        let format = choose_surface_format(&caps.formats, params.prefer_srgb)
            .context("no supported surface formats")?;
        let present_mode = choose_present_mode(&caps.present_modes, params.present_mode);
        let alpha_mode = choose_alpha_mode(&caps.alpha_modes);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: params.desired_maximum_frame_latency,
        };

        surface.configure(device, &config);
        let targets = AuxTargets::create(device, &config, params.sample_count);

        log::debug!(
            "swapchain configured for {:?}: {}x{} {format:?} {present_mode:?} samples={}",
            window.id(),
            config.width,
            config.height,
            params.sample_count,
        );

        Ok(Self {
            window,
            surface: Some(surface),
            config,
            params,
            targets,
            pending_resize: PendingResize::default(),
            recreate_count: 0,
        })
    }

    /// Notes that the swapchain must be rebuilt before the next acquire.
    ///
    /// Called from the resize notification path. Consumed lazily by
    /// [`WindowSwapchain::acquire`]; repeated notifications before the next
    /// acquire coalesce into one rebuild.
    pub fn request_recreate(&mut self, new_size: PhysicalSize<u32>) {
        self.pending_resize.request(new_size);
    }

    pub fn needs_recreate(&self) -> bool {
        self.pending_resize.is_pending()
    }

    /// Number of completed teardown/recreate cycles.
    pub fn recreate_count(&self) -> u64 {
        self.recreate_count
    }

    pub fn extent(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Acquires the next presentable texture, rebuilding the swapchain
    /// first when a resize notification is pending.
    ///
    /// Returns `None` when acquisition fails; the caller skips the frame
    /// rather than retrying in a loop. The returned surface texture must be
    /// presented after the frame's work is submitted.
    pub(crate) fn acquire(
        &mut self,
        instance: &wgpu::Instance,
        device: &wgpu::Device,
    ) -> Option<(SwapchainTarget, wgpu::SurfaceTexture)> {
        if let Some(new_size) = self.pending_resize.take() {
            if new_size.width == 0 || new_size.height == 0 {
                // A zero-sized surface cannot be configured. Skip until the
                // window reports a real size again.
                log::debug!("skipping frame for {:?}: window is zero-sized", self.window.id());
                return None;
            }
            if let Err(e) = self.recreate(instance, device, new_size) {
                log::error!("swapchain recreate failed: {e:#}");
                return None;
            }
        }

        let surface = self.surface.as_ref()?;
        let surface_texture = match surface.get_current_texture() {
            Ok(texture) => texture,
            Err(err) => {
                match map_surface_error(err.clone()) {
                    SurfaceErrorAction::Recreate => {
                        // Rebuild at the window's current size on the next
                        // acquire.
                        self.pending_resize.request(self.window.inner_size());
                        log::warn!("surface lost or outdated, scheduling recreate: {err}");
                    }
                    SurfaceErrorAction::SkipFrame => {
                        log::warn!("failed to acquire swapchain texture: {err}");
                    }
                    SurfaceErrorAction::Fatal => {
                        log::error!("surface is out of memory: {err}");
                    }
                }
                return None;
            }
        };

        let surface_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let (view, resolve_target) = match self.targets.msaa_view() {
            Some(msaa) => (msaa.clone(), Some(surface_view)),
            None => (surface_view, None),
        };
        let depth_view = self.targets.depth_view()?.clone();

        let target = SwapchainTarget {
            view,
            resolve_target,
            depth_view,
            width: self.config.width,
            height: self.config.height,
            sample_count: self.params.sample_count,
            format: self.config.format,
        };

        Some((target, surface_texture))
    }

    /// Full teardown and fresh creation at the new extent.
    ///
    /// Release order is strict: attachment views, then their textures, then
    /// the swapchain configuration, then the surface. Dependent views must
    /// go before the objects they view.
    fn recreate(
        &mut self,
        instance: &wgpu::Instance,
        device: &wgpu::Device,
        new_size: PhysicalSize<u32>,
    ) -> Result<()> {
        self.targets.release(|step| log::trace!("released {step:?}"));
        if let Some(surface) = self.surface.take() {
            drop(surface);
            log::trace!("released swapchain and surface");
        }

        let surface = instance
            .create_surface(self.window.clone())
            .context("failed to re-create wgpu surface")?;

        self.config.width = new_size.width;
        self.config.height = new_size.height;
        surface.configure(device, &self.config);

        self.targets = AuxTargets::create(device, &self.config, self.params.sample_count);
        self.surface = Some(surface);
        self.recreate_count += 1;

        log::debug!(
            "swapchain for {:?} recreated at {}x{}",
            self.window.id(),
            self.config.width,
            self.config.height
        );
        Ok(())
    }

    /// Tears down every native object this swapchain owns.
    pub(crate) fn destroy(&mut self) {
        self.targets.release(|step| log::trace!("released {step:?}"));
        if let Some(surface) = self.surface.take() {
            drop(surface);
            log::trace!("released swapchain and surface");
        }
    }
}
