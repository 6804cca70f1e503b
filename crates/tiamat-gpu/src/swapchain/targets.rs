//! Auxiliary render targets owned by a swapchain.

/// Depth-stencil format used for swapchain depth targets.
///
/// Universally supported; containers that want Depth32FloatStencil8 create
/// their own textures with the negotiated optional feature.
pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24PlusStencil8;

/// One auxiliary target: a texture plus the view used to attach it.
pub(crate) struct AuxTarget<T, V> {
    pub texture: T,
    pub view: V,
}

/// The depth-stencil and optional multisample color targets behind a
/// swapchain.
///
/// Generic over the texture/view types so the release bookkeeping can be
/// exercised without a live device; production code uses the wgpu types.
pub(crate) struct AuxTargets<T = wgpu::Texture, V = wgpu::TextureView> {
    pub msaa: Option<AuxTarget<T, V>>,
    pub depth: Option<AuxTarget<T, V>>,
}

/// Teardown steps, in required release order.
///
/// Views must be released before the textures they view, and the
/// multisample target before the depth target.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) enum ReleaseStep {
    MsaaView,
    MsaaTexture,
    DepthView,
    DepthTexture,
}

impl<T, V> AuxTargets<T, V> {
    pub fn msaa_view(&self) -> Option<&V> {
        self.msaa.as_ref().map(|t| &t.view)
    }

    pub fn depth_view(&self) -> Option<&V> {
        self.depth.as_ref().map(|t| &t.view)
    }

    /// Releases all targets in strict reverse-acquisition order.
    ///
    /// `note` observes each step as it completes; release is idempotent.
    pub fn release(&mut self, mut note: impl FnMut(ReleaseStep)) {
        if let Some(target) = self.msaa.take() {
            drop(target.view);
            note(ReleaseStep::MsaaView);
            drop(target.texture);
            note(ReleaseStep::MsaaTexture);
        }
        if let Some(target) = self.depth.take() {
            drop(target.view);
            note(ReleaseStep::DepthView);
            drop(target.texture);
            note(ReleaseStep::DepthTexture);
        }
    }
}

impl AuxTargets {
    /// Creates the depth-stencil target and, when `sample_count > 1`, the
    /// multisample color target, sized to the swapchain extent.
    pub fn create(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        sample_count: u32,
    ) -> Self {
        let msaa = (sample_count > 1).then(|| {
            make_target(
                device,
                "tiamat msaa color target",
                config,
                config.format,
                sample_count,
            )
        });
        let depth = make_target(
            device,
            "tiamat depth target",
            config,
            DEPTH_FORMAT,
            sample_count,
        );

        Self {
            msaa,
            depth: Some(depth),
        }
    }
}

fn make_target(
    device: &wgpu::Device,
    label: &str,
    config: &wgpu::SurfaceConfiguration,
    format: wgpu::TextureFormat,
    sample_count: u32,
) -> AuxTarget<wgpu::Texture, wgpu::TextureView> {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

    AuxTarget { texture, view }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targets(msaa: bool) -> AuxTargets<u32, u32> {
        AuxTargets {
            msaa: msaa.then(|| AuxTarget {
                texture: 0,
                view: 1,
            }),
            depth: Some(AuxTarget {
                texture: 2,
                view: 3,
            }),
        }
    }

    #[test]
    fn release_order_with_msaa() {
        let mut t = targets(true);
        let mut steps = Vec::new();
        t.release(|s| steps.push(s));

        assert_eq!(
            steps,
            [
                ReleaseStep::MsaaView,
                ReleaseStep::MsaaTexture,
                ReleaseStep::DepthView,
                ReleaseStep::DepthTexture,
            ]
        );
    }

    #[test]
    fn release_order_without_msaa() {
        let mut t = targets(false);
        let mut steps = Vec::new();
        t.release(|s| steps.push(s));

        assert_eq!(steps, [ReleaseStep::DepthView, ReleaseStep::DepthTexture]);
    }

    #[test]
    fn release_is_idempotent() {
        let mut t = targets(true);
        t.release(|_| {});

        let mut steps = Vec::new();
        t.release(|s| steps.push(s));
        assert!(steps.is_empty());
    }
}
