use winit::dpi::PhysicalSize;

/// Presentation behavior requested when claiming a window.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PresentMode {
    /// Present on vertical blank. Always available.
    Vsync,
    /// Present immediately; may tear.
    Immediate,
    /// Triple-buffered low-latency presentation.
    Mailbox,
}

/// Per-window surface parameters, fixed at claim time.
#[derive(Debug, Clone)]
pub struct SurfaceParams {
    /// Prefer an sRGB surface format when available.
    pub prefer_srgb: bool,

    /// Requested presentation behavior; falls back to vsync when the
    /// surface does not support it.
    pub present_mode: PresentMode,

    /// Sample count for the color target. A count above 1 adds a
    /// multisample color attachment resolved into the presentable surface.
    pub sample_count: u32,

    /// Desired maximum frame latency for the surface.
    ///
    /// This value is a hint; support depends on platform/backend.
    pub desired_maximum_frame_latency: u32,
}

impl Default for SurfaceParams {
    fn default() -> Self {
        Self {
            prefer_srgb: true,
            present_mode: PresentMode::Vsync,
            sample_count: 1,
            desired_maximum_frame_latency: 2,
        }
    }
}

pub(crate) fn map_present_mode(mode: PresentMode) -> wgpu::PresentMode {
    match mode {
        PresentMode::Vsync => wgpu::PresentMode::Fifo,
        PresentMode::Immediate => wgpu::PresentMode::Immediate,
        PresentMode::Mailbox => wgpu::PresentMode::Mailbox,
    }
}

/// Maps the requested mode onto what the surface supports.
///
/// FIFO is the guaranteed fallback: every surface supports it.
pub(crate) fn choose_present_mode(
    supported: &[wgpu::PresentMode],
    requested: PresentMode,
) -> wgpu::PresentMode {
    let wanted = map_present_mode(requested);
    if supported.contains(&wanted) {
        wanted
    } else {
        wgpu::PresentMode::Fifo
    }
}

pub(crate) fn choose_surface_format(
    formats: &[wgpu::TextureFormat],
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    if formats.is_empty() {
        return None;
    }

    if prefer_srgb {
        let preferred = [
            wgpu::TextureFormat::Bgra8UnormSrgb,
            wgpu::TextureFormat::Rgba8UnormSrgb,
        ];
        for f in preferred {
            if formats.contains(&f) {
                return Some(f);
            }
        }
    }

    Some(formats[0])
}

pub(crate) fn choose_alpha_mode(modes: &[wgpu::CompositeAlphaMode]) -> wgpu::CompositeAlphaMode {
    modes
        .first()
        .copied()
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

/// Resize request raised by the windowing collaborator.
///
/// Set asynchronously when the resize notification arrives; consumed
/// synchronously by the next swapchain acquire. Never applied mid-frame.
#[derive(Debug, Default)]
pub(crate) struct PendingResize {
    requested: Option<PhysicalSize<u32>>,
}

impl PendingResize {
    /// Records a new requested extent. A later request supersedes an
    /// unconsumed earlier one.
    pub fn request(&mut self, size: PhysicalSize<u32>) {
        self.requested = Some(size);
    }

    pub fn is_pending(&self) -> bool {
        self.requested.is_some()
    }

    /// Consumes the request. Returns `None` until the next `request`.
    pub fn take(&mut self) -> Option<PhysicalSize<u32>> {
        self.requested.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(w: u32, h: u32) -> PhysicalSize<u32> {
        PhysicalSize::new(w, h)
    }

    // ── pending resize ───────────────────────────────────────────────────

    #[test]
    fn pending_resize_consumed_exactly_once() {
        let mut pending = PendingResize::default();
        pending.request(size(1024, 768));

        assert_eq!(pending.take(), Some(size(1024, 768)));
        assert_eq!(pending.take(), None);
        assert!(!pending.is_pending());
    }

    #[test]
    fn pending_resize_latest_request_wins() {
        let mut pending = PendingResize::default();
        pending.request(size(640, 480));
        pending.request(size(1920, 1080));

        assert_eq!(pending.take(), Some(size(1920, 1080)));
    }

    // ── present mode ─────────────────────────────────────────────────────

    #[test]
    fn vsync_maps_to_fifo() {
        let supported = [wgpu::PresentMode::Fifo, wgpu::PresentMode::Mailbox];
        assert_eq!(
            choose_present_mode(&supported, PresentMode::Vsync),
            wgpu::PresentMode::Fifo
        );
    }

    #[test]
    fn unsupported_mode_falls_back_to_fifo() {
        let supported = [wgpu::PresentMode::Fifo];
        assert_eq!(
            choose_present_mode(&supported, PresentMode::Mailbox),
            wgpu::PresentMode::Fifo
        );
    }

    #[test]
    fn supported_mailbox_is_honored() {
        let supported = [wgpu::PresentMode::Fifo, wgpu::PresentMode::Mailbox];
        assert_eq!(
            choose_present_mode(&supported, PresentMode::Mailbox),
            wgpu::PresentMode::Mailbox
        );
    }

    // ── surface format ───────────────────────────────────────────────────

    #[test]
    fn srgb_preferred_when_available() {
        let formats = [
            wgpu::TextureFormat::Rgba8Unorm,
            wgpu::TextureFormat::Bgra8UnormSrgb,
        ];
        assert_eq!(
            choose_surface_format(&formats, true),
            Some(wgpu::TextureFormat::Bgra8UnormSrgb)
        );
    }

    #[test]
    fn first_format_when_srgb_not_preferred() {
        let formats = [
            wgpu::TextureFormat::Rgba8Unorm,
            wgpu::TextureFormat::Bgra8UnormSrgb,
        ];
        assert_eq!(
            choose_surface_format(&formats, false),
            Some(wgpu::TextureFormat::Rgba8Unorm)
        );
    }

    #[test]
    fn no_formats_is_none() {
        assert_eq!(choose_surface_format(&[], true), None);
    }
}
