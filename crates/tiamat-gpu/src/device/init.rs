/// Initialization parameters for device negotiation.
///
/// Keep this structure stable and minimal. Add configuration flags only when
/// a concrete platform or backend requirement exists.
#[derive(Debug, Clone)]
pub struct DeviceInit {
    /// Adapter power profile requested from the instance.
    ///
    /// A GPU driver wants the discrete adapter when one exists.
    pub power_preference: wgpu::PowerPreference,

    /// Accept a software fallback adapter when no hardware adapter exists.
    pub force_fallback_adapter: bool,

    /// Features the device must expose. Negotiation fails without them.
    pub required_features: wgpu::Features,

    /// Features requested when the adapter has them and dropped with a
    /// warning when it does not.
    pub optional_features: wgpu::Features,

    /// Limits requested from the adapter/device.
    pub required_limits: wgpu::Limits,
}

impl Default for DeviceInit {
    fn default() -> Self {
        Self {
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            required_features: wgpu::Features::empty(),
            // Combined depth/stencil float format; not universal, so it is
            // negotiated as optional rather than required.
            optional_features: wgpu::Features::DEPTH32FLOAT_STENCIL8,
            required_limits: wgpu::Limits::default(),
        }
    }
}
