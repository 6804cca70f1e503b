//! Driver metadata.

/// Shader intermediate form the driver accepts.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ShaderFormat {
    Wgsl,
}

/// Static driver identification handed to the layer above.
#[derive(Debug, Copy, Clone)]
pub struct DriverInfo {
    pub name: &'static str,
    pub shader_format: ShaderFormat,
}

pub const DRIVER_INFO: DriverInfo = DriverInfo {
    name: "webgpu",
    shader_format: ShaderFormat::Wgsl,
};
