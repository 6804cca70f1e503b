//! Translation from abstract attachment descriptors to wgpu form.

use super::attachments::{Color, LoadOp, StoreOp};

pub(crate) fn color_load_op(op: LoadOp, clear: Color) -> wgpu::LoadOp<wgpu::Color> {
    let clear = wgpu::Color {
        r: clear.r,
        g: clear.g,
        b: clear.b,
        a: clear.a,
    };
    match op {
        LoadOp::Load => wgpu::LoadOp::Load,
        LoadOp::Clear => wgpu::LoadOp::Clear(clear),
        // WebGPU has no undefined-contents load; treat it as a clear.
        LoadOp::DontCare => wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
    }
}

pub(crate) fn depth_load_op(op: LoadOp, clear: f32) -> wgpu::LoadOp<f32> {
    match op {
        LoadOp::Load => wgpu::LoadOp::Load,
        LoadOp::Clear => wgpu::LoadOp::Clear(clear),
        LoadOp::DontCare => wgpu::LoadOp::Clear(1.0),
    }
}

pub(crate) fn stencil_load_op(op: LoadOp, clear: u32) -> wgpu::LoadOp<u32> {
    match op {
        LoadOp::Load => wgpu::LoadOp::Load,
        LoadOp::Clear => wgpu::LoadOp::Clear(clear),
        LoadOp::DontCare => wgpu::LoadOp::Clear(0),
    }
}

pub(crate) fn store_op(op: StoreOp) -> wgpu::StoreOp {
    match op {
        StoreOp::Store => wgpu::StoreOp::Store,
        StoreOp::DontCare => wgpu::StoreOp::Discard,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_color_components_carry_over() {
        let translated = color_load_op(LoadOp::Clear, Color::new(0.25, 0.5, 0.75, 1.0));
        assert!(matches!(
            translated,
            wgpu::LoadOp::Clear(c) if c.r == 0.25 && c.g == 0.5 && c.b == 0.75 && c.a == 1.0
        ));
    }

    #[test]
    fn dont_care_loads_become_clears() {
        assert!(matches!(
            color_load_op(LoadOp::DontCare, Color::BLACK),
            wgpu::LoadOp::Clear(_)
        ));
        assert!(matches!(
            depth_load_op(LoadOp::DontCare, 0.0),
            wgpu::LoadOp::Clear(v) if v == 1.0
        ));
        assert!(matches!(
            stencil_load_op(LoadOp::DontCare, 7),
            wgpu::LoadOp::Clear(0)
        ));
    }

    #[test]
    fn load_is_preserved() {
        assert!(matches!(depth_load_op(LoadOp::Load, 0.5), wgpu::LoadOp::Load));
    }

    #[test]
    fn store_ops_translate() {
        assert!(matches!(store_op(StoreOp::Store), wgpu::StoreOp::Store));
        assert!(matches!(store_op(StoreOp::DontCare), wgpu::StoreOp::Discard));
    }
}
