use anyhow::{Context, Result};

use super::DeviceInit;

/// Handles produced by a successful negotiation.
///
/// One set of these per logical device; everything the driver allocates is
/// created against `device` and submitted on `queue`.
pub struct DeviceHandles {
    pub instance: wgpu::Instance,
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

/// Negotiates an adapter and logical device.
///
/// Two callback-driven steps under wgpu: request an adapter with the
/// configured power profile, then request a device with the merged feature
/// set. Optional features the adapter lacks are dropped with a warning
/// instead of failing negotiation. Failure at either step surfaces as an
/// error; nothing is partially constructed.
pub async fn negotiate(init: DeviceInit) -> Result<DeviceHandles> {
    // Use all backends to allow wgpu to select the optimal platform backend.
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    });

    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: init.power_preference,
            compatible_surface: None,
            force_fallback_adapter: init.force_fallback_adapter,
        })
        .await
        .context("failed to find a suitable GPU adapter")?;

    let info = adapter.get_info();
    log::info!(
        "adapter: {} ({:?}, {:?})",
        info.name,
        info.device_type,
        info.backend
    );

    let supported = adapter.features();
    let missing = init.optional_features - supported;
    if !missing.is_empty() {
        log::warn!("adapter lacks optional features, dropping: {missing:?}");
    }
    let required_features = init.required_features | (init.optional_features & supported);

    let (device, queue) = adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: Some("tiamat device"),
            required_features,
            required_limits: init.required_limits,
            experimental_features: wgpu::ExperimentalFeatures::disabled(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::Off,
        })
        .await
        .context("failed to create wgpu device/queue")?;

    Ok(DeviceHandles {
        instance,
        adapter,
        device,
        queue,
    })
}

/// Reports whether a usable adapter exists on this system.
///
/// Blocking capability probe for driver selection; creates no device and
/// leaves no state behind.
pub fn probe(init: &DeviceInit) -> bool {
    pollster::block_on(async {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: init.power_preference,
                compatible_surface: None,
                force_fallback_adapter: init.force_fallback_adapter,
            })
            .await
            .is_ok()
    })
}
