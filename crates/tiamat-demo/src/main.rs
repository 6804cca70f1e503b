//! Clear-pass demo.
//!
//! Claims one window, animates the clear color every frame, and forwards
//! resize notifications so the swapchain rebuild path gets exercised.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use tiamat_gpu::command::{Color, ColorAttachment, DepthStencilAttachment};
use tiamat_gpu::device::DeviceInit;
use tiamat_gpu::driver::Renderer;
use tiamat_gpu::logging::{init_logging, LoggingConfig};
use tiamat_gpu::swapchain::{PresentMode, SurfaceParams};

struct Demo {
    renderer: Renderer,
    window: Option<Arc<Window>>,
    started: Instant,
}

impl Demo {
    fn new(renderer: Renderer) -> Self {
        Self {
            renderer,
            window: None,
            started: Instant::now(),
        }
    }

    fn render(&mut self) {
        let Some(window) = self.window.as_ref() else {
            return;
        };
        let id = window.id();

        let mut cmd = self.renderer.acquire_command_buffer();
        let Some(target) = self.renderer.acquire_swapchain_texture(&mut cmd, id) else {
            // Frame skipped; the next redraw retries.
            return;
        };

        let t = self.started.elapsed().as_secs_f64();
        let clear = Color::new(0.08 + 0.08 * t.sin().abs(), 0.10, 0.18, 1.0);

        let colors = [ColorAttachment::clear_swapchain(&target, clear)];
        let depth = DepthStencilAttachment::clear_swapchain(&target);
        if cmd.begin_render_pass(&colors, Some(&depth)) {
            cmd.end_render_pass();
        }

        window.pre_present_notify();
        self.renderer.submit(cmd);
    }
}

impl ApplicationHandler for Demo {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title("tiamat clear demo")
            .with_inner_size(LogicalSize::new(800.0, 600.0));

        let window = match event_loop.create_window(attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let params = SurfaceParams {
            present_mode: PresentMode::Vsync,
            ..Default::default()
        };
        if let Err(e) = self.renderer.claim_window(window.clone(), params) {
            log::error!("failed to claim window: {e:#}");
            event_loop.exit();
            return;
        }

        window.request_redraw();
        self.window = Some(window);
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw keeps the clear animation moving.
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                self.renderer.release_window(window_id);
                self.window = None;
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => {
                self.renderer.notify_window_resized(window_id, new_size);
                if let Some(window) = self.window.as_ref() {
                    window.request_redraw();
                }
            }

            WindowEvent::RedrawRequested => {
                self.render();
            }

            _ => {}
        }
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let renderer = Renderer::new(DeviceInit::default()).context("device negotiation failed")?;
    log::info!(
        "driver '{}' ready, shader format {:?}",
        renderer.driver_info().name,
        renderer.driver_info().shader_format
    );

    let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
    let mut demo = Demo::new(renderer);

    event_loop
        .run_app(&mut demo)
        .context("winit event loop terminated with error")?;

    Ok(())
}
