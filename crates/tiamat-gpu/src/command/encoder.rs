use std::sync::Arc;

use crate::resource::{BufferHandle, TextureHandle};
use crate::swapchain::DEPTH_FORMAT;

use super::attachments::{ColorAttachment, ColorTarget, DepthStencilAttachment, DepthStencilTarget};
use super::convert;

/// A one-shot recording context.
///
/// One native encoder per command buffer; the buffer is consumed by
/// submission and cannot be reused. Resource handles the recording touches
/// are retained until the queue reports the submission complete, which is
/// what lets containers hand their backings out again safely.
pub struct CommandBuffer {
    encoder: wgpu::CommandEncoder,
    pass: Option<wgpu::RenderPass<'static>>,
    retained_buffers: Vec<BufferHandle>,
    retained_textures: Vec<TextureHandle>,
    pending_presents: Vec<wgpu::SurfaceTexture>,
}

/// Checks whether a render pass may begin. Split out so the guard logic is
/// testable without a device.
pub(crate) fn can_begin_pass(color_count: usize, pass_open: bool) -> bool {
    color_count > 0 && !pass_open
}

impl CommandBuffer {
    pub(crate) fn new(device: &wgpu::Device) -> Self {
        let encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("tiamat command buffer"),
        });

        Self {
            encoder,
            pass: None,
            retained_buffers: Vec::new(),
            retained_textures: Vec::new(),
            pending_presents: Vec::new(),
        }
    }

    /// Keeps a buffer backing alive until this submission drains.
    pub fn track_buffer(&mut self, handle: &BufferHandle) {
        self.retained_buffers.push(Arc::clone(handle));
    }

    /// Keeps a texture backing alive until this submission drains.
    pub fn track_texture(&mut self, handle: &TextureHandle) {
        self.retained_textures.push(Arc::clone(handle));
    }

    pub(crate) fn push_present(&mut self, surface_texture: wgpu::SurfaceTexture) {
        self.pending_presents.push(surface_texture);
    }

    /// Begins a render pass over the given attachments.
    ///
    /// Fails (logs and returns `false`, creating no native pass) when no
    /// color attachment is supplied or a pass is already open. A render
    /// pass with zero attachments is meaningless.
    pub fn begin_render_pass(
        &mut self,
        colors: &[ColorAttachment<'_>],
        depth_stencil: Option<&DepthStencilAttachment<'_>>,
    ) -> bool {
        if !can_begin_pass(colors.len(), self.pass.is_some()) {
            if colors.is_empty() {
                log::error!("begin_render_pass requires at least one color attachment");
            } else {
                log::error!("begin_render_pass called while a pass is already open");
            }
            return false;
        }

        let mut color_attachments = Vec::with_capacity(colors.len());
        for attachment in colors {
            let (view, resolve_target) = match &attachment.target {
                ColorTarget::Swapchain(target) => (&target.view, target.resolve_target.as_ref()),
                ColorTarget::Texture { texture, layer, mip } => {
                    let Some(view) = texture.render_view(*layer, *mip) else {
                        log::error!(
                            "color attachment references a missing subresource (layer {layer}, mip {mip})"
                        );
                        return false;
                    };
                    self.note_texture_use(texture, *layer, *mip);
                    (view, None)
                }
            };

            color_attachments.push(Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target,
                ops: wgpu::Operations {
                    load: convert::color_load_op(attachment.load_op, attachment.clear_color),
                    store: convert::store_op(attachment.store_op),
                },
                depth_slice: None,
            }));
        }

        let depth_stencil_attachment = match depth_stencil {
            None => None,
            Some(attachment) => {
                let (view, format) = match &attachment.target {
                    DepthStencilTarget::Swapchain(target) => (&target.depth_view, DEPTH_FORMAT),
                    DepthStencilTarget::Texture { texture, layer, mip } => {
                        let Some(view) = texture.depth_stencil_view(*layer, *mip) else {
                            log::error!(
                                "depth attachment references a missing subresource (layer {layer}, mip {mip})"
                            );
                            return false;
                        };
                        self.note_texture_use(texture, *layer, *mip);
                        (view, texture.desc().format)
                    }
                };

                Some(wgpu::RenderPassDepthStencilAttachment {
                    view,
                    depth_ops: Some(wgpu::Operations {
                        load: convert::depth_load_op(
                            attachment.depth_load_op,
                            attachment.clear_depth,
                        ),
                        store: convert::store_op(attachment.depth_store_op),
                    }),
                    // Stencil ops only apply when the format has a stencil
                    // aspect.
                    stencil_ops: format.has_stencil_aspect().then(|| wgpu::Operations {
                        load: convert::stencil_load_op(
                            attachment.stencil_load_op,
                            attachment.clear_stencil,
                        ),
                        store: convert::store_op(attachment.stencil_store_op),
                    }),
                })
            }
        };

        let pass = self
            .encoder
            .begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("tiamat render pass"),
                color_attachments: &color_attachments,
                depth_stencil_attachment,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            })
            .forget_lifetime();

        self.pass = Some(pass);
        true
    }

    /// The open render pass, for draw recording by the layer above.
    pub fn render_pass(&mut self) -> Option<&mut wgpu::RenderPass<'static>> {
        self.pass.as_mut()
    }

    /// Ends and releases the open render pass. Must precede submission.
    pub fn end_render_pass(&mut self) -> bool {
        match self.pass.take() {
            Some(pass) => {
                drop(pass);
                true
            }
            None => {
                log::warn!("end_render_pass with no open pass");
                false
            }
        }
    }

    fn note_texture_use(&mut self, texture: &TextureHandle, layer: u32, mip: u32) {
        if let Some(sub) = texture.subresource(layer, mip) {
            if sub.note_first_use() {
                log::trace!("first use of (layer {layer}, mip {mip}) this recording session");
            }
        }
        self.retained_textures.push(Arc::clone(texture));
    }

    /// Finishes the encoder, submits, presents, and schedules the retained
    /// resource handles to drop once the queue signals completion.
    ///
    /// Fire-and-forget: no completion handle is returned.
    pub(crate) fn finish_and_submit(mut self, queue: &wgpu::Queue) {
        if self.pass.take().is_some() {
            log::warn!("render pass still open at submit; ending it");
        }

        let command_buffer = self.encoder.finish();
        queue.submit(std::iter::once(command_buffer));

        // The recording session is over; per-session subresource state
        // resets before the handles move into the completion callback.
        for texture in &self.retained_textures {
            texture.end_recording_session();
        }

        let retained_buffers = self.retained_buffers;
        let retained_textures = self.retained_textures;
        if !retained_buffers.is_empty() || !retained_textures.is_empty() {
            queue.on_submitted_work_done(move || {
                // Dropping the clones returns each backing to its baseline
                // reference count, making it reusable by its container.
                drop(retained_buffers);
                drop(retained_textures);
            });
        }

        for surface_texture in self.pending_presents {
            surface_texture.present();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_color_attachments_cannot_begin() {
        assert!(!can_begin_pass(0, false));
    }

    #[test]
    fn open_pass_cannot_begin_again() {
        assert!(!can_begin_pass(1, true));
    }

    #[test]
    fn one_attachment_and_no_open_pass_may_begin() {
        assert!(can_begin_pass(1, false));
    }
}
