//! wgpu backend.
//!
//! Headless implementation of [`GpuDevice`]: renders into an offscreen
//! color target instead of a window surface. Draw calls recorded during a
//! frame are replayed into a single render pass at `end_frame()`.
//!
//! Responsibilities:
//! - create Instance/Adapter/Device/Queue and the offscreen target
//! - own the two render pipelines (flat shapes, atlas-textured sprites)
//! - own the atlas texture, sampler and bind group
//! - translate [`BufferHandle`]s to `wgpu::Buffer`s

use anyhow::{Context, Result};

use crate::atlas::AtlasImage;
use crate::coords::ColorRgba;

use super::backend::{BufferHandle, BufferUsage, GpuDevice, GpuError, PipelineKind};
use super::batch::{ShapeVertex, SpriteVertex};

const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Initialization parameters for the headless GPU layer.
#[derive(Debug, Clone)]
pub struct WgpuInit {
    /// Offscreen target size in pixels.
    pub width: u32,
    pub height: u32,

    /// Required wgpu features.
    ///
    /// Favor an empty set for portability unless a feature is strictly
    /// necessary.
    pub required_features: wgpu::Features,

    /// Limits requested from the adapter/device.
    pub required_limits: wgpu::Limits,
}

impl Default for WgpuInit {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
        }
    }
}

/// A draw call recorded between `begin_frame` and `end_frame`.
#[derive(Debug, Copy, Clone)]
enum FrameCmd {
    BindPipeline(PipelineKind),
    BindAtlas,
    DrawIndexed {
        vertices: BufferHandle,
        indices: BufferHandle,
        count: u32,
    },
}

/// Owns wgpu core objects and implements [`GpuDevice`] against them.
pub struct WgpuDevice {
    device: wgpu::Device,
    queue: wgpu::Queue,

    target: wgpu::Texture,
    target_view: wgpu::TextureView,
    width: u32,
    height: u32,

    shape_pipeline: wgpu::RenderPipeline,
    sprite_pipeline: wgpu::RenderPipeline,
    atlas_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    atlas_bind_group: Option<wgpu::BindGroup>,

    // Handle N indexes slot N; destroyed buffers leave a None behind.
    buffers: Vec<Option<wgpu::Buffer>>,

    clear_color: ColorRgba,
    commands: Vec<FrameCmd>,
}

impl WgpuDevice {
    /// Creates a headless GPU context.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu.
    pub async fn new(init: WgpuInit) -> Result<Self> {
        anyhow::ensure!(init.width > 0 && init.height > 0, "target has zero size");

        // Use all backends to allow wgpu to select the optimal platform backend.
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("quill-engine device"),
                required_features: init.required_features,
                required_limits: init.required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        let target = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("quill offscreen target"),
            size: wgpu::Extent3d {
                width: init.width,
                height: init.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TARGET_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let target_view = target.create_view(&wgpu::TextureViewDescriptor::default());

        let atlas_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("quill atlas bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
            ],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("quill atlas sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let shape_pipeline = build_shape_pipeline(&device);
        let sprite_pipeline = build_sprite_pipeline(&device, &atlas_layout);

        Ok(Self {
            device,
            queue,
            target,
            target_view,
            width: init.width,
            height: init.height,
            shape_pipeline,
            sprite_pipeline,
            atlas_layout,
            sampler,
            atlas_bind_group: None,
            buffers: Vec::new(),
            clear_color: ColorRgba::black(),
            commands: Vec::new(),
        })
    }

    /// Blocking wrapper around [`WgpuDevice::new`].
    pub fn new_blocking(init: WgpuInit) -> Result<Self> {
        pollster::block_on(Self::new(init))
    }

    #[inline]
    pub fn target_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Copies the offscreen target back to the CPU as tightly packed RGBA8.
    ///
    /// Blocks until the copy completes. Intended for captures and tests, not
    /// per-frame use.
    pub fn read_target(&self) -> Result<Vec<u8>, GpuError> {
        let unpadded = self.width as u64 * 4;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT as u64;
        let padded = unpadded.div_ceil(align) * align;
        let size = padded * self.height as u64;

        let readback = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("quill readback"),
            size,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("quill readback encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.target,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &readback,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded as u32),
                    rows_per_image: Some(self.height),
                },
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        let slice = readback.slice(..);
        slice.map_async(wgpu::MapMode::Read, |_| {});
        self.device
            .poll(wgpu::PollType::wait_indefinitely())
            .map_err(|e| GpuError::Backend(e.to_string()))?;

        let mapped = slice.get_mapped_range();
        let mut pixels = Vec::with_capacity((unpadded * self.height as u64) as usize);
        for row in 0..self.height as u64 {
            let start = (row * padded) as usize;
            pixels.extend_from_slice(&mapped[start..start + unpadded as usize]);
        }
        drop(mapped);
        readback.unmap();
        Ok(pixels)
    }

    fn buffer(&self, handle: BufferHandle) -> Option<&wgpu::Buffer> {
        self.buffers.get(handle.0 as usize)?.as_ref()
    }
}

impl GpuDevice for WgpuDevice {
    fn create_buffer(&mut self, size_bytes: u64, usage: BufferUsage) -> Result<BufferHandle, GpuError> {
        let usages = match usage {
            BufferUsage::Vertex => wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            BufferUsage::Index => wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        };
        // Round up so padded writes always fit.
        let align = wgpu::COPY_BUFFER_ALIGNMENT;
        let size = size_bytes.max(align).div_ceil(align) * align;

        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(match usage {
                BufferUsage::Vertex => "quill vertex buffer",
                BufferUsage::Index => "quill index buffer",
            }),
            size,
            usage: usages,
            mapped_at_creation: false,
        });

        // Reuse the first free slot before growing the table.
        if let Some(slot) = self.buffers.iter().position(Option::is_none) {
            self.buffers[slot] = Some(buffer);
            Ok(BufferHandle(slot as u32))
        } else {
            self.buffers.push(Some(buffer));
            Ok(BufferHandle(self.buffers.len() as u32 - 1))
        }
    }

    fn destroy_buffer(&mut self, buffer: BufferHandle) {
        if let Some(slot) = self.buffers.get_mut(buffer.0 as usize) {
            if let Some(b) = slot.take() {
                b.destroy();
            }
        }
    }

    fn update_buffer(&mut self, buffer: BufferHandle, offset: u64, data: &[u8]) -> Result<(), GpuError> {
        let Some(target) = self.buffer(buffer) else {
            return Err(GpuError::InvalidHandle);
        };

        // write_buffer requires a 4-byte aligned size; index data in u16 can
        // fall short, so pad the tail. Buffer sizes are rounded up to match.
        let align = wgpu::COPY_BUFFER_ALIGNMENT as usize;
        if data.len() % align == 0 {
            self.queue.write_buffer(target, offset, data);
        } else {
            let mut padded = data.to_vec();
            padded.resize(data.len().div_ceil(align) * align, 0);
            self.queue.write_buffer(target, offset, &padded);
        }
        Ok(())
    }

    fn upload_atlas(&mut self, atlas: &AtlasImage) -> Result<(), GpuError> {
        let limit = self.device.limits().max_texture_dimension_2d;
        if atlas.width > limit || atlas.height > limit {
            return Err(GpuError::AtlasOverflow {
                width: atlas.width,
                height: atlas.height,
                limit,
            });
        }

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("quill atlas"),
            size: wgpu::Extent3d {
                width: atlas.width,
                height: atlas.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &atlas.pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(atlas.width * 4),
                rows_per_image: Some(atlas.height),
            },
            wgpu::Extent3d {
                width: atlas.width,
                height: atlas.height,
                depth_or_array_layers: 1,
            },
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.atlas_bind_group = Some(self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("quill atlas bind group"),
            layout: &self.atlas_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
            ],
        }));

        log::info!("uploaded {}x{} atlas", atlas.width, atlas.height);
        Ok(())
    }

    fn begin_frame(&mut self, clear: ColorRgba) {
        self.clear_color = clear;
        self.commands.clear();
    }

    fn bind_pipeline(&mut self, pipeline: PipelineKind) {
        self.commands.push(FrameCmd::BindPipeline(pipeline));
    }

    fn bind_atlas(&mut self) {
        self.commands.push(FrameCmd::BindAtlas);
    }

    fn draw_indexed(&mut self, vertices: BufferHandle, indices: BufferHandle, count: u32) {
        self.commands.push(FrameCmd::DrawIndexed {
            vertices,
            indices,
            count,
        });
    }

    fn end_frame(&mut self) -> Result<(), GpuError> {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("quill frame encoder"),
            });

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("quill frame pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.target_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: self.clear_color.r as f64,
                            g: self.clear_color.g as f64,
                            b: self.clear_color.b as f64,
                            a: self.clear_color.a as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            for cmd in self.commands.drain(..) {
                match cmd {
                    FrameCmd::BindPipeline(PipelineKind::Shape) => {
                        rpass.set_pipeline(&self.shape_pipeline);
                    }
                    FrameCmd::BindPipeline(PipelineKind::Sprite) => {
                        rpass.set_pipeline(&self.sprite_pipeline);
                    }
                    FrameCmd::BindAtlas => match self.atlas_bind_group.as_ref() {
                        Some(bg) => rpass.set_bind_group(0, bg, &[]),
                        None => log::warn!("sprites drawn before any atlas upload, skipping bind"),
                    },
                    FrameCmd::DrawIndexed {
                        vertices,
                        indices,
                        count,
                    } => {
                        let (Some(vb), Some(ib)) = (
                            self.buffers.get(vertices.0 as usize).and_then(Option::as_ref),
                            self.buffers.get(indices.0 as usize).and_then(Option::as_ref),
                        ) else {
                            log::warn!("draw with stale buffer handle, skipping");
                            continue;
                        };
                        rpass.set_vertex_buffer(0, vb.slice(..));
                        rpass.set_index_buffer(ib.slice(..), wgpu::IndexFormat::Uint16);
                        rpass.draw_indexed(0..count, 0, 0..1);
                    }
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }
}

// ── pipeline construction ─────────────────────────────────────────────────

fn shape_vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x2, // position
        1 => Float32x4  // color
    ];
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<ShapeVertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &ATTRS,
    }
}

fn sprite_vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x2, // position
        1 => Float32x2, // uv
        2 => Float32x4  // color
    ];
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<SpriteVertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &ATTRS,
    }
}

fn build_shape_pipeline(device: &wgpu::Device) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("quill shape shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shaders/shape.wgsl").into()),
    });

    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("quill shape pipeline layout"),
        bind_group_layouts: &[],
        immediate_size: 0,
    });

    build_pipeline(device, "quill shape pipeline", &shader, &layout, shape_vertex_layout())
}

fn build_sprite_pipeline(
    device: &wgpu::Device,
    atlas_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("quill sprite shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shaders/sprite.wgsl").into()),
    });

    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("quill sprite pipeline layout"),
        bind_group_layouts: &[atlas_layout],
        immediate_size: 0,
    });

    build_pipeline(device, "quill sprite pipeline", &shader, &layout, sprite_vertex_layout())
}

fn build_pipeline(
    device: &wgpu::Device,
    label: &str,
    shader: &wgpu::ShaderModule,
    layout: &wgpu::PipelineLayout,
    vertex_layout: wgpu::VertexBufferLayout<'static>,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[vertex_layout],
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: TARGET_FORMAT,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}
