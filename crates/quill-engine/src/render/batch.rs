//! Per-frame draw batching.
//!
//! Components enqueue draw requests between `begin()` and `end()`; nothing
//! touches the GPU until `end()`, which flushes the whole frame as two
//! indexed draw calls:
//!
//! 1. flat-shape pass — no texture binding
//! 2. textured-sprite pass — one sampler/atlas binding shared by every
//!    sprite and glyph quad
//!
//! Separating the passes keeps per-draw-call pipeline and resource-set
//! switches out of the frame entirely.

use bytemuck::{Pod, Zeroable};

use crate::assets::Font;
use crate::atlas::{AtlasImage, UvRect};
use crate::coords::{ColorRgba, Vec2, Viewport};
use crate::text;

use super::backend::{BufferHandle, BufferUsage, GpuDevice, GpuError, PipelineKind};

/// Initial buffer sizing, in vertices/indices.
const INITIAL_CAPACITY: usize = 8192;

/// Unit-quad index pattern shared by every rectangle draw.
pub const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

// ── vertex formats ────────────────────────────────────────────────────────

/// Vertex of the flat-shape pass: NDC position + color.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct ShapeVertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

/// Vertex of the textured-sprite pass: NDC position + atlas UV + tint.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct SpriteVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}

// ── per-frame records ─────────────────────────────────────────────────────

/// A buffered flat-shape draw; lives until the frame flush.
#[derive(Debug, Clone)]
pub struct BatchedShape {
    pub center: Vec2,
    pub vertices: Vec<Vec2>,
    pub indices: Vec<u16>,
    pub color: ColorRgba,
}

/// A buffered sprite-quad draw; lives until the frame flush.
#[derive(Debug, Copy, Clone)]
pub struct BatchedSprite {
    pub uv: UvRect,
    pub position: Vec2,
    pub size: Vec2,
    pub color: ColorRgba,
}

// ── growable GPU buffer ───────────────────────────────────────────────────

/// A backend buffer plus its byte capacity.
///
/// Growth-only: a shrinking requirement never reallocates. Growth doubles
/// the requirement so steady-state frames stop reallocating quickly; the
/// old buffer is destroyed, never resized in place.
#[derive(Debug)]
struct GrowBuffer {
    handle: BufferHandle,
    capacity: u64,
    usage: BufferUsage,
}

impl GrowBuffer {
    fn new<B: GpuDevice>(device: &mut B, capacity: u64, usage: BufferUsage)
        -> Result<Self, GpuError>
    {
        let handle = device.create_buffer(capacity, usage)?;
        Ok(Self { handle, capacity, usage })
    }

    fn ensure<B: GpuDevice>(&mut self, device: &mut B, required: u64)
        -> Result<BufferHandle, GpuError>
    {
        if required > self.capacity {
            let new_size = required.max(required * 2);
            device.destroy_buffer(self.handle);
            self.handle = device.create_buffer(new_size, self.usage)?;
            log::debug!(
                "grew {:?} buffer {} -> {} bytes",
                self.usage,
                self.capacity,
                new_size
            );
            self.capacity = new_size;
        }
        Ok(self.handle)
    }
}

// ── batcher ───────────────────────────────────────────────────────────────

/// Collects a frame's draw requests and flushes them through a
/// [`GpuDevice`].
///
/// Owns its backend and all four GPU buffers exclusively; batch lists are
/// empty at `begin()` and fully drained by `end()`.
pub struct FrameBatcher<B: GpuDevice> {
    device: B,
    viewport: Viewport,
    clear_color: ColorRgba,

    shapes: Vec<BatchedShape>,
    sprites: Vec<BatchedSprite>,

    shape_vb: GrowBuffer,
    shape_ib: GrowBuffer,
    sprite_vb: GrowBuffer,
    sprite_ib: GrowBuffer,
}

impl<B: GpuDevice> FrameBatcher<B> {
    pub fn new(mut device: B, viewport: Viewport) -> Result<Self, GpuError> {
        let cap = INITIAL_CAPACITY as u64;
        let shape_vb = GrowBuffer::new(
            &mut device,
            cap * std::mem::size_of::<ShapeVertex>() as u64,
            BufferUsage::Vertex,
        )?;
        let shape_ib = GrowBuffer::new(&mut device, cap * 2, BufferUsage::Index)?;
        let sprite_vb = GrowBuffer::new(
            &mut device,
            cap * std::mem::size_of::<SpriteVertex>() as u64,
            BufferUsage::Vertex,
        )?;
        let sprite_ib = GrowBuffer::new(&mut device, cap * 2, BufferUsage::Index)?;

        Ok(Self {
            device,
            viewport,
            clear_color: ColorRgba::black(),
            shapes: Vec::new(),
            sprites: Vec::new(),
            shape_vb,
            shape_ib,
            sprite_vb,
            sprite_ib,
        })
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        debug_assert!(viewport.is_valid());
        self.viewport = viewport;
    }

    pub fn set_clear_color(&mut self, color: ColorRgba) {
        self.clear_color = color;
    }

    #[inline]
    pub fn device(&self) -> &B {
        &self.device
    }

    #[inline]
    pub fn device_mut(&mut self) -> &mut B {
        &mut self.device
    }

    /// Forwards the packed atlas to the backend.
    pub fn upload_atlas(&mut self, atlas: &AtlasImage) -> Result<(), GpuError> {
        self.device.upload_atlas(atlas)
    }

    /// Opens a frame: clears both batch lists and issues the backend clear.
    pub fn begin(&mut self) {
        self.shapes.clear();
        self.sprites.clear();
        self.device.begin_frame(self.clear_color);
    }

    /// Buffers a flat shape given in local vertices around `center`.
    /// Indices are local to `vertices`. No geometry is built yet.
    pub fn draw_shape(&mut self, center: Vec2, vertices: &[Vec2], indices: &[u16], color: ColorRgba) {
        if vertices.is_empty() || indices.is_empty() {
            return;
        }
        self.shapes.push(BatchedShape {
            center,
            vertices: vertices.to_vec(),
            indices: indices.to_vec(),
            color,
        });
    }

    /// Buffers an axis-aligned rectangle centered on `center`.
    pub fn draw_quad(&mut self, center: Vec2, size: Vec2, color: ColorRgba) {
        let h = size / 2.0;
        self.draw_shape(
            center,
            &[
                Vec2::new(-h.x, -h.y),
                Vec2::new(h.x, -h.y),
                Vec2::new(h.x, h.y),
                Vec2::new(-h.x, h.y),
            ],
            &QUAD_INDICES,
            color,
        );
    }

    /// Buffers one textured quad sampling `uv` from the atlas.
    pub fn draw_sprite(&mut self, uv: UvRect, position: Vec2, size: Vec2, color: ColorRgba) {
        self.sprites.push(BatchedSprite { uv, position, size, color });
    }

    /// Lays `text` out with [`text::layout`] and buffers one sprite quad
    /// per glyph. Layout runs fresh on every call.
    pub fn draw_text(
        &mut self,
        font: &Font,
        spacing: f32,
        text: &str,
        origin: Vec2,
        font_size: f32,
        color: ColorRgba,
    ) {
        for quad in text::layout(font, text, origin, font_size, spacing) {
            self.draw_sprite(quad.uv, quad.position, quad.size, color);
        }
    }

    /// Flushes both passes and submits the frame.
    pub fn end(&mut self) -> Result<(), GpuError> {
        self.flush_shapes()?;
        self.flush_sprites()?;
        self.device.end_frame()
    }

    // ── flushes ───────────────────────────────────────────────────────────

    fn flush_shapes(&mut self) -> Result<(), GpuError> {
        if self.shapes.is_empty() {
            return Ok(());
        }

        let mut total_vertices = 0usize;
        let mut total_indices = 0usize;
        for s in &self.shapes {
            total_vertices += s.vertices.len();
            total_indices += s.indices.len();
        }

        let vb = self.shape_vb.ensure(
            &mut self.device,
            (total_vertices * std::mem::size_of::<ShapeVertex>()) as u64,
        )?;
        let ib = self.shape_ib.ensure(&mut self.device, (total_indices * 2) as u64)?;

        let mut vertices = Vec::with_capacity(total_vertices);
        let mut indices = Vec::with_capacity(total_indices);
        for s in self.shapes.drain(..) {
            if vertices.len() + s.vertices.len() > u16::MAX as usize {
                // u16 index space exhausted; drop the remainder of the pass
                // instead of wrapping indices into earlier geometry.
                log::warn!("shape pass exceeds 65535 vertices, truncating frame");
                break;
            }
            let base = vertices.len() as u16;
            for p in &s.vertices {
                let ndc = self.viewport.pixel_to_ndc(s.center + *p);
                vertices.push(ShapeVertex {
                    position: [ndc.x, ndc.y],
                    color: s.color.to_array(),
                });
            }
            for i in &s.indices {
                indices.push(i + base);
            }
        }
        self.shapes.clear();

        self.device.update_buffer(vb, 0, bytemuck::cast_slice(&vertices))?;
        self.device.update_buffer(ib, 0, bytemuck::cast_slice(&indices))?;
        self.device.bind_pipeline(PipelineKind::Shape);
        self.device.draw_indexed(vb, ib, indices.len() as u32);
        Ok(())
    }

    fn flush_sprites(&mut self) -> Result<(), GpuError> {
        if self.sprites.is_empty() {
            return Ok(());
        }

        let count = self.sprites.len().min(u16::MAX as usize / 4);
        if count < self.sprites.len() {
            log::warn!("sprite pass exceeds 65535 vertices, truncating frame");
        }

        let vb = self.sprite_vb.ensure(
            &mut self.device,
            (count * 4 * std::mem::size_of::<SpriteVertex>()) as u64,
        )?;
        let ib = self.sprite_ib.ensure(&mut self.device, (count * 6 * 2) as u64)?;

        let mut vertices = Vec::with_capacity(count * 4);
        let mut indices = Vec::with_capacity(count * 6);
        for s in self.sprites.drain(..).take(count) {
            let c = self.viewport.pixel_to_ndc(s.position);
            let h = self.viewport.size_to_ndc(s.size) * 0.5;
            let color = s.color.to_array();

            let base = vertices.len() as u16;
            vertices.push(SpriteVertex { position: [c.x - h.x, c.y - h.y], uv: [s.uv.u0, s.uv.v0], color });
            vertices.push(SpriteVertex { position: [c.x + h.x, c.y - h.y], uv: [s.uv.u1, s.uv.v0], color });
            vertices.push(SpriteVertex { position: [c.x + h.x, c.y + h.y], uv: [s.uv.u1, s.uv.v1], color });
            vertices.push(SpriteVertex { position: [c.x - h.x, c.y + h.y], uv: [s.uv.u0, s.uv.v1], color });

            for i in QUAD_INDICES {
                indices.push(base + i);
            }
        }
        self.sprites.clear();

        self.device.update_buffer(vb, 0, bytemuck::cast_slice(&vertices))?;
        self.device.update_buffer(ib, 0, bytemuck::cast_slice(&indices))?;
        self.device.bind_pipeline(PipelineKind::Sprite);
        self.device.bind_atlas();
        self.device.draw_indexed(vb, ib, indices.len() as u32);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── recording backend ─────────────────────────────────────────────────

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Create { handle: BufferHandle, size: u64, usage: BufferUsage },
        Destroy(BufferHandle),
        Update { handle: BufferHandle, offset: u64, bytes: Vec<u8> },
        BeginFrame,
        BindPipeline(PipelineKind),
        BindAtlas,
        Draw { vertices: BufferHandle, indices: BufferHandle, count: u32 },
        EndFrame,
    }

    #[derive(Debug, Default)]
    struct RecordingDevice {
        next_handle: u32,
        events: Vec<Event>,
    }

    impl RecordingDevice {
        fn draws(&self) -> Vec<&Event> {
            self.events
                .iter()
                .filter(|e| matches!(e, Event::Draw { .. }))
                .collect()
        }

        fn last_update_for(&self, handle: BufferHandle) -> Option<&Vec<u8>> {
            self.events.iter().rev().find_map(|e| match e {
                Event::Update { handle: h, bytes, .. } if *h == handle => Some(bytes),
                _ => None,
            })
        }
    }

    impl GpuDevice for RecordingDevice {
        fn create_buffer(&mut self, size_bytes: u64, usage: BufferUsage)
            -> Result<BufferHandle, GpuError>
        {
            let handle = BufferHandle(self.next_handle);
            self.next_handle += 1;
            self.events.push(Event::Create { handle, size: size_bytes, usage });
            Ok(handle)
        }

        fn destroy_buffer(&mut self, buffer: BufferHandle) {
            self.events.push(Event::Destroy(buffer));
        }

        fn update_buffer(&mut self, buffer: BufferHandle, offset: u64, data: &[u8])
            -> Result<(), GpuError>
        {
            self.events.push(Event::Update { handle: buffer, offset, bytes: data.to_vec() });
            Ok(())
        }

        fn upload_atlas(&mut self, _atlas: &AtlasImage) -> Result<(), GpuError> {
            Ok(())
        }

        fn begin_frame(&mut self, _clear: ColorRgba) {
            self.events.push(Event::BeginFrame);
        }

        fn bind_pipeline(&mut self, pipeline: PipelineKind) {
            self.events.push(Event::BindPipeline(pipeline));
        }

        fn bind_atlas(&mut self) {
            self.events.push(Event::BindAtlas);
        }

        fn draw_indexed(&mut self, vertices: BufferHandle, indices: BufferHandle, count: u32) {
            self.events.push(Event::Draw { vertices, indices, count });
        }

        fn end_frame(&mut self) -> Result<(), GpuError> {
            self.events.push(Event::EndFrame);
            Ok(())
        }
    }

    fn batcher() -> FrameBatcher<RecordingDevice> {
        FrameBatcher::new(RecordingDevice::default(), Viewport::new(800.0, 600.0)).unwrap()
    }

    // ── empty frames ──────────────────────────────────────────────────────

    #[test]
    fn empty_frame_issues_no_upload_and_no_draw() {
        let mut b = batcher();
        b.begin();
        b.end().unwrap();

        let events = &b.device().events;
        assert!(events.iter().all(|e| !matches!(e, Event::Draw { .. } | Event::Update { .. })));
        assert_eq!(events.last(), Some(&Event::EndFrame));
    }

    // ── shape pass ────────────────────────────────────────────────────────

    #[test]
    fn shapes_share_one_draw_call_with_offset_indices() {
        let mut b = batcher();
        b.begin();
        b.draw_quad(Vec2::zero(), Vec2::splat(10.0), ColorRgba::white());
        b.draw_quad(Vec2::new(50.0, 0.0), Vec2::splat(10.0), ColorRgba::white());
        b.end().unwrap();

        let draws = b.device().draws();
        assert_eq!(draws.len(), 1);
        let Event::Draw { indices: ib, count, .. } = draws[0] else { unreachable!() };
        assert_eq!(*count, 12);

        let bytes = b.device().last_update_for(*ib).unwrap().clone();
        let idx: Vec<u16> = bytemuck::pod_collect_to_vec(&bytes);
        // Second quad's indices are offset by the first quad's 4 vertices.
        assert_eq!(&idx[..6], &QUAD_INDICES);
        assert_eq!(&idx[6..], &[4, 5, 6, 4, 6, 7]);
    }

    #[test]
    fn shape_vertices_are_converted_to_ndc() {
        let mut b = batcher();
        b.begin();
        // A 800x600 viewport: center (200, 150) world -> (0.5, -0.5) NDC.
        b.draw_quad(Vec2::new(200.0, 150.0), Vec2::new(800.0, 600.0), ColorRgba::white());
        b.end().unwrap();

        let draws = b.device().draws();
        let Event::Draw { vertices: vb, .. } = draws[0] else { unreachable!() };
        let bytes = b.device().last_update_for(*vb).unwrap().clone();
        let verts: Vec<ShapeVertex> = bytemuck::pod_collect_to_vec(&bytes);
        // First local vertex (-400, -300): world (-200, -150) -> (-0.5, 0.5).
        assert_eq!(verts[0].position, [-0.5, 0.5]);
        // Third local vertex (400, 300): world (600, 450) -> (1.5, -1.5).
        assert_eq!(verts[2].position, [1.5, -1.5]);
    }

    // ── sprite pass ───────────────────────────────────────────────────────

    #[test]
    fn sprites_bind_atlas_and_draw_once() {
        let mut b = batcher();
        b.begin();
        b.draw_sprite(UvRect::FULL, Vec2::zero(), Vec2::splat(32.0), ColorRgba::white());
        b.draw_sprite(UvRect::FULL, Vec2::new(40.0, 0.0), Vec2::splat(32.0), ColorRgba::white());
        b.end().unwrap();

        let events = &b.device().events;
        let pipeline_pos = events
            .iter()
            .position(|e| matches!(e, Event::BindPipeline(PipelineKind::Sprite)))
            .unwrap();
        assert_eq!(events[pipeline_pos + 1], Event::BindAtlas);

        let draws = b.device().draws();
        assert_eq!(draws.len(), 1);
        let Event::Draw { count, .. } = draws[0] else { unreachable!() };
        assert_eq!(*count, 12);
    }

    #[test]
    fn sprite_quads_use_two_triangle_winding() {
        let mut b = batcher();
        b.begin();
        b.draw_sprite(UvRect::new(0.1, 0.2, 0.3, 0.4), Vec2::zero(), Vec2::splat(8.0), ColorRgba::white());
        b.end().unwrap();

        let draws = b.device().draws();
        let Event::Draw { vertices: vb, indices: ib, .. } = draws[0] else { unreachable!() };

        let vbytes = b.device().last_update_for(*vb).unwrap().clone();
        let verts: Vec<SpriteVertex> = bytemuck::pod_collect_to_vec(&vbytes);
        assert_eq!(verts.len(), 4);
        assert_eq!(verts[0].uv, [0.1, 0.2]);
        assert_eq!(verts[2].uv, [0.3, 0.4]);

        let ibytes = b.device().last_update_for(*ib).unwrap().clone();
        let idx: Vec<u16> = bytemuck::pod_collect_to_vec(&ibytes);
        assert_eq!(idx, &[0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn shape_pass_flushes_before_sprite_pass() {
        let mut b = batcher();
        b.begin();
        b.draw_sprite(UvRect::FULL, Vec2::zero(), Vec2::splat(8.0), ColorRgba::white());
        b.draw_quad(Vec2::zero(), Vec2::splat(8.0), ColorRgba::white());
        b.end().unwrap();

        let events = &b.device().events;
        let shape = events
            .iter()
            .position(|e| matches!(e, Event::BindPipeline(PipelineKind::Shape)))
            .unwrap();
        let sprite = events
            .iter()
            .position(|e| matches!(e, Event::BindPipeline(PipelineKind::Sprite)))
            .unwrap();
        assert!(shape < sprite);
    }

    // ── buffer growth ─────────────────────────────────────────────────────

    #[test]
    fn growing_past_capacity_doubles_and_reuploads_everything() {
        let mut b = batcher();
        // 2250 quads = 9000 vertices, past the initial 8192 capacity.
        b.begin();
        for i in 0..2250 {
            b.draw_quad(Vec2::new(i as f32, 0.0), Vec2::splat(2.0), ColorRgba::white());
        }
        b.end().unwrap();

        let stride = std::mem::size_of::<ShapeVertex>() as u64;
        let required = 9000 * stride;
        let grown = b.device().events.iter().any(|e| {
            matches!(e, Event::Create { size, usage: BufferUsage::Vertex, .. }
                if *size >= required * 2)
        });
        assert!(grown, "vertex buffer was not doubled past the requirement");

        // The old vertex buffer is destroyed, and the upload covers every
        // vertex (no stale tail reused).
        assert!(b.device().events.iter().any(|e| matches!(e, Event::Destroy(_))));
        let draws = b.device().draws();
        let Event::Draw { vertices: vb, count, .. } = draws[0] else { unreachable!() };
        assert_eq!(*count, 2250 * 6);
        let bytes = b.device().last_update_for(*vb).unwrap();
        assert_eq!(bytes.len() as u64, required);
    }

    #[test]
    fn shrinking_requirement_does_not_reallocate() {
        let mut b = batcher();
        b.begin();
        for i in 0..2250 {
            b.draw_quad(Vec2::new(i as f32, 0.0), Vec2::splat(2.0), ColorRgba::white());
        }
        b.end().unwrap();
        let creates_after_growth = b.device().events.len();

        b.begin();
        b.draw_quad(Vec2::zero(), Vec2::splat(2.0), ColorRgba::white());
        b.end().unwrap();

        let new_creates = b.device().events[creates_after_growth..]
            .iter()
            .filter(|e| matches!(e, Event::Create { .. }))
            .count();
        assert_eq!(new_creates, 0);
    }

    // ── text ──────────────────────────────────────────────────────────────

    #[test]
    fn draw_text_emits_one_sprite_quad_per_glyph() {
        use crate::assets::{Font, Glyph, SpriteId};
        use std::collections::HashMap;

        let mut glyphs = HashMap::new();
        glyphs.insert('a', Glyph { cell: (0, 0), advance: 8.0, uv: UvRect::FULL });
        let font = Font {
            texture: SpriteId(0),
            glyphs,
            cell_size: (16, 16),
            default_size: 16.0,
        };

        let mut b = batcher();
        b.begin();
        // "a a" = two glyphs, one space.
        b.draw_text(&font, 2.0, "a a", Vec2::zero(), 16.0, ColorRgba::white());
        b.end().unwrap();

        let draws = b.device().draws();
        assert_eq!(draws.len(), 1);
        let Event::Draw { count, .. } = draws[0] else { unreachable!() };
        assert_eq!(*count, 2 * 6);
    }
}
