use thiserror::Error;

use crate::atlas::AtlasImage;
use crate::coords::ColorRgba;

/// Error surfaced by a [`GpuDevice`] implementation.
#[derive(Debug, Error)]
pub enum GpuError {
    /// The packed atlas exceeds what the backend can create as a texture.
    ///
    /// Raised at texture-creation time; the packer itself is unbounded.
    #[error("atlas {width}x{height} exceeds the backend texture limit of {limit}")]
    AtlasOverflow { width: u32, height: u32, limit: u32 },

    #[error("buffer allocation of {size} bytes failed")]
    BufferAlloc { size: u64 },

    #[error("stale or unknown buffer handle")]
    InvalidHandle,

    #[error("backend error: {0}")]
    Backend(String),
}

/// Opaque handle to a backend-owned GPU buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct BufferHandle(pub u32);

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BufferUsage {
    Vertex,
    Index,
}

/// The two fixed pipelines of the batch renderer.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PipelineKind {
    /// Flat-colored geometry; no texture binding.
    Shape,
    /// Textured quads sampling the shared atlas.
    Sprite,
}

/// Abstract graphics backend consumed by the batcher.
///
/// This is the entire surface the rendering core needs from a graphics API:
/// buffer upload plus indexed draws against two fixed pipelines. Frames are
/// bracketed by `begin_frame`/`end_frame`; between them, bind and draw
/// calls are honored in submission order.
pub trait GpuDevice {
    fn create_buffer(&mut self, size_bytes: u64, usage: BufferUsage)
        -> Result<BufferHandle, GpuError>;

    /// Releases a buffer. Passing a stale handle is a no-op.
    fn destroy_buffer(&mut self, buffer: BufferHandle);

    fn update_buffer(
        &mut self,
        buffer: BufferHandle,
        offset: u64,
        data: &[u8],
    ) -> Result<(), GpuError>;

    /// Creates the immutable atlas texture and its resource set.
    ///
    /// Fails with [`GpuError::AtlasOverflow`] when the image exceeds the
    /// device's texture size limit.
    fn upload_atlas(&mut self, atlas: &AtlasImage) -> Result<(), GpuError>;

    /// Opens a frame and clears the target to `clear`.
    fn begin_frame(&mut self, clear: ColorRgba);

    fn bind_pipeline(&mut self, pipeline: PipelineKind);

    /// Binds the atlas resource set (sampler + texture) for the sprite pass.
    fn bind_atlas(&mut self);

    fn draw_indexed(&mut self, vertices: BufferHandle, indices: BufferHandle, index_count: u32);

    /// Submits the frame.
    fn end_frame(&mut self) -> Result<(), GpuError>;
}
