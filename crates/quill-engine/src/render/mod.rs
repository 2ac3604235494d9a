//! Rendering layer.
//!
//! Split in two:
//! - [`backend`]: the [`GpuDevice`] trait the rest of the engine draws
//!   through, plus the wgpu implementation in [`gpu`]
//! - [`batch`]: the per-frame [`FrameBatcher`] that collects draw requests
//!   and flushes them as one shape pass and one sprite pass

pub mod backend;
pub mod batch;
pub mod gpu;

pub use backend::{BufferHandle, BufferUsage, GpuDevice, GpuError, PipelineKind};
pub use batch::{BatchedShape, BatchedSprite, FrameBatcher, ShapeVertex, SpriteVertex};
pub use gpu::{WgpuDevice, WgpuInit};
