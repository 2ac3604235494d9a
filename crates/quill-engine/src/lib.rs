//! Quill engine crate.
//!
//! The rendering core of a small 2D engine: a retained scene graph of
//! entities/components feeding a per-frame batching renderer. All sprite
//! and glyph bitmaps are packed into a single texture atlas at startup;
//! each frame is flushed as two indexed draw calls (flat shapes, textured
//! sprites).

pub mod assets;
pub mod atlas;
pub mod coords;
pub mod logging;
pub mod render;
pub mod scene;
pub mod text;
pub mod time;
