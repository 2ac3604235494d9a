//! Texture atlas packing.
//!
//! Every sprite and font bitmap in the game is packed into one atlas image
//! before the first frame, so the sprite pass can bind a single texture for
//! its whole draw call. Packing is two-pass: placements and the final atlas
//! size are computed incrementally as images are registered (the allocation
//! size is not known until every participant has been measured), then
//! [`AtlasPacker::pack`] allocates the pixel buffer once and blits.
//!
//! The packer is append-only and runs exactly once; the atlas is immutable
//! afterwards.

use std::path::Path;

use crate::assets::{Assets, SpriteId};

/// UV rectangle into the shared atlas, in `[0, 1]²`.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct UvRect {
    pub u0: f32,
    pub v0: f32,
    pub u1: f32,
    pub v1: f32,
}

impl UvRect {
    /// The whole atlas (also the placeholder before packing).
    pub const FULL: UvRect = UvRect { u0: 0.0, v0: 0.0, u1: 1.0, v1: 1.0 };

    #[inline]
    pub const fn new(u0: f32, v0: f32, u1: f32, v1: f32) -> Self {
        Self { u0, v0, u1, v1 }
    }

    #[inline]
    pub fn in_unit_square(self) -> bool {
        (0.0..=1.0).contains(&self.u0)
            && (0.0..=1.0).contains(&self.v0)
            && (0.0..=1.0).contains(&self.u1)
            && (0.0..=1.0).contains(&self.v1)
            && self.u0 <= self.u1
            && self.v0 <= self.v1
    }
}

/// The packed atlas: a tight RGBA8 pixel buffer.
#[derive(Debug, Clone)]
pub struct AtlasImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl AtlasImage {
    /// Writes the atlas out as a PNG for inspection.
    ///
    /// Debug side effect only; nothing in the renderer depends on the file.
    pub fn save_png(&self, path: &Path) -> Result<(), image::ImageError> {
        image::save_buffer(
            path,
            &self.pixels,
            self.width,
            self.height,
            image::ColorType::Rgba8,
        )
    }
}

/// Packer tuning knobs.
#[derive(Debug, Clone)]
pub struct PackerConfig {
    /// Maximum number of sprites per shelf row.
    pub max_slot_x: usize,
}

impl Default for PackerConfig {
    fn default() -> Self {
        Self { max_slot_x: 8 }
    }
}

/// Shelf packer for sprite and font bitmaps.
///
/// Sprites are placed left-to-right in rows of at most `max_slot_x` entries;
/// a full row wraps the cursor down by the tallest sprite seen in that row.
/// Font textures are much larger than icons and must not inflate a shared
/// row height, so each one gets its own full-width row in a vertical stack —
/// register fonts before sprites (as [`Assets`] loading does) to keep that
/// stack at the top of the atlas.
#[derive(Debug, Default)]
pub struct AtlasPacker {
    config: PackerConfig,

    cursor_x: u32,
    cursor_y: u32,
    row_height: u32,
    slot_x: usize,

    width: u32,
    height: u32,

    placements: Vec<(SpriteId, u32, u32)>,
}

impl AtlasPacker {
    pub fn new(config: PackerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Final atlas size so far, `(width, height)` in pixels.
    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Registers a font texture: one full-width row in the vertical stack.
    pub fn add_font(&mut self, id: SpriteId, width: u32, height: u32) {
        log::debug!("atlas: font texture {id:?} ({width}x{height}) at row y={}", self.cursor_y);
        self.placements.push((id, self.cursor_x, self.cursor_y));
        self.cursor_y += height;

        self.height = self.height.max(self.cursor_y + self.row_height);
        self.width = self.width.max(width);
    }

    /// Registers a sprite in the current shelf row, wrapping when the row is
    /// full. An oversized sprite still gets placed; it simply grows the atlas
    /// width (and owns its row height).
    pub fn add_sprite(&mut self, id: SpriteId, width: u32, height: u32) {
        if self.slot_x >= self.config.max_slot_x {
            self.cursor_x = 0;
            self.cursor_y += self.row_height;
            self.row_height = 0;
            self.slot_x = 0;
        }

        log::debug!(
            "atlas: sprite {id:?} ({width}x{height}) at ({}, {})",
            self.cursor_x,
            self.cursor_y
        );
        self.placements.push((id, self.cursor_x, self.cursor_y));

        self.cursor_x += width;
        self.row_height = self.row_height.max(height);
        self.slot_x += 1;

        self.width = self.width.max(self.cursor_x);
        self.height = self.height.max(self.cursor_y + self.row_height);
    }

    /// Blits every registered bitmap into a freshly allocated atlas buffer
    /// and writes each sprite's UV rectangle back into `assets`.
    ///
    /// No maximum dimension is enforced here; exceeding a backend's texture
    /// limit surfaces as [`GpuError::AtlasOverflow`] at texture-creation
    /// time instead of corrupting the packer.
    ///
    /// [`GpuError::AtlasOverflow`]: crate::render::GpuError::AtlasOverflow
    pub fn pack(self, assets: &mut Assets) -> AtlasImage {
        let (w, h) = (self.width, self.height);
        let mut pixels = vec![0u8; (w as usize) * (h as usize) * 4];

        for (id, x, y) in &self.placements {
            let Some(sprite) = assets.sprite_mut(*id) else {
                log::warn!("atlas: sprite {id:?} vanished before pack, skipping");
                continue;
            };

            let (sw, sh) = (sprite.width as usize, sprite.height as usize);
            for row in 0..sh {
                let atlas_start = ((*y as usize + row) * w as usize + *x as usize) * 4;
                let sprite_start = row * sw * 4;
                pixels[atlas_start..atlas_start + sw * 4]
                    .copy_from_slice(&sprite.pixels[sprite_start..sprite_start + sw * 4]);
            }

            sprite.uv = UvRect::new(
                *x as f32 / w as f32,
                *y as f32 / h as f32,
                (*x + sprite.width) as f32 / w as f32,
                (*y + sprite.height) as f32 / h as f32,
            );
            log::debug!("atlas: sprite {id:?} uv {:?}", sprite.uv);
        }

        log::info!("atlas packed: {w}x{h}, {} images", self.placements.len());
        AtlasImage { width: w, height: h, pixels }
    }
}
