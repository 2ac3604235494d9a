//! Sprite and font registries.
//!
//! Assets are loaded once at startup, registered with the
//! [`AtlasPacker`](crate::atlas::AtlasPacker), and referenced afterwards
//! through copyable id handles. Pixel data is immutable after packing.

mod font;
mod sprite;

use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;

use crate::atlas::{AtlasPacker, UvRect};

pub use font::{parse_descriptor, Font, FontDescriptor, FontId, FontLoadError, Glyph};
pub use sprite::{Sprite, SpriteId};

/// Error raised while loading sprite or font assets from disk.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image decode error: {0}")]
    Decode(#[from] image::ImageError),
    #[error("pixel buffer for {width}x{height} sprite must be {expected} bytes, got {actual}")]
    PixelSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

/// Owns every sprite and font in the game.
///
/// Handles ([`SpriteId`], [`FontId`]) stay valid for the lifetime of the
/// store; nothing is ever removed.
#[derive(Debug, Default)]
pub struct Assets {
    sprites: Vec<Sprite>,
    sprite_names: HashMap<String, SpriteId>,
    fonts: Vec<Font>,
    font_names: HashMap<String, FontId>,
}

impl Assets {
    pub fn new() -> Self {
        Self::default()
    }

    // ── sprites ───────────────────────────────────────────────────────────

    /// Registers an in-memory sprite under `name`.
    pub fn add_sprite(&mut self, name: impl Into<String>, sprite: Sprite) -> SpriteId {
        let id = SpriteId(self.sprites.len());
        let name = name.into();
        log::debug!("sprite '{name}' registered ({}x{})", sprite.width, sprite.height);
        self.sprites.push(sprite);
        self.sprite_names.insert(name, id);
        id
    }

    /// Decodes a PNG from disk and registers it under its file stem.
    pub fn load_sprite(&mut self, path: &Path) -> Result<SpriteId, AssetError> {
        let img = image::open(path)?.into_rgba8();
        let (w, h) = img.dimensions();
        let sprite = Sprite::from_pixels(w, h, img.into_raw())?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(self.add_sprite(name, sprite))
    }

    /// Loads every `*.png` directly inside `dir`, registering each with the
    /// packer. Returns the number of sprites loaded.
    pub fn load_sprites_dir(
        &mut self,
        packer: &mut AtlasPacker,
        dir: &Path,
    ) -> Result<usize, AssetError> {
        let mut count = 0;
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().is_none_or(|e| e != "png") {
                continue;
            }
            let id = self.load_sprite(&path)?;
            let sprite = &self.sprites[id.0];
            packer.add_sprite(id, sprite.width, sprite.height);
            count += 1;
        }
        Ok(count)
    }

    #[inline]
    pub fn sprite(&self, id: SpriteId) -> Option<&Sprite> {
        self.sprites.get(id.0)
    }

    pub(crate) fn sprite_mut(&mut self, id: SpriteId) -> Option<&mut Sprite> {
        self.sprites.get_mut(id.0)
    }

    pub fn sprite_named(&self, name: &str) -> Option<SpriteId> {
        self.sprite_names.get(name).copied()
    }

    // ── fonts ─────────────────────────────────────────────────────────────

    /// Registers an already-assembled font under `name`.
    pub fn add_font(&mut self, name: impl Into<String>, font: Font) -> FontId {
        let id = FontId(self.fonts.len());
        let name = name.into();
        log::debug!("font '{name}' registered ({} glyphs)", font.glyphs.len());
        self.fonts.push(font);
        self.font_names.insert(name, id);
        id
    }

    /// Loads every font under `dir`.
    ///
    /// Each font lives in its own subdirectory `<name>/` holding
    /// `<name>.png` (the glyph sheet) and `<name>.qefont` (the descriptor).
    /// A malformed descriptor is fatal to that font only: it is logged and
    /// skipped, and loading continues. Returns the number of fonts loaded.
    pub fn load_fonts_dir(
        &mut self,
        packer: &mut AtlasPacker,
        dir: &Path,
    ) -> Result<usize, AssetError> {
        let mut count = 0;
        for entry in std::fs::read_dir(dir)? {
            let font_dir = entry?.path();
            if !font_dir.is_dir() {
                continue;
            }
            let Some(name) = font_dir.file_name().map(|n| n.to_string_lossy().into_owned())
            else {
                continue;
            };

            let png = font_dir.join(format!("{name}.png"));
            let qefont = font_dir.join(format!("{name}.qefont"));
            if !png.exists() || !qefont.exists() {
                log::warn!("font dir '{name}' is missing its .png/.qefont pair, skipping");
                continue;
            }

            let descriptor = match font::parse_descriptor(&std::fs::read_to_string(&qefont)?) {
                Ok(d) => d,
                Err(err) => {
                    log::error!("font '{name}' failed to load: {err}");
                    continue;
                }
            };

            let texture = self.load_sprite(&png)?;
            let sheet = &self.sprites[texture.0];
            packer.add_font(texture, sheet.width, sheet.height);

            self.add_font(
                name,
                Font {
                    texture,
                    glyphs: descriptor.glyphs,
                    cell_size: descriptor.cell_size,
                    default_size: descriptor.default_size,
                },
            );
            count += 1;
        }
        Ok(count)
    }

    #[inline]
    pub fn font(&self, id: FontId) -> Option<&Font> {
        self.fonts.get(id.0)
    }

    pub fn font_named(&self, name: &str) -> Option<FontId> {
        self.font_names.get(name).copied()
    }

    // ── post-pack ─────────────────────────────────────────────────────────

    /// Derives every glyph's UV rectangle from its cell position, the
    /// font texture's packed origin, and the final atlas size.
    ///
    /// Call once after [`AtlasPacker::pack`]; glyph UVs are undefined
    /// before that.
    pub fn compute_glyph_uvs(&mut self, atlas_width: u32, atlas_height: u32) {
        let (aw, ah) = (atlas_width as f32, atlas_height as f32);
        for font in &mut self.fonts {
            let Some(sheet) = self.sprites.get(font.texture.0) else {
                continue;
            };
            // Packed pixel origin of the font texture inside the atlas.
            let ox = sheet.uv.u0 * aw;
            let oy = sheet.uv.v0 * ah;
            let (cw, ch) = (font.cell_size.0 as f32, font.cell_size.1 as f32);

            for glyph in font.glyphs.values_mut() {
                let px = ox + glyph.cell.0 as f32 * cw;
                let py = oy + glyph.cell.1 as f32 * ch;
                glyph.uv = UvRect::new(px / aw, py / ah, (px + cw) / aw, (py + ch) / ah);
            }
        }
    }

    /// Logs an inventory of everything loaded.
    pub fn summary(&self) {
        log::info!("assets: {} sprites, {} fonts", self.sprites.len(), self.fonts.len());
        for (name, id) in &self.sprite_names {
            let s = &self.sprites[id.0];
            log::info!("  sprite '{name}' {}x{}", s.width, s.height);
        }
        for (name, id) in &self.font_names {
            let f = &self.fonts[id.0];
            log::info!("  font '{name}' with {} glyphs", f.glyphs.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::PackerConfig;

    fn solid(w: u32, h: u32, v: u8) -> Sprite {
        Sprite::from_pixels(w, h, vec![v; (w * h * 4) as usize]).unwrap()
    }

    #[test]
    fn pixel_size_mismatch_is_rejected() {
        assert!(matches!(
            Sprite::from_pixels(2, 2, vec![0; 3]),
            Err(AssetError::PixelSize { expected: 16, actual: 3, .. })
        ));
    }

    #[test]
    fn named_lookup_round_trips() {
        let mut assets = Assets::new();
        let id = assets.add_sprite("hero", solid(4, 4, 255));
        assert_eq!(assets.sprite_named("hero"), Some(id));
        assert!(assets.sprite_named("missing").is_none());
    }

    #[test]
    fn glyph_uvs_include_font_atlas_origin() {
        let mut assets = Assets::new();
        let mut packer = AtlasPacker::new(PackerConfig::default());

        // Two stacked font sheets; the second starts at y=96.
        for (name, h) in [("first", 96u32), ("second", 96)] {
            let tex = assets.add_sprite(name, solid(128, h, 255));
            packer.add_font(tex, 128, h);
            let mut glyphs = HashMap::new();
            glyphs.insert(
                'A',
                Glyph { cell: (1, 0), advance: 10.0, uv: UvRect::FULL },
            );
            assets.add_font(
                name,
                Font { texture: tex, glyphs, cell_size: (32, 48), default_size: 16.0 },
            );
        }

        let atlas = packer.pack(&mut assets);
        assets.compute_glyph_uvs(atlas.width, atlas.height);
        assert_eq!((atlas.width, atlas.height), (128, 192));

        let second = assets.font(assets.font_named("second").unwrap()).unwrap();
        let uv = second.glyphs[&'A'].uv;
        // cell (1, 0) of a sheet whose packed origin is (0, 96).
        assert_eq!(uv.u0, 32.0 / 128.0);
        assert_eq!(uv.v0, 96.0 / 192.0);
        assert_eq!(uv.u1, 64.0 / 128.0);
        assert_eq!(uv.v1, 144.0 / 192.0);
    }
}
