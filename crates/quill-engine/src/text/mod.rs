//! Text layout.
//!
//! Converts a bitmap font + string into a stream of textured quads
//! referencing the font's atlas UVs. Layout is recomputed on every draw
//! call — there is no caching layer — so the iterator is cheap to build
//! and allocation-free.

use crate::assets::Font;
use crate::coords::Vec2;

/// One laid-out glyph: where to draw which cell of the atlas.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GlyphQuad {
    pub uv: crate::atlas::UvRect,
    /// Quad center in world pixels.
    pub position: Vec2,
    pub size: Vec2,
}

/// Lays out `text` starting at `origin`, scaled so glyph cells render at
/// `font_size` relative to the font's authored default size.
///
/// Cursor rules, per character:
/// - `'\n'` resets cursor.x and steps cursor.y down by one scaled cell
/// - `' '` advances by half a scaled cell width, emitting nothing
/// - a character without a glyph is skipped with no advance
/// - otherwise one quad is emitted and the cursor advances by
///   `spacing + advance * scale`
///
/// The returned iterator is finite and restartable: call again to lay the
/// same text out from scratch.
pub fn layout<'a>(
    font: &'a Font,
    text: &'a str,
    origin: Vec2,
    font_size: f32,
    spacing: f32,
) -> Layout<'a> {
    Layout {
        font,
        chars: text.chars(),
        origin,
        scale: font_size / font.default_size,
        spacing,
        cursor: Vec2::zero(),
    }
}

/// Iterator over [`GlyphQuad`]s; see [`layout`].
#[derive(Debug, Clone)]
pub struct Layout<'a> {
    font: &'a Font,
    chars: std::str::Chars<'a>,
    origin: Vec2,
    scale: f32,
    spacing: f32,
    cursor: Vec2,
}

impl Layout<'_> {
    /// Current cursor offset from the origin, in world pixels.
    #[inline]
    pub fn cursor(&self) -> Vec2 {
        self.cursor
    }
}

impl Iterator for Layout<'_> {
    type Item = GlyphQuad;

    fn next(&mut self) -> Option<GlyphQuad> {
        let cell = Vec2::new(self.font.cell_size.0 as f32, self.font.cell_size.1 as f32);

        for c in self.chars.by_ref() {
            if c == '\n' {
                self.cursor.x = 0.0;
                self.cursor.y -= cell.y * self.scale;
                continue;
            }
            if c == ' ' {
                self.cursor.x += cell.x / 2.0 * self.scale;
                continue;
            }
            let Some(glyph) = self.font.glyphs.get(&c) else {
                // Unknown character: no geometry, no advance.
                continue;
            };

            let size = cell * self.scale;
            let position =
                self.origin + self.cursor + Vec2::new(glyph.advance * self.scale, size.y) / 2.0;
            self.cursor.x += self.spacing + glyph.advance * self.scale;

            return Some(GlyphQuad { uv: glyph.uv, position, size });
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{Font, Glyph, SpriteId};
    use crate::atlas::UvRect;
    use std::collections::HashMap;

    fn test_font() -> Font {
        let mut glyphs = HashMap::new();
        glyphs.insert('H', Glyph { cell: (0, 0), advance: 10.0, uv: UvRect::FULL });
        glyphs.insert('i', Glyph { cell: (1, 0), advance: 4.0, uv: UvRect::FULL });
        Font {
            texture: SpriteId(0),
            glyphs,
            cell_size: (32, 48),
            default_size: 16.0,
        }
    }

    #[test]
    fn second_glyph_cursor_is_first_advance_plus_spacing() {
        let font = test_font();
        let spacing = 3.0;
        // font_size == default_size, so scale is 1.
        let quads: Vec<_> = layout(&font, "Hi", Vec2::zero(), 16.0, spacing).collect();
        assert_eq!(quads.len(), 2);

        // The 'i' quad sits at cursor (10 + 3, 0) plus its own draw offset
        // of (advance/2, cell_h/2).
        let expected = Vec2::new(10.0 + spacing + 4.0 / 2.0, 48.0 / 2.0);
        assert_eq!(quads[1].position, expected);
    }

    #[test]
    fn scale_follows_font_size_ratio() {
        let font = test_font();
        // Half the default size halves cells and advances.
        let quads: Vec<_> = layout(&font, "H", Vec2::zero(), 8.0, 0.0).collect();
        assert_eq!(quads[0].size, Vec2::new(16.0, 24.0));
        assert_eq!(quads[0].position, Vec2::new(2.5, 12.0));
    }

    #[test]
    fn newline_resets_x_and_steps_down() {
        let font = test_font();
        let quads: Vec<_> = layout(&font, "H\nH", Vec2::zero(), 16.0, 2.0).collect();
        assert_eq!(quads.len(), 2);
        assert_eq!(quads[1].position.x, quads[0].position.x);
        assert_eq!(quads[1].position.y, quads[0].position.y - 48.0);
    }

    #[test]
    fn space_advances_half_cell_without_geometry() {
        let font = test_font();
        let mut run = layout(&font, " H", Vec2::zero(), 16.0, 0.0);
        let quad = run.next().unwrap();
        // Space advanced the cursor by 16 (half of 32) before 'H' was placed.
        assert_eq!(quad.position.x, 16.0 + 10.0 / 2.0);
        assert!(run.next().is_none());
    }

    #[test]
    fn unknown_characters_are_skipped_with_no_advance() {
        let font = test_font();
        let with_unknown: Vec<_> = layout(&font, "H?i", Vec2::zero(), 16.0, 1.0).collect();
        let without: Vec<_> = layout(&font, "Hi", Vec2::zero(), 16.0, 1.0).collect();
        assert_eq!(with_unknown, without);
    }

    #[test]
    fn layout_is_restartable() {
        let font = test_font();
        let a: Vec<_> = layout(&font, "Hi Hi", Vec2::new(5.0, 7.0), 16.0, 2.0).collect();
        let b: Vec<_> = layout(&font, "Hi Hi", Vec2::new(5.0, 7.0), 16.0, 2.0).collect();
        assert_eq!(a, b);
    }
}
