use std::collections::HashMap;

use thiserror::Error;

use crate::atlas::UvRect;

use super::SpriteId;

/// Opaque handle to a font stored in [`Assets`](super::Assets).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct FontId(pub(crate) usize);

/// Error returned when a font descriptor fails to parse.
///
/// Fatal to that font's registration only; other fonts keep loading.
#[derive(Debug, Clone, Error)]
pub enum FontLoadError {
    #[error("font descriptor is empty (missing header line)")]
    MissingHeader,
    #[error("font descriptor line {line}: {message}")]
    Malformed { line: usize, message: String },
}

/// Per-character visual metadata.
///
/// `cell` is a grid index into the font texture; the pixel position is
/// `cell * cell_size`. `advance` is the glyph's ink width ("thickness") used
/// to step the layout cursor.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Glyph {
    pub cell: (u32, u32),
    pub advance: f32,
    /// Atlas UVs, filled in by [`Assets::compute_glyph_uvs`](super::Assets::compute_glyph_uvs).
    pub uv: UvRect,
}

/// A fixed-cell bitmap font.
#[derive(Debug, Clone)]
pub struct Font {
    /// The font's texture sheet, packed into the shared atlas.
    pub texture: SpriteId,
    pub glyphs: HashMap<char, Glyph>,
    /// Size of one glyph cell in the texture, in pixels.
    pub cell_size: (u32, u32),
    /// Font size the advances are authored at; draw-time sizes scale
    /// relative to this.
    pub default_size: f32,
}

/// Parsed form of a `.qefont` descriptor, before the texture is known.
#[derive(Debug, Clone)]
pub struct FontDescriptor {
    pub glyphs: HashMap<char, Glyph>,
    pub cell_size: (u32, u32),
    pub default_size: f32,
}

/// Parses a plain-text font descriptor.
///
/// Line 0 is `"<cellW>x<cellH>,<defaultFontSize>"`; each following
/// non-empty line is `"<char><slotX>x<slotY>,<advance>"` where the slot
/// coordinates are cell-grid indices.
pub fn parse_descriptor(text: &str) -> Result<FontDescriptor, FontLoadError> {
    let mut lines = text.lines().enumerate();

    let (_, header) = lines
        .by_ref()
        .find(|(_, l)| !l.trim().is_empty())
        .ok_or(FontLoadError::MissingHeader)?;

    let (cell_size, default_size) = parse_header(header).map_err(|message| {
        FontLoadError::Malformed { line: 0, message }
    })?;

    let mut glyphs = HashMap::new();
    for (line_no, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        let (ch, glyph) = parse_glyph_line(line)
            .map_err(|message| FontLoadError::Malformed { line: line_no, message })?;
        glyphs.insert(ch, glyph);
    }

    Ok(FontDescriptor {
        glyphs,
        cell_size,
        default_size,
    })
}

fn parse_header(line: &str) -> Result<((u32, u32), f32), String> {
    let (cell, size) = line
        .split_once(',')
        .ok_or_else(|| format!("expected \"<w>x<h>,<size>\", got {line:?}"))?;
    let cell = parse_pair(cell.trim())?;
    let size: f32 = size
        .trim()
        .parse()
        .map_err(|_| format!("bad default font size {size:?}"))?;
    Ok((cell, size))
}

fn parse_glyph_line(line: &str) -> Result<(char, Glyph), String> {
    let ch = line.chars().next().ok_or("empty glyph line")?;
    let rest = &line[ch.len_utf8()..];
    let (slot, advance) = rest
        .split_once(',')
        .ok_or_else(|| format!("expected \"<char><x>x<y>,<advance>\", got {line:?}"))?;
    let cell = parse_pair(slot.trim())?;
    let advance: f32 = advance
        .trim()
        .parse()
        .map_err(|_| format!("bad advance {advance:?}"))?;
    Ok((
        ch,
        Glyph {
            cell,
            advance,
            uv: UvRect::FULL,
        },
    ))
}

fn parse_pair(s: &str) -> Result<(u32, u32), String> {
    let (x, y) = s
        .split_once('x')
        .ok_or_else(|| format!("expected \"<x>x<y>\", got {s:?}"))?;
    let x = x.trim().parse().map_err(|_| format!("bad integer {x:?}"))?;
    let y = y.trim().parse().map_err(|_| format!("bad integer {y:?}"))?;
    Ok((x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DESCRIPTOR: &str = "\
32x48,16

A0x0,18.5
B1x0,17
i2x1,6
";

    #[test]
    fn parses_header_and_glyphs() {
        let d = parse_descriptor(DESCRIPTOR).unwrap();
        assert_eq!(d.cell_size, (32, 48));
        assert_eq!(d.default_size, 16.0);
        assert_eq!(d.glyphs.len(), 3);

        let a = d.glyphs[&'A'];
        assert_eq!(a.cell, (0, 0));
        assert_eq!(a.advance, 18.5);
        assert_eq!(d.glyphs[&'i'].cell, (2, 1));
    }

    #[test]
    fn empty_descriptor_is_missing_header() {
        assert!(matches!(parse_descriptor(""), Err(FontLoadError::MissingHeader)));
        assert!(matches!(parse_descriptor("\n\n"), Err(FontLoadError::MissingHeader)));
    }

    #[test]
    fn bad_header_integer_fails() {
        let err = parse_descriptor("32xnope,16").unwrap_err();
        assert!(matches!(err, FontLoadError::Malformed { line: 0, .. }));
    }

    #[test]
    fn bad_glyph_line_reports_line_number() {
        let err = parse_descriptor("32x48,16\nA0x0,18\nBbroken").unwrap_err();
        assert!(matches!(err, FontLoadError::Malformed { line: 2, .. }));
    }

    #[test]
    fn blank_lines_are_skipped() {
        let d = parse_descriptor("32x48,16\n\n\nA0x0,18\n\n").unwrap();
        assert_eq!(d.glyphs.len(), 1);
    }
}
