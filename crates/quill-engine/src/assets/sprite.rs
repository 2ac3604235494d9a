use crate::atlas::UvRect;

/// Opaque handle to a sprite stored in [`Assets`](super::Assets).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct SpriteId(pub(crate) usize);

/// An RGBA8 pixel buffer plus, once packed, its UV rectangle into the atlas.
#[derive(Debug, Clone)]
pub struct Sprite {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
    /// Assigned by [`AtlasPacker::pack`](crate::atlas::AtlasPacker::pack);
    /// holds [`UvRect::FULL`] until then.
    pub uv: UvRect,
}

impl Sprite {
    /// Wraps a raw RGBA8 buffer. Fails when the buffer length does not match
    /// `width * height * 4`.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, super::AssetError> {
        let expected = (width as usize) * (height as usize) * 4;
        if pixels.len() != expected {
            return Err(super::AssetError::PixelSize {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
            uv: UvRect::FULL,
        })
    }

    /// Sprite size in pixels as floats, handy for draw-size defaults.
    #[inline]
    pub fn size(&self) -> crate::coords::Vec2 {
        crate::coords::Vec2::new(self.width as f32, self.height as f32)
    }
}
