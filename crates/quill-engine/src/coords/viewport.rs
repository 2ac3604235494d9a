use super::Vec2;

/// Screen size in pixels, and the pixel → NDC conversion built on it.
///
/// World space is centered on the screen with +Y up; the backend consumes
/// Vulkan-style NDC (`[-1, 1]`, +Y down), so the conversion negates Y. A
/// point at `(w/2, h/2)` world pixels maps to NDC `(1, -1)`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// Converts a world-pixel position to NDC.
    #[inline]
    pub fn pixel_to_ndc(self, p: Vec2) -> Vec2 {
        Vec2::new(p.x / (self.width / 2.0), -p.y / (self.height / 2.0))
    }

    /// Converts a pixel extent to an NDC extent (no axis flip).
    #[inline]
    pub fn size_to_ndc(self, s: Vec2) -> Vec2 {
        Vec2::new(s.x / (self.width / 2.0), s.y / (self.height / 2.0))
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_maps_to_origin() {
        let vp = Viewport::new(800.0, 600.0);
        assert_eq!(vp.pixel_to_ndc(Vec2::zero()), Vec2::zero());
    }

    #[test]
    fn top_right_corner() {
        let vp = Viewport::new(800.0, 600.0);
        let ndc = vp.pixel_to_ndc(Vec2::new(400.0, 300.0));
        assert_eq!(ndc, Vec2::new(1.0, -1.0));
    }

    #[test]
    fn size_has_no_axis_flip() {
        let vp = Viewport::new(200.0, 100.0);
        assert_eq!(vp.size_to_ndc(Vec2::new(100.0, 50.0)), Vec2::new(1.0, 1.0));
    }
}
