//! Coordinate and color types shared across the engine.
//!
//! Canonical CPU space:
//! - World pixels, origin at screen center
//! - +X right, +Y up
//!
//! The batcher converts to NDC on flush via [`Viewport`]; nothing past the
//! batch boundary sees pixel coordinates.

mod color;
mod vec2;
mod viewport;

pub use color::ColorRgba;
pub use vec2::Vec2;
pub use viewport::Viewport;

/// Linearly remaps `value` from `[in_min, in_max]` to `[out_min, out_max]`.
/// Values outside the input range extrapolate.
#[inline]
pub fn remap(value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    (value - in_min) / (in_max - in_min) * (out_max - out_min) + out_min
}

#[cfg(test)]
mod tests {
    use super::remap;

    #[test]
    fn remap_maps_midpoint_and_extrapolates() {
        assert_eq!(remap(5.0, 0.0, 10.0, -100.0, 100.0), 0.0);
        assert_eq!(remap(15.0, 0.0, 10.0, 0.0, 1.0), 1.5);
    }
}
