use crate::coords::{ColorRgba, Vec2};
use crate::render::GpuDevice;
use crate::scene::graph::DrawCtx;
use crate::scene::Transform;

/// Arbitrary indexed 2D geometry in local space around the transform.
///
/// Defaults to a triangle so a freshly added shape is visible.
#[derive(Debug, Clone)]
pub struct Shape2D {
    pub vertices: Vec<Vec2>,
    pub indices: Vec<u16>,
    pub color: ColorRgba,
}

impl Default for Shape2D {
    fn default() -> Self {
        Self {
            vertices: vec![
                Vec2::new(0.0, 83.2),
                Vec2::new(-100.0, -80.0),
                Vec2::new(100.0, -80.0),
            ],
            indices: vec![0, 2, 1],
            color: ColorRgba::white(),
        }
    }
}

impl Shape2D {
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }

    pub(crate) fn draw<B: GpuDevice>(&self, transform: &Transform, ctx: &mut DrawCtx<'_, B>) {
        ctx.batcher
            .draw_shape(transform.position, &self.vertices, &self.indices, self.color);
    }
}
