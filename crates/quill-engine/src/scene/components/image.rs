use crate::assets::SpriteId;
use crate::coords::{ColorRgba, Vec2};
use crate::render::GpuDevice;
use crate::scene::graph::DrawCtx;
use crate::scene::Transform;

/// Draws one atlas sprite as a centered, tinted quad.
///
/// Without a sprite assigned it falls back to a flat quad in the tint
/// color, which keeps placeholder entities visible.
#[derive(Debug, Clone)]
pub struct Image {
    pub sprite: Option<SpriteId>,
    pub size: Vec2,
    pub color: ColorRgba,
}

impl Default for Image {
    fn default() -> Self {
        Self {
            sprite: None,
            size: Vec2::splat(100.0),
            color: ColorRgba::white(),
        }
    }
}

impl Image {
    pub(crate) fn draw<B: GpuDevice>(&self, transform: &Transform, ctx: &mut DrawCtx<'_, B>) {
        match self.sprite.and_then(|id| ctx.assets.sprite(id)) {
            Some(sprite) => {
                ctx.batcher
                    .draw_sprite(sprite.uv, transform.position, self.size, self.color);
            }
            None => {
                ctx.batcher.draw_quad(transform.position, self.size, self.color);
            }
        }
    }
}
