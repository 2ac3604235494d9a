use crate::assets::FontId;
use crate::coords::ColorRgba;
use crate::render::GpuDevice;
use crate::scene::graph::DrawCtx;
use crate::scene::Transform;

/// Draws a string at the transform position with a bitmap font.
///
/// A missing font is a silent skip; the entity stays valid and starts
/// rendering once a font is assigned.
#[derive(Debug, Clone)]
pub struct Text {
    pub font: Option<FontId>,
    pub text: String,
    pub font_size: f32,
    pub spacing: f32,
    pub color: ColorRgba,
}

impl Default for Text {
    fn default() -> Self {
        Self {
            font: None,
            text: String::from("Text..."),
            font_size: 16.0,
            spacing: 8.0,
            color: ColorRgba::white(),
        }
    }
}

impl Text {
    pub(crate) fn draw<B: GpuDevice>(&self, transform: &Transform, ctx: &mut DrawCtx<'_, B>) {
        let Some(font) = self.font.and_then(|id| ctx.assets.font(id)) else {
            return;
        };
        ctx.batcher.draw_text(
            font,
            self.spacing,
            &self.text,
            transform.position,
            self.font_size,
            self.color,
        );
    }
}
