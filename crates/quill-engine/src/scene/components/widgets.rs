//! Draw-only UI widgets.
//!
//! These components carry the visual state and geometry of the classic
//! widget set; pointer and keyboard handling live outside the engine, so
//! scripts mutate widget state directly and the widgets only render it.

use crate::assets::FontId;
use crate::coords::{remap, ColorRgba, Vec2};
use crate::render::GpuDevice;
use crate::scene::graph::DrawCtx;
use crate::scene::Transform;

/// A filled rectangle styled as a button face.
#[derive(Debug, Clone)]
pub struct Button {
    pub size: Vec2,
    pub color: ColorRgba,
}

impl Default for Button {
    fn default() -> Self {
        Self {
            size: Vec2::splat(100.0),
            color: ColorRgba::white(),
        }
    }
}

impl Button {
    pub(crate) fn draw<B: GpuDevice>(&self, transform: &Transform, ctx: &mut DrawCtx<'_, B>) {
        ctx.batcher.draw_quad(transform.position, self.size, self.color);
    }
}

/// A slider track with a proportional fill and an optional handle.
#[derive(Debug, Clone)]
pub struct Slider {
    pub size: Vec2,
    pub background_color: ColorRgba,
    pub fill_color: ColorRgba,
    pub handle_color: ColorRgba,
    pub hide_handle: bool,
    min: f32,
    max: f32,
    value: f32,
}

impl Default for Slider {
    fn default() -> Self {
        Self {
            size: Vec2::new(200.0, 20.0),
            background_color: ColorRgba::new(1.0, 1.0, 1.0, 100.0 / 255.0),
            fill_color: ColorRgba::new(160.0 / 255.0, 160.0 / 255.0, 160.0 / 255.0, 1.0),
            handle_color: ColorRgba::new(200.0 / 255.0, 200.0 / 255.0, 200.0 / 255.0, 1.0),
            hide_handle: false,
            min: 0.0,
            max: 10.0,
            value: 5.0,
        }
    }
}

impl Slider {
    #[inline]
    pub fn min(&self) -> f32 {
        self.min
    }

    #[inline]
    pub fn max(&self) -> f32 {
        self.max
    }

    #[inline]
    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn set_range(&mut self, min: f32, max: f32) {
        self.min = min;
        self.max = max;
        self.value = self.value.clamp(min, max);
    }

    pub fn set_value(&mut self, value: f32) {
        self.value = value.clamp(self.min, self.max);
    }

    pub(crate) fn draw<B: GpuDevice>(&self, transform: &Transform, ctx: &mut DrawCtx<'_, B>) {
        let pos = transform.position;
        let h = self.size / 2.0;

        ctx.batcher.draw_quad(pos, self.size, self.background_color);

        // Fill from the left edge to the value's mapped x.
        let fill_x = remap(self.value, self.min, self.max, -h.x, h.x);
        ctx.batcher.draw_shape(
            pos,
            &[
                Vec2::new(-h.x, -h.y),
                Vec2::new(fill_x, -h.y),
                Vec2::new(fill_x, h.y),
                Vec2::new(-h.x, h.y),
            ],
            &crate::render::batch::QUAD_INDICES,
            self.fill_color,
        );

        if !self.hide_handle {
            ctx.batcher.draw_shape(
                pos,
                &[
                    Vec2::new(fill_x - 5.0, -h.y - 5.0),
                    Vec2::new(fill_x + 5.0, -h.y - 5.0),
                    Vec2::new(fill_x + 5.0, h.y + 5.0),
                    Vec2::new(fill_x - 5.0, h.y + 5.0),
                ],
                &crate::render::batch::QUAD_INDICES,
                self.handle_color,
            );
        }
    }
}

/// A dropdown box: the selected option's label, plus the option list
/// stacked below while `opened`.
#[derive(Debug, Clone)]
pub struct Dropdown {
    pub size: Vec2,
    pub color: ColorRgba,

    pub font: Option<FontId>,
    pub font_spacing: f32,
    pub label_font_size: f32,
    pub label_color: ColorRgba,

    pub option_size: Vec2,
    pub option_color: ColorRgba,
    pub option_font_size: f32,
    pub option_font_color: ColorRgba,
    pub option_distance: f32,

    pub options: Vec<String>,
    pub selected: usize,
    pub opened: bool,
}

impl Default for Dropdown {
    fn default() -> Self {
        Self {
            size: Vec2::new(200.0, 30.0),
            color: ColorRgba::white(),
            font: None,
            font_spacing: 8.0,
            label_font_size: 6.0,
            label_color: ColorRgba::black(),
            option_size: Vec2::new(180.0, 20.0),
            option_color: ColorRgba::new(200.0 / 255.0, 200.0 / 255.0, 200.0 / 255.0, 1.0),
            option_font_size: 4.0,
            option_font_color: ColorRgba::black(),
            option_distance: 5.0,
            options: vec![
                String::from("Option A"),
                String::from("Option B"),
                String::from("Option C"),
            ],
            selected: 0,
            opened: false,
        }
    }
}

impl Dropdown {
    /// Center of option row `i` while opened.
    pub fn option_position(&self, transform: &Transform, i: usize) -> Vec2 {
        transform.position
            - Vec2::new(0.0, self.option_distance)
            - Vec2::new(0.0, self.option_size.y + self.option_distance) * (i + 1) as f32
    }

    pub(crate) fn draw<B: GpuDevice>(&self, transform: &Transform, ctx: &mut DrawCtx<'_, B>) {
        let pos = transform.position;
        ctx.batcher.draw_quad(pos, self.size, self.color);

        let font = self.font.and_then(|id| ctx.assets.font(id));

        if let (Some(font), Some(label)) = (font, self.options.get(self.selected)) {
            let origin = pos
                - Vec2::new(self.size.x / 2.0 - 5.0, self.size.y / 2.0 - self.label_font_size / 2.0);
            ctx.batcher.draw_text(
                font,
                self.font_spacing,
                label,
                origin,
                self.label_font_size,
                self.label_color,
            );
        }

        if !self.opened {
            return;
        }

        for (i, option) in self.options.iter().enumerate() {
            let pos = self.option_position(transform, i);
            ctx.batcher.draw_quad(pos, self.option_size, self.option_color);
            if let Some(font) = font {
                let origin = pos
                    - Vec2::new(
                        self.option_size.x / 2.0 - 5.0,
                        self.option_size.y / 2.0 - self.option_font_size / 2.0,
                    );
                ctx.batcher.draw_text(
                    font,
                    self.font_spacing,
                    option,
                    origin,
                    self.option_font_size,
                    self.option_font_color,
                );
            }
        }
    }
}

/// A text box showing either its content or a placeholder label.
#[derive(Debug, Clone)]
pub struct InputField {
    pub size: Vec2,
    pub color: ColorRgba,

    pub font: Option<FontId>,
    pub font_spacing: f32,

    pub text: String,
    pub text_color: ColorRgba,
    pub text_font_size: f32,

    pub placeholder: String,
    pub placeholder_color: ColorRgba,
    pub placeholder_font_size: f32,
}

impl Default for InputField {
    fn default() -> Self {
        Self {
            size: Vec2::new(200.0, 30.0),
            color: ColorRgba::white(),
            font: None,
            font_spacing: 8.0,
            text: String::new(),
            text_color: ColorRgba::black(),
            text_font_size: 6.0,
            placeholder: String::from("Enter text..."),
            placeholder_color: ColorRgba::new(0.0, 0.0, 0.0, 150.0 / 255.0),
            placeholder_font_size: 6.0,
        }
    }
}

impl InputField {
    pub(crate) fn draw<B: GpuDevice>(&self, transform: &Transform, ctx: &mut DrawCtx<'_, B>) {
        let pos = transform.position;
        ctx.batcher.draw_quad(pos, self.size, self.color);

        let Some(font) = self.font.and_then(|id| ctx.assets.font(id)) else {
            return;
        };

        let (content, color, font_size) = if self.text.is_empty() {
            (&self.placeholder, self.placeholder_color, self.placeholder_font_size)
        } else {
            (&self.text, self.text_color, self.text_font_size)
        };
        let origin = pos - Vec2::new(self.size.x / 2.0 - 5.0, self.size.y / 2.0 - font_size / 2.0);
        ctx.batcher
            .draw_text(font, self.font_spacing, content, origin, font_size, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slider_value_clamps_to_its_range() {
        let mut s = Slider::default();
        s.set_range(0.0, 10.0);
        s.set_value(25.0);
        assert_eq!(s.value(), 10.0);
        s.set_value(-3.0);
        assert_eq!(s.value(), 0.0);
    }

    #[test]
    fn narrowing_the_range_reclamps_the_value() {
        let mut s = Slider::default();
        s.set_value(9.0);
        s.set_range(0.0, 5.0);
        assert_eq!(s.value(), 5.0);
    }

    #[test]
    fn dropdown_options_stack_below_the_box() {
        let d = Dropdown::default();
        let t = Transform::at(Vec2::new(0.0, 100.0));

        let first = d.option_position(&t, 0);
        let second = d.option_position(&t, 1);
        assert_eq!(first.y, 100.0 - 5.0 - 25.0);
        assert_eq!(second.y, first.y - 25.0);
        assert_eq!(first.x, 0.0);
    }
}
