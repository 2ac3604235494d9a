//! Component set.
//!
//! Components are a closed enum rather than trait objects: capabilities
//! (update, draw) are resolved here at compile time instead of per-frame
//! type checks, and entities store them in one homogeneous list.

mod animator;
mod image;
mod particles;
mod shape;
mod text;
mod widgets;

pub use animator::{Animation, Animator};
pub use image::Image;
pub use particles::{Particle, ParticleEmitter};
pub use shape::Shape2D;
pub use text::Text;
pub use widgets::{Button, Dropdown, InputField, Slider};

use crate::assets::SpriteId;
use crate::render::GpuDevice;
use crate::scene::graph::{DrawCtx, UpdateCtx};
use crate::scene::Transform;

/// Every component an entity can carry.
#[derive(Debug, Clone)]
pub enum Component {
    Image(Image),
    Shape2D(Shape2D),
    Text(Text),
    ParticleEmitter(ParticleEmitter),
    Animator(Animator),
    Button(Button),
    Slider(Slider),
    Dropdown(Dropdown),
    InputField(InputField),
}

/// Conversion between a concrete component type and the [`Component`] enum,
/// used by the typed entity accessors.
pub trait ComponentKind: Sized {
    fn into_component(self) -> Component;
    fn from_ref(component: &Component) -> Option<&Self>;
    fn from_mut(component: &mut Component) -> Option<&mut Self>;
}

macro_rules! component_kind {
    ($($variant:ident),+ $(,)?) => {
        $(
            impl ComponentKind for $variant {
                fn into_component(self) -> Component {
                    Component::$variant(self)
                }

                fn from_ref(component: &Component) -> Option<&Self> {
                    match component {
                        Component::$variant(c) => Some(c),
                        _ => None,
                    }
                }

                fn from_mut(component: &mut Component) -> Option<&mut Self> {
                    match component {
                        Component::$variant(c) => Some(c),
                        _ => None,
                    }
                }
            }
        )+
    };
}

component_kind!(
    Image,
    Shape2D,
    Text,
    ParticleEmitter,
    Animator,
    Button,
    Slider,
    Dropdown,
    InputField,
);

impl Component {
    /// Steps the component by one frame. An [`Animator`] returns the new
    /// frame's sprite so the entity can forward it to its `Image`.
    pub(crate) fn update(&mut self, ctx: &UpdateCtx) -> Option<SpriteId> {
        match self {
            Component::ParticleEmitter(p) => {
                p.update(ctx.dt);
                None
            }
            Component::Animator(a) => a.update(ctx.dt),
            _ => None,
        }
    }

    pub(crate) fn draw<B: GpuDevice>(&self, transform: &Transform, ctx: &mut DrawCtx<'_, B>) {
        match self {
            Component::Image(c) => c.draw(transform, ctx),
            Component::Shape2D(c) => c.draw(transform, ctx),
            Component::Text(c) => c.draw(transform, ctx),
            Component::ParticleEmitter(c) => c.draw(transform, ctx),
            Component::Button(c) => c.draw(transform, ctx),
            Component::Slider(c) => c.draw(transform, ctx),
            Component::Dropdown(c) => c.draw(transform, ctx),
            Component::InputField(c) => c.draw(transform, ctx),
            Component::Animator(_) => {}
        }
    }
}
