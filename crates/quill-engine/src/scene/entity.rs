use crate::render::GpuDevice;

use super::components::{Component, ComponentKind, Image};
use super::graph::{DrawCtx, UpdateCtx};
use super::Transform;

/// Index of an entity within its [`SceneGraph`](super::SceneGraph).
///
/// Stable for the lifetime of the scene; `clear()` invalidates all ids.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct EntityId(pub(crate) usize);

/// A named transform plus an ordered component list.
#[derive(Debug, Clone)]
pub struct Entity {
    pub name: String,
    pub transform: Transform,
    components: Vec<Component>,
}

impl Entity {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::default(),
            components: Vec::new(),
        }
    }

    /// Appends a default-constructed component and returns it for
    /// configuration. Multiple components of the same type may coexist;
    /// the typed accessors return the first.
    pub fn add_component<T: ComponentKind + Default>(&mut self) -> &mut T {
        self.components.push(T::default().into_component());
        match self.components.last_mut().and_then(T::from_mut) {
            Some(component) => component,
            // The matching variant was pushed on the line above.
            None => unreachable!(),
        }
    }

    /// First component of type `T`, if any.
    pub fn component<T: ComponentKind>(&self) -> Option<&T> {
        self.components.iter().find_map(T::from_ref)
    }

    pub fn component_mut<T: ComponentKind>(&mut self) -> Option<&mut T> {
        self.components.iter_mut().find_map(T::from_mut)
    }

    #[inline]
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub(crate) fn update(&mut self, ctx: &UpdateCtx) {
        let mut frame = None;
        for component in &mut self.components {
            if let Some(sprite) = component.update(ctx) {
                frame = Some(sprite);
            }
        }

        // An animator frame change lands on the sibling image.
        if let Some(sprite) = frame {
            if let Some(image) = self.component_mut::<Image>() {
                image.sprite = Some(sprite);
            }
        }
    }

    pub(crate) fn draw<B: GpuDevice>(&self, ctx: &mut DrawCtx<'_, B>) {
        for component in &self.components {
            component.draw(&self.transform, ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::components::{Shape2D, Text};

    #[test]
    fn typed_accessors_return_the_first_match() {
        let mut e = Entity::new("hud");
        e.add_component::<Text>().text = String::from("first");
        e.add_component::<Text>().text = String::from("second");

        assert_eq!(e.component::<Text>().map(|t| t.text.as_str()), Some("first"));
        assert!(e.component::<Shape2D>().is_none());
        assert_eq!(e.components().len(), 2);
    }

    #[test]
    fn missing_component_is_none_not_a_panic() {
        let mut e = Entity::new("bare");
        assert!(e.component_mut::<Image>().is_none());
    }
}
