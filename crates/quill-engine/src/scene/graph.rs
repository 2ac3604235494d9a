use crate::assets::Assets;
use crate::render::{FrameBatcher, GpuDevice};

use super::components::ComponentKind;
use super::entity::{Entity, EntityId};

/// Per-frame update context handed down the scene.
#[derive(Debug, Copy, Clone)]
pub struct UpdateCtx {
    /// Seconds since the previous update.
    pub dt: f32,
}

/// Per-frame draw context: the open batcher plus asset lookups.
pub struct DrawCtx<'a, B: GpuDevice> {
    pub batcher: &'a mut FrameBatcher<B>,
    pub assets: &'a Assets,
}

/// Ordered entity collection.
///
/// Update and draw visit entities in insertion order, and each entity's
/// components in their insertion order; draw order is the paint order
/// (no z-sorting).
#[derive(Debug, Default)]
pub struct SceneGraph {
    entities: Vec<Entity>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_entity(&mut self, name: impl Into<String>) -> EntityId {
        self.entities.push(Entity::new(name));
        EntityId(self.entities.len() - 1)
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id.0)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id.0)
    }

    /// First entity with the given name.
    pub fn entity_named(&self, name: &str) -> Option<EntityId> {
        self.entities.iter().position(|e| e.name == name).map(EntityId)
    }

    /// Adds a default component to `id`'s entity; `None` for a stale id.
    pub fn add_component<T: ComponentKind + Default>(&mut self, id: EntityId) -> Option<&mut T> {
        Some(self.entities.get_mut(id.0)?.add_component::<T>())
    }

    pub fn component<T: ComponentKind>(&self, id: EntityId) -> Option<&T> {
        self.entities.get(id.0)?.component::<T>()
    }

    pub fn component_mut<T: ComponentKind>(&mut self, id: EntityId) -> Option<&mut T> {
        self.entities.get_mut(id.0)?.component_mut::<T>()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn clear(&mut self) {
        self.entities.clear();
    }

    pub fn update(&mut self, ctx: &UpdateCtx) {
        for entity in &mut self.entities {
            entity.update(ctx);
        }
    }

    pub fn draw<B: GpuDevice>(&self, ctx: &mut DrawCtx<'_, B>) {
        for entity in &self.entities {
            entity.draw(ctx);
        }
    }
}
