use crate::coords::Vec2;

/// World-space placement of an entity.
///
/// Components never own a transform; update and draw receive the entity's.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Transform {
    pub position: Vec2,
}

impl Transform {
    #[inline]
    pub const fn at(position: Vec2) -> Self {
        Self { position }
    }
}
