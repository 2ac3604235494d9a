//! Scene graph.
//!
//! Responsibilities:
//! - entities: a name, a [`Transform`], and an ordered component list
//! - the closed [`Component`] set with compile-time capability dispatch
//! - [`SceneGraph`] update/draw traversal in insertion order
//! - [`SceneManager`]: named scene scripts and the active scene's lifecycle

pub mod components;
mod entity;
mod graph;
mod manager;
mod transform;

pub use components::{Component, ComponentKind};
pub use entity::{Entity, EntityId};
pub use graph::{DrawCtx, SceneGraph, UpdateCtx};
pub use manager::{SceneManager, SceneScript};
pub use transform::Transform;
