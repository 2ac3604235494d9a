use super::graph::{SceneGraph, UpdateCtx};

/// Build and per-frame logic for one named scene.
///
/// Scripts are plain objects owned by the [`SceneManager`]; they receive
/// the scene graph explicitly instead of reaching into globals.
pub trait SceneScript {
    /// Populates a freshly cleared scene. Called on every activation.
    fn init(&mut self, scene: &mut SceneGraph);

    /// Runs before the scene's own update each frame.
    fn update(&mut self, _scene: &mut SceneGraph, _ctx: &UpdateCtx) {}
}

/// Named scene registry plus the single active scene graph.
#[derive(Default)]
pub struct SceneManager {
    scenes: Vec<(String, Box<dyn SceneScript>)>,
    active: Option<usize>,
    graph: SceneGraph,
}

impl SceneManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a scene script under `name`. A duplicate name is a logged
    /// no-op; the original registration wins.
    pub fn register(&mut self, name: impl Into<String>, script: Box<dyn SceneScript>) {
        let name = name.into();
        if self.scenes.iter().any(|(n, _)| *n == name) {
            log::warn!("scene {name:?} is already registered, ignoring");
            return;
        }
        self.scenes.push((name, script));
    }

    /// Switches to `name`: clears the graph and re-initializes it through
    /// the scene's script. Returns false for an unknown name.
    pub fn go_to(&mut self, name: &str) -> bool {
        let Some(index) = self.scenes.iter().position(|(n, _)| n == name) else {
            log::warn!("unknown scene {name:?}");
            return false;
        };

        log::info!("entering scene {name:?}");
        self.graph.clear();
        self.scenes[index].1.init(&mut self.graph);
        self.active = Some(index);
        true
    }

    pub fn active_name(&self) -> Option<&str> {
        self.active.map(|i| self.scenes[i].0.as_str())
    }

    #[inline]
    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    #[inline]
    pub fn graph_mut(&mut self) -> &mut SceneGraph {
        &mut self.graph
    }

    /// Runs the active script, then every component, for one frame.
    pub fn update(&mut self, ctx: &UpdateCtx) {
        if let Some(index) = self.active {
            self.scenes[index].1.update(&mut self.graph, ctx);
        }
        self.graph.update(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::components::Shape2D;

    struct Counting {
        inits: usize,
    }

    impl SceneScript for Counting {
        fn init(&mut self, scene: &mut SceneGraph) {
            self.inits += 1;
            let id = scene.add_entity("marker");
            scene.add_component::<Shape2D>(id);
        }
    }

    struct Empty;

    impl SceneScript for Empty {
        fn init(&mut self, _scene: &mut SceneGraph) {}
    }

    #[test]
    fn go_to_clears_and_reinitializes() {
        let mut mgr = SceneManager::new();
        mgr.register("menu", Box::new(Counting { inits: 0 }));

        assert!(mgr.go_to("menu"));
        assert_eq!(mgr.graph().len(), 1);
        mgr.graph_mut().add_entity("extra");

        assert!(mgr.go_to("menu"));
        assert_eq!(mgr.graph().len(), 1);
        assert_eq!(mgr.active_name(), Some("menu"));
    }

    #[test]
    fn unknown_scene_leaves_the_current_one_active() {
        let mut mgr = SceneManager::new();
        mgr.register("game", Box::new(Empty));
        mgr.go_to("game");

        assert!(!mgr.go_to("credits"));
        assert_eq!(mgr.active_name(), Some("game"));
    }

    #[test]
    fn duplicate_registration_keeps_the_first_script() {
        let mut mgr = SceneManager::new();
        mgr.register("menu", Box::new(Counting { inits: 0 }));
        mgr.register("menu", Box::new(Empty));

        assert!(mgr.go_to("menu"));
        // The counting script (registered first) built the marker entity.
        assert_eq!(mgr.graph().len(), 1);
    }
}
