//! Render engine contracts and the in-memory actor registry
//!
//! The part tree never draws anything itself. It talks to a [`RenderEngine`]
//! through four calls and to a [`GeometryParser`] for decoding files. Real
//! backends implement these traits; [`ActorRegistry`] is the headless engine
//! used by the demo and the tests.

use std::path::Path;

use crate::error::GeometryLoadError;

use super::geometry::Bounds;
use super::handle::{ActorId, RenderHandle};

/// The narrow contract the scene synchronizer needs from a render backend
pub trait RenderEngine {
    /// Adds an actor to the active set. Adding an id that is already active
    /// replaces the stored actor.
    fn add_actor(&mut self, handle: &RenderHandle);

    /// Removes an actor, returning whether it was active
    fn remove_actor(&mut self, id: ActorId) -> bool;

    fn clear_all(&mut self);

    fn request_redraw(&mut self);
}

/// Decodes a geometry file into a render handle
///
/// Called on loader worker threads, hence `Send + Sync`.
pub trait GeometryParser: Send + Sync {
    fn parse(&self, path: &Path) -> Result<RenderHandle, GeometryLoadError>;
}

/// Headless render engine that keeps the active actor set in insertion order
#[derive(Debug, Default)]
pub struct ActorRegistry {
    actors: Vec<RenderHandle>,
    redraw_requests: u64,
}

impl ActorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_count(&self) -> usize {
        self.actors.len()
    }

    pub fn contains(&self, id: ActorId) -> bool {
        self.actors.iter().any(|a| a.id() == id)
    }

    /// Active actors in the order they were added
    pub fn actors(&self) -> &[RenderHandle] {
        &self.actors
    }

    pub fn redraw_count(&self) -> u64 {
        self.redraw_requests
    }

    /// Gets statistics about the active actor set
    pub fn statistics(&self) -> SceneStatistics {
        let total_triangles = self.actors.iter().map(|a| a.mesh().triangle_count()).sum();
        let total_vertices = self.actors.iter().map(|a| a.mesh().vertex_count()).sum();
        let bounds = self
            .actors
            .iter()
            .filter_map(|a| a.mesh().bounds())
            .reduce(|acc, b| acc.union(&b));

        SceneStatistics {
            actor_count: self.actors.len(),
            total_triangles,
            total_vertices,
            bounds,
        }
    }
}

impl RenderEngine for ActorRegistry {
    fn add_actor(&mut self, handle: &RenderHandle) {
        match self.actors.iter_mut().find(|a| a.id() == handle.id()) {
            Some(existing) => *existing = handle.clone(),
            None => self.actors.push(handle.clone()),
        }
    }

    fn remove_actor(&mut self, id: ActorId) -> bool {
        let before = self.actors.len();
        self.actors.retain(|a| a.id() != id);
        self.actors.len() != before
    }

    fn clear_all(&mut self) {
        self.actors.clear();
    }

    fn request_redraw(&mut self) {
        self.redraw_requests += 1;
        log::trace!("redraw requested ({} actors)", self.actors.len());
    }
}

/// Scene statistics for debugging and UI display
#[derive(Debug, Clone, PartialEq)]
pub struct SceneStatistics {
    pub actor_count: usize,
    pub total_triangles: usize,
    pub total_vertices: usize,
    /// Combined bounds of every active actor, `None` when nothing is drawn
    pub bounds: Option<Bounds>,
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::gfx::geometry::{generate_cube, generate_plane};

    #[test]
    fn test_add_remove_clear() {
        let mut engine = ActorRegistry::new();
        let cube = RenderHandle::new(Arc::new(generate_cube()));
        let plane = RenderHandle::new(Arc::new(generate_plane(1.0, 1.0, 1, 1)));

        engine.add_actor(&cube);
        engine.add_actor(&plane);
        engine.add_actor(&cube);
        assert_eq!(engine.active_count(), 2);

        assert!(engine.remove_actor(cube.id()));
        assert!(!engine.remove_actor(cube.id()));
        assert!(engine.contains(plane.id()));

        engine.clear_all();
        assert_eq!(engine.active_count(), 0);
    }

    #[test]
    fn test_statistics() {
        let mut engine = ActorRegistry::new();
        assert_eq!(engine.statistics().bounds, None);

        engine.add_actor(&RenderHandle::new(Arc::new(generate_cube())));
        engine.add_actor(&RenderHandle::new(Arc::new(generate_plane(4.0, 4.0, 1, 1))));

        let stats = engine.statistics();
        assert_eq!(stats.actor_count, 2);
        assert_eq!(stats.total_triangles, 12 + 2);
        assert_eq!(stats.total_vertices, 24 + 4);
        assert_eq!(stats.bounds.unwrap().size().x, 4.0);
    }
}
