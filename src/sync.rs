//! Scene synchronization
//!
//! Keeps a render engine's active actor set matching the part tree. The
//! synchronizer observes the tree: it unregisters actors of a subtree before
//! the subtree is removed, and marks itself dirty on any change that affects
//! what is drawn. [`SceneSync::flush`] then rebuilds the actor set from scratch.

use std::sync::Arc;

use crate::gfx::geometry::generate_floor;
use crate::gfx::{RenderEngine, RenderHandle, Rgb};
use crate::tree::{PartIndex, PartTree, TreeEvent, TreeObserver};

/// Reconciles a [`RenderEngine`] with a [`PartTree`]
#[derive(Debug)]
pub struct SceneSync<E: RenderEngine> {
    engine: E,
    floor: Option<RenderHandle>,
    dirty: bool,
    resync_count: u64,
}

impl<E: RenderEngine> SceneSync<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            floor: None,
            dirty: false,
            resync_count: 0,
        }
    }

    /// Adds a floor plane that is re-added after every resync
    pub fn with_floor(mut self, extent: f32, color: Rgb) -> Self {
        let mut floor = RenderHandle::new(Arc::new(generate_floor(extent)));
        floor.set_color(color);
        self.floor = Some(floor);
        self
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn resync_count(&self) -> u64 {
        self.resync_count
    }

    /// Rebuilds the engine's actor set from the tree
    ///
    /// Clears every actor, then adds the handle of each visible part in
    /// depth-first pre-order. No diffing: the cost is one walk of the tree.
    pub fn resync(&mut self, tree: &PartTree) {
        self.engine.clear_all();

        let mut added = 0usize;
        for handle in visible_handles(tree) {
            self.engine.add_actor(handle);
            added += 1;
        }
        if let Some(floor) = &self.floor {
            self.engine.add_actor(floor);
        }
        self.engine.request_redraw();

        self.dirty = false;
        self.resync_count += 1;
        log::debug!("resync #{}: {added} actors", self.resync_count);
    }

    /// Resyncs if anything relevant changed since the last resync
    pub fn flush(&mut self, tree: &PartTree) -> bool {
        if !self.dirty {
            return false;
        }
        self.resync(tree);
        true
    }

    /// Removes every actor in the subtree at `index` from the engine
    fn unregister_subtree(&mut self, tree: &PartTree, index: PartIndex) -> usize {
        let mut removed = 0;
        for key in tree.walk(Some(index)) {
            let Some(handle) = tree.node(key).and_then(|n| n.render_handle()) else {
                continue;
            };
            if self.engine.remove_actor(handle.id()) {
                removed += 1;
            }
        }
        removed
    }
}

impl<E: RenderEngine> TreeObserver for SceneSync<E> {
    fn tree_changed(&mut self, tree: &PartTree, event: &TreeEvent) {
        match event {
            TreeEvent::RowsAboutToBeRemoved { parent, rows } => {
                let mut removed = 0;
                for row in rows.clone() {
                    if let Some(child) = tree.child_at(*parent, row) {
                        removed += self.unregister_subtree(tree, child);
                    }
                }
                if removed > 0 {
                    self.engine.request_redraw();
                }
                log::trace!("unregistered {removed} actors ahead of removal");
                self.dirty = true;
            }
            TreeEvent::RowsRemoved { .. } => self.dirty = true,
            TreeEvent::RowsInserted { parent, rows } => {
                let renderable = rows.clone().any(|row| {
                    tree.child_at(*parent, row).is_some_and(|child| {
                        tree.walk(Some(child))
                            .into_iter()
                            .any(|key| tree.node(key).is_some_and(|n| n.render_handle().is_some()))
                    })
                });
                if renderable {
                    self.dirty = true;
                }
            }
            TreeEvent::DataChanged { .. } if event.touches_appearance() => self.dirty = true,
            _ => {}
        }
    }
}

/// Handles of every visible part, in depth-first pre-order
pub fn visible_handles(tree: &PartTree) -> impl Iterator<Item = &RenderHandle> + '_ {
    tree.walk(None).into_iter().filter_map(move |key| {
        let node = tree.node(key)?;
        if node.is_visible() {
            node.render_handle()
        } else {
            None
        }
    })
}

/// Overwrites visibility and colour on `index` and every descendant
///
/// Pre-order, unconditional: descendants lose whatever they had before. Labels
/// are never touched. Returns the number of parts written.
pub fn propagate(tree: &mut PartTree, index: PartIndex, visible: bool, color: Rgb) -> usize {
    let mut written = 0;
    for key in tree.walk(Some(index)) {
        let Some(target) = tree.index_of(key) else {
            continue;
        };
        if tree.set_appearance(target, visible, color) {
            written += 1;
        }
    }
    written
}
