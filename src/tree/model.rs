//! Index-based adapter over the part hierarchy

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::error::IndexError;
use crate::gfx::Rgb;

use super::events::{TreeEvent, TreeObserver};
use super::index::{Column, NodeKey, PartData, PartIndex, PartValue};
use super::node::{PartArena, PartNode};

/// Default column headers, stored on the root sentinel
pub const DEFAULT_HEADERS: [&str; 3] = ["Part", "Visible?", "Colour"];

/// The part hierarchy, addressed through [`PartIndex`] values
///
/// A `parent` argument of `None` means the root. The root itself has no index
/// and can never be removed. Every structural mutation is bracketed by an
/// `AboutTo` event and a completion event delivered to all observers.
///
/// The tree is `!Send`: it lives on the thread that owns the mutation context
/// and only that thread can change it.
pub struct PartTree {
    arena: PartArena,
    root: NodeKey,
    headers: [String; 3],
    observers: Vec<Rc<RefCell<dyn TreeObserver>>>,
}

impl fmt::Debug for PartTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartTree")
            .field("parts", &self.len())
            .field("headers", &self.headers)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl Default for PartTree {
    fn default() -> Self {
        Self::new()
    }
}

impl PartTree {
    /// Creates an empty tree with the default headers
    pub fn new() -> Self {
        let [part, visible, colour] = DEFAULT_HEADERS;
        Self::with_headers(part, visible, colour)
    }

    pub fn with_headers(
        part: impl Into<String>,
        visible: impl Into<String>,
        colour: impl Into<String>,
    ) -> Self {
        let headers = [part.into(), visible.into(), colour.into()];
        let mut arena = PartArena::new();
        let root = arena.insert_root(PartNode::new(PartData::new(headers[0].clone())));
        Self {
            arena,
            root,
            headers,
            observers: Vec::new(),
        }
    }

    /// Registers an observer for every future change
    ///
    /// Observers are called synchronously; an observer must not be borrowed
    /// elsewhere while the tree mutates.
    pub fn subscribe(&mut self, observer: Rc<RefCell<dyn TreeObserver>>) {
        self.observers.push(observer);
    }

    fn notify(&self, event: TreeEvent) {
        for observer in &self.observers {
            observer.borrow_mut().tree_changed(self, &event);
        }
    }

    pub fn header_data(&self, column: Column) -> &str {
        &self.headers[column.index()]
    }

    pub fn root_key(&self) -> NodeKey {
        self.root
    }

    /// Number of parts, not counting the root sentinel
    pub fn len(&self) -> usize {
        self.arena.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn column_count(&self) -> usize {
        Column::COUNT
    }

    pub fn node(&self, key: NodeKey) -> Option<&PartNode> {
        self.arena.get(key)
    }

    pub fn part(&self, index: PartIndex) -> Option<&PartNode> {
        self.arena.get(index.node())
    }

    pub fn try_part(&self, index: PartIndex) -> Result<&PartNode, IndexError> {
        self.part(index).ok_or(IndexError::Stale)
    }

    pub fn is_valid(&self, index: PartIndex) -> bool {
        index.node() != self.root && self.arena.contains(index.node())
    }

    /// Key addressed by a parent argument
    ///
    /// Only label-column indices have children; any other column, like a stale
    /// index, addresses nothing.
    fn key_of(&self, parent: Option<PartIndex>) -> Option<NodeKey> {
        match parent {
            None => Some(self.root),
            Some(index) if index.column() == Column::Label => self.live_key(Some(index)),
            Some(_) => None,
        }
    }

    /// Node under an index regardless of its column; `None` if stale
    fn live_key(&self, index: Option<PartIndex>) -> Option<NodeKey> {
        match index {
            None => Some(self.root),
            Some(index) if self.arena.contains(index.node()) => Some(index.node()),
            Some(_) => None,
        }
    }

    /// Index for a node; the root has none
    fn index_for_key(&self, key: NodeKey, column: Column) -> Option<PartIndex> {
        (key != self.root && self.arena.contains(key)).then(|| PartIndex::new(key, column))
    }

    pub fn index_of(&self, key: NodeKey) -> Option<PartIndex> {
        self.index_for_key(key, Column::Label)
    }

    pub fn row_count(&self, parent: Option<PartIndex>) -> usize {
        self.key_of(parent)
            .map_or(0, |key| self.arena.child_count(key))
    }

    pub fn index(&self, row: usize, column: Column, parent: Option<PartIndex>) -> Option<PartIndex> {
        let parent_key = self.key_of(parent)?;
        let child = self.arena.child_at(parent_key, row)?;
        Some(PartIndex::new(child, column))
    }

    pub fn child_at(&self, parent: Option<PartIndex>, row: usize) -> Option<PartIndex> {
        self.index(row, Column::Label, parent)
    }

    /// Like [`PartTree::child_at`], but says why nothing was found
    pub fn try_child_at(&self, parent: Option<PartIndex>, row: usize) -> Result<PartIndex, IndexError> {
        let parent_key = self.key_of(parent).ok_or(IndexError::Stale)?;
        let count = self.arena.child_count(parent_key);
        self.arena
            .child_at(parent_key, row)
            .map(|child| PartIndex::new(child, Column::Label))
            .ok_or(IndexError::RowOutOfRange { row, count })
    }

    /// Parent of a part; `None` for top-level parts and stale indices
    pub fn parent_of(&self, index: PartIndex) -> Option<PartIndex> {
        let parent = self.part(index)?.parent()?;
        self.index_for_key(parent, Column::Label)
    }

    /// Current row of a part within its parent
    pub fn row(&self, index: PartIndex) -> Option<usize> {
        if !self.is_valid(index) {
            return None;
        }
        self.arena.position(index.node())
    }

    pub fn data(&self, index: PartIndex) -> PartValue {
        match self.part(index) {
            Some(node) if index.node() != self.root => node.data(index.column()),
            _ => PartValue::Empty,
        }
    }

    /// Writes one cell and reports the change
    ///
    /// Returns false for a stale index or a value of the wrong type.
    pub fn set_data(&mut self, index: PartIndex, value: PartValue) -> bool {
        if !self.is_valid(index) {
            return false;
        }
        let Some(node) = self.arena.get_mut(index.node()) else {
            return false;
        };
        if !node.set_data(index.column(), value) {
            return false;
        }
        self.notify(TreeEvent::DataChanged {
            first: index,
            last: index,
        });
        true
    }

    /// Writes visibility and colour together and reports one change
    pub fn set_appearance(&mut self, index: PartIndex, visible: bool, color: Rgb) -> bool {
        if !self.is_valid(index) {
            return false;
        }
        let Some(node) = self.arena.get_mut(index.node()) else {
            return false;
        };
        node.set_visible(visible);
        node.set_color(color);
        self.notify(TreeEvent::DataChanged {
            first: index.sibling(Column::Visible),
            last: index.sibling(Column::Color),
        });
        true
    }

    /// Appends a new group under `parent` (the root if absent, stale or not a
    /// label-column index)
    pub fn insert_child(&mut self, parent: Option<PartIndex>, data: PartData) -> PartIndex {
        self.insert_node(parent, PartNode::new(data))
    }

    /// Appends a prebuilt node under `parent`, with the same fallback to the root
    pub fn insert_node(&mut self, parent: Option<PartIndex>, node: PartNode) -> PartIndex {
        let parent_key = self.key_of(parent).unwrap_or(self.root);
        let parent_index = self.index_for_key(parent_key, Column::Label);
        let row = self.arena.child_count(parent_key);

        self.notify(TreeEvent::RowsAboutToBeInserted {
            parent: parent_index,
            rows: row..row + 1,
        });
        let label = node.label().to_string();
        let Some(key) = self.arena.append_child(parent_key, node) else {
            unreachable!("insertion parent was resolved to a live node");
        };
        self.notify(TreeEvent::RowsInserted {
            parent: parent_index,
            rows: row..row + 1,
        });

        log::debug!("inserted part '{label}' at row {row}");
        PartIndex::new(key, Column::Label)
    }

    /// Removes `count` consecutive children of `parent` starting at `start`
    ///
    /// Fails without touching the tree if the parent is stale or not a
    /// label-column index, `count` is zero or the range runs past the last
    /// child.
    pub fn remove_rows(&mut self, parent: Option<PartIndex>, start: usize, count: usize) -> bool {
        let Some(parent_key) = self.key_of(parent) else {
            log::warn!("remove_rows: parent index does not address a part");
            return false;
        };
        let len = self.arena.child_count(parent_key);
        let end = match start.checked_add(count) {
            Some(end) if count > 0 && end <= len => end,
            _ => {
                log::warn!("remove_rows: rows {start}..+{count} out of range ({len} children)");
                return false;
            }
        };
        let parent_index = self.index_for_key(parent_key, Column::Label);

        self.notify(TreeEvent::RowsAboutToBeRemoved {
            parent: parent_index,
            rows: start..end,
        });
        for _ in start..end {
            self.arena.remove_child_at(parent_key, start);
        }
        self.notify(TreeEvent::RowsRemoved {
            parent: parent_index,
            rows: start..end,
        });

        log::debug!("removed rows {start}..{end}");
        true
    }

    /// Depth-first pre-order keys starting at `from` (the root if `None`)
    ///
    /// Any column of the start part works; a stale start yields an empty walk.
    pub fn walk(&self, from: Option<PartIndex>) -> Vec<NodeKey> {
        match self.live_key(from) {
            Some(key) => self.arena.preorder(key),
            None => Vec::new(),
        }
    }

    /// First part, in pre-order, whose label contains `term` ignoring case
    pub fn find(&self, term: &str) -> Option<PartIndex> {
        let needle = term.to_lowercase();
        self.walk(None)
            .into_iter()
            .skip(1)
            .find(|&key| {
                self.arena
                    .get(key)
                    .is_some_and(|n| n.label().to_lowercase().contains(&needle))
            })
            .map(|key| PartIndex::new(key, Column::Label))
    }
}
