//! Part nodes and the arena that owns them
//!
//! Every node lives in a [`PartArena`]. A parent holds its children by key in
//! order; a child points back at its parent by key without owning it. Removing
//! a child from the arena destroys its whole subtree.

use slotmap::SlotMap;

use crate::gfx::{RenderHandle, Rgb};

use super::index::{Column, NodeKey, PartData, PartValue};

/// A single entity in the part hierarchy
#[derive(Debug)]
pub struct PartNode {
    label: String,
    visible: bool,
    color: Rgb,
    geometry: Option<RenderHandle>,
    children: Vec<NodeKey>,
    parent: Option<NodeKey>,
}

impl PartNode {
    /// A group: a part with no geometry
    pub fn new(data: PartData) -> Self {
        Self {
            label: data.label,
            visible: data.visible,
            color: data.color,
            geometry: None,
            children: Vec::new(),
            parent: None,
        }
    }

    /// A visible white part carrying freshly loaded geometry
    pub fn loaded(label: impl Into<String>, handle: RenderHandle) -> Self {
        let mut node = PartNode::new(PartData::new(label));
        node.attach_geometry(handle);
        node
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    /// Sets the color of the part and of its actor, if any
    pub fn set_color(&mut self, color: Rgb) {
        self.color = color;
        if let Some(handle) = &mut self.geometry {
            handle.set_color(color);
        }
    }

    /// Sets the visibility of the part and of its actor, if any
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        if let Some(handle) = &mut self.geometry {
            handle.set_visible(visible);
        }
    }

    pub fn data(&self, column: Column) -> PartValue {
        match column {
            Column::Label => PartValue::Text(self.label.clone()),
            Column::Visible => PartValue::Bool(self.visible),
            Column::Color => PartValue::Color(self.color),
        }
    }

    /// Writes a cell; rejects values that do not fit the column
    ///
    /// Text typed into the visibility or colour cell is accepted when it
    /// parses (`true`/`false`, `r,g,b`).
    pub fn set_data(&mut self, column: Column, value: PartValue) -> bool {
        match (column, value) {
            (Column::Label, PartValue::Text(label)) => self.set_label(label),
            (Column::Visible, PartValue::Bool(visible)) => self.set_visible(visible),
            (Column::Visible, PartValue::Text(text)) => match text.trim().parse() {
                Ok(visible) => self.set_visible(visible),
                Err(_) => return false,
            },
            (Column::Color, PartValue::Color(color)) => self.set_color(color),
            (Column::Color, PartValue::Text(text)) => match text.parse::<Rgb>() {
                Ok(color) => self.set_color(color),
                Err(_) => return false,
            },
            _ => return false,
        }
        true
    }

    /// Attaches geometry, replacing any previous handle
    ///
    /// The handle adopts the node's current color and visibility.
    pub fn attach_geometry(&mut self, mut handle: RenderHandle) {
        handle.set_color(self.color);
        handle.set_visible(self.visible);
        self.geometry = Some(handle);
    }

    pub fn render_handle(&self) -> Option<&RenderHandle> {
        self.geometry.as_ref()
    }

    /// Independent actor over the same geometry, or `None` for a group
    pub fn clone_render_handle(&self) -> Option<RenderHandle> {
        self.geometry.as_ref().map(RenderHandle::duplicate)
    }

    pub fn is_group(&self) -> bool {
        self.geometry.is_none()
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn children(&self) -> &[NodeKey] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }
}

/// Owner of every node in one hierarchy
#[derive(Debug, Default)]
pub struct PartArena {
    nodes: SlotMap<NodeKey, PartNode>,
}

impl PartArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a parentless node
    pub fn insert_root(&mut self, mut node: PartNode) -> NodeKey {
        node.parent = None;
        node.children.clear();
        self.nodes.insert(node)
    }

    pub fn get(&self, key: NodeKey) -> Option<&PartNode> {
        self.nodes.get(key)
    }

    pub fn get_mut(&mut self, key: NodeKey) -> Option<&mut PartNode> {
        self.nodes.get_mut(key)
    }

    pub fn contains(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Appends a standalone node as the last child of `parent`
    ///
    /// Any children keys the node carries are discarded: a node enters the
    /// arena as a leaf. Returns `None` if `parent` is not live.
    pub fn append_child(&mut self, parent: NodeKey, mut node: PartNode) -> Option<NodeKey> {
        if !self.nodes.contains_key(parent) {
            return None;
        }
        node.parent = Some(parent);
        node.children.clear();
        let key = self.nodes.insert(node);
        self.nodes[parent].children.push(key);
        Some(key)
    }

    /// Removes the child at `position` and destroys its subtree
    ///
    /// Later siblings shift down by one; positions obtained for them before
    /// this call are stale.
    pub fn remove_child_at(&mut self, parent: NodeKey, position: usize) -> bool {
        let Some(parent_node) = self.nodes.get_mut(parent) else {
            return false;
        };
        if position >= parent_node.children.len() {
            return false;
        }
        let child = parent_node.children.remove(position);
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = None;
        }
        self.destroy(child);
        true
    }

    /// Drops a detached subtree, children before parents
    fn destroy(&mut self, key: NodeKey) {
        let mut stack = vec![(key, false)];
        while let Some((key, expanded)) = stack.pop() {
            if expanded {
                self.nodes.remove(key);
                continue;
            }
            stack.push((key, true));
            if let Some(node) = self.nodes.get(key) {
                stack.extend(node.children.iter().rev().map(|&c| (c, false)));
            }
        }
    }

    pub fn child_count(&self, key: NodeKey) -> usize {
        self.nodes.get(key).map_or(0, PartNode::child_count)
    }

    pub fn child_at(&self, key: NodeKey, position: usize) -> Option<NodeKey> {
        self.nodes.get(key)?.children.get(position).copied()
    }

    /// Index of a node within its parent; 0 for a parentless node
    pub fn position(&self, key: NodeKey) -> Option<usize> {
        let node = self.nodes.get(key)?;
        match node.parent {
            Some(parent) => self.nodes.get(parent)?.children.iter().position(|&c| c == key),
            None => Some(0),
        }
    }

    /// Depth-first pre-order keys of the subtree rooted at `from`
    pub fn preorder(&self, from: NodeKey) -> Vec<NodeKey> {
        let mut order = Vec::new();
        let mut stack = vec![from];
        while let Some(key) = stack.pop() {
            let Some(node) = self.nodes.get(key) else {
                continue;
            };
            order.push(key);
            stack.extend(node.children.iter().rev().copied());
        }
        order
    }
}
