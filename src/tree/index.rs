//! Addressing into the part tree: keys, columns, indices and cell values

use std::fmt;

use slotmap::new_key_type;

use crate::gfx::Rgb;

new_key_type! {
    /// Generational key of a node in the part arena
    pub struct NodeKey;
}

/// The three columns every part exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    Label,
    Visible,
    Color,
}

impl Column {
    pub const ALL: [Column; 3] = [Column::Label, Column::Visible, Column::Color];
    pub const COUNT: usize = Self::ALL.len();

    pub fn from_index(index: usize) -> Option<Column> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Opaque address of one cell: a node plus a column
///
/// An index to a removed node is stale; every accessor taking it returns an
/// empty sentinel instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PartIndex {
    node: NodeKey,
    column: Column,
}

impl PartIndex {
    pub(crate) fn new(node: NodeKey, column: Column) -> Self {
        Self { node, column }
    }

    pub fn node(&self) -> NodeKey {
        self.node
    }

    pub fn column(&self) -> Column {
        self.column
    }

    /// Same node, different column
    pub fn sibling(&self, column: Column) -> PartIndex {
        PartIndex::new(self.node, column)
    }
}

/// Value of a single cell
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PartValue {
    /// Sentinel for stale indices and out-of-range columns
    #[default]
    Empty,
    Text(String),
    Bool(bool),
    Color(Rgb),
}

impl PartValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, PartValue::Empty)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            PartValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PartValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Rgb> {
        match self {
            PartValue::Color(c) => Some(*c),
            _ => None,
        }
    }
}

impl fmt::Display for PartValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartValue::Empty => Ok(()),
            PartValue::Text(s) => f.write_str(s),
            PartValue::Bool(b) => write!(f, "{b}"),
            PartValue::Color(c) => write!(f, "{c}"),
        }
    }
}

impl From<&str> for PartValue {
    fn from(value: &str) -> Self {
        PartValue::Text(value.to_string())
    }
}

impl From<String> for PartValue {
    fn from(value: String) -> Self {
        PartValue::Text(value)
    }
}

impl From<bool> for PartValue {
    fn from(value: bool) -> Self {
        PartValue::Bool(value)
    }
}

impl From<Rgb> for PartValue {
    fn from(value: Rgb) -> Self {
        PartValue::Color(value)
    }
}

/// Initial column values for a new part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartData {
    pub label: String,
    pub visible: bool,
    pub color: Rgb,
}

impl PartData {
    /// Visible white part with the given label
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            visible: true,
            color: Rgb::WHITE,
        }
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }
}
