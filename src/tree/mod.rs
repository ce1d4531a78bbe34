//! # Part Tree
//!
//! The hierarchical model of a scene: named, colorable, independently visible
//! parts, some of which carry geometry.
//!
//! ## Key Components
//!
//! - [`PartNode`] - One part: label, visibility, colour, optional render handle
//! - [`PartArena`] - Owns every node; parents hold children by key
//! - [`PartTree`] - Index-based adapter with bracketed change notifications
//! - [`TreeObserver`] - Subscriber contract for views and the scene synchronizer
//!
//! ## Usage
//!
//! ```rust
//! use partview::tree::{Column, PartData, PartTree, PartValue};
//!
//! let mut tree = PartTree::new();
//! let group = tree.insert_child(None, PartData::new("Assembly"));
//! let bolt = tree.insert_child(Some(group), PartData::new("bolt"));
//!
//! assert_eq!(tree.row_count(Some(group)), 1);
//! assert_eq!(tree.data(bolt.sibling(Column::Visible)), PartValue::Bool(true));
//! assert!(tree.remove_rows(None, 0, 1));
//! assert!(tree.data(bolt).is_empty());
//! ```

pub mod events;
pub mod index;
pub mod model;
pub mod node;

pub use events::{TreeEvent, TreeEventLog, TreeObserver};
pub use index::{Column, NodeKey, PartData, PartIndex, PartValue};
pub use model::{PartTree, DEFAULT_HEADERS};
pub use node::{PartArena, PartNode};
