//! Tree change notifications and their subscribers

use std::ops::Range;

use super::index::{Column, PartIndex};
use super::model::PartTree;

/// A change to the part tree
///
/// Structural changes come in bracketed pairs: the `AboutTo` event fires while
/// the tree is still in its old shape, the matching completion event after the
/// mutation. `parent` is `None` for the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEvent {
    RowsAboutToBeInserted {
        parent: Option<PartIndex>,
        rows: Range<usize>,
    },
    RowsInserted {
        parent: Option<PartIndex>,
        rows: Range<usize>,
    },
    RowsAboutToBeRemoved {
        parent: Option<PartIndex>,
        rows: Range<usize>,
    },
    RowsRemoved {
        parent: Option<PartIndex>,
        rows: Range<usize>,
    },
    /// Cells from `first` to `last` (same node, inclusive columns) changed
    DataChanged { first: PartIndex, last: PartIndex },
}

impl TreeEvent {
    pub fn is_structural(&self) -> bool {
        !matches!(self, TreeEvent::DataChanged { .. })
    }

    /// Whether the change touches the visibility or colour of a part
    pub fn touches_appearance(&self) -> bool {
        match self {
            TreeEvent::DataChanged { first, last } => {
                let span = first.column()..=last.column();
                span.contains(&Column::Visible) || span.contains(&Column::Color)
            }
            _ => false,
        }
    }
}

/// Subscriber to tree changes
///
/// Observers run inside the mutation context and get a shared view of the
/// tree; they cannot mutate it from a callback.
pub trait TreeObserver {
    fn tree_changed(&mut self, tree: &PartTree, event: &TreeEvent);
}

/// Observer that records every event and logs it
///
/// Stands in for a GUI view: anything a tree widget would need to refresh is
/// in [`TreeEventLog::events`].
#[derive(Debug, Default)]
pub struct TreeEventLog {
    events: Vec<TreeEvent>,
}

impl TreeEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[TreeEvent] {
        &self.events
    }

    pub fn take(&mut self) -> Vec<TreeEvent> {
        std::mem::take(&mut self.events)
    }
}

impl TreeObserver for TreeEventLog {
    fn tree_changed(&mut self, _tree: &PartTree, event: &TreeEvent) {
        log::trace!("tree event: {event:?}");
        self.events.push(event.clone());
    }
}
