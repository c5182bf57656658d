// Selection capture and restore
// Positions are plain coordinates, so a snapshot stays meaningful across
// tree transforms as long as it is re-validated before use.

use super::structured_document::{DocumentPosition, StructuredDocument};
use crate::error::{EditError, EditResult};

/// An anchor/focus pair. Collapsed when both are equal (a caret).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub anchor: DocumentPosition,
    pub focus: DocumentPosition,
}

impl Selection {
    pub fn new(anchor: DocumentPosition, focus: DocumentPosition) -> Self {
        Selection { anchor, focus }
    }

    pub fn caret(pos: DocumentPosition) -> Self {
        Selection::new(pos, pos)
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// (start, end) in document order
    pub fn ordered(&self) -> (DocumentPosition, DocumentPosition) {
        if self.focus < self.anchor {
            (self.focus, self.anchor)
        } else {
            (self.anchor, self.focus)
        }
    }

    pub fn start(&self) -> DocumentPosition {
        self.ordered().0
    }

    pub fn end(&self) -> DocumentPosition {
        self.ordered().1
    }

    /// Block indices touched by this selection, inclusive
    pub fn block_range(&self) -> std::ops::RangeInclusive<usize> {
        let (start, end) = self.ordered();
        start.block_index..=end.block_index
    }
}

/// A saved selection, taken before focus moves to a toolbar control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionSnapshot {
    selection: Selection,
}

impl SelectionSnapshot {
    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Re-validate the snapshot against the current tree
    pub fn resolve(&self, doc: &StructuredDocument) -> EditResult<Selection> {
        if doc.contains_position(self.selection.anchor)
            && doc.contains_position(self.selection.focus)
        {
            Ok(self.selection)
        } else {
            Err(EditError::DetachedSelection)
        }
    }
}

/// Snapshot the current selection if it lies within the document.
/// Returns None when there is no selection or it points outside the tree.
pub fn capture_selection(
    doc: &StructuredDocument,
    current: Option<Selection>,
) -> Option<SelectionSnapshot> {
    let selection = current?;
    if doc.contains_position(selection.anchor) && doc.contains_position(selection.focus) {
        Some(SelectionSnapshot { selection })
    } else {
        None
    }
}

/// Outcome of re-applying a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Restored {
    /// The snapshot still maps onto the tree and is the selection again
    Snapshot(Selection),
    /// The snapshot was detached; the caret went to the start of the root
    Refocused(Selection),
    /// No snapshot was taken
    Nothing,
}

impl Restored {
    pub fn selection(&self) -> Option<Selection> {
        match self {
            Restored::Snapshot(sel) | Restored::Refocused(sel) => Some(*sel),
            Restored::Nothing => None,
        }
    }
}

/// Re-apply a snapshot, falling back to focusing the editable root
pub fn restore_selection(
    doc: &StructuredDocument,
    snapshot: Option<&SelectionSnapshot>,
) -> Restored {
    let Some(snapshot) = snapshot else {
        return Restored::Nothing;
    };
    match snapshot.resolve(doc) {
        Ok(selection) => Restored::Snapshot(selection),
        Err(err) => {
            tracing::debug!(%err, "restoring selection failed, refocusing root");
            Restored::Refocused(Selection::caret(DocumentPosition::start()))
        }
    }
}
