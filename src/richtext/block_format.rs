// Block-Level Format Engine
// Line-scoped replace: every block touched by the selection is rebuilt with the
// target type, its children and declared styles carried over. The caret is
// handed back as a pending re-seat which the caller commits once its own
// mutation is complete.

use super::selection::Selection;
use super::structured_document::*;
use super::style::Alignment;
use crate::error::{EditError, EditResult};

/// A caret anchor expressed against block identity rather than block index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Anchor {
    block_id: ElementId,
    offset: usize,
}

impl Anchor {
    fn capture(doc: &StructuredDocument, pos: DocumentPosition) -> EditResult<Self> {
        let block = doc
            .blocks()
            .get(pos.block_index)
            .ok_or(EditError::InvalidBlockIndex(pos.block_index))?;
        Ok(Anchor {
            block_id: block.id,
            offset: pos.offset,
        })
    }

    fn resolve(&self, doc: &StructuredDocument) -> DocumentPosition {
        let Some(block_index) = doc.find_block_index(self.block_id) else {
            tracing::debug!(block_id = self.block_id, "re-seat target vanished");
            return DocumentPosition::start();
        };
        let pos = DocumentPosition::new(block_index, self.offset);
        if doc.contains_position(pos) {
            pos
        } else {
            // The text changed under us: fall back to the start of the block
            DocumentPosition::new(block_index, 0)
        }
    }
}

/// Selection to re-establish after a block replacement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "the caret is only re-seated when the pending instruction is committed"]
pub struct PendingReseat {
    anchor: Anchor,
    focus: Anchor,
}

impl PendingReseat {
    pub fn new(doc: &StructuredDocument, selection: Selection) -> EditResult<Self> {
        Ok(PendingReseat {
            anchor: Anchor::capture(doc, selection.anchor)?,
            focus: Anchor::capture(doc, selection.focus)?,
        })
    }

    /// Map the saved anchors onto the tree as it is now
    pub fn commit(self, doc: &StructuredDocument) -> Selection {
        Selection::new(self.anchor.resolve(doc), self.focus.resolve(doc))
    }
}

/// Change the block type of every block touched by the selection
pub fn apply_block_format(
    doc: &mut StructuredDocument,
    selection: Selection,
    format: BlockType,
) -> EditResult<PendingReseat> {
    let reseat = PendingReseat::new(doc, selection)?;
    for block_index in selection.block_range() {
        let old = &doc.blocks()[block_index];
        if old.block_type == format {
            continue;
        }
        let mut replacement = Block::new(0, format);
        replacement.alignment = old.alignment;
        replacement.style = old.style.clone();
        replacement.content = old.content.clone();
        tracing::trace!(
            block_index,
            from = old.block_type.tag_name(),
            to = format.tag_name(),
            "replacing block"
        );
        doc.replace_block(block_index, replacement);
    }
    Ok(reseat)
}

/// Set the alignment of every block touched by the selection
pub fn apply_alignment(
    doc: &mut StructuredDocument,
    selection: Selection,
    alignment: Alignment,
) -> EditResult {
    let (_, end) = selection.ordered();
    if end.block_index >= doc.block_count() {
        return Err(EditError::InvalidBlockIndex(end.block_index));
    }
    for block_index in selection.block_range() {
        doc.blocks_mut()[block_index].alignment = alignment;
    }
    Ok(())
}

/// Block type shared by every block in the selection, if they agree
pub fn common_block_type(doc: &StructuredDocument, selection: Selection) -> Option<BlockType> {
    let mut types = selection
        .block_range()
        .filter_map(|i| doc.blocks().get(i).map(|b| b.block_type));
    let first = types.next()?;
    types.all(|t| t == first).then_some(first)
}
