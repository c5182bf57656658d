// Inline Style Span Engine
// Applies character-level styles to a selection by introducing, reusing and
// cleaning up carrier spans. All functions are tree transforms that report
// where the caret should go afterwards.

use super::selection::Selection;
use super::structured_document::*;
use super::style::{Flag, SpanStyle, StyleKey, StyleProperty, TextStyle};
use crate::error::{EditError, EditResult};

/// What the engine did to honour a style intent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// An existing empty typing-style carrier at the caret was restyled
    ReusedPlaceholder,
    /// A new empty typing-style carrier was inserted at the caret
    InsertedPlaceholder,
    /// The selected content was wrapped in a new carrier
    Wrapped,
}

/// Result of a span transform: the re-mapped caret and its insert affinity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleChange {
    pub kind: ChangeKind,
    pub caret: DocumentPosition,
    pub affinity: Affinity,
}

/// Apply a single style property to the selection.
///
/// A collapsed selection becomes a typing style carried by a placeholder span;
/// a non-collapsed one is wrapped, and the caret collapses right after the wrap.
pub fn apply_style(
    doc: &mut StructuredDocument,
    selection: Selection,
    property: &StyleProperty,
    flags: TextStyle,
    affinity: Affinity,
) -> EditResult<StyleChange> {
    if doc.is_empty() {
        return Err(EditError::EmptyDocument);
    }
    if !doc.contains_position(selection.anchor) || !doc.contains_position(selection.focus) {
        return Err(EditError::InvalidPosition);
    }

    if selection.is_collapsed() {
        apply_typing_style(doc, selection.anchor, property, flags, affinity)
    } else {
        wrap_selection(doc, selection, property)
    }
}

fn apply_typing_style(
    doc: &mut StructuredDocument,
    caret: DocumentPosition,
    property: &StyleProperty,
    flags: TextStyle,
    affinity: Affinity,
) -> EditResult<StyleChange> {
    let block = doc
        .blocks_mut()
        .get_mut(caret.block_index)
        .ok_or(EditError::InvalidBlockIndex(caret.block_index))?;

    if let Some(path) = placeholder_path_ending_at(&block.content, caret.offset)
        && let Some(span) = span_at_path_mut(&mut block.content, &path)
    {
        span.style.set(property.clone());
        tracing::trace!(?caret, "restyled existing typing placeholder");
        return Ok(StyleChange {
            kind: ChangeKind::ReusedPlaceholder,
            caret,
            affinity: Affinity::Inner,
        });
    }

    let placeholder = StyleSpan::placeholder(property.to_span_style(), flags);
    block.insert_inline(caret.offset, InlineContent::Span(placeholder), affinity);
    Ok(StyleChange {
        kind: ChangeKind::InsertedPlaceholder,
        caret: DocumentPosition::new(caret.block_index, caret.offset + PLACEHOLDER_LEN),
        affinity: Affinity::Inner,
    })
}

fn wrap_selection(
    doc: &mut StructuredDocument,
    selection: Selection,
    property: &StyleProperty,
) -> EditResult<StyleChange> {
    let (_, end) = selection.ordered();
    let mut depth = 0;
    for (block_index, from, to) in block_ranges(doc, selection)? {
        let block = &mut doc.blocks_mut()[block_index];
        // The wrap goes inside the deepest carrier that strictly encloses the range
        let (path, from, to) = enclosing_path(&block.content, from, to);
        let Some(target) = content_at_path_mut(&mut block.content, &path) else {
            continue;
        };
        let (before, mut selected, after) = split_range(target, from, to);
        if content_len(&selected) == 0 {
            continue;
        }
        strip_property(&mut selected, property.key());
        let mut content = before;
        content.push(InlineContent::Span(StyleSpan::new(
            property.to_span_style(),
            selected,
        )));
        content.extend(after);
        *target = content;
        if block_index == end.block_index {
            depth = path.len();
        }
        cleanup_block(block);
    }
    let affinity = match depth {
        0 => Affinity::Outer,
        depth => Affinity::Within(depth),
    };
    Ok(StyleChange {
        kind: ChangeKind::Wrapped,
        caret: end,
        affinity,
    })
}

/// Path to the deepest carrier that strictly encloses `from..to`, with the
/// range translated into that carrier's content
fn enclosing_path(
    content: &[InlineContent],
    from: usize,
    to: usize,
) -> (Vec<usize>, usize, usize) {
    let mut pos = 0usize;
    for (idx, item) in content.iter().enumerate() {
        let len = item.text_len();
        if let InlineContent::Span(span) = item
            && !span.is_placeholder()
            && pos <= from
            && to <= pos + len
            && (from, to) != (pos, pos + len)
        {
            let (mut path, from, to) = enclosing_path(&span.content, from - pos, to - pos);
            path.insert(0, idx);
            return (path, from, to);
        }
        pos += len;
    }
    (Vec::new(), from, to)
}

fn content_at_path_mut<'a>(
    content: &'a mut Vec<InlineContent>,
    path: &[usize],
) -> Option<&'a mut Vec<InlineContent>> {
    let Some((first, rest)) = path.split_first() else {
        return Some(content);
    };
    match content.get_mut(*first)? {
        InlineContent::Span(span) => content_at_path_mut(&mut span.content, rest),
        _ => None,
    }
}

/// Set or clear a character flag on the selected runs.
/// The flag is set everywhere unless every selected run already has it.
/// Returns the new state of the flag.
pub fn toggle_flag(
    doc: &mut StructuredDocument,
    selection: Selection,
    flag: Flag,
) -> EditResult<bool> {
    let ranges = block_ranges(doc, selection)?;
    let all_on = ranges.iter().all(|&(block_index, from, to)| {
        let (_, selected, _) = split_range(&doc.blocks()[block_index].content, from, to);
        runs_all(&selected, &|style: &TextStyle| flag.get(style))
    });
    let on = !all_on;

    for (block_index, from, to) in ranges {
        let block = &mut doc.blocks_mut()[block_index];
        let (before, mut selected, after) = split_range(&block.content, from, to);
        map_runs(&mut selected, &mut |style| flag.set(style, on));
        block.content = before;
        block.content.extend(selected);
        block.content.extend(after);
        cleanup_block(block);
    }
    Ok(on)
}

/// Remove every inline style from the selected content: carrier spans are
/// unwrapped and run flags reset. Placeholder carriers inside are dropped.
pub fn remove_formatting(doc: &mut StructuredDocument, selection: Selection) -> EditResult {
    for (block_index, from, to) in block_ranges(doc, selection)? {
        let block = &mut doc.blocks_mut()[block_index];
        let (before, selected, after) = split_range(&block.content, from, to);
        let mut content = before;
        content.extend(flatten_plain(selected));
        content.extend(after);
        block.content = content;
        cleanup_block(block);
    }
    Ok(())
}

/// Cleanup pass over one block, run after every content change.
///
/// - spans without text are removed
/// - placeholder spans are kept untouched
/// - spans without attributes are unwrapped
/// - spans whose attributes all equal the inherited values are unwrapped
/// - neighbouring runs/spans with identical styles are merged
pub fn cleanup_block(block: &mut Block) {
    let inherited = block.style.clone();
    cleanup_content(&mut block.content, &inherited);
    merge_adjacent(&mut block.content);
}

/// Run [`cleanup_block`] over every block of the document
pub fn cleanup_document(doc: &mut StructuredDocument) {
    for block in doc.blocks_mut() {
        cleanup_block(block);
    }
}

fn cleanup_content(content: &mut Vec<InlineContent>, inherited: &SpanStyle) {
    let mut out: Vec<InlineContent> = Vec::with_capacity(content.len());
    for item in content.drain(..) {
        let mut span = match item {
            InlineContent::Span(span) => span,
            other => {
                out.push(other);
                continue;
            }
        };
        if span.is_placeholder() {
            out.push(InlineContent::Span(span));
            continue;
        }
        let effective = span.style.merged_over(inherited);
        cleanup_content(&mut span.content, &effective);
        if span.text_len() == 0 {
            continue;
        }
        if span.style.is_empty() || span.style.is_redundant_under(inherited) {
            out.extend(span.content);
        } else {
            out.push(InlineContent::Span(span));
        }
    }
    *content = out;
}

/// Per-block byte ranges covered by a selection
fn block_ranges(
    doc: &StructuredDocument,
    selection: Selection,
) -> EditResult<Vec<(usize, usize, usize)>> {
    let (start, end) = selection.ordered();
    if end.block_index >= doc.block_count() {
        return Err(EditError::InvalidBlockIndex(end.block_index));
    }
    if !doc.contains_position(start) || !doc.contains_position(end) {
        return Err(EditError::InvalidPosition);
    }
    let ranges = (start.block_index..=end.block_index)
        .map(|block_index| {
            let len = doc.blocks()[block_index].text_len();
            let from = if block_index == start.block_index {
                start.offset.min(len)
            } else {
                0
            };
            let to = if block_index == end.block_index {
                end.offset.min(len)
            } else {
                len
            };
            (block_index, from, to)
        })
        .collect();
    Ok(ranges)
}

/// Path of child indices to a placeholder span that ends exactly at `offset`
fn placeholder_path_ending_at(content: &[InlineContent], offset: usize) -> Option<Vec<usize>> {
    let mut pos = 0usize;
    for (idx, item) in content.iter().enumerate() {
        let len = item.text_len();
        if let InlineContent::Span(span) = item
            && pos < offset
            && offset <= pos + len
        {
            if span.is_placeholder() && pos + len == offset {
                return Some(vec![idx]);
            }
            if let Some(mut path) = placeholder_path_ending_at(&span.content, offset - pos) {
                path.insert(0, idx);
                return Some(path);
            }
        }
        pos += len;
    }
    None
}

fn span_at_path_mut<'a>(
    content: &'a mut [InlineContent],
    path: &[usize],
) -> Option<&'a mut StyleSpan> {
    let (first, rest) = path.split_first()?;
    match content.get_mut(*first)? {
        InlineContent::Span(span) => {
            if rest.is_empty() {
                Some(span)
            } else {
                span_at_path_mut(&mut span.content, rest)
            }
        }
        _ => None,
    }
}

/// Replace the placeholder marker ending at `offset` with real text.
/// Returns the caret after the inserted text, or None when there is no
/// placeholder there.
pub fn fill_placeholder(
    block: &mut Block,
    offset: usize,
    text: &str,
    flags: TextStyle,
) -> Option<usize> {
    let path = placeholder_path_ending_at(&block.content, offset)?;
    let span = span_at_path_mut(&mut block.content, &path)?;
    span.content = vec![InlineContent::Text(TextRun::new(text, flags))];
    Some(offset - PLACEHOLDER_LEN + text.len())
}

fn strip_property(content: &mut [InlineContent], key: StyleKey) {
    for item in content.iter_mut() {
        if let InlineContent::Span(span) = item {
            span.style.clear(key);
            strip_property(&mut span.content, key);
        }
    }
}

fn runs_all(content: &[InlineContent], pred: &dyn Fn(&TextStyle) -> bool) -> bool {
    content.iter().all(|item| match item {
        InlineContent::Text(run) => run.is_empty() || pred(&run.style),
        InlineContent::Span(span) => span.is_placeholder() || runs_all(&span.content, pred),
        InlineContent::LineBreak => true,
    })
}

fn map_runs<F>(content: &mut [InlineContent], apply: &mut F)
where
    F: FnMut(&mut TextStyle),
{
    for item in content.iter_mut() {
        match item {
            InlineContent::Text(run) => apply(&mut run.style),
            InlineContent::Span(span) => map_runs(&mut span.content, apply),
            InlineContent::LineBreak => {}
        }
    }
}

fn flatten_plain(content: Vec<InlineContent>) -> Vec<InlineContent> {
    let mut out = Vec::new();
    for item in content {
        match item {
            InlineContent::Text(run) => out.push(InlineContent::Text(TextRun::plain(run.text))),
            InlineContent::Span(span) if span.is_placeholder() => {}
            InlineContent::Span(span) => out.extend(flatten_plain(span.content)),
            InlineContent::LineBreak => out.push(InlineContent::LineBreak),
        }
    }
    out
}
