// Structured Document Model
// Blocks of styled inline content addressed by (block, offset) positions.
// HTML is only produced by the renderers; nothing here knows about markup.

use super::style::{Alignment, SpanStyle, TextStyle};
use std::cmp::min;
use std::fmt;

/// Unique identifier for document elements
pub type ElementId = usize;

/// Zero-width marker held by an empty typing-style carrier
pub const PLACEHOLDER: char = '\u{200B}';

/// Byte length of [`PLACEHOLDER`]
pub const PLACEHOLDER_LEN: usize = PLACEHOLDER.len_utf8();

/// Where text typed at a span boundary ends up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Affinity {
    /// Join the innermost container that ends at the caret
    #[default]
    Inner,
    /// Stay at the shallowest level, outside spans that end or start at the caret
    Outer,
    /// Join the enclosing spans down to this depth, then behave like `Outer`
    Within(usize),
}

impl Affinity {
    /// How this affinity picks a child at the current level
    fn at_level(self) -> Affinity {
        match self {
            Affinity::Within(0) => Affinity::Outer,
            Affinity::Within(_) => Affinity::Inner,
            other => other,
        }
    }

    /// The affinity used one span further down
    fn descend(self) -> Affinity {
        match self {
            Affinity::Within(0 | 1) => Affinity::Outer,
            Affinity::Within(depth) => Affinity::Within(depth - 1),
            other => other,
        }
    }
}

/// A run of styled text (a contiguous piece of text with uniform flags)
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub style: TextStyle,
}

impl TextRun {
    pub fn new(text: impl Into<String>, style: TextStyle) -> Self {
        TextRun {
            text: text.into(),
            style,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, TextStyle::plain())
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Split this text run at the given byte offset
    /// Returns (left_run, right_run)
    pub fn split_at(&self, offset: usize) -> (TextRun, TextRun) {
        let (left, right) = self.text.split_at(offset);
        (
            TextRun::new(left, self.style),
            TextRun::new(right, self.style),
        )
    }

    /// Insert text at the given offset
    pub fn insert_text(&mut self, offset: usize, text: &str) {
        self.text.insert_str(offset, text);
    }
}

/// A carrier span: an inline wrapper that only exists to hold style attributes
#[derive(Debug, Clone, PartialEq)]
pub struct StyleSpan {
    pub style: SpanStyle,
    pub content: Vec<InlineContent>,
}

impl StyleSpan {
    pub fn new(style: SpanStyle, content: Vec<InlineContent>) -> Self {
        StyleSpan { style, content }
    }

    /// An empty typing-style carrier holding only the zero-width marker
    pub fn placeholder(style: SpanStyle, flags: TextStyle) -> Self {
        StyleSpan {
            style,
            content: vec![InlineContent::Text(TextRun::new(
                PLACEHOLDER.to_string(),
                flags,
            ))],
        }
    }

    /// True when the span's only content is the zero-width marker
    pub fn is_placeholder(&self) -> bool {
        let mut chars = self.content.iter().flat_map(|c| {
            if let InlineContent::Text(run) = c {
                run.text.chars().collect::<Vec<_>>()
            } else {
                vec!['\n']
            }
        });
        chars.next() == Some(PLACEHOLDER) && chars.next().is_none()
    }

    pub fn text_len(&self) -> usize {
        content_len(&self.content)
    }
}

/// Inline content (can appear within a block)
#[derive(Debug, Clone, PartialEq)]
pub enum InlineContent {
    Text(TextRun),
    Span(StyleSpan),
    LineBreak,
}

impl InlineContent {
    /// Get the flattened text length of this inline content
    pub fn text_len(&self) -> usize {
        match self {
            InlineContent::Text(run) => run.len(),
            InlineContent::Span(span) => span.text_len(),
            InlineContent::LineBreak => 1,
        }
    }

    /// Flatten to plain text
    pub fn to_plain_text(&self) -> String {
        match self {
            InlineContent::Text(run) => run.text.clone(),
            InlineContent::Span(span) => span.content.iter().map(|c| c.to_plain_text()).collect(),
            InlineContent::LineBreak => "\n".to_string(),
        }
    }
}

/// Total flattened length of a content list
pub fn content_len(content: &[InlineContent]) -> usize {
    content.iter().map(InlineContent::text_len).sum()
}

/// Number of carrier spans in a content list, nested ones included
pub fn count_spans(content: &[InlineContent]) -> usize {
    content
        .iter()
        .map(|c| match c {
            InlineContent::Span(span) => 1 + count_spans(&span.content),
            _ => 0,
        })
        .sum()
}

/// Block-level content types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockType {
    #[default]
    Paragraph,
    Heading {
        level: u8,
    }, // 1-3
}

impl BlockType {
    pub fn heading(level: u8) -> Self {
        BlockType::Heading {
            level: level.clamp(1, 3),
        }
    }

    /// Parse a block-format control value: `P`, `H1`..`H3`, optionally in angle brackets
    pub fn parse(value: &str) -> Option<Self> {
        let tag = value
            .trim()
            .trim_start_matches('<')
            .trim_end_matches('>')
            .to_ascii_lowercase();
        match tag.as_str() {
            "p" | "div" => Some(BlockType::Paragraph),
            "h1" => Some(BlockType::heading(1)),
            "h2" => Some(BlockType::heading(2)),
            "h3" => Some(BlockType::heading(3)),
            _ => None,
        }
    }

    pub fn tag_name(self) -> &'static str {
        match self {
            BlockType::Paragraph => "p",
            BlockType::Heading { level: 1 } => "h1",
            BlockType::Heading { level: 2 } => "h2",
            BlockType::Heading { .. } => "h3",
        }
    }

    pub fn heading_level(self) -> Option<u8> {
        match self {
            BlockType::Heading { level } => Some(level),
            BlockType::Paragraph => None,
        }
    }
}

/// A block of content
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub id: ElementId,
    pub block_type: BlockType,
    pub alignment: Alignment,
    /// Styles declared on the block element itself
    pub style: SpanStyle,
    pub content: Vec<InlineContent>,
}

impl Block {
    pub fn new(id: ElementId, block_type: BlockType) -> Self {
        Block {
            id,
            block_type,
            alignment: Alignment::default(),
            style: SpanStyle::default(),
            content: Vec::new(),
        }
    }

    pub fn paragraph(id: ElementId) -> Self {
        Self::new(id, BlockType::Paragraph)
    }

    pub fn heading(id: ElementId, level: u8) -> Self {
        Self::new(id, BlockType::heading(level))
    }

    pub fn with_text(mut self, text: impl Into<String>, style: TextStyle) -> Self {
        self.content
            .push(InlineContent::Text(TextRun::new(text, style)));
        self
    }

    pub fn with_plain_text(mut self, text: impl Into<String>) -> Self {
        self.content.push(InlineContent::Text(TextRun::plain(text)));
        self
    }

    pub fn with_span(mut self, span: StyleSpan) -> Self {
        self.content.push(InlineContent::Span(span));
        self
    }

    /// Get the total text length of this block
    pub fn text_len(&self) -> usize {
        content_len(&self.content)
    }

    /// Get plain text content
    pub fn to_plain_text(&self) -> String {
        self.content.iter().map(|c| c.to_plain_text()).collect()
    }

    /// Plain text without typing-style markers
    pub fn visible_text(&self) -> String {
        self.to_plain_text().replace(PLACEHOLDER, "")
    }

    /// Check if this block is empty (nothing visible)
    pub fn is_empty(&self) -> bool {
        self.visible_text().trim().is_empty()
    }

    /// Delete text in [start..end) within this block's flattened content
    pub fn delete_text_range(&mut self, start: usize, end: usize) {
        let len = self.text_len();
        let start = min(start, len);
        let end = min(end, len);
        if start >= end {
            return;
        }
        let (left, rest) = split_inline(&self.content, start);
        let (_deleted, right) = split_inline(&rest, end - start);
        let mut content = left;
        content.extend(right);
        merge_adjacent(&mut content);
        self.content = content;
    }

    /// Split this block's content at a flattened text offset, returning the right part.
    /// The left part remains in self.
    pub fn split_content_at(&mut self, offset: usize) -> Vec<InlineContent> {
        let offset = min(offset, self.text_len());
        let (left, right) = split_inline(&self.content, offset);
        self.content = left;
        right
    }

    /// Insert text at a flattened text offset with the given flags
    pub fn insert_text(&mut self, offset: usize, text: &str, style: TextStyle, affinity: Affinity) {
        if text.is_empty() {
            return;
        }
        let offset = min(offset, self.text_len());
        insert_text_into(&mut self.content, offset, text, style, affinity);
    }

    /// Insert plain text at a flattened text offset
    pub fn insert_plain_text(&mut self, offset: usize, text: &str) {
        self.insert_text(offset, text, TextStyle::plain(), Affinity::Inner);
    }

    /// Insert an inline item at a flattened text offset
    pub fn insert_inline(&mut self, offset: usize, item: InlineContent, affinity: Affinity) {
        let offset = min(offset, self.text_len());
        insert_inline_into(&mut self.content, offset, item, affinity);
    }

    /// Spans enclosing the caret, outermost first, and the flags of the run it touches
    pub fn styles_at(&self, offset: usize, affinity: Affinity) -> (Vec<SpanStyle>, TextStyle) {
        let mut chain = Vec::new();
        let mut flags = TextStyle::plain();
        let mut content = &self.content;
        let mut offset = min(offset, self.text_len());
        let mut affinity = affinity;
        while let Some((idx, local)) = child_at(content, offset, affinity) {
            match &content[idx] {
                InlineContent::Span(span) => {
                    chain.push(span.style.clone());
                    content = &span.content;
                    offset = local;
                    affinity = affinity.descend();
                }
                InlineContent::Text(run) => {
                    flags = run.style;
                    break;
                }
                InlineContent::LineBreak => break,
            }
        }
        (chain, flags)
    }

    /// Flatten into segments with fully resolved span styles.
    /// Segment styles include the block's own declared style.
    pub fn styled_segments(&self) -> Vec<StyledSegment> {
        fn walk(content: &[InlineContent], inherited: &SpanStyle, out: &mut Vec<StyledSegment>) {
            for item in content {
                match item {
                    InlineContent::Text(run) => out.push(StyledSegment {
                        text: run.text.clone(),
                        span: inherited.clone(),
                        flags: run.style,
                    }),
                    InlineContent::Span(span) => {
                        walk(&span.content, &span.style.merged_over(inherited), out)
                    }
                    InlineContent::LineBreak => out.push(StyledSegment {
                        text: "\n".to_string(),
                        span: inherited.clone(),
                        flags: TextStyle::plain(),
                    }),
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.content, &self.style, &mut out);
        out
    }

    /// Byte offsets of every placeholder marker in this block
    pub fn placeholder_offsets(&self) -> Vec<usize> {
        fn walk(content: &[InlineContent], base: usize, out: &mut Vec<usize>) {
            let mut pos = base;
            for item in content {
                if let InlineContent::Span(span) = item {
                    if span.is_placeholder() {
                        out.push(pos);
                    } else {
                        walk(&span.content, pos, out);
                    }
                }
                pos += item.text_len();
            }
        }
        let mut out = Vec::new();
        walk(&self.content, 0, &mut out);
        out
    }

    /// Remove the placeholder carriers starting at the given offsets
    pub fn remove_placeholders_at(&mut self, offsets: &[usize]) {
        fn walk(content: &mut Vec<InlineContent>, base: usize, offsets: &[usize]) {
            let mut pos = base;
            content.retain_mut(|item| {
                let start = pos;
                pos += item.text_len();
                match item {
                    InlineContent::Span(span) if span.is_placeholder() => {
                        !offsets.contains(&start)
                    }
                    InlineContent::Span(span) => {
                        walk(&mut span.content, start, offsets);
                        true
                    }
                    _ => true,
                }
            });
        }
        walk(&mut self.content, 0, offsets);
        merge_adjacent(&mut self.content);
    }
}

/// A flattened piece of a block with its resolved styles
#[derive(Debug, Clone, PartialEq)]
pub struct StyledSegment {
    pub text: String,
    pub span: SpanStyle,
    pub flags: TextStyle,
}

/// Locate the child that contains `offset` under the given affinity.
/// Returns (child index, offset local to the child), or None when the offset
/// sits at a boundary of this level.
fn child_at(
    content: &[InlineContent],
    offset: usize,
    affinity: Affinity,
) -> Option<(usize, usize)> {
    let mut pos = 0usize;
    for (idx, item) in content.iter().enumerate() {
        let len = item.text_len();
        let contains = match affinity.at_level() {
            Affinity::Outer => pos < offset && offset < pos + len,
            _ => (pos < offset && offset <= pos + len) || (offset == 0 && pos == 0 && len > 0),
        };
        if contains {
            if let InlineContent::LineBreak = item {
                return None;
            }
            return Some((idx, offset - pos));
        }
        pos += len;
    }
    None
}

/// Index of the boundary at `offset` on this level, splitting a text run if needed
fn boundary_index(content: &mut Vec<InlineContent>, offset: usize) -> usize {
    let mut pos = 0usize;
    for idx in 0..content.len() {
        if pos == offset {
            return idx;
        }
        let len = content[idx].text_len();
        if offset < pos + len {
            if let InlineContent::Text(run) = &content[idx] {
                let (left, right) = run.split_at(offset - pos);
                content[idx] = InlineContent::Text(left);
                content.insert(idx + 1, InlineContent::Text(right));
                return idx + 1;
            }
            return idx + 1;
        }
        pos += len;
    }
    content.len()
}

fn insert_text_into(
    content: &mut Vec<InlineContent>,
    offset: usize,
    text: &str,
    style: TextStyle,
    affinity: Affinity,
) {
    if let Some((idx, local)) = child_at(content, offset, affinity) {
        match &mut content[idx] {
            InlineContent::Span(span) => {
                insert_text_into(&mut span.content, local, text, style, affinity.descend());
                return;
            }
            InlineContent::Text(run) if run.style == style => {
                run.insert_text(local, text);
                return;
            }
            _ => {}
        }
    }

    let at = boundary_index(content, offset);
    if at > 0
        && let InlineContent::Text(prev) = &mut content[at - 1]
        && prev.style == style
    {
        prev.text.push_str(text);
        return;
    }
    if at < content.len()
        && let InlineContent::Text(next) = &mut content[at]
        && next.style == style
    {
        next.insert_text(0, text);
        return;
    }
    content.insert(at, InlineContent::Text(TextRun::new(text, style)));
}

fn insert_inline_into(
    content: &mut Vec<InlineContent>,
    offset: usize,
    item: InlineContent,
    affinity: Affinity,
) {
    if let Some((idx, local)) = child_at(content, offset, affinity)
        && let InlineContent::Span(span) = &mut content[idx]
    {
        insert_inline_into(&mut span.content, local, item, affinity.descend());
        return;
    }
    let at = boundary_index(content, offset);
    content.insert(at, item);
}

/// Split a content list at a flattened offset. Spans straddling the offset are
/// split into two shells carrying the same style.
pub fn split_inline(
    content: &[InlineContent],
    offset: usize,
) -> (Vec<InlineContent>, Vec<InlineContent>) {
    let mut left: Vec<InlineContent> = Vec::new();
    let mut right: Vec<InlineContent> = Vec::new();
    let mut pos = 0usize;

    for item in content.iter() {
        let len = item.text_len();
        if pos + len <= offset {
            left.push(item.clone());
        } else if pos >= offset {
            right.push(item.clone());
        } else {
            // offset falls within this item
            let local = offset - pos;
            match item {
                InlineContent::Text(run) => {
                    let (l, r) = run.split_at(local);
                    left.push(InlineContent::Text(l));
                    right.push(InlineContent::Text(r));
                }
                InlineContent::Span(span) => {
                    let (l_inner, r_inner) = split_inline(&span.content, local);
                    left.push(InlineContent::Span(StyleSpan::new(
                        span.style.clone(),
                        l_inner,
                    )));
                    right.push(InlineContent::Span(StyleSpan::new(
                        span.style.clone(),
                        r_inner,
                    )));
                }
                InlineContent::LineBreak => right.push(item.clone()),
            }
        }
        pos += len;
    }

    (left, right)
}

/// Split a content list into (before, selected, after) around [start..end)
pub fn split_range(
    content: &[InlineContent],
    start: usize,
    end: usize,
) -> (Vec<InlineContent>, Vec<InlineContent>, Vec<InlineContent>) {
    let end = end.max(start);
    let (head, after) = split_inline(content, end);
    let (before, selected) = split_inline(&head, start);
    (before, selected, after)
}

/// Merge neighbouring runs with equal flags and neighbouring spans with equal
/// styles, recursively. Empty runs are dropped. Placeholder carriers are never
/// merged into their neighbours.
pub fn merge_adjacent(content: &mut Vec<InlineContent>) {
    let mut merged: Vec<InlineContent> = Vec::with_capacity(content.len());
    for mut item in content.drain(..) {
        if let InlineContent::Span(span) = &mut item {
            merge_adjacent(&mut span.content);
        }
        if let InlineContent::Text(run) = &item
            && run.is_empty()
        {
            continue;
        }
        match (merged.last_mut(), &mut item) {
            (Some(InlineContent::Text(prev)), InlineContent::Text(run))
                if prev.style == run.style =>
            {
                prev.text.push_str(&run.text);
            }
            (Some(InlineContent::Span(prev)), InlineContent::Span(span))
                if prev.style == span.style && !prev.is_placeholder() && !span.is_placeholder() =>
            {
                prev.content.append(&mut span.content);
                merge_adjacent(&mut prev.content);
            }
            _ => merged.push(item),
        }
    }
    *content = merged;
}

/// Position within a document
/// This represents a logical cursor position in the structured content
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentPosition {
    pub block_index: usize,
    pub offset: usize, // Byte offset within the block's flattened text
}

impl DocumentPosition {
    pub fn new(block_index: usize, offset: usize) -> Self {
        DocumentPosition {
            block_index,
            offset,
        }
    }

    pub fn start() -> Self {
        DocumentPosition::new(0, 0)
    }
}

/// The structured document
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredDocument {
    blocks: Vec<Block>,
    next_id: ElementId,
}

impl StructuredDocument {
    pub fn new() -> Self {
        StructuredDocument {
            blocks: Vec::new(),
            next_id: 1,
        }
    }

    /// Get a unique element ID
    fn next_id(&mut self) -> ElementId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Get blocks
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Get mutable blocks
    pub fn blocks_mut(&mut self) -> &mut Vec<Block> {
        &mut self.blocks
    }

    /// Add a block
    pub fn add_block(&mut self, mut block: Block) {
        if block.id == 0 {
            block.id = self.next_id();
        }
        self.blocks.push(block);
    }

    /// Insert a block at a specific position
    pub fn insert_block(&mut self, index: usize, mut block: Block) {
        if block.id == 0 {
            block.id = self.next_id();
        }
        self.blocks.insert(index, block);
    }

    /// Replace the block at `index`, keeping its identity unless the new block has one
    pub fn replace_block(&mut self, index: usize, mut block: Block) -> Option<Block> {
        let slot = self.blocks.get_mut(index)?;
        if block.id == 0 {
            block.id = slot.id;
        }
        Some(std::mem::replace(slot, block))
    }

    /// Remove a block
    pub fn remove_block(&mut self, index: usize) -> Option<Block> {
        if index < self.blocks.len() {
            Some(self.blocks.remove(index))
        } else {
            None
        }
    }

    /// Get block count
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Find block index by ID
    pub fn find_block_index(&self, id: ElementId) -> Option<usize> {
        self.blocks.iter().position(|b| b.id == id)
    }

    /// Validate and clamp a position to document bounds
    pub fn clamp_position(&self, pos: DocumentPosition) -> DocumentPosition {
        if self.blocks.is_empty() {
            return DocumentPosition::start();
        }

        let block_index = pos.block_index.min(self.blocks.len() - 1);
        let text = self.blocks[block_index].to_plain_text();
        let mut offset = pos.offset.min(text.len());
        while !text.is_char_boundary(offset) {
            offset -= 1;
        }

        DocumentPosition::new(block_index, offset)
    }

    /// True when the position addresses an existing block and a char boundary in it
    pub fn contains_position(&self, pos: DocumentPosition) -> bool {
        self.blocks.get(pos.block_index).is_some_and(|block| {
            let text = block.to_plain_text();
            pos.offset <= text.len() && text.is_char_boundary(pos.offset)
        })
    }

    /// Position after the last character of the document
    pub fn end_position(&self) -> DocumentPosition {
        match self.blocks.last() {
            Some(block) => DocumentPosition::new(self.blocks.len() - 1, block.text_len()),
            None => DocumentPosition::start(),
        }
    }

    /// Convert to plain text
    pub fn to_plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(|b| b.to_plain_text())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Plain text without typing-style markers
    pub fn visible_text(&self) -> String {
        self.to_plain_text().replace(PLACEHOLDER, "")
    }

    /// Total number of carrier spans across all blocks
    pub fn span_count(&self) -> usize {
        self.blocks.iter().map(|b| count_spans(&b.content)).sum()
    }

    /// Check if document is empty
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Create a simple document with one paragraph
    pub fn with_paragraph(text: impl Into<String>) -> Self {
        let mut doc = Self::new();
        let id = doc.next_id();
        let block = Block::paragraph(id).with_plain_text(text);
        doc.add_block(block);
        doc
    }

    /// Delete content in [start..end) across blocks.
    /// If the range spans multiple blocks, merges the tail of the end block into the start block
    /// and removes all fully-covered blocks in between.
    pub fn delete_range(&mut self, start: DocumentPosition, end: DocumentPosition) {
        if self.blocks.is_empty() {
            return;
        }
        let mut a = self.clamp_position(start);
        let mut b = self.clamp_position(end);
        if b < a {
            std::mem::swap(&mut a, &mut b);
        }

        if a.block_index == b.block_index {
            let block = &mut self.blocks[a.block_index];
            block.delete_text_range(a.offset, b.offset);
            return;
        }

        // Delete tail of start block
        {
            let block = &mut self.blocks[a.block_index];
            let len = block.text_len();
            block.delete_text_range(a.offset, len);
        }

        // Keep what follows the end position in the end block
        let tail_content: Vec<InlineContent> = {
            let block = &mut self.blocks[b.block_index];
            block.split_content_at(b.offset)
        };

        // Remove the blocks after the start block up to and including the end block
        self.blocks.drain(a.block_index + 1..=b.block_index);

        let block = &mut self.blocks[a.block_index];
        block.content.extend(tail_content);
        merge_adjacent(&mut block.content);
    }
}

impl Default for StructuredDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for StructuredDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "StructuredDocument ({} blocks):", self.blocks.len())?;
        for (i, block) in self.blocks.iter().enumerate() {
            write!(f, "  [{}] ", i)?;
            match &block.block_type {
                BlockType::Paragraph => write!(f, "Paragraph")?,
                BlockType::Heading { level } => write!(f, "Heading(h{})", level)?,
            }
            writeln!(f, ": {:?}", block.to_plain_text())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::richtext::style::{FontSize, StyleProperty};

    fn size_span(px: u32, text: &str) -> StyleSpan {
        StyleSpan::new(
            StyleProperty::FontSize(FontSize::new(px).unwrap()).to_span_style(),
            vec![InlineContent::Text(TextRun::plain(text))],
        )
    }

    #[test]
    fn test_text_run() {
        let run = TextRun::plain("hello world");
        assert_eq!(run.len(), 11);

        let (left, right) = run.split_at(5);
        assert_eq!(left.text, "hello");
        assert_eq!(right.text, " world");
    }

    #[test]
    fn test_block_text_len() {
        let block = Block::paragraph(1)
            .with_plain_text("hello")
            .with_text(" world", TextStyle::bold());

        assert_eq!(block.text_len(), 11);
        assert_eq!(block.to_plain_text(), "hello world");
    }

    #[test]
    fn test_block_type_parse() {
        assert_eq!(BlockType::parse("P"), Some(BlockType::Paragraph));
        assert_eq!(BlockType::parse("<h2>"), Some(BlockType::heading(2)));
        assert_eq!(BlockType::parse("H3"), Some(BlockType::heading(3)));
        assert_eq!(BlockType::parse("h4"), None);
        assert_eq!(BlockType::heading(9).tag_name(), "h3");
    }

    #[test]
    fn test_position_clamping() {
        let mut doc = StructuredDocument::new();
        doc.add_block(Block::paragraph(0).with_plain_text("hello"));

        let pos = DocumentPosition::new(0, 100);
        let clamped = doc.clamp_position(pos);
        assert_eq!(clamped.offset, 5); // Length of "hello"
    }

    #[test]
    fn test_position_clamping_respects_char_boundaries() {
        let doc = StructuredDocument::with_paragraph("hé");
        // Offset 2 falls inside the two-byte "é"
        assert_eq!(doc.clamp_position(DocumentPosition::new(0, 2)).offset, 1);
        assert!(!doc.contains_position(DocumentPosition::new(0, 2)));
        assert!(doc.contains_position(DocumentPosition::new(0, 3)));
        assert!(!doc.contains_position(DocumentPosition::new(1, 0)));
    }

    #[test]
    fn test_split_inline_splits_span_shells() {
        let block = Block::paragraph(1)
            .with_plain_text("ab")
            .with_span(size_span(24, "cdef"));
        let (left, right) = split_inline(&block.content, 4);
        assert_eq!(content_len(&left), 4);
        assert_eq!(content_len(&right), 2);
        assert_eq!(count_spans(&left), 1);
        assert_eq!(count_spans(&right), 1);
    }

    #[test]
    fn test_insert_text_affinity_at_span_end() {
        let mut inner = Block::paragraph(1)
            .with_plain_text("ab")
            .with_span(size_span(24, "cd"));
        let mut outer = inner.clone();

        inner.insert_text(4, "X", TextStyle::plain(), Affinity::Inner);
        outer.insert_text(4, "X", TextStyle::plain(), Affinity::Outer);

        assert_eq!(inner.to_plain_text(), "abcdX");
        assert_eq!(inner.content.len(), 2);
        let InlineContent::Span(span) = &inner.content[1] else {
            panic!("expected span");
        };
        assert_eq!(span.text_len(), 3);

        assert_eq!(outer.to_plain_text(), "abcdX");
        assert_eq!(outer.content.len(), 3);
    }

    #[test]
    fn test_insert_text_with_new_flags_splits_run() {
        let mut block = Block::paragraph(1).with_plain_text("abcd");
        block.insert_text(2, "X", TextStyle::bold(), Affinity::Inner);
        assert_eq!(block.to_plain_text(), "abXcd");
        assert_eq!(block.content.len(), 3);
        assert_eq!(block.content[1], InlineContent::Text(TextRun::new("X", TextStyle::bold())));
    }

    #[test]
    fn test_styles_at_reports_chain() {
        let block = Block::paragraph(1)
            .with_plain_text("ab")
            .with_span(size_span(24, "cd"));
        let (chain, _) = block.styles_at(3, Affinity::Inner);
        assert_eq!(chain.len(), 1);
        let (chain, _) = block.styles_at(2, Affinity::Inner);
        assert!(chain.is_empty());
        let (chain, _) = block.styles_at(4, Affinity::Outer);
        assert!(chain.is_empty());
    }

    #[test]
    fn test_within_joins_enclosing_span_only() {
        let inner = size_span(30, "cd");
        let outer = StyleSpan::new(
            StyleProperty::FontSize(FontSize::new(12).unwrap()).to_span_style(),
            vec![
                InlineContent::Text(TextRun::plain("ab")),
                InlineContent::Span(inner),
            ],
        );
        let mut block = Block::paragraph(1).with_span(outer);

        let (chain, _) = block.styles_at(4, Affinity::Within(1));
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].font_size, FontSize::new(12));

        block.insert_text(4, "X", TextStyle::plain(), Affinity::Within(1));
        assert_eq!(block.content.len(), 1);
        let InlineContent::Span(outer) = &block.content[0] else {
            panic!("expected span");
        };
        assert_eq!(outer.content.len(), 3);
        assert_eq!(outer.content[2], InlineContent::Text(TextRun::plain("X")));
    }

    #[test]
    fn test_merge_adjacent_keeps_placeholders() {
        let style = StyleProperty::FontSize(FontSize::new(24).unwrap()).to_span_style();
        let mut content = vec![
            InlineContent::Span(StyleSpan::new(
                style.clone(),
                vec![InlineContent::Text(TextRun::plain("a"))],
            )),
            InlineContent::Span(StyleSpan::new(
                style.clone(),
                vec![InlineContent::Text(TextRun::plain("b"))],
            )),
            InlineContent::Span(StyleSpan::placeholder(style, TextStyle::plain())),
            InlineContent::Text(TextRun::plain("")),
        ];
        merge_adjacent(&mut content);
        assert_eq!(content.len(), 2);
        assert_eq!(content[0].to_plain_text(), "ab");
    }

    #[test]
    fn test_placeholder_offsets_and_removal() {
        let style = StyleProperty::FontSize(FontSize::new(24).unwrap()).to_span_style();
        let mut block = Block::paragraph(1)
            .with_plain_text("ab")
            .with_span(StyleSpan::placeholder(style, TextStyle::plain()))
            .with_plain_text("cd");
        assert_eq!(block.placeholder_offsets(), vec![2]);
        block.remove_placeholders_at(&[2]);
        assert_eq!(block.to_plain_text(), "abcd");
        assert_eq!(block.content.len(), 1);
    }

    #[test]
    fn test_delete_range_within_block() {
        let mut doc = StructuredDocument::new();
        doc.add_block(Block::paragraph(0).with_plain_text("Hello world"));
        let start = DocumentPosition::new(0, 5);
        let end = DocumentPosition::new(0, 11);
        doc.delete_range(start, end);
        assert_eq!(doc.blocks()[0].to_plain_text(), "Hello");
    }

    #[test]
    fn test_delete_range_across_blocks_merges() {
        let mut doc = StructuredDocument::new();
        doc.add_block(Block::paragraph(0).with_plain_text("First para"));
        doc.add_block(Block::paragraph(0).with_plain_text("Second"));
        doc.add_block(Block::paragraph(0).with_plain_text("Third para"));

        // Delete from after "Fir" in block 0 to after "Th" in block 2
        let start = DocumentPosition::new(0, 3); // "Fir|st para"
        let end = DocumentPosition::new(2, 2); // "Th|ird para"
        doc.delete_range(start, end);

        assert_eq!(doc.block_count(), 1);
        assert_eq!(doc.blocks()[0].to_plain_text(), "Firird para");
        assert_eq!(doc.blocks()[0].content.len(), 1);
    }

    #[test]
    fn test_delete_inside_span_keeps_single_span() {
        let mut block = Block::paragraph(1)
            .with_plain_text("ab")
            .with_span(size_span(24, "cdef"));
        block.delete_text_range(3, 5);
        assert_eq!(block.to_plain_text(), "abcf");
        assert_eq!(count_spans(&block.content), 1);
    }
}
