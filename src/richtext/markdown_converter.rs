// Markdown Converter
// Loads Markdown sources into a StructuredDocument.
// Headings deeper than level 3 are clamped; lists, quotes and code blocks
// flatten into paragraphs since the document only knows two block types.

use super::structured_document::*;
use super::style::TextStyle;
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

/// Convert markdown text to a StructuredDocument
pub fn markdown_to_document(markdown: &str) -> StructuredDocument {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    let parser = Parser::new_ext(markdown, options);

    let mut doc = StructuredDocument::new();
    let mut current: Option<Block> = None;

    // Stack to track current text style (for nested emphasis/strong)
    let mut style_stack: Vec<TextStyle> = vec![TextStyle::default()];

    for event in parser {
        match event {
            Event::Start(tag) => match tag {
                Tag::Paragraph => {
                    flush(&mut doc, &mut current);
                    current = Some(Block::paragraph(0));
                }
                Tag::Heading { level, .. } => {
                    flush(&mut doc, &mut current);
                    current = Some(Block::heading(0, level as u8));
                }
                Tag::Emphasis => push_style(&mut style_stack, |s| s.italic = true),
                Tag::Strong => push_style(&mut style_stack, |s| s.bold = true),
                Tag::Strikethrough => push_style(&mut style_stack, |s| s.strikethrough = true),
                Tag::Item | Tag::CodeBlock(_) | Tag::BlockQuote(_) => flush(&mut doc, &mut current),
                _ => {}
            },

            Event::End(tag_end) => match tag_end {
                TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => {
                    pop_style(&mut style_stack);
                }
                TagEnd::Paragraph
                | TagEnd::Heading(_)
                | TagEnd::Item
                | TagEnd::CodeBlock
                | TagEnd::BlockQuote(_) => flush(&mut doc, &mut current),
                _ => {}
            },

            Event::Text(text) | Event::Code(text) => {
                let style = style_stack.last().copied().unwrap_or_default();
                let block = current.get_or_insert_with(|| Block::paragraph(0));
                push_text(block, &text, style);
            }

            Event::SoftBreak => {
                let style = style_stack.last().copied().unwrap_or_default();
                if let Some(block) = current.as_mut() {
                    push_text(block, " ", style);
                }
            }

            Event::HardBreak => {
                if let Some(block) = current.as_mut() {
                    block.content.push(InlineContent::LineBreak);
                }
            }

            Event::Html(html) | Event::InlineHtml(html) => {
                let tag = html.trim();
                if tag == "<u>" || tag.starts_with("<u ") {
                    push_style(&mut style_stack, |s| s.underline = true);
                } else if tag == "</u>" {
                    pop_style(&mut style_stack);
                }
            }

            _ => {
                // Rules, footnotes, task markers and the like carry no text
            }
        }
    }
    flush(&mut doc, &mut current);

    if doc.is_empty() {
        doc.add_block(Block::paragraph(0));
    }
    tracing::debug!(blocks = doc.block_count(), "loaded markdown");
    doc
}

fn push_style(stack: &mut Vec<TextStyle>, change: impl FnOnce(&mut TextStyle)) {
    let mut style = stack.last().copied().unwrap_or_default();
    change(&mut style);
    stack.push(style);
}

fn pop_style(stack: &mut Vec<TextStyle>) {
    if stack.len() > 1 {
        stack.pop();
    }
}

/// Append text, turning embedded newlines (code blocks) into line breaks
fn push_text(block: &mut Block, text: &str, style: TextStyle) {
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            block.content.push(InlineContent::LineBreak);
        }
        if !line.is_empty() {
            block.content.push(InlineContent::Text(TextRun::new(line, style)));
        }
    }
}

fn flush(doc: &mut StructuredDocument, current: &mut Option<Block>) {
    if let Some(mut block) = current.take() {
        while block.content.last() == Some(&InlineContent::LineBreak) {
            block.content.pop();
        }
        merge_adjacent(&mut block.content);
        if !block.content.is_empty() {
            doc.add_block(block);
        }
    }
}
