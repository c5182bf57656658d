// HTML markup for a StructuredDocument
// Blocks become <p>/<h1>-<h3>, carrier spans become <span style>, flags become
// <b>/<i>/<u>/<s>. Placeholder carriers are invisible and are not emitted.

use crate::richtext::structured_document::*;
use crate::richtext::style::{Alignment, SpanStyle, TextStyle};
use regex::Regex;
use std::sync::LazyLock;

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_]+").expect("valid slug pattern"));

/// A heading that shows up in the export sidebar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineEntry {
    pub level: u8,
    pub text: String,
    pub slug: String,
}

/// Render the document body markup
pub fn document_to_html(doc: &StructuredDocument) -> String {
    render(doc, false)
}

/// Render the document body markup with slug ids on h1/h2 headings
pub fn document_to_html_with_ids(doc: &StructuredDocument) -> String {
    render(doc, true)
}

fn render(doc: &StructuredDocument, heading_ids: bool) -> String {
    let mut out = String::new();
    for block in doc.blocks() {
        write_block(&mut out, block, heading_ids);
        out.push('\n');
    }
    out
}

fn write_block(out: &mut String, block: &Block, heading_ids: bool) {
    let tag = block.block_type.tag_name();
    out.push_str(&format!("<{tag}"));
    if heading_ids && matches!(block.block_type.heading_level(), Some(1 | 2)) {
        let slug = slugify(&heading_text(block));
        if !slug.is_empty() {
            out.push_str(&format!(" id=\"{}\"", escape_html(&slug)));
        }
    }
    let css = block_css(block.alignment, &block.style);
    if !css.is_empty() {
        out.push_str(&format!(" style=\"{}\"", escape_html(&css)));
    }
    out.push('>');
    write_inline(out, &block.content);
    out.push_str(&format!("</{tag}>"));
}

fn block_css(alignment: Alignment, style: &SpanStyle) -> String {
    let mut parts = Vec::new();
    if alignment != Alignment::Left {
        parts.push(format!("text-align: {}", alignment.css_value()));
    }
    if !style.is_empty() {
        parts.push(style.to_css());
    }
    parts.join("; ")
}

fn write_inline(out: &mut String, content: &[InlineContent]) {
    for item in content {
        match item {
            InlineContent::Text(run) => write_run(out, &run.text, run.style),
            InlineContent::Span(span) if span.is_placeholder() => {}
            InlineContent::Span(span) => {
                let css = span.style.to_css();
                out.push_str(&format!("<span style=\"{}\">", escape_html(&css)));
                write_inline(out, &span.content);
                out.push_str("</span>");
            }
            InlineContent::LineBreak => out.push_str("<br>"),
        }
    }
}

fn write_run(out: &mut String, text: &str, style: TextStyle) {
    let visible = text.replace(PLACEHOLDER, "");
    if visible.is_empty() {
        return;
    }
    let tags: Vec<&str> = [
        (style.bold, "b"),
        (style.italic, "i"),
        (style.underline, "u"),
        (style.strikethrough, "s"),
    ]
    .into_iter()
    .filter_map(|(on, tag)| on.then_some(tag))
    .collect();

    for tag in &tags {
        out.push_str(&format!("<{tag}>"));
    }
    out.push_str(&escape_html(&visible));
    for tag in tags.iter().rev() {
        out.push_str(&format!("</{tag}>"));
    }
}

/// Escape text for use in element content and quoted attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Anchor id for a heading: lowercase, non-word runs collapsed to a hyphen,
/// hyphens trimmed from both ends
pub fn slugify(text: &str) -> String {
    let lower = text.trim().to_lowercase();
    NON_WORD
        .replace_all(&lower, "-")
        .trim_matches('-')
        .to_string()
}

/// Text of a heading as a reader sees it (line breaks contribute nothing)
fn heading_text(block: &Block) -> String {
    block.visible_text().replace('\n', "")
}

/// Every h1 and h2 in document order. Duplicate slugs are kept as they are.
pub fn heading_outline(doc: &StructuredDocument) -> Vec<OutlineEntry> {
    doc.blocks()
        .iter()
        .filter_map(|block| {
            let level = block.block_type.heading_level().filter(|l| *l <= 2)?;
            let text = heading_text(block);
            Some(OutlineEntry {
                level,
                slug: slugify(&text),
                text: text.trim().to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::richtext::style::{FontSize, StyleProperty};

    #[test]
    fn test_escape() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Getting Started"), "getting-started");
        assert_eq!(slugify("  --Hello, World!--  "), "hello-world");
        assert_eq!(slugify("snake_case stays"), "snake_case-stays");
        assert_eq!(slugify("Über uns"), "ber-uns");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_blocks_and_flags() {
        let mut doc = StructuredDocument::new();
        let mut heading = Block::heading(0, 2).with_plain_text("A & B");
        heading.alignment = Alignment::Center;
        doc.add_block(heading);
        doc.add_block(
            Block::paragraph(0)
                .with_plain_text("x<y ")
                .with_text("bold", TextStyle::bold()),
        );
        assert_eq!(
            document_to_html(&doc),
            "<h2 style=\"text-align: center\">A &amp; B</h2>\n<p>x&lt;y <b>bold</b></p>\n"
        );
    }

    #[test]
    fn test_spans_breaks_and_placeholders() {
        let size = StyleProperty::FontSize(FontSize::new(24).unwrap()).to_span_style();
        let mut block = Block::paragraph(0).with_plain_text("Hi");
        block.content.push(InlineContent::LineBreak);
        block.content.push(InlineContent::Span(StyleSpan::new(
            size.clone(),
            vec![InlineContent::Text(TextRun::plain("big"))],
        )));
        block
            .content
            .push(InlineContent::Span(StyleSpan::placeholder(size, TextStyle::plain())));
        let mut doc = StructuredDocument::new();
        doc.add_block(block);
        assert_eq!(
            document_to_html(&doc),
            "<p>Hi<br><span style=\"font-size: 24px\">big</span></p>\n"
        );
    }

    #[test]
    fn test_heading_ids_and_outline() {
        let mut doc = StructuredDocument::new();
        doc.add_block(Block::heading(0, 1).with_plain_text("Intro"));
        doc.add_block(Block::heading(0, 2).with_plain_text("Intro"));
        doc.add_block(Block::heading(0, 3).with_plain_text("Details"));
        doc.add_block(Block::paragraph(0).with_plain_text("Body"));

        let html = document_to_html_with_ids(&doc);
        assert!(html.starts_with("<h1 id=\"intro\">Intro</h1>\n<h2 id=\"intro\">Intro</h2>\n<h3>"));

        let outline = heading_outline(&doc);
        assert_eq!(outline.len(), 2);
        assert_eq!(outline[0].level, 1);
        assert_eq!(outline[1].level, 2);
        assert!(outline.iter().all(|entry| entry.slug == "intro"));
    }
}
