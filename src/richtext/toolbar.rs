// Toolbar/Selection State Sync
// Reflects the formatting at the caret back into the controls.

use super::structured_document::{Affinity, BlockType, DocumentPosition, StructuredDocument};
use super::style::{Alignment, FontSize, StyleProfile, TextStyle, primary_family};

/// The control values implied by the caret position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolbarState {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
    pub alignment: Alignment,
    pub block_format: BlockType,
    /// Only reported when it is one of the configured font options
    pub font_family: Option<String>,
    pub font_size: FontSize,
}

impl Default for ToolbarState {
    fn default() -> Self {
        ToolbarState {
            bold: false,
            italic: false,
            underline: false,
            strikethrough: false,
            alignment: Alignment::Left,
            block_format: BlockType::Paragraph,
            font_family: None,
            font_size: FontSize::DEFAULT,
        }
    }
}

/// Marks control updates made by the editor itself so the controls' own
/// change handlers do not feed them back as user edits.
///
/// Armed by a toolbar sync, released by the host once the resulting control
/// events have been delivered.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UpdateGuard {
    armed: bool,
}

impl UpdateGuard {
    pub fn arm(&mut self) {
        self.armed = true;
    }

    pub fn release(&mut self) {
        self.armed = false;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }
}

/// Resolve the toolbar state at `caret`.
///
/// Font size and family walk outwards from the innermost span at the caret to
/// the block's declared style and finally to the style profile.
pub fn resolve_toolbar_state(
    doc: &StructuredDocument,
    caret: DocumentPosition,
    affinity: Affinity,
    pending_flags: Option<TextStyle>,
    profile: &StyleProfile,
    font_options: &[String],
) -> Option<ToolbarState> {
    let block = doc.blocks().get(caret.block_index)?;
    let (chain, run_flags) = block.styles_at(caret.offset, affinity);
    let flags = pending_flags.unwrap_or(run_flags);

    let font_size = chain
        .iter()
        .rev()
        .find_map(|style| style.font_size)
        .or(block.style.font_size)
        .unwrap_or_else(|| match block.block_type {
            BlockType::Heading { level } => profile.heading_size(level),
            BlockType::Paragraph => profile.font_size,
        });

    let family_stack = chain
        .iter()
        .rev()
        .find_map(|style| style.font_family.clone())
        .or_else(|| block.style.font_family.clone())
        .unwrap_or_else(|| profile.font_family.clone());
    let family = primary_family(&family_stack);
    let font_family = font_options
        .iter()
        .find(|option| option.eq_ignore_ascii_case(&family))
        .cloned();

    Some(ToolbarState {
        bold: flags.bold,
        italic: flags.italic,
        underline: flags.underline,
        strikethrough: flags.strikethrough,
        alignment: block.alignment,
        block_format: block.block_type,
        font_family,
        font_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::richtext::structured_document::{Block, InlineContent, StyleSpan, TextRun};
    use crate::richtext::style::StyleProperty;

    fn fonts() -> Vec<String> {
        vec!["Inter".to_string(), "Georgia".to_string()]
    }

    fn doc() -> StructuredDocument {
        let mut doc = StructuredDocument::new();
        doc.add_block(Block::heading(0, 1).with_plain_text("Intro"));
        let outer = StyleSpan::new(
            StyleProperty::FontFamily("Georgia, serif".into()).to_span_style(),
            vec![
                InlineContent::Text(TextRun::new("ab", TextStyle::bold())),
                InlineContent::Span(StyleSpan::new(
                    StyleProperty::FontSize(FontSize::new(30).unwrap()).to_span_style(),
                    vec![InlineContent::Text(TextRun::plain("cd"))],
                )),
            ],
        );
        doc.add_block(Block::paragraph(0).with_plain_text("xy").with_span(outer));
        doc
    }

    fn state_at(doc: &StructuredDocument, block: usize, offset: usize) -> ToolbarState {
        resolve_toolbar_state(
            doc,
            DocumentPosition::new(block, offset),
            Affinity::Inner,
            None,
            &StyleProfile::default(),
            &fonts(),
        )
        .unwrap()
    }

    #[test]
    fn test_heading_size_from_profile() {
        let state = state_at(&doc(), 0, 2);
        assert_eq!(state.block_format, BlockType::heading(1));
        assert_eq!(state.font_size.px(), 32);
        assert_eq!(state.font_family.as_deref(), Some("Inter"));
        assert!(!state.bold);
    }

    #[test]
    fn test_walks_up_from_innermost_span() {
        let doc = doc();
        let plain = state_at(&doc, 1, 1);
        assert_eq!(plain.font_size, FontSize::DEFAULT);

        let bold = state_at(&doc, 1, 3);
        assert!(bold.bold);
        assert_eq!(bold.font_family.as_deref(), Some("Georgia"));
        assert_eq!(bold.font_size, FontSize::DEFAULT);

        let nested = state_at(&doc, 1, 6);
        assert!(!nested.bold);
        assert_eq!(nested.font_size.px(), 30);
        assert_eq!(nested.font_family.as_deref(), Some("Georgia"));
    }

    #[test]
    fn test_unknown_family_not_reported() {
        let mut doc = doc();
        doc.blocks_mut()[0].style =
            StyleProperty::FontFamily("Comic Sans MS".into()).to_span_style();
        assert_eq!(state_at(&doc, 0, 1).font_family, None);
    }

    #[test]
    fn test_pending_flags_win() {
        let doc = doc();
        let state = resolve_toolbar_state(
            &doc,
            DocumentPosition::new(1, 1),
            Affinity::Inner,
            Some(TextStyle::italic()),
            &StyleProfile::default(),
            &fonts(),
        )
        .unwrap();
        assert!(state.italic);
        assert!(
            resolve_toolbar_state(
                &doc,
                DocumentPosition::new(9, 0),
                Affinity::Inner,
                None,
                &StyleProfile::default(),
                &fonts(),
            )
            .is_none()
        );
    }

    #[test]
    fn test_guard() {
        let mut guard = UpdateGuard::default();
        assert!(!guard.is_armed());
        guard.arm();
        assert!(guard.is_armed());
        guard.release();
        assert!(!guard.is_armed());
    }
}
