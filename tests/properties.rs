// Property tests for the inline style engine

use proptest::prelude::*;
use richpad::richtext::span_engine::{apply_style, cleanup_block};
use richpad::richtext::structured_document::{
    Affinity, Block, DocumentPosition, InlineContent, StructuredDocument, StyleSpan, TextRun,
};
use richpad::richtext::style::{FontSize, SpanStyle, StyleProperty, TextStyle};
use richpad::richtext::{Selection, StructuredEditor};

/// Effective font size of every byte of block 0
fn sizes(doc: &StructuredDocument) -> Vec<Option<FontSize>> {
    doc.blocks()[0]
        .styled_segments()
        .iter()
        .flat_map(|segment| std::iter::repeat_n(segment.span.font_size, segment.text.len()))
        .collect()
}

fn has_empty_carrier(content: &[InlineContent]) -> bool {
    content.iter().any(|item| match item {
        InlineContent::Span(span) => {
            (!span.is_placeholder() && (span.content.is_empty() || span.style.is_empty()))
                || has_empty_carrier(&span.content)
        }
        _ => false,
    })
}

fn editor_with(text: &str) -> StructuredEditor {
    StructuredEditor::with_document(StructuredDocument::with_paragraph(text))
}

fn size_of(px: u32) -> StyleProperty {
    StyleProperty::FontSize(FontSize::new(px).unwrap())
}

fn range(len: usize) -> impl Strategy<Value = (usize, usize)> {
    (0..len, 0..len).prop_map(|(a, b)| if a <= b { (a, b + 1) } else { (b, a + 1) })
}

proptest! {
    #[test]
    fn size_applies_to_every_selected_character(
        text in "[a-z ]{1,24}",
        px in 8u32..=72,
    ) {
        let mut editor = editor_with(&text);
        editor.select_all();
        prop_assert!(editor.on_font_size_input(&px.to_string()));
        prop_assert_eq!(editor.document().visible_text(), text.clone());
        prop_assert!(sizes(editor.document()).iter().all(|s| *s == FontSize::new(px)));
    }

    #[test]
    fn out_of_range_sizes_change_nothing(
        text in "[a-z]{1,12}",
        px in prop_oneof![0u32..8, 73u32..1000],
    ) {
        let mut editor = editor_with(&text);
        editor.select_all();
        let before = editor.document().clone();
        prop_assert!(!editor.on_font_size_input(&px.to_string()));
        prop_assert!(!editor.execute("fontSize", Some(&px.to_string())));
        prop_assert_eq!(editor.document(), &before);
    }

    #[test]
    fn nested_sizes_resolve_to_the_latest(
        (text, (a, b)) in "[a-z]{2,20}".prop_flat_map(|t| {
            let len = t.len();
            (Just(t), range(len))
        }),
        outer in 8u32..=72,
        inner in 8u32..=72,
    ) {
        let mut doc = StructuredDocument::with_paragraph(text.clone());
        let all = Selection::new(DocumentPosition::start(), doc.end_position());
        apply_style(&mut doc, all, &size_of(outer), TextStyle::plain(), Affinity::Inner).unwrap();
        let part = Selection::new(DocumentPosition::new(0, a), DocumentPosition::new(0, b));
        apply_style(&mut doc, part, &size_of(inner), TextStyle::plain(), Affinity::Inner).unwrap();

        prop_assert_eq!(doc.visible_text(), text);
        for (i, size) in sizes(&doc).into_iter().enumerate() {
            let expected = if (a..b).contains(&i) { inner } else { outer };
            prop_assert_eq!(size, FontSize::new(expected));
        }
        prop_assert!(!has_empty_carrier(&doc.blocks()[0].content));
    }

    #[test]
    fn collapsed_size_is_idempotent(
        text in "[a-z]{1,12}",
        caret in 0usize..12,
        px in 8u32..=72,
        repeats in 1usize..5,
    ) {
        let mut editor = editor_with(&text);
        editor.set_cursor(DocumentPosition::new(0, caret.min(text.len())));
        for _ in 0..repeats {
            prop_assert!(editor.on_font_size_input(&px.to_string()));
        }
        prop_assert_eq!(editor.document().span_count(), 1);
        prop_assert_eq!(editor.document().visible_text(), text);
    }
}

#[test]
fn cleanup_drops_empty_and_styleless_carriers_but_keeps_placeholders() {
    let size = size_of(24).to_span_style();
    let mut block = Block::paragraph(1);
    block.content = vec![
        InlineContent::Span(StyleSpan::new(size.clone(), vec![])),
        InlineContent::Span(StyleSpan::new(
            SpanStyle::default(),
            vec![InlineContent::Text(TextRun::plain("a"))],
        )),
        InlineContent::Span(StyleSpan::placeholder(size.clone(), TextStyle::plain())),
        InlineContent::Text(TextRun::plain("b")),
    ];
    cleanup_block(&mut block);

    assert_eq!(block.visible_text(), "ab");
    assert_eq!(block.placeholder_offsets(), vec![1]);
    assert!(!has_empty_carrier(&block.content));
}
