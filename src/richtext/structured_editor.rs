// Structured Editor
// The editing session: owns the document, the selection and every piece of
// state the toolbar handlers share. Constructed on mount, consumed on unmount.

use super::block_format::{apply_alignment, apply_block_format, common_block_type};
use super::commands::Command;
use super::selection::{
    Restored, Selection, SelectionSnapshot, capture_selection, restore_selection,
};
use super::span_engine::{self, cleanup_document};
use super::structured_document::*;
use super::style::{
    Color, FontSize, StyleProfile, StyleProperty, TextStyle, is_valid_font_family,
};
use super::toolbar::{ToolbarState, UpdateGuard, resolve_toolbar_state};
use crate::config::Config;
use crate::error::{EditError, EditResult};
use crate::render::{export, page};
use std::cmp::min;
use tracing::{debug, warn};
use unicode_segmentation::UnicodeSegmentation;

/// Text of the single paragraph a cleared document starts with
pub const DEFAULT_PARAGRAPH: &str = "Start typing your document here...";

/// Step used by the font-size increase/decrease buttons
pub const FONT_SIZE_STEP: i64 = 2;

/// Values currently shown by the toolbar controls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlValues {
    /// Raw text of the numeric font-size input
    pub font_size: String,
    pub block_format: BlockType,
    pub font_family: Option<String>,
}

impl Default for ControlValues {
    fn default() -> Self {
        ControlValues {
            font_size: FontSize::DEFAULT.px().to_string(),
            block_format: BlockType::Paragraph,
            font_family: None,
        }
    }
}

/// The structured editor with cursor state
pub struct StructuredEditor {
    document: StructuredDocument,
    selection: Selection,
    affinity: Affinity,
    has_focus: bool,
    saved_selection: Option<SelectionSnapshot>,
    pending_flags: Option<TextStyle>,
    current_line_format: BlockType,
    profile: StyleProfile,
    guard: UpdateGuard,
    controls: ControlValues,
    font_options: Vec<String>,
    title: String,
}

impl StructuredEditor {
    /// Create a new editor with the default document
    pub fn new() -> Self {
        Self::with_document(default_document())
    }

    /// Create an editor with an existing document
    pub fn with_document(mut document: StructuredDocument) -> Self {
        if document.is_empty() {
            document = default_document();
        }
        cleanup_document(&mut document);
        let mut editor = StructuredEditor {
            document,
            selection: Selection::caret(DocumentPosition::start()),
            affinity: Affinity::Inner,
            has_focus: true,
            saved_selection: None,
            pending_flags: None,
            current_line_format: BlockType::Paragraph,
            profile: StyleProfile::default(),
            guard: UpdateGuard::default(),
            controls: ControlValues::default(),
            font_options: Config::default().fonts,
            title: String::new(),
        };
        editor.refresh_line_format();
        editor
    }

    /// Mount a session on a document, taking title, profile and font options from the config
    pub fn mount(document: StructuredDocument, config: &Config) -> Self {
        let mut editor = Self::with_document(document);
        editor.profile = config.profile.clone();
        editor.font_options = config.fonts.clone();
        editor.title = config.title.clone().unwrap_or_default();
        editor.controls.font_size = config.profile.font_size.px().to_string();
        debug!(blocks = editor.document.block_count(), "editor mounted");
        editor
    }

    /// Tear the session down, handing back the document
    pub fn unmount(self) -> StructuredDocument {
        debug!(blocks = self.document.block_count(), "editor unmounted");
        self.document
    }

    /// Get the document
    pub fn document(&self) -> &StructuredDocument {
        &self.document
    }

    /// Get mutable document. Call [`Self::content_changed`] after mutating it.
    pub fn document_mut(&mut self) -> &mut StructuredDocument {
        &mut self.document
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn profile(&self) -> &StyleProfile {
        &self.profile
    }

    /// Whole-document style controls mutate the profile directly
    pub fn profile_mut(&mut self) -> &mut StyleProfile {
        &mut self.profile
    }

    pub fn set_document_font_family(&mut self, family: &str) {
        let family = family.trim();
        if !is_valid_font_family(family) {
            debug!(family, "ignoring invalid document font family");
            return;
        }
        self.profile.font_family = family.to_string();
    }

    pub fn set_document_font_size(&mut self, value: &str) {
        match FontSize::parse(value) {
            Some(size) => self.profile.font_size = size,
            None => debug!(value, "ignoring invalid document font size"),
        }
    }

    pub fn set_document_text_color(&mut self, value: &str) {
        match Color::parse(value) {
            Some(color) => self.profile.text_color = Some(color),
            None => debug!(value, "ignoring invalid document text color"),
        }
    }

    pub fn set_document_background(&mut self, value: &str) {
        match Color::parse(value) {
            Some(color) => self.profile.background_color = Some(color),
            None => debug!(value, "ignoring invalid document background color"),
        }
    }

    pub fn controls(&self) -> &ControlValues {
        &self.controls
    }

    pub fn font_options(&self) -> &[String] {
        &self.font_options
    }

    pub fn current_line_format(&self) -> BlockType {
        self.current_line_format
    }

    pub fn affinity(&self) -> Affinity {
        self.affinity
    }

    pub fn has_focus(&self) -> bool {
        self.has_focus
    }

    /// Get cursor position (the focus end of the selection)
    pub fn cursor(&self) -> DocumentPosition {
        self.selection.focus
    }

    /// Get selection range, if anything is selected
    pub fn selection(&self) -> Option<(DocumentPosition, DocumentPosition)> {
        (!self.selection.is_collapsed()).then(|| self.selection.ordered())
    }

    /// The raw anchor/focus pair
    pub fn raw_selection(&self) -> Selection {
        self.selection
    }

    /// Set cursor position (will be clamped to valid range)
    pub fn set_cursor(&mut self, pos: DocumentPosition) {
        let pos = self.document.clamp_position(pos);
        self.move_selection(Selection::caret(pos));
    }

    /// Set selection range
    pub fn set_selection(&mut self, start: DocumentPosition, end: DocumentPosition) {
        let start = self.document.clamp_position(start);
        let end = self.document.clamp_position(end);
        self.move_selection(Selection::new(start, end));
    }

    /// Clear selection, keeping the cursor where it is
    pub fn clear_selection(&mut self) {
        self.selection = Selection::caret(self.selection.focus);
    }

    /// Select all content in the document
    pub fn select_all(&mut self) {
        let end = self.document.end_position();
        self.move_selection(Selection::new(DocumentPosition::start(), end));
    }

    pub fn move_cursor_left(&mut self) {
        let pos = self.cursor();
        if pos.offset > 0 {
            let text = self.document.blocks()[pos.block_index].to_plain_text();
            let prev = previous_grapheme_start(&text, pos.offset);
            self.set_cursor(DocumentPosition::new(pos.block_index, prev));
        } else if pos.block_index > 0 {
            let len = self.document.blocks()[pos.block_index - 1].text_len();
            self.set_cursor(DocumentPosition::new(pos.block_index - 1, len));
        }
    }

    pub fn move_cursor_right(&mut self) {
        let pos = self.cursor();
        let text = self.document.blocks()[pos.block_index].to_plain_text();
        if pos.offset < text.len() {
            let next = text[pos.offset..]
                .graphemes(true)
                .next()
                .map_or(text.len(), |g| pos.offset + g.len());
            self.set_cursor(DocumentPosition::new(pos.block_index, next));
        } else if pos.block_index + 1 < self.document.block_count() {
            self.set_cursor(DocumentPosition::new(pos.block_index + 1, 0));
        }
    }

    pub fn move_cursor_to_line_start(&mut self) {
        let pos = self.cursor();
        self.set_cursor(DocumentPosition::new(pos.block_index, 0));
    }

    pub fn move_cursor_to_line_end(&mut self) {
        let pos = self.cursor();
        let len = self.document.blocks()[pos.block_index].text_len();
        self.set_cursor(DocumentPosition::new(pos.block_index, len));
    }

    /// Focus moved into the editable surface
    pub fn focus_surface(&mut self) {
        self.has_focus = true;
    }

    /// Focus is about to move to a control outside the surface: snapshot the selection
    pub fn blur_surface(&mut self) {
        self.capture_selection();
        self.has_focus = false;
    }

    /// Snapshot the current selection if the surface owns it
    pub fn capture_selection(&mut self) -> Option<SelectionSnapshot> {
        let current = self.has_focus.then_some(self.selection);
        if let Some(snapshot) = capture_selection(&self.document, current) {
            self.saved_selection = Some(snapshot);
        }
        self.saved_selection
    }

    /// Re-apply the saved snapshot, refocusing the root if it no longer fits
    pub fn restore_selection(&mut self) -> Restored {
        let restored = restore_selection(&self.document, self.saved_selection.as_ref());
        match restored {
            Restored::Snapshot(selection) => {
                self.selection = selection;
                self.has_focus = true;
            }
            Restored::Refocused(_) => self.refocus_root(),
            Restored::Nothing => self.has_focus = true,
        }
        restored
    }

    /// Insert text at cursor position
    pub fn insert_text(&mut self, text: &str) -> EditResult {
        if text.is_empty() {
            return Ok(());
        }
        if !self.selection.is_collapsed() {
            self.delete_selection()?;
        }

        let caret = self.cursor();
        let flags = self.typing_flags();
        let affinity = self.affinity;
        let block = self
            .document
            .blocks_mut()
            .get_mut(caret.block_index)
            .ok_or(EditError::InvalidBlockIndex(caret.block_index))?;

        let offset = match span_engine::fill_placeholder(block, caret.offset, text, flags) {
            Some(offset) => offset,
            None => {
                block.insert_text(caret.offset, text, flags, affinity);
                caret.offset + text.len()
            }
        };

        self.pending_flags = None;
        self.affinity = Affinity::Inner;
        self.selection = Selection::caret(DocumentPosition::new(caret.block_index, offset));
        self.content_changed();
        Ok(())
    }

    /// Insert a newline at cursor. The new line continues the current line format.
    pub fn insert_newline(&mut self) -> EditResult {
        if !self.selection.is_collapsed() {
            self.delete_selection()?;
        }

        let caret = self.cursor();
        let block = self
            .document
            .blocks_mut()
            .get_mut(caret.block_index)
            .ok_or(EditError::InvalidBlockIndex(caret.block_index))?;

        // Enter on an empty heading line leaves heading mode
        if block.block_type != BlockType::Paragraph && block.is_empty() {
            block.block_type = BlockType::Paragraph;
            self.current_line_format = BlockType::Paragraph;
            self.controls.block_format = BlockType::Paragraph;
            return Ok(());
        }

        let right = block.split_content_at(caret.offset);
        let mut new_line = Block::paragraph(0);
        new_line.alignment = block.alignment;
        new_line.style = block.style.clone();
        new_line.content = right;
        self.document.insert_block(caret.block_index + 1, new_line);

        let new_caret = Selection::caret(DocumentPosition::new(caret.block_index + 1, 0));
        let pending = apply_block_format(&mut self.document, new_caret, self.current_line_format)?;
        let seated = pending.commit(&self.document);
        self.move_selection(seated);
        self.content_changed();
        Ok(())
    }

    /// Delete the grapheme before the cursor (backspace)
    pub fn delete_backward(&mut self) -> EditResult {
        if self.document.is_empty() {
            return Err(EditError::EmptyDocument);
        }
        if !self.selection.is_collapsed() {
            return self.delete_selection();
        }

        let pos = self.cursor();
        if pos.offset == 0 {
            if pos.block_index == 0 {
                return Ok(());
            }
            let current = self
                .document
                .remove_block(pos.block_index)
                .ok_or(EditError::InvalidBlockIndex(pos.block_index))?;
            let prev = &mut self.document.blocks_mut()[pos.block_index - 1];
            let prev_len = prev.text_len();
            prev.content.extend(current.content);
            merge_adjacent(&mut prev.content);
            self.selection = Selection::caret(DocumentPosition::new(pos.block_index - 1, prev_len));
        } else {
            let block = &mut self.document.blocks_mut()[pos.block_index];
            let text = block.to_plain_text();
            let start = previous_grapheme_start(&text, min(pos.offset, text.len()));
            block.delete_text_range(start, pos.offset);
            self.selection = Selection::caret(DocumentPosition::new(pos.block_index, start));
        }
        self.affinity = Affinity::Inner;
        self.content_changed();
        Ok(())
    }

    /// Delete the selected content, collapsing the caret to its start
    pub fn delete_selection(&mut self) -> EditResult {
        if self.selection.is_collapsed() {
            return Ok(());
        }
        let (start, end) = self.selection.ordered();
        self.document.delete_range(start, end);
        self.selection = Selection::caret(self.document.clamp_position(start));
        self.affinity = Affinity::Inner;
        self.content_changed();
        Ok(())
    }

    /// Dispatch a toolbar command identifier with its optional value.
    /// Returns whether anything was applied.
    pub fn execute(&mut self, command: &str, value: Option<&str>) -> bool {
        match Command::parse(command, value) {
            Ok(command) => self.run(command),
            Err(err) => {
                debug!(%err, "ignoring toolbar command");
                false
            }
        }
    }

    /// Apply a parsed command to the current (or restored) selection.
    /// Failures are logged and fall back to refocusing the root.
    pub fn run(&mut self, command: Command) -> bool {
        if !self.has_focus {
            self.restore_selection();
        }
        match self.apply(&command) {
            Ok(()) => {
                cleanup_document(&mut self.document);
                true
            }
            Err(err) => {
                warn!(%err, %command, "formatting command failed");
                self.refocus_root();
                false
            }
        }
    }

    fn apply(&mut self, command: &Command) -> EditResult {
        match command {
            Command::ToggleFlag(flag) => {
                if self.selection.is_collapsed() {
                    let mut flags = self.typing_flags();
                    let on = !flag.get(&flags);
                    flag.set(&mut flags, on);
                    self.pending_flags = Some(flags);
                } else {
                    span_engine::toggle_flag(&mut self.document, self.selection, *flag)?;
                }
            }
            Command::Align(alignment) => {
                apply_alignment(&mut self.document, self.selection, *alignment)?;
            }
            Command::FormatBlock(format) => {
                let pending = apply_block_format(&mut self.document, self.selection, *format)?;
                self.selection = pending.commit(&self.document);
                self.current_line_format = *format;
                self.controls.block_format = *format;
            }
            Command::Style(property) => {
                let flags = self.typing_flags();
                let change = span_engine::apply_style(
                    &mut self.document,
                    self.selection,
                    property,
                    flags,
                    self.affinity,
                )?;
                debug!(kind = ?change.kind, caret = ?change.caret, "applied style");
                self.selection = Selection::caret(change.caret);
                self.affinity = change.affinity;
                if let StyleProperty::FontSize(size) = property {
                    self.controls.font_size = size.px().to_string();
                }
            }
            Command::RemoveFormat => {
                self.pending_flags = None;
                if !self.selection.is_collapsed() {
                    span_engine::remove_formatting(&mut self.document, self.selection)?;
                }
            }
        }
        Ok(())
    }

    /// Numeric font-size input changed. Invalid or out-of-range values are ignored.
    pub fn on_font_size_input(&mut self, value: &str) -> bool {
        if self.guard.is_armed() {
            return false;
        }
        self.controls.font_size = value.to_string();
        match FontSize::parse(value) {
            Some(size) => self.run(Command::Style(StyleProperty::FontSize(size))),
            None => {
                debug!(value, "ignoring invalid font size");
                false
            }
        }
    }

    /// Step the font size by `delta` from the value shown in the control
    pub fn adjust_font_size(&mut self, delta: i64) -> bool {
        let current = leading_number(&self.controls.font_size)
            .filter(|n| *n > 0)
            .unwrap_or_else(|| i64::from(FontSize::DEFAULT.px()));
        let size = FontSize::clamped(current + delta);
        self.controls.font_size = size.px().to_string();
        self.run(Command::Style(StyleProperty::FontSize(size)))
    }

    pub fn increase_font_size(&mut self) -> bool {
        self.adjust_font_size(FONT_SIZE_STEP)
    }

    pub fn decrease_font_size(&mut self) -> bool {
        self.adjust_font_size(-FONT_SIZE_STEP)
    }

    /// Block-format selector changed
    pub fn on_block_format_change(&mut self, value: &str) -> bool {
        if self.guard.is_armed() {
            return false;
        }
        self.execute("formatBlock", Some(value))
    }

    /// Font-family selector changed
    pub fn on_font_family_change(&mut self, value: &str) -> bool {
        if self.guard.is_armed() {
            return false;
        }
        self.controls.font_family = Some(value.to_string());
        self.execute("fontName", Some(value))
    }

    pub fn set_text_color(&mut self, value: &str) -> bool {
        self.execute("foreColor", Some(value))
    }

    pub fn set_highlight_color(&mut self, value: &str) -> bool {
        self.execute("hiliteColor", Some(value))
    }

    /// Remove inline formatting from the selection and reset the controls
    pub fn clear_formatting(&mut self) -> bool {
        let applied = self.run(Command::RemoveFormat);
        self.controls.font_size = FontSize::DEFAULT.px().to_string();
        self.controls.block_format = BlockType::Paragraph;
        applied
    }

    /// Replace everything with the default paragraph, if `confirm` agrees.
    /// Declining leaves the session untouched.
    pub fn clear_content(&mut self, confirm: impl FnOnce() -> bool) -> bool {
        if !confirm() {
            debug!("clear content declined");
            return false;
        }
        self.document = default_document();
        self.selection = Selection::caret(DocumentPosition::start());
        self.affinity = Affinity::Inner;
        self.has_focus = true;
        self.saved_selection = None;
        self.pending_flags = None;
        self.current_line_format = BlockType::Paragraph;
        self.profile.reset();
        self.controls = ControlValues::default();
        true
    }

    /// Toolbar state at the cursor, without touching the controls
    pub fn toolbar_state(&self) -> Option<ToolbarState> {
        resolve_toolbar_state(
            &self.document,
            self.cursor(),
            self.affinity,
            self.pending_flags,
            &self.profile,
            &self.font_options,
        )
    }

    /// Push the caret's formatting into the controls. The update guard is armed
    /// until [`Self::controls_settled`]; while armed this is a no-op.
    pub fn sync_toolbar(&mut self) -> Option<ToolbarState> {
        if self.guard.is_armed() {
            return None;
        }
        let state = self.toolbar_state()?;
        self.guard.arm();
        // A selection spanning mixed line formats shows the caret's own
        self.controls.block_format =
            common_block_type(&self.document, self.selection).unwrap_or(state.block_format);
        if let Some(family) = &state.font_family {
            self.controls.font_family = Some(family.clone());
        }
        if leading_number(&self.controls.font_size) != Some(i64::from(state.font_size.px())) {
            self.controls.font_size = state.font_size.px().to_string();
        }
        Some(state)
    }

    /// The controls have delivered the change events caused by the last sync
    pub fn controls_settled(&mut self) {
        self.guard.release();
    }

    pub fn is_syncing_controls(&self) -> bool {
        self.guard.is_armed()
    }

    /// Cleanup pass after any content change, including native host edits
    pub fn content_changed(&mut self) {
        cleanup_document(&mut self.document);
        if self.document.is_empty() {
            self.document.add_block(Block::paragraph(0));
        }
        let anchor = self.document.clamp_position(self.selection.anchor);
        let focus = self.document.clamp_position(self.selection.focus);
        self.selection = Selection::new(anchor, focus);
        self.refresh_line_format();
    }

    /// Full preview document for the current state
    pub fn preview_html(&self) -> String {
        page::preview_html(&self.title, &self.document, &self.profile)
    }

    /// Printable document for the current state
    pub fn print_html(&self) -> String {
        page::print_html(&self.title, &self.document, &self.profile)
    }

    /// Exported standalone document and its suggested file name
    pub fn export(&self, year: i32) -> (String, String) {
        (
            export::export_html(&self.title, &self.document, year),
            export::export_file_name(&self.title),
        )
    }

    /// Flags for the next typed character: pending typing flags win over the
    /// flags of the run at the caret
    fn typing_flags(&self) -> TextStyle {
        if let Some(flags) = self.pending_flags {
            return flags;
        }
        let pos = self.cursor();
        self.document
            .blocks()
            .get(pos.block_index)
            .map(|block| block.styles_at(pos.offset, self.affinity).1)
            .unwrap_or_default()
    }

    /// Move the selection as the user would: typing state tied to the old
    /// caret is abandoned, and placeholders left behind are discarded.
    fn move_selection(&mut self, selection: Selection) {
        self.pending_flags = None;
        self.affinity = Affinity::Inner;
        self.selection = self.discard_stale_placeholders(selection);
        self.refresh_line_format();
    }

    fn discard_stale_placeholders(&mut self, selection: Selection) -> Selection {
        let mut selection = selection;
        for block_index in 0..self.document.block_count() {
            let block = &mut self.document.blocks_mut()[block_index];
            let stale: Vec<usize> = block
                .placeholder_offsets()
                .into_iter()
                .filter(|&start| {
                    let kept = DocumentPosition::new(block_index, start + PLACEHOLDER_LEN);
                    !(selection.is_collapsed() && selection.focus == kept)
                })
                .collect();
            if stale.is_empty() {
                continue;
            }
            block.remove_placeholders_at(&stale);
            let remap = |pos: DocumentPosition| {
                if pos.block_index != block_index {
                    return pos;
                }
                let removed = stale.iter().filter(|&&start| start < pos.offset).count();
                DocumentPosition::new(block_index, pos.offset - removed * PLACEHOLDER_LEN)
            };
            selection = Selection::new(remap(selection.anchor), remap(selection.focus));
        }
        selection
    }

    fn refresh_line_format(&mut self) {
        if let Some(block) = self.document.blocks().get(self.selection.focus.block_index) {
            self.current_line_format = block.block_type;
        }
    }

    fn refocus_root(&mut self) {
        debug!("refocusing editable root");
        self.selection = Selection::caret(DocumentPosition::start());
        self.affinity = Affinity::Inner;
        self.has_focus = true;
        self.refresh_line_format();
    }
}

impl Default for StructuredEditor {
    fn default() -> Self {
        Self::new()
    }
}

/// A document holding the single default paragraph
pub fn default_document() -> StructuredDocument {
    StructuredDocument::with_paragraph(DEFAULT_PARAGRAPH)
}

fn previous_grapheme_start(text: &str, offset: usize) -> usize {
    text[..offset]
        .grapheme_indices(true)
        .next_back()
        .map_or(0, |(i, _)| i)
}

/// Leading integer of a control value, the way a number input reports it
fn leading_number(value: &str) -> Option<i64> {
    let digits: String = value
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}
