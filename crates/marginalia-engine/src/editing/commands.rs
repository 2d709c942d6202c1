use crate::editing::block::{BlockType, MAX_LIST_DEPTH};
use crate::editing::document::{Document, EditError, Point, Selection};
use crate::editing::style::InlineStyle;

/// Commands that can be applied to a document. Each application returns a
/// fresh snapshot; documents are never edited in place.
#[derive(Debug, Clone, PartialEq)]
pub enum Cmd {
    /// Toggle the type of the block containing the selection start. Setting
    /// the type the block already has resets it to a paragraph.
    ToggleBlockType(BlockType),
    /// Toggle an inline style over the selected range, or hold it as a
    /// pending override at a collapsed caret.
    ToggleInlineStyle(InlineStyle),
    /// Replace the selection (if any) with text. Embedded newlines split
    /// blocks.
    InsertText(String),
    /// A resolved editor key command.
    Key(KeyCommand),
    IndentListItem,
    OutdentListItem,
}

/// Key commands with default bindings, mirroring common editor chords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Bold,
    Italic,
    Underline,
    Code,
    Backspace,
    SplitBlock,
}

/// A raw key event, independent of any frontend toolkit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub ctrl: bool,
    pub shift: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Tab,
    Enter,
    Backspace,
}

/// Default key binding map. Tab indents list items (Shift-Tab outdents),
/// Ctrl-B/I/U/J toggle inline styles, plain characters insert themselves.
pub fn map_key(press: KeyPress) -> Option<Cmd> {
    if press.ctrl {
        return match press.key {
            Key::Char('b') => Some(Cmd::Key(KeyCommand::Bold)),
            Key::Char('i') => Some(Cmd::Key(KeyCommand::Italic)),
            Key::Char('u') => Some(Cmd::Key(KeyCommand::Underline)),
            Key::Char('j') => Some(Cmd::Key(KeyCommand::Code)),
            _ => None,
        };
    }
    match press.key {
        Key::Tab if press.shift => Some(Cmd::OutdentListItem),
        Key::Tab => Some(Cmd::IndentListItem),
        Key::Enter => Some(Cmd::Key(KeyCommand::SplitBlock)),
        Key::Backspace => Some(Cmd::Key(KeyCommand::Backspace)),
        Key::Char(c) => Some(Cmd::InsertText(c.to_string())),
    }
}

impl Document {
    /// Apply a command, returning the resulting snapshot. Commands are total
    /// on well-formed documents; a malformed selection fails with
    /// [`EditError::InvalidSelection`] and produces no partial state.
    pub fn apply(&self, cmd: Cmd) -> Result<Document, EditError> {
        self.validate_selection(self.selection())?;
        let mut next = self.clone();
        match cmd {
            Cmd::ToggleBlockType(kind) => toggle_block_type(&mut next, kind),
            Cmd::ToggleInlineStyle(style) => toggle_inline_style(&mut next, style),
            Cmd::InsertText(text) => insert_text(&mut next, &text),
            Cmd::Key(KeyCommand::Bold) => toggle_inline_style(&mut next, InlineStyle::Bold),
            Cmd::Key(KeyCommand::Italic) => toggle_inline_style(&mut next, InlineStyle::Italic),
            Cmd::Key(KeyCommand::Underline) => {
                toggle_inline_style(&mut next, InlineStyle::Underline)
            }
            Cmd::Key(KeyCommand::Code) => toggle_inline_style(&mut next, InlineStyle::Code),
            Cmd::Key(KeyCommand::Backspace) => backspace(&mut next),
            Cmd::Key(KeyCommand::SplitBlock) => split_block(&mut next),
            Cmd::IndentListItem => shift_list_depth(&mut next, 1),
            Cmd::OutdentListItem => shift_list_depth(&mut next, -1),
        }
        next.bump_version();
        Ok(next)
    }
}

fn toggle_block_type(doc: &mut Document, kind: BlockType) {
    let index = doc.selection().start().block;
    let block = &mut doc.blocks_mut()[index];
    block.kind = if block.kind == kind {
        BlockType::Paragraph
    } else {
        kind
    };
    if !block.kind.is_list_item() {
        block.depth = 0;
    }
    doc.set_style_override(None);
}

fn toggle_inline_style(doc: &mut Document, style: InlineStyle) {
    let selection = doc.selection();
    if selection.is_caret() {
        // Nothing to restyle yet; remember the toggle for the next insert.
        let pending = doc.current_styles().toggled(style);
        doc.set_style_override(Some(pending));
        return;
    }

    let present = doc.styles_intersection(selection).contains(style);
    let (start, end) = (selection.start(), selection.end());
    for index in start.block..=end.block {
        let from = if index == start.block { start.offset } else { 0 };
        let to = if index == end.block {
            end.offset
        } else {
            doc.blocks()[index].len()
        };
        doc.blocks_mut()[index].map_styles_in(from..to, |set| {
            if present {
                set.without(style)
            } else {
                set.with(style)
            }
        });
    }
    doc.set_style_override(None);
}

fn insert_text(doc: &mut Document, text: &str) {
    // Captured before the selection collapses so override styles survive.
    let styles = doc.current_styles();
    delete_selection(doc);

    let caret = doc.selection().start();
    let mut segments = text.split('\n');
    let first = segments.next().unwrap_or("");
    doc.blocks_mut()[caret.block].insert_text(caret.offset, first, styles);
    let mut point = Point::new(caret.block, caret.offset + first.len());

    for segment in segments {
        let successor_kind = doc.blocks()[point.block].kind.split_successor();
        let mut tail = doc.blocks_mut()[point.block].split_at(point.offset);
        tail.kind = successor_kind;
        if !successor_kind.is_list_item() {
            tail.depth = 0;
        }
        tail.insert_text(0, segment, styles);
        doc.blocks_mut().insert(point.block + 1, tail);
        point = Point::new(point.block + 1, segment.len());
    }

    doc.set_selection_internal(Selection::caret(point));
    doc.set_style_override(None);
}

fn backspace(doc: &mut Document) {
    let selection = doc.selection();
    if !selection.is_caret() {
        delete_selection(doc);
        doc.set_style_override(None);
        return;
    }

    let point = selection.start();
    if point.offset > 0 {
        let text = doc.blocks()[point.block].text();
        let prev = prev_char_boundary(&text, point.offset);
        doc.blocks_mut()[point.block].remove_range(prev..point.offset);
        doc.set_selection_internal(Selection::caret(Point::new(point.block, prev)));
    } else if point.block > 0 {
        let prev_index = point.block - 1;
        let prev_len = doc.blocks()[prev_index].len();
        let tail = doc.blocks()[point.block].clone();
        doc.blocks_mut()[prev_index].merge_tail(&tail);
        doc.blocks_mut().remove(point.block);
        doc.set_selection_internal(Selection::caret(Point::new(prev_index, prev_len)));
    } else {
        // Caret at the very start of the document: soften any block styling
        // back to a plain paragraph instead of deleting.
        let block = &mut doc.blocks_mut()[0];
        block.kind = BlockType::Paragraph;
        block.depth = 0;
    }
    doc.set_style_override(None);
}

fn split_block(doc: &mut Document) {
    delete_selection(doc);
    let point = doc.selection().start();
    let successor_kind = doc.blocks()[point.block].kind.split_successor();
    let mut tail = doc.blocks_mut()[point.block].split_at(point.offset);
    tail.kind = successor_kind;
    if !successor_kind.is_list_item() {
        tail.depth = 0;
    }
    doc.blocks_mut().insert(point.block + 1, tail);
    doc.set_selection_internal(Selection::caret(Point::new(point.block + 1, 0)));
    doc.set_style_override(None);
}

fn shift_list_depth(doc: &mut Document, delta: i8) {
    let index = doc.selection().start().block;
    let block = &mut doc.blocks_mut()[index];
    if block.kind.is_list_item() {
        block.depth = if delta > 0 {
            (block.depth + 1).min(MAX_LIST_DEPTH)
        } else {
            block.depth.saturating_sub(1)
        };
    }
    doc.set_style_override(None);
}

/// Collapse a range selection by deleting its contents; the caret lands at
/// the former selection start. The head block's type wins a cross-block join.
fn delete_selection(doc: &mut Document) {
    let selection = doc.selection();
    if selection.is_caret() {
        return;
    }
    let (start, end) = (selection.start(), selection.end());
    if start.block == end.block {
        doc.blocks_mut()[start.block].remove_range(start.offset..end.offset);
    } else {
        let mut tail = doc.blocks()[end.block].clone();
        tail.remove_range(0..end.offset);
        let head_len = doc.blocks()[start.block].len();
        let blocks = doc.blocks_mut();
        blocks[start.block].remove_range(start.offset..head_len);
        blocks[start.block].merge_tail(&tail);
        blocks.drain(start.block + 1..=end.block);
    }
    doc.set_selection_internal(Selection::caret(start));
}

fn prev_char_boundary(text: &str, offset: usize) -> usize {
    text[..offset]
        .chars()
        .last()
        .map(|c| offset - c.len_utf8())
        .unwrap_or(0)
}
