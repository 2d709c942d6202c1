use serde::{Deserialize, Serialize};

use crate::editing::block::{Block, BlockType};
use crate::editing::style::StyleSet;

/// A position in the document: block index plus byte offset into the
/// block's concatenated run text. Offsets must lie on char boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    pub block: usize,
    pub offset: usize,
}

impl Point {
    pub fn new(block: usize, offset: usize) -> Self {
        Self { block, offset }
    }
}

/// Cursor position or text range, kept ordered (start <= end).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    start: Point,
    end: Point,
}

impl Selection {
    pub fn new(a: Point, b: Point) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    pub fn caret(point: Point) -> Self {
        Self {
            start: point,
            end: point,
        }
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn end(&self) -> Point {
        self.end
    }

    pub fn is_caret(&self) -> bool {
        self.start == self.end
    }
}

/// Errors from the command layer. Everything except selection validation is
/// total; a malformed selection leaves no partial state behind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("invalid selection: {detail} (block {block}, offset {offset})")]
    InvalidSelection {
        block: usize,
        offset: usize,
        detail: &'static str,
    },
}

/// Immutable snapshot of the comment being composed.
///
/// A document is never mutated in place: every command produces a new
/// snapshot via [`Document::apply`], so re-render triggers reduce to a
/// version comparison and undo/redo reduces to keeping old snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    blocks: Vec<Block>,
    selection: Selection,
    /// Pending style set toggled at a collapsed caret, applied to the next
    /// text insertion. Cleared by any other command or selection change.
    style_override: Option<StyleSet>,
    version: u64,
}

impl Document {
    /// An empty document: one empty paragraph block, caret at its start.
    pub fn new() -> Self {
        Self {
            blocks: vec![Block::empty(BlockType::Paragraph)],
            selection: Selection::caret(Point::new(0, 0)),
            style_override: None,
            version: 0,
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub(crate) fn style_override(&self) -> Option<StyleSet> {
        self.style_override
    }

    /// Whether any block carries non-empty text.
    pub fn has_text(&self) -> bool {
        self.blocks.iter().any(|b| !b.is_empty())
    }

    /// Block containing the selection start.
    pub fn current_block(&self) -> &Block {
        // Selection is validated on every mutation, so the index holds.
        &self.blocks[self.selection.start().block]
    }

    pub fn current_block_type(&self) -> BlockType {
        self.current_block().kind
    }

    /// Style set active at the selection: the pending override if one is
    /// set, the caret style for a collapsed selection, otherwise the
    /// intersection of every run slice in the selected range.
    pub fn current_styles(&self) -> StyleSet {
        if let Some(override_set) = self.style_override {
            return override_set;
        }
        if self.selection.is_caret() {
            let point = self.selection.start();
            return self.blocks[point.block].styles_at_caret(point.offset);
        }
        self.styles_intersection(self.selection)
    }

    pub(crate) fn styles_intersection(&self, selection: Selection) -> StyleSet {
        let start = selection.start();
        let end = selection.end();
        let mut acc: Option<StyleSet> = None;
        for (index, block) in self
            .blocks
            .iter()
            .enumerate()
            .take(end.block + 1)
            .skip(start.block)
        {
            let from = if index == start.block { start.offset } else { 0 };
            let to = if index == end.block {
                end.offset
            } else {
                block.len()
            };
            if let Some(set) = block.styles_intersection_in(from..to) {
                acc = Some(match acc {
                    Some(prev) => prev.intersection(set),
                    None => set,
                });
            }
        }
        acc.unwrap_or(StyleSet::EMPTY)
    }

    /// Return a snapshot with the given selection. Any pending style
    /// override is dropped, matching editor focus-change behavior.
    pub fn with_selection(&self, selection: Selection) -> Result<Self, EditError> {
        self.validate_selection(selection)?;
        let mut next = self.clone();
        next.selection = selection;
        next.style_override = None;
        Ok(next)
    }

    pub(crate) fn validate_selection(&self, selection: Selection) -> Result<(), EditError> {
        for point in [selection.start(), selection.end()] {
            let Some(block) = self.blocks.get(point.block) else {
                return Err(EditError::InvalidSelection {
                    block: point.block,
                    offset: point.offset,
                    detail: "block index out of range",
                });
            };
            if point.offset > block.len() {
                return Err(EditError::InvalidSelection {
                    block: point.block,
                    offset: point.offset,
                    detail: "offset past end of block",
                });
            }
            if !block.is_char_boundary(point.offset) {
                return Err(EditError::InvalidSelection {
                    block: point.block,
                    offset: point.offset,
                    detail: "offset not on a char boundary",
                });
            }
        }
        Ok(())
    }

    // Mutable access for the command layer only.
    pub(crate) fn blocks_mut(&mut self) -> &mut Vec<Block> {
        &mut self.blocks
    }

    pub(crate) fn set_selection_internal(&mut self, selection: Selection) {
        self.selection = selection;
    }

    pub(crate) fn set_style_override(&mut self, override_set: Option<StyleSet>) {
        self.style_override = override_set;
    }

    pub(crate) fn bump_version(&mut self) {
        self.version += 1;
    }

    /// Panic unless the document invariants hold: at least one block, every
    /// block normalized, selection in range. Intended for tests.
    pub fn assert_invariants(&self) {
        assert!(!self.blocks.is_empty(), "document must have >= 1 block");
        for (index, block) in self.blocks.iter().enumerate() {
            assert!(
                !block.runs().is_empty(),
                "block {index} must have >= 1 run"
            );
            for pair in block.runs().windows(2) {
                assert_ne!(
                    pair[0].styles, pair[1].styles,
                    "block {index} has adjacent runs with identical style sets"
                );
            }
            if block.runs().len() > 1 {
                assert!(
                    block.runs().iter().all(|r| !r.text.is_empty()),
                    "block {index} has an empty run next to others"
                );
            }
            if !block.kind.is_list_item() {
                assert_eq!(block.depth, 0, "non-list block {index} has depth");
            }
        }
        self.validate_selection(self.selection)
            .expect("selection must stay valid");
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
