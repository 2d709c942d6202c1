use std::ops::Range;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::editing::style::StyleSet;

/// Maximum nesting depth for list items. Indent requests beyond this are
/// clamped, never rejected.
pub const MAX_LIST_DEPTH: u8 = 4;

/// Structural classification of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockType {
    Paragraph,
    /// ATX-style heading, level 1 through 6.
    Heading { level: u8 },
    Quote,
    UnorderedItem,
    OrderedItem,
}

impl BlockType {
    pub fn is_list_item(self) -> bool {
        matches!(self, BlockType::UnorderedItem | BlockType::OrderedItem)
    }

    /// Block type a new block takes when the user splits this one.
    /// List items continue the list; headings and quotes yield a paragraph.
    pub(crate) fn split_successor(self) -> BlockType {
        match self {
            BlockType::UnorderedItem | BlockType::OrderedItem => self,
            _ => BlockType::Paragraph,
        }
    }
}

/// Stable block identity that survives edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockKey(Uuid);

impl BlockKey {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BlockKey {
    fn default() -> Self {
        Self::new()
    }
}

/// Contiguous span of text sharing one style set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    pub text: String,
    pub styles: StyleSet,
}

impl Run {
    pub fn new(text: impl Into<String>, styles: StyleSet) -> Self {
        Self {
            text: text.into(),
            styles,
        }
    }

    pub fn empty() -> Self {
        Self::new("", StyleSet::EMPTY)
    }
}

/// One structural unit of the document: a typed sequence of runs.
///
/// Invariants, restored by [`Block::normalize`] after every mutation:
/// - at least one run (possibly with empty text);
/// - no two adjacent runs share an identical style set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    key: BlockKey,
    pub kind: BlockType,
    /// List nesting depth; always 0 for non-list blocks.
    pub depth: u8,
    runs: Vec<Run>,
}

impl Block {
    pub fn empty(kind: BlockType) -> Self {
        Self {
            key: BlockKey::new(),
            kind,
            depth: 0,
            runs: vec![Run::empty()],
        }
    }

    pub fn from_runs(kind: BlockType, runs: Vec<Run>) -> Self {
        let mut block = Self {
            key: BlockKey::new(),
            kind,
            depth: 0,
            runs,
        };
        block.normalize();
        block
    }

    pub fn key(&self) -> BlockKey {
        self.key
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    /// Concatenated text of all runs.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Total text length in bytes.
    pub fn len(&self) -> usize {
        self.runs.iter().map(|r| r.text.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `offset` lies on a char boundary of the block text.
    pub(crate) fn is_char_boundary(&self, offset: usize) -> bool {
        let mut cursor = 0;
        for run in &self.runs {
            let end = cursor + run.text.len();
            if offset <= end {
                return run.text.is_char_boundary(offset - cursor);
            }
            cursor = end;
        }
        offset == cursor
    }

    /// Style set governing a caret at `offset`: the style of the char before
    /// the caret, or of the first char when the caret sits at block start.
    pub(crate) fn styles_at_caret(&self, offset: usize) -> StyleSet {
        if self.is_empty() {
            return StyleSet::EMPTY;
        }
        let probe = if offset > 0 { offset - 1 } else { 0 };
        let mut cursor = 0;
        for run in &self.runs {
            let end = cursor + run.text.len();
            if probe < end {
                return run.styles;
            }
            cursor = end;
        }
        self.runs.last().map(|r| r.styles).unwrap_or(StyleSet::EMPTY)
    }

    /// Intersection of the style sets of every run slice overlapping `range`,
    /// or `None` when the range covers no text.
    pub(crate) fn styles_intersection_in(&self, range: Range<usize>) -> Option<StyleSet> {
        let mut acc: Option<StyleSet> = None;
        let mut cursor = 0;
        for run in &self.runs {
            let end = cursor + run.text.len();
            if range.start.max(cursor) < range.end.min(end) {
                acc = Some(match acc {
                    Some(set) => set.intersection(run.styles),
                    None => run.styles,
                });
            }
            cursor = end;
        }
        acc
    }

    /// Rewrite the style set of every run slice within `range`, splitting
    /// runs at the range boundaries and re-merging afterwards.
    pub(crate) fn map_styles_in(&mut self, range: Range<usize>, f: impl Fn(StyleSet) -> StyleSet) {
        let mut out = Vec::with_capacity(self.runs.len() + 2);
        let mut cursor = 0;
        for run in &self.runs {
            let end = cursor + run.text.len();
            let overlap_start = range.start.max(cursor);
            let overlap_end = range.end.min(end);
            if overlap_start >= overlap_end {
                out.push(run.clone());
            } else {
                let local = (overlap_start - cursor)..(overlap_end - cursor);
                if local.start > 0 {
                    out.push(Run::new(&run.text[..local.start], run.styles));
                }
                out.push(Run::new(&run.text[local.clone()], f(run.styles)));
                if local.end < run.text.len() {
                    out.push(Run::new(&run.text[local.end..], run.styles));
                }
            }
            cursor = end;
        }
        self.runs = out;
        self.normalize();
    }

    /// Insert `text` at `offset` as a run styled with `styles`.
    pub(crate) fn insert_text(&mut self, offset: usize, text: &str, styles: StyleSet) {
        let mut out = Vec::with_capacity(self.runs.len() + 2);
        let mut cursor = 0;
        let mut inserted = false;
        for run in &self.runs {
            let end = cursor + run.text.len();
            if !inserted && offset >= cursor && offset <= end {
                let local = offset - cursor;
                if local > 0 {
                    out.push(Run::new(&run.text[..local], run.styles));
                }
                out.push(Run::new(text, styles));
                if local < run.text.len() {
                    out.push(Run::new(&run.text[local..], run.styles));
                }
                inserted = true;
            } else {
                out.push(run.clone());
            }
            cursor = end;
        }
        if !inserted {
            out.push(Run::new(text, styles));
        }
        self.runs = out;
        self.normalize();
    }

    /// Delete the text within `range`.
    pub(crate) fn remove_range(&mut self, range: Range<usize>) {
        let mut out = Vec::with_capacity(self.runs.len());
        let mut cursor = 0;
        for run in &self.runs {
            let end = cursor + run.text.len();
            let overlap_start = range.start.max(cursor);
            let overlap_end = range.end.min(end);
            if overlap_start >= overlap_end {
                out.push(run.clone());
            } else {
                let local = (overlap_start - cursor)..(overlap_end - cursor);
                let mut kept = String::new();
                kept.push_str(&run.text[..local.start]);
                kept.push_str(&run.text[local.end..]);
                out.push(Run::new(kept, run.styles));
            }
            cursor = end;
        }
        self.runs = out;
        self.normalize();
    }

    /// Split at `offset` into the existing block (keeping its key) and a
    /// successor carrying the remaining runs. Kind and depth carry over;
    /// the command layer decides the successor's final kind.
    pub(crate) fn split_at(&mut self, offset: usize) -> Block {
        let mut head = Vec::new();
        let mut tail = Vec::new();
        let mut cursor = 0;
        for run in &self.runs {
            let end = cursor + run.text.len();
            if end <= offset {
                head.push(run.clone());
            } else if cursor >= offset {
                tail.push(run.clone());
            } else {
                let local = offset - cursor;
                head.push(Run::new(&run.text[..local], run.styles));
                tail.push(Run::new(&run.text[local..], run.styles));
            }
            cursor = end;
        }
        self.runs = head;
        self.normalize();
        let mut successor = Block {
            key: BlockKey::new(),
            kind: self.kind,
            depth: self.depth,
            runs: tail,
        };
        successor.normalize();
        successor
    }

    /// Append another block's runs onto this one.
    pub(crate) fn merge_tail(&mut self, tail: &Block) {
        self.runs.extend(tail.runs.iter().cloned());
        self.normalize();
    }

    /// Restore the run invariants: drop empty runs, merge adjacent runs with
    /// identical style sets, keep at least one run.
    pub(crate) fn normalize(&mut self) {
        let mut out: Vec<Run> = Vec::with_capacity(self.runs.len());
        for run in self.runs.drain(..) {
            if run.text.is_empty() {
                continue;
            }
            match out.last_mut() {
                Some(prev) if prev.styles == run.styles => prev.text.push_str(&run.text),
                _ => out.push(run),
            }
        }
        if out.is_empty() {
            out.push(Run::empty());
        }
        self.runs = out;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::style::InlineStyle;
    use pretty_assertions::assert_eq;

    fn styled(text: &str, styles: &[InlineStyle]) -> Run {
        Run::new(text, StyleSet::of(styles))
    }

    // ============ Normalization tests ============

    #[test]
    fn test_normalize_merges_adjacent_identical_styles() {
        let block = Block::from_runs(
            BlockType::Paragraph,
            vec![styled("hel", &[]), styled("lo", &[])],
        );

        assert_eq!(block.runs().len(), 1);
        assert_eq!(block.text(), "hello");
    }

    #[test]
    fn test_normalize_drops_empty_runs() {
        let block = Block::from_runs(
            BlockType::Paragraph,
            vec![
                styled("a", &[InlineStyle::Bold]),
                styled("", &[]),
                styled("b", &[InlineStyle::Bold]),
            ],
        );

        // Empty run removed, surrounding identical runs merged
        assert_eq!(block.runs().len(), 1);
        assert_eq!(block.text(), "ab");
    }

    #[test]
    fn test_normalize_keeps_one_empty_run() {
        let block = Block::from_runs(BlockType::Paragraph, vec![]);

        assert_eq!(block.runs().len(), 1);
        assert!(block.is_empty());
    }

    // ============ Run surgery tests ============

    #[test]
    fn test_map_styles_splits_at_boundaries() {
        let mut block = Block::from_runs(BlockType::Paragraph, vec![styled("hello world", &[])]);

        block.map_styles_in(0..5, |s| s.with(InlineStyle::Bold));

        assert_eq!(
            block.runs(),
            &[
                styled("hello", &[InlineStyle::Bold]),
                styled(" world", &[]),
            ]
        );
    }

    #[test]
    fn test_map_styles_remerges_after_removal() {
        let mut block = Block::from_runs(
            BlockType::Paragraph,
            vec![styled("hello", &[InlineStyle::Bold]), styled(" world", &[])],
        );

        block.map_styles_in(0..5, |s| s.without(InlineStyle::Bold));

        assert_eq!(block.runs(), &[styled("hello world", &[])]);
    }

    #[test]
    fn test_insert_text_mid_run() {
        let mut block = Block::from_runs(BlockType::Paragraph, vec![styled("held", &[])]);

        block.insert_text(3, "lo wor", StyleSet::EMPTY);

        assert_eq!(block.text(), "hello world");
        assert_eq!(block.runs().len(), 1);
    }

    #[test]
    fn test_insert_styled_text_creates_run() {
        let mut block = Block::from_runs(BlockType::Paragraph, vec![styled("ac", &[])]);

        block.insert_text(1, "b", StyleSet::of(&[InlineStyle::Code]));

        assert_eq!(
            block.runs(),
            &[
                styled("a", &[]),
                styled("b", &[InlineStyle::Code]),
                styled("c", &[]),
            ]
        );
    }

    #[test]
    fn test_remove_range_across_runs() {
        let mut block = Block::from_runs(
            BlockType::Paragraph,
            vec![styled("hello ", &[InlineStyle::Bold]), styled("world", &[])],
        );

        block.remove_range(4..8);

        assert_eq!(
            block.runs(),
            &[styled("hell", &[InlineStyle::Bold]), styled("rld", &[])]
        );
    }

    #[test]
    fn test_split_at_keeps_styles_on_both_sides() {
        let mut block =
            Block::from_runs(BlockType::OrderedItem, vec![styled("hello", &[InlineStyle::Italic])]);
        block.depth = 2;

        let tail = block.split_at(2);

        assert_eq!(block.text(), "he");
        assert_eq!(tail.text(), "llo");
        assert_eq!(tail.kind, BlockType::OrderedItem);
        assert_eq!(tail.depth, 2);
        assert_ne!(block.key(), tail.key());
        assert_eq!(tail.runs()[0].styles, StyleSet::of(&[InlineStyle::Italic]));
    }

    #[test]
    fn test_merge_tail_restores_merge_invariant() {
        let mut head = Block::from_runs(BlockType::Paragraph, vec![styled("foo", &[])]);
        let tail = Block::from_runs(BlockType::Quote, vec![styled("bar", &[])]);

        head.merge_tail(&tail);

        assert_eq!(head.runs(), &[styled("foobar", &[])]);
        assert_eq!(head.kind, BlockType::Paragraph);
    }

    // ============ Caret style tests ============

    #[test]
    fn test_styles_at_caret_uses_char_before() {
        let block = Block::from_runs(
            BlockType::Paragraph,
            vec![styled("ab", &[InlineStyle::Bold]), styled("cd", &[])],
        );

        assert_eq!(block.styles_at_caret(2), StyleSet::of(&[InlineStyle::Bold]));
        assert_eq!(block.styles_at_caret(3), StyleSet::EMPTY);
    }

    #[test]
    fn test_styles_at_caret_block_start_uses_first_char() {
        let block = Block::from_runs(BlockType::Paragraph, vec![styled("x", &[InlineStyle::Code])]);

        assert_eq!(block.styles_at_caret(0), StyleSet::of(&[InlineStyle::Code]));
    }

    #[test]
    fn test_styles_at_caret_empty_block() {
        let block = Block::empty(BlockType::Paragraph);

        assert_eq!(block.styles_at_caret(0), StyleSet::EMPTY);
    }

    #[test]
    fn test_styles_intersection_in_range() {
        let block = Block::from_runs(
            BlockType::Paragraph,
            vec![
                styled("ab", &[InlineStyle::Bold, InlineStyle::Italic]),
                styled("cd", &[InlineStyle::Bold]),
            ],
        );

        assert_eq!(
            block.styles_intersection_in(0..4),
            Some(StyleSet::of(&[InlineStyle::Bold]))
        );
        assert_eq!(
            block.styles_intersection_in(0..2),
            Some(StyleSet::of(&[InlineStyle::Bold, InlineStyle::Italic]))
        );
        assert_eq!(block.styles_intersection_in(2..2), None);
    }
}
