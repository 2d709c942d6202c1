use crate::editing::block::BlockType;
use crate::editing::document::Document;
use crate::editing::style::InlineStyle;

/// Catalog entry for a block-level formatting control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockControl {
    pub label: &'static str,
    pub kind: BlockType,
}

/// Catalog entry for an inline-style formatting control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InlineControl {
    pub label: &'static str,
    pub style: InlineStyle,
}

/// Derived on/off state of one control for UI binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlState {
    pub label: &'static str,
    pub active: bool,
}

/// Block-level controls offered by the toolbar.
pub const BLOCK_TYPES: [BlockControl; 9] = [
    BlockControl { label: "H1", kind: BlockType::Heading { level: 1 } },
    BlockControl { label: "H2", kind: BlockType::Heading { level: 2 } },
    BlockControl { label: "H3", kind: BlockType::Heading { level: 3 } },
    BlockControl { label: "H4", kind: BlockType::Heading { level: 4 } },
    BlockControl { label: "H5", kind: BlockType::Heading { level: 5 } },
    BlockControl { label: "H6", kind: BlockType::Heading { level: 6 } },
    BlockControl { label: "Blockquote", kind: BlockType::Quote },
    BlockControl { label: "UL", kind: BlockType::UnorderedItem },
    BlockControl { label: "OL", kind: BlockType::OrderedItem },
];

/// Inline-style controls offered by the toolbar.
pub const INLINE_STYLES: [InlineControl; 4] = [
    InlineControl { label: "Bold", style: InlineStyle::Bold },
    InlineControl { label: "Italic", style: InlineStyle::Italic },
    InlineControl { label: "Underline", style: InlineStyle::Underline },
    InlineControl { label: "Monospace", style: InlineStyle::Code },
];

/// State of every block control: active iff it matches the type of the
/// block at the selection start.
pub fn block_controls(doc: &Document) -> Vec<ControlState> {
    let current = doc.current_block_type();
    BLOCK_TYPES
        .iter()
        .map(|control| ControlState {
            label: control.label,
            active: control.kind == current,
        })
        .collect()
}

/// State of every inline control: active iff the style is in the style set
/// active at the selection.
pub fn inline_controls(doc: &Document) -> Vec<ControlState> {
    let current = doc.current_styles();
    INLINE_STYLES
        .iter()
        .map(|control| ControlState {
            label: control.label,
            active: current.contains(control.style),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::commands::Cmd;
    use crate::editing::document::{Point, Selection};
    use rstest::rstest;

    fn active_labels(states: &[ControlState]) -> Vec<&'static str> {
        states
            .iter()
            .filter(|s| s.active)
            .map(|s| s.label)
            .collect()
    }

    #[test]
    fn test_no_block_control_active_on_fresh_document() {
        let doc = Document::new();

        assert!(active_labels(&block_controls(&doc)).is_empty());
    }

    #[rstest]
    #[case(BlockType::Heading { level: 1 }, "H1")]
    #[case(BlockType::Heading { level: 6 }, "H6")]
    #[case(BlockType::Quote, "Blockquote")]
    #[case(BlockType::UnorderedItem, "UL")]
    #[case(BlockType::OrderedItem, "OL")]
    fn test_block_control_reflects_current_block(
        #[case] kind: BlockType,
        #[case] label: &'static str,
    ) {
        let doc = Document::new().apply(Cmd::ToggleBlockType(kind)).unwrap();

        assert_eq!(active_labels(&block_controls(&doc)), vec![label]);
    }

    #[test]
    fn test_inline_controls_reflect_selection_styles() {
        let doc = Document::new()
            .apply(Cmd::InsertText("hello".to_string()))
            .unwrap();
        let doc = doc
            .with_selection(Selection::new(Point::new(0, 0), Point::new(0, 5)))
            .unwrap();
        let doc = doc
            .apply(Cmd::ToggleInlineStyle(InlineStyle::Bold))
            .unwrap();
        let doc = doc
            .apply(Cmd::ToggleInlineStyle(InlineStyle::Code))
            .unwrap();

        assert_eq!(active_labels(&inline_controls(&doc)), vec!["Bold", "Monospace"]);
    }

    #[test]
    fn test_inline_controls_follow_caret_override() {
        let doc = Document::new()
            .apply(Cmd::ToggleInlineStyle(InlineStyle::Italic))
            .unwrap();

        assert_eq!(active_labels(&inline_controls(&doc)), vec!["Italic"]);
    }
}
