//! Deterministic HTML rendering of a document.
//!
//! Conventions (fixed so identical documents yield byte-identical output):
//! - block tags: `<p>`, `<h1>`..`<h6>`, `<blockquote>`; contiguous list
//!   items of one kind group into a single `<ul>`/`<ol>`, with deeper
//!   items nested inside the preceding item's `<li>`;
//! - inline tags nest outermost-first as `<b>`, `<i>`, `<u>`, `<code>`;
//! - text content is escaped (`&`, `<`, `>`, `"`, `'`), tags are not.

use crate::editing::block::{Block, BlockType};
use crate::editing::document::Document;
use crate::editing::style::InlineStyle;

/// Blocks grouped the way HTML wants them: single elements, or contiguous
/// list items of one kind gathered under a shared wrapper.
enum ContentGroup<'a> {
    Single(&'a Block),
    BulletList(Vec<ListNode<'a>>),
    NumberedList(Vec<ListNode<'a>>),
}

/// A list item with its deeper-nested successors attached as children.
struct ListNode<'a> {
    block: &'a Block,
    children: Vec<ListNode<'a>>,
}

/// Render the document to an HTML string.
pub fn render_html(doc: &Document) -> String {
    let mut out = String::new();
    for group in group_blocks(doc.blocks()) {
        match group {
            ContentGroup::Single(block) => render_single(block, &mut out),
            ContentGroup::BulletList(nodes) => render_list(&nodes, "ul", &mut out),
            ContentGroup::NumberedList(nodes) => render_list(&nodes, "ol", &mut out),
        }
    }
    out
}

fn group_blocks(blocks: &[Block]) -> Vec<ContentGroup<'_>> {
    let mut groups = Vec::new();
    let mut index = 0;
    while index < blocks.len() {
        let kind = blocks[index].kind;
        if kind.is_list_item() {
            let mut end = index;
            while end < blocks.len() && blocks[end].kind == kind {
                end += 1;
            }
            let items: Vec<&Block> = blocks[index..end].iter().collect();
            let nodes = build_list_nodes(&items);
            groups.push(match kind {
                BlockType::UnorderedItem => ContentGroup::BulletList(nodes),
                _ => ContentGroup::NumberedList(nodes),
            });
            index = end;
        } else {
            groups.push(ContentGroup::Single(&blocks[index]));
            index += 1;
        }
    }
    groups
}

/// Turn a flat run of list items into a tree keyed on depth. Items deeper
/// than their predecessor nest under it; a leading over-deep run is lifted
/// to sibling level rather than dropped.
fn build_list_nodes<'a>(items: &[&'a Block]) -> Vec<ListNode<'a>> {
    let Some(min_depth) = items.iter().map(|b| b.depth).min() else {
        return Vec::new();
    };
    let mut nodes = Vec::new();
    let mut index = 0;
    while index < items.len() {
        let mut end = index + 1;
        while end < items.len() && items[end].depth > min_depth {
            end += 1;
        }
        if items[index].depth == min_depth {
            nodes.push(ListNode {
                block: items[index],
                children: build_list_nodes(&items[index + 1..end]),
            });
        } else {
            nodes.extend(build_list_nodes(&items[index..end]));
        }
        index = end;
    }
    nodes
}

fn render_single(block: &Block, out: &mut String) {
    let tag = match block.kind {
        BlockType::Paragraph => "p".to_string(),
        BlockType::Heading { level } => format!("h{}", level.clamp(1, 6)),
        BlockType::Quote => "blockquote".to_string(),
        // Lone list items reaching here are already grouped; unreachable in
        // practice but kept total.
        BlockType::UnorderedItem | BlockType::OrderedItem => "li".to_string(),
    };
    out.push_str(&format!("<{tag}>"));
    render_runs(block, out);
    out.push_str(&format!("</{tag}>"));
}

fn render_list(nodes: &[ListNode<'_>], tag: &str, out: &mut String) {
    out.push_str(&format!("<{tag}>"));
    for node in nodes {
        out.push_str("<li>");
        render_runs(node.block, out);
        if !node.children.is_empty() {
            render_list(&node.children, tag, out);
        }
        out.push_str("</li>");
    }
    out.push_str(&format!("</{tag}>"));
}

fn render_runs(block: &Block, out: &mut String) {
    for run in block.runs() {
        if run.text.is_empty() {
            continue;
        }
        let mut open = Vec::new();
        for style in InlineStyle::ALL {
            if run.styles.contains(style) {
                open.push(inline_tag(style));
            }
        }
        for tag in &open {
            out.push_str(&format!("<{tag}>"));
        }
        out.push_str(&html_escape::encode_safe(&run.text));
        for tag in open.iter().rev() {
            out.push_str(&format!("</{tag}>"));
        }
    }
}

fn inline_tag(style: InlineStyle) -> &'static str {
    match style {
        InlineStyle::Bold => "b",
        InlineStyle::Italic => "i",
        InlineStyle::Underline => "u",
        InlineStyle::Code => "code",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::commands::Cmd;
    use crate::editing::document::{Point, Selection};
    use rstest::rstest;

    fn bold_hello() -> Document {
        let doc = Document::new()
            .apply(Cmd::InsertText("hello".to_string()))
            .unwrap();
        let doc = doc
            .with_selection(Selection::new(Point::new(0, 0), Point::new(0, 5)))
            .unwrap();
        doc.apply(Cmd::ToggleInlineStyle(InlineStyle::Bold)).unwrap()
    }

    // ============ Block tag tests ============

    #[test]
    fn test_empty_document_renders_empty_paragraph() {
        insta::assert_snapshot!(render_html(&Document::new()), @"<p></p>");
    }

    #[test]
    fn test_bold_run_in_paragraph() {
        insta::assert_snapshot!(render_html(&bold_hello()), @"<p><b>hello</b></p>");
    }

    #[rstest]
    #[case(1, "<h1>title</h1>")]
    #[case(3, "<h3>title</h3>")]
    #[case(6, "<h6>title</h6>")]
    fn test_heading_levels(#[case] level: u8, #[case] expected: &str) {
        let doc = Document::new()
            .apply(Cmd::ToggleBlockType(BlockType::Heading { level }))
            .unwrap()
            .apply(Cmd::InsertText("title".to_string()))
            .unwrap();

        assert_eq!(render_html(&doc), expected);
    }

    #[test]
    fn test_blockquote() {
        let doc = Document::new()
            .apply(Cmd::ToggleBlockType(BlockType::Quote))
            .unwrap()
            .apply(Cmd::InsertText("wise words".to_string()))
            .unwrap();

        insta::assert_snapshot!(render_html(&doc), @"<blockquote>wise words</blockquote>");
    }

    // ============ Inline style tests ============

    #[test]
    fn test_inline_nesting_order_is_fixed() {
        let doc = bold_hello();
        let doc = doc
            .with_selection(Selection::new(Point::new(0, 0), Point::new(0, 5)))
            .unwrap()
            .apply(Cmd::ToggleInlineStyle(InlineStyle::Code))
            .unwrap();

        insta::assert_snapshot!(render_html(&doc), @"<p><b><code>hello</code></b></p>");
    }

    #[test]
    fn test_mixed_runs_in_one_paragraph() {
        let doc = Document::new()
            .apply(Cmd::InsertText("plain bold".to_string()))
            .unwrap();
        let doc = doc
            .with_selection(Selection::new(Point::new(0, 6), Point::new(0, 10)))
            .unwrap()
            .apply(Cmd::ToggleInlineStyle(InlineStyle::Bold))
            .unwrap();

        insta::assert_snapshot!(render_html(&doc), @"<p>plain <b>bold</b></p>");
    }

    // ============ List grouping tests ============

    #[test]
    fn test_contiguous_list_items_share_wrapper() {
        let doc = Document::new()
            .apply(Cmd::ToggleBlockType(BlockType::UnorderedItem))
            .unwrap()
            .apply(Cmd::InsertText("one\ntwo".to_string()))
            .unwrap();

        insta::assert_snapshot!(render_html(&doc), @"<ul><li>one</li><li>two</li></ul>");
    }

    #[test]
    fn test_nested_list_items_nest_inside_parent_li() {
        let doc = Document::new()
            .apply(Cmd::ToggleBlockType(BlockType::OrderedItem))
            .unwrap()
            .apply(Cmd::InsertText("parent\nchild".to_string()))
            .unwrap()
            .apply(Cmd::IndentListItem)
            .unwrap();

        insta::assert_snapshot!(
            render_html(&doc),
            @"<ol><li>parent<ol><li>child</li></ol></li></ol>"
        );
    }

    #[test]
    fn test_list_kind_change_breaks_group() {
        let doc = Document::new()
            .apply(Cmd::ToggleBlockType(BlockType::UnorderedItem))
            .unwrap()
            .apply(Cmd::InsertText("a\nb".to_string()))
            .unwrap()
            .apply(Cmd::ToggleBlockType(BlockType::OrderedItem))
            .unwrap();

        insta::assert_snapshot!(render_html(&doc), @"<ul><li>a</li></ul><ol><li>b</li></ol>");
    }

    #[test]
    fn test_paragraph_between_lists_splits_them() {
        let doc = Document::new()
            .apply(Cmd::ToggleBlockType(BlockType::UnorderedItem))
            .unwrap()
            .apply(Cmd::InsertText("a\nb\nc".to_string()))
            .unwrap();
        // Middle block back to paragraph
        let doc = doc
            .with_selection(Selection::caret(Point::new(1, 0)))
            .unwrap()
            .apply(Cmd::ToggleBlockType(BlockType::UnorderedItem))
            .unwrap();

        insta::assert_snapshot!(
            render_html(&doc),
            @"<ul><li>a</li></ul><p>b</p><ul><li>c</li></ul>"
        );
    }

    // ============ Escaping and determinism tests ============

    #[test]
    fn test_text_content_is_escaped() {
        let doc = Document::new()
            .apply(Cmd::InsertText("<script>alert(\"x & y\")</script>".to_string()))
            .unwrap();

        let html = render_html(&doc);

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("&amp;"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let doc = Document::new()
            .apply(Cmd::ToggleBlockType(BlockType::Heading { level: 2 }))
            .unwrap()
            .apply(Cmd::InsertText("title\nbody".to_string()))
            .unwrap();

        assert_eq!(render_html(&doc), render_html(&doc));
    }
}
