//! Ordered content extraction: container node → flat block sequence.
//!
//! Top-level children are classified one by one. A block quote is descended
//! exactly once: every element below it is classified by its own tag with
//! quote semantics, so nested structure (including quotes inside quotes) is
//! flattened into the parent sequence at the quote's position.

use qaharvest_shared::ContentBlock;

use crate::normalize::normalize;
use crate::tree::{Node, Tag};

/// Classify the direct children of `container` into blocks, in document order.
///
/// Unknown tags, blank text and missing image sources emit nothing.
pub fn extract(container: &Node) -> Vec<ContentBlock> {
    let mut blocks = Vec::new();
    for child in &container.children {
        classify_top_level(child, &mut blocks);
    }
    blocks
}

fn classify_top_level(node: &Node, out: &mut Vec<ContentBlock>) {
    match node.kind() {
        Tag::Paragraph | Tag::Division => {
            if let Some(text) = prose(node) {
                out.push(ContentBlock::Text { value: text });
            }
        }
        Tag::BlockQuote => {
            for descendant in node.descendants() {
                classify_quoted(descendant, out);
            }
        }
        Tag::Preformatted => out.extend(code(node)),
        Tag::Image => out.extend(image(node)),
        Tag::Other => {}
    }
}

/// Quote-descendant rules: prose becomes `Quoted`, everything else as top level.
/// Block quotes found here contribute nothing themselves; the caller's
/// descendant walk already visits their contents.
fn classify_quoted(node: &Node, out: &mut Vec<ContentBlock>) {
    match node.kind() {
        Tag::Paragraph | Tag::Division => {
            if let Some(text) = prose(node) {
                out.push(ContentBlock::Quoted { value: text });
            }
        }
        Tag::Preformatted => out.extend(code(node)),
        Tag::Image => out.extend(image(node)),
        Tag::BlockQuote | Tag::Other => {}
    }
}

fn prose(node: &Node) -> Option<String> {
    let text = normalize(node.text.as_str());
    (!text.is_empty()).then_some(text)
}

/// Code keeps its inner layout; only the ends are trimmed.
fn code(node: &Node) -> Option<ContentBlock> {
    let text = node.text.trim();
    (!text.is_empty()).then(|| ContentBlock::code(text))
}

fn image(node: &Node) -> Option<ContentBlock> {
    node.attr("src")
        .filter(|src| !src.trim().is_empty())
        .map(ContentBlock::image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regroup::regroup;

    fn p(text: &str) -> Node {
        Node::new("p").with_text(text)
    }

    fn quote(children: impl IntoIterator<Item = Node>) -> Node {
        let children: Vec<Node> = children.into_iter().collect();
        let text = children.iter().map(|c| c.text.as_str()).collect::<Vec<_>>().join("\n");
        Node::new("blockquote").with_text(text).with_children(children)
    }

    fn container(children: impl IntoIterator<Item = Node>) -> Node {
        Node::new("div").with_children(children)
    }

    #[test]
    fn mixed_children_keep_document_order() {
        let body = container([
            p("Hello   world"),
            Node::new("pre").with_text("x=1\n y=2"),
            Node::new("img").with_attr("src", "a.png"),
        ]);

        assert_eq!(
            extract(&body),
            vec![
                ContentBlock::text("Hello world"),
                ContentBlock::code("x=1\n y=2"),
                ContentBlock::image("a.png"),
            ]
        );
    }

    #[test]
    fn quote_then_paragraph() {
        let body = container([quote([p("q1"), p("q2")]), p("after")]);

        let blocks = extract(&body);
        assert_eq!(
            blocks,
            vec![
                ContentBlock::quoted("q1"),
                ContentBlock::quoted("q2"),
                ContentBlock::text("after"),
            ]
        );

        assert_eq!(
            regroup(blocks),
            vec![
                ContentBlock::QuotedGroup {
                    lines: vec!["q1".into(), "q2".into()]
                },
                ContentBlock::text("after"),
            ]
        );
    }

    #[test]
    fn separated_quotes_stay_separate() {
        let body = container([quote([p("q1")]), p("mid"), quote([p("q2")])]);

        assert_eq!(
            regroup(extract(&body)),
            vec![
                ContentBlock::QuotedGroup {
                    lines: vec!["q1".into()]
                },
                ContentBlock::text("mid"),
                ContentBlock::QuotedGroup {
                    lines: vec!["q2".into()]
                },
            ]
        );
    }

    #[test]
    fn quote_descendants_keep_their_own_kinds() {
        let body = container([quote([
            p("see this"),
            Node::new("pre").with_text("  SELECT 1  "),
            Node::new("img").with_attr("src", "q.png"),
        ])]);

        assert_eq!(
            extract(&body),
            vec![
                ContentBlock::quoted("see this"),
                ContentBlock::code("SELECT 1"),
                ContentBlock::image("q.png"),
            ]
        );
    }

    #[test]
    fn nested_quotes_are_flattened_one_level() {
        let inner = quote([p("inner")]);
        let body = container([quote([p("outer"), inner])]);

        assert_eq!(
            extract(&body),
            vec![ContentBlock::quoted("outer"), ContentBlock::quoted("inner")]
        );
    }

    #[test]
    fn wrapper_div_inside_quote_emits_its_own_text_and_its_children() {
        let wrapper = Node::new("div").with_text("a\nb").with_children([p("a"), p("b")]);
        let body = container([quote([wrapper])]);

        assert_eq!(
            extract(&body),
            vec![
                ContentBlock::quoted("a b"),
                ContentBlock::quoted("a"),
                ContentBlock::quoted("b"),
            ]
        );
    }

    #[test]
    fn blank_and_unknown_children_emit_nothing() {
        let body = container([
            p("   \n\t "),
            Node::new("pre").with_text("\n   \n"),
            Node::new("img"),
            Node::new("img").with_attr("src", "  "),
            Node::new("ul").with_text("list item"),
            Node::new("h2").with_text("heading"),
            quote([Node::new("span").with_text("ignored")]),
        ]);

        assert!(extract(&body).is_empty());
    }

    #[test]
    fn empty_container() {
        assert!(extract(&Node::new("div")).is_empty());
    }

    #[test]
    fn code_preserves_internal_whitespace() {
        let body = container([Node::new("pre").with_text("\n  if x:\n      y()\n\n")]);
        assert_eq!(extract(&body), vec![ContentBlock::code("if x:\n      y()")]);
    }

    #[test]
    fn sibling_order_is_preserved_across_many_children() {
        let children: Vec<Node> = (0..20)
            .map(|i| match i % 3 {
                0 => p(&format!("t{i}")),
                1 => Node::new("pre").with_text(format!("c{i}")),
                _ => Node::new("img").with_attr("src", format!("i{i}.png")),
            })
            .collect();

        let blocks = extract(&container(children));
        assert_eq!(blocks.len(), 20);
        for (i, block) in blocks.iter().enumerate() {
            let expected = match i % 3 {
                0 => ContentBlock::text(format!("t{i}")),
                1 => ContentBlock::code(format!("c{i}")),
                _ => ContentBlock::image(format!("i{i}.png")),
            };
            assert_eq!(block, &expected);
        }
    }

    #[test]
    fn uppercase_tags_are_recognised() {
        let body = container([Node::new("P").with_text("shout")]);
        assert_eq!(extract(&body), vec![ContentBlock::text("shout")]);
    }
}
