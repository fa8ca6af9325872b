//! Shared helpers for integration tests.
#![allow(dead_code)]

use marksome_core::{parse, Segment};

/// Span-free view of a segment tree, for compact expectations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(String),
    Strong(Vec<Node>),
    Emphasis(Vec<Node>),
    Link(Vec<Node>, String),
}

pub fn t(text: &str) -> Node {
    Node::Text(text.to_string())
}

pub fn strong(content: Vec<Node>) -> Node {
    Node::Strong(content)
}

pub fn em(content: Vec<Node>) -> Node {
    Node::Emphasis(content)
}

pub fn link(content: Vec<Node>, reference: &str) -> Node {
    Node::Link(content, reference.to_string())
}

pub fn shape(segments: &[Segment<'_>]) -> Vec<Node> {
    segments
        .iter()
        .map(|segment| match segment {
            Segment::Text(text) => Node::Text(text.content.to_string()),
            Segment::Strong(s) => Node::Strong(shape(&s.content)),
            Segment::Emphasis(e) => Node::Emphasis(shape(&e.content)),
            Segment::ReferenceLink(l) => Node::Link(shape(&l.content), l.reference.to_string()),
        })
        .collect()
}

#[track_caller]
pub fn assert_parses(input: &str, expected: Vec<Node>) {
    assert_eq!(shape(&parse(input)), expected, "input: {:?}", input);
}
