//! Segment tree produced by the inline parser.
//!
//! A parse yields an ordered sequence of [`Segment`]s. Segments at one level
//! are contiguous and never overlap; nesting forms a strict tree.
//!
//! - **Zero-copy**: text borrows from the input unless an escape was removed
//! - **Span-tracked**: every node records the source range it came from

use crate::span::Span;

/// Borrowed or owned string type for zero-copy parsing.
pub type CowStr<'a> = std::borrow::Cow<'a, str>;

/// A node of the parsed inline tree.
///
/// Dropping a tree is iterative. The optional `Serialize` impl is derived
/// and recurses once per nesting level.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(tag = "type", rename_all = "kebab-case")
)]
pub enum Segment<'a> {
    /// Literal text, already unescaped.
    Text(Text<'a>),
    /// Strong emphasis (`**bold**` or `__bold__`).
    Strong(Strong<'a>),
    /// Emphasis (`*italic*` or `_italic_`).
    Emphasis(Emphasis<'a>),
    /// Full (`[text][ref]`) or shortcut (`[ref]`) reference link.
    ReferenceLink(ReferenceLink<'a>),
}

/// Literal text.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Text<'a> {
    /// Text with escaping backslashes removed.
    pub content: CowStr<'a>,
    /// Raw source range, escapes included.
    pub span: Span,
}

/// Strong emphasis.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Strong<'a> {
    pub content: Vec<Segment<'a>>,
    pub span: Span,
}

/// Emphasis.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Emphasis<'a> {
    pub content: Vec<Segment<'a>>,
    pub span: Span,
}

/// Reference link.
///
/// For the shortcut form `[ref]` the content is the parsed reference text.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ReferenceLink<'a> {
    /// Parsed link text.
    pub content: Vec<Segment<'a>>,
    /// Reference key, verbatim from the source (escapes are kept).
    pub reference: CowStr<'a>,
    /// Source range from the opening `[` to the final `]`.
    pub span: Span,
}

impl<'a> Segment<'a> {
    /// Child segments; empty for [`Segment::Text`].
    pub fn content(&self) -> &[Segment<'a>] {
        match self {
            Segment::Text(_) => &[],
            Segment::Strong(s) => &s.content,
            Segment::Emphasis(e) => &e.content,
            Segment::ReferenceLink(l) => &l.content,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Segment::Text(t) => t.span,
            Segment::Strong(s) => s.span,
            Segment::Emphasis(e) => e.span,
            Segment::ReferenceLink(l) => l.span,
        }
    }

    /// Literal text of this subtree with all markup dropped.
    pub fn plain_text(&self) -> String {
        plain_text(std::slice::from_ref(self))
    }
}

impl Drop for Segment<'_> {
    /// Tear the subtree down with a work list, so that dropping a deeply
    /// nested tree does not recurse once per level.
    fn drop(&mut self) {
        let mut pending = self.take_children();
        while let Some(mut segment) = pending.pop() {
            pending.append(&mut segment.take_children());
        }
    }
}

impl Segment<'_> {
    fn take_children(&mut self) -> Vec<Self> {
        match self {
            Segment::Text(_) => Vec::new(),
            Segment::Strong(s) => std::mem::take(&mut s.content),
            Segment::Emphasis(e) => std::mem::take(&mut e.content),
            Segment::ReferenceLink(l) => std::mem::take(&mut l.content),
        }
    }
}

/// Concatenate the literal text of `segments`, depth-first.
pub fn plain_text(segments: &[Segment<'_>]) -> String {
    let mut out = String::new();
    // Reversed so that popping yields document order.
    let mut pending: Vec<&Segment<'_>> = segments.iter().rev().collect();

    while let Some(segment) = pending.pop() {
        match segment {
            Segment::Text(t) => out.push_str(&t.content),
            other => pending.extend(other.content().iter().rev()),
        }
    }

    out
}
