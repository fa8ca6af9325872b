//! Inline parsing pipeline.
//!
//! Scanning stages produce flat match lists; the tree builder then nests
//! them into [`Segment`]s:
//!
//! 1. reference links ([`crate::links`])
//! 2. delimiter runs, partitioned into blocks ([`crate::delimiter`])
//! 3. strong/emphasis matches per block ([`crate::emphasis`])
//! 4. one sorted pass that nests matches and slices the literal text between
//!    them
//!
//! Nothing here recurses on the input's nesting depth.

use crate::ast::{Emphasis, ReferenceLink, Segment, Strong, Text};
use crate::delimiter::scan_delimiters;
use crate::emphasis::resolve_block;
use crate::escape::unescape;
use crate::links::{scan_reference_links, LinkMatch};
use crate::span::Span;

/// What a match turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MatchKind<'a> {
    Strong,
    Emphasis,
    /// Carries the raw reference key.
    ReferenceLink(&'a str),
}

/// A resolved piece of markup, in byte offsets of the parsed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Match<'a> {
    pub kind: MatchKind<'a>,
    pub start: usize,
    pub end: usize,
    /// Width of the opening marker; inner text starts at
    /// `start + marker_width`.
    pub marker_width: usize,
    /// End of the inner text.
    pub inner_end: usize,
}

impl<'a> From<&LinkMatch<'a>> for Match<'a> {
    fn from(link: &LinkMatch<'a>) -> Self {
        Self {
            kind: MatchKind::ReferenceLink(link.reference),
            start: link.start,
            end: link.end,
            marker_width: 1,
            inner_end: link.inner_end,
        }
    }
}

/// Parse `text` into segments.
pub fn parse_segments(text: &str) -> Vec<Segment<'_>> {
    if text.is_empty() {
        return Vec::new();
    }

    let matches = collect_matches(text);
    build_tree(text, matches)
}

/// Run the scanning stages and return every match sorted by start offset.
pub(crate) fn collect_matches(text: &str) -> Vec<Match<'_>> {
    let links = scan_reference_links(text);
    let blocks = scan_delimiters(text, &links);

    let mut matches: Vec<Match<'_>> = links.iter().map(Match::from).collect();
    for block in blocks.into_blocks() {
        resolve_block(&block, &mut matches);
    }

    // Stable, so equal starts keep scan order.
    matches.sort_by_key(|m| m.start);

    log::trace!(
        "inline scan: {} bytes, {} reference links, {} matches",
        text.len(),
        links.len(),
        matches.len()
    );

    matches
}

/// An unfinished segment while building the tree.
struct Frame<'a> {
    /// `None` for the root.
    kind: Option<MatchKind<'a>>,
    start: usize,
    end: usize,
    inner_end: usize,
    /// Next offset not yet covered by a child.
    cursor: usize,
    children: Vec<Segment<'a>>,
}

impl<'a> Frame<'a> {
    fn root(len: usize) -> Self {
        Self {
            kind: None,
            start: 0,
            end: len,
            inner_end: len,
            cursor: 0,
            children: Vec::new(),
        }
    }

    fn open(m: &Match<'a>) -> Self {
        Self {
            kind: Some(m.kind),
            start: m.start,
            end: m.end,
            inner_end: m.inner_end,
            cursor: m.start + m.marker_width,
            children: Vec::new(),
        }
    }

    /// Append the literal text `self.cursor..to`, if any.
    fn push_text(&mut self, text: &'a str, to: usize) {
        if self.cursor < to {
            self.children.push(Segment::Text(Text {
                content: unescape(&text[self.cursor..to]),
                span: Span::from_range(self.cursor, to),
            }));
        }
        self.cursor = to;
    }

    /// Close the frame into a segment. `None` for the root.
    fn finish(mut self, text: &'a str) -> Option<Segment<'a>> {
        let kind = self.kind?;
        self.push_text(text, self.inner_end);

        let span = Span::from_range(self.start, self.end);
        let content = self.children;

        Some(match kind {
            MatchKind::Strong => Segment::Strong(Strong { content, span }),
            MatchKind::Emphasis => Segment::Emphasis(Emphasis { content, span }),
            MatchKind::ReferenceLink(reference) => Segment::ReferenceLink(ReferenceLink {
                content,
                reference: reference.into(),
                span,
            }),
        })
    }
}

/// Nest sorted `matches` into a segment tree using an explicit frame stack.
pub(crate) fn build_tree<'a>(text: &'a str, matches: Vec<Match<'a>>) -> Vec<Segment<'a>> {
    let mut stack = vec![Frame::root(text.len())];

    for m in &matches {
        while stack.len() > 1 && m.end > stack[stack.len() - 1].end {
            close_top(text, &mut stack);
        }

        let Some(top) = stack.last_mut() else {
            break;
        };

        // Partial overlap with an emitted sibling or the frame's tail.
        if m.start < top.cursor || m.end > top.inner_end {
            log::trace!("dropping overlapping match at {}..{}", m.start, m.end);
            continue;
        }

        top.push_text(text, m.start);
        stack.push(Frame::open(m));
    }

    while stack.len() > 1 {
        close_top(text, &mut stack);
    }

    let mut root = stack.pop().unwrap_or_else(|| Frame::root(text.len()));
    root.push_text(text, text.len());
    root.children
}

fn close_top<'a>(text: &'a str, stack: &mut Vec<Frame<'a>>) {
    let Some(frame) = stack.pop() else {
        return;
    };
    let end = frame.end;

    if let (Some(segment), Some(parent)) = (frame.finish(text), stack.last_mut()) {
        parent.children.push(segment);
        parent.cursor = end;
    }
}
