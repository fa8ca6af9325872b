//! Delimiter-run scanner.
//!
//! Finds maximal runs of `*` or `_`, classifies them as openers and/or
//! closers using the CommonMark flanking rules, and assigns each run to the
//! block it belongs to: the top level, or the inner text of one reference
//! link.

use memchr::memchr2;

use crate::escape::is_escaped;
use crate::links::LinkMatch;

/// Character class of a delimiter run's neighbour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CharClass {
    /// Unicode `White_Space` as tested by [`char::is_whitespace`] (this
    /// includes U+0085 but not U+FEFF), or no character at all.
    Whitespace,
    /// ASCII punctuation.
    Punctuation,
    Other,
}

impl CharClass {
    fn of(c: Option<char>) -> Self {
        match c {
            None => CharClass::Whitespace,
            Some(c) if c.is_whitespace() => CharClass::Whitespace,
            Some(c) if c.is_ascii_punctuation() => CharClass::Punctuation,
            Some(_) => CharClass::Other,
        }
    }
}

/// A delimiter run that can open and/or close emphasis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Delimiter {
    /// `*` or `_`.
    pub marker: u8,
    /// Offset of the first unconsumed marker.
    pub index: usize,
    /// Unconsumed markers left in the run.
    pub length: usize,
    pub can_open: bool,
    pub can_close: bool,
}

impl Delimiter {
    /// Classify the run at `index..index + length`. `None` if it can
    /// neither open nor close.
    fn classify(text: &str, marker: u8, index: usize, length: usize) -> Option<Self> {
        let prev = CharClass::of(text[..index].chars().next_back());
        let next = CharClass::of(text[index + length..].chars().next());

        let left_flanking = next == CharClass::Other
            || (next == CharClass::Punctuation && prev != CharClass::Other);
        let right_flanking = prev == CharClass::Other
            || (prev == CharClass::Punctuation && next != CharClass::Other);

        let (can_open, can_close) = if marker == b'_' {
            (
                left_flanking && (!right_flanking || prev == CharClass::Punctuation),
                right_flanking && (!left_flanking || next == CharClass::Punctuation),
            )
        } else {
            (left_flanking, right_flanking)
        };

        (can_open || can_close).then_some(Self {
            marker,
            index,
            length,
            can_open,
            can_close,
        })
    }

    /// Can both open and close.
    #[inline]
    pub fn is_both(&self) -> bool {
        self.can_open && self.can_close
    }
}

/// Delimiter runs partitioned by block.
///
/// Slot 0 is the top level; slot `i + 1` is the inner text of link `i`.
#[derive(Debug, Default)]
pub(crate) struct DelimiterBlocks {
    blocks: Vec<Vec<Delimiter>>,
}

impl DelimiterBlocks {
    fn new(link_count: usize) -> Self {
        Self {
            blocks: vec![Vec::new(); link_count + 1],
        }
    }

    #[cfg(test)]
    pub fn top_level(&self) -> &[Delimiter] {
        &self.blocks[0]
    }

    #[cfg(test)]
    pub fn link(&self, link: usize) -> &[Delimiter] {
        &self.blocks[link + 1]
    }

    pub fn into_blocks(self) -> impl Iterator<Item = Vec<Delimiter>> {
        self.blocks.into_iter()
    }
}

/// Where a run sits relative to the reference links.
enum Placement {
    TopLevel,
    Link(usize),
    /// In a link's `][ref]` tail; not renderable content.
    Discarded,
}

/// Scan `text` for delimiter runs. `links` must be ordered by start offset.
pub(crate) fn scan_delimiters(text: &str, links: &[LinkMatch<'_>]) -> DelimiterBlocks {
    let bytes = text.as_bytes();
    let mut blocks = DelimiterBlocks::new(links.len());
    let mut link_cursor = 0;
    let mut pos = 0;

    while let Some(offset) = memchr2(b'*', b'_', &bytes[pos..]) {
        let run_start = pos + offset;
        let marker = bytes[run_start];
        let run_end = bytes[run_start..]
            .iter()
            .position(|&b| b != marker)
            .map_or(bytes.len(), |len| run_start + len);
        pos = run_end;

        let mut index = run_start;
        if is_escaped(bytes, index) {
            // The escaped marker is literal; the rest of the run still counts.
            index += 1;
            if index == run_end {
                continue;
            }
        }

        let Some(delimiter) = Delimiter::classify(text, marker, index, run_end - index) else {
            continue;
        };

        match place(links, &mut link_cursor, index) {
            Placement::TopLevel => blocks.blocks[0].push(delimiter),
            Placement::Link(link) => blocks.blocks[link + 1].push(delimiter),
            Placement::Discarded => {}
        }
    }

    blocks
}

/// Two-pointer merge of run offsets against the ordered link list.
fn place(links: &[LinkMatch<'_>], cursor: &mut usize, index: usize) -> Placement {
    while let Some(link) = links.get(*cursor) {
        if link.start > index {
            break;
        }

        if link.end <= index {
            *cursor += 1;
            continue;
        }

        if index >= link.inner_end {
            return Placement::Discarded;
        }

        return Placement::Link(*cursor);
    }

    Placement::TopLevel
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::links::scan_reference_links;

    fn scan(text: &str) -> DelimiterBlocks {
        scan_delimiters(text, &scan_reference_links(text))
    }

    fn caps(d: &Delimiter) -> (usize, usize, bool, bool) {
        (d.index, d.length, d.can_open, d.can_close)
    }

    #[test]
    fn test_asterisk_flanking() {
        let blocks = scan("*foo bar*");
        let found: Vec<_> = blocks.top_level().iter().map(caps).collect();
        assert_eq!(found, vec![(0, 1, true, false), (8, 1, false, true)]);
    }

    #[test]
    fn test_intraword_asterisk_is_both() {
        let blocks = scan("foo*bar*");
        assert!(blocks.top_level()[0].is_both());
        assert_eq!(caps(&blocks.top_level()[1]), (7, 1, false, true));
    }

    #[test]
    fn test_intraword_underscore_is_discarded() {
        let blocks = scan("foo_bar_");
        let found: Vec<_> = blocks.top_level().iter().map(caps).collect();
        assert_eq!(found, vec![(7, 1, false, true)]);
    }

    #[test]
    fn test_underscore_next_to_punctuation() {
        let blocks = scan("foo-_(bar)_");
        let found: Vec<_> = blocks.top_level().iter().map(caps).collect();
        assert_eq!(found, vec![(4, 1, true, true), (10, 1, false, true)]);
    }

    #[test]
    fn test_run_surrounded_by_whitespace_is_discarded() {
        assert!(scan("a * b").top_level().is_empty());
        assert!(scan(&"*".repeat(64)).top_level().is_empty());
    }

    #[test]
    fn test_escaped_leading_marker_is_dropped() {
        let blocks = scan(r"\**foo*");
        let found: Vec<_> = blocks.top_level().iter().map(caps).collect();
        assert_eq!(found, vec![(2, 1, true, false), (6, 1, false, true)]);

        assert!(scan(r"\*foo").top_level().is_empty());
    }

    #[test]
    fn test_runs_are_assigned_to_link_blocks() {
        let blocks = scan("*a [*b*][ref]*");
        assert_eq!(blocks.top_level().len(), 2);
        assert_eq!(blocks.link(0).len(), 2);
    }

    #[test]
    fn test_runs_in_reference_label_are_discarded() {
        let blocks = scan("**[foo][**]");
        assert_eq!(blocks.top_level().len(), 1);
        assert!(blocks.link(0).is_empty());
    }

    #[test]
    fn test_unicode_neighbours() {
        assert_eq!(CharClass::of(Some('я')), CharClass::Other);
        assert_eq!(CharClass::of(Some('\u{a0}')), CharClass::Whitespace);
        assert_eq!(CharClass::of(Some('"')), CharClass::Punctuation);
        assert_eq!(CharClass::of(None), CharClass::Whitespace);
    }

    #[test]
    fn test_whitespace_is_unicode_white_space() {
        assert_eq!(CharClass::of(Some('\u{85}')), CharClass::Whitespace);
        assert_eq!(CharClass::of(Some('\u{2028}')), CharClass::Whitespace);
        assert_eq!(CharClass::of(Some('\u{feff}')), CharClass::Other);

        // A BOM before a run counts as a word character.
        let blocks = scan("\u{feff}*a*");
        assert!(blocks.top_level()[0].is_both());
    }
}
