//! Reference-link scanner.
//!
//! Finds `[inner][ref]` (full) and `[ref]` (shortcut) reference links in a
//! single left-to-right pass. Every accepted link also opens a delimiter
//! block: emphasis inside its inner text is matched independently of the
//! surrounding text.
//!
//! Escape rules:
//!
//! - a reference label closes at the first unescaped `]`; an unescaped `[`
//!   aborts it, escaped brackets are part of the key
//! - if the opening `[` or the closing `]` of a full link's inner text is
//!   escaped, the link falls back to the shortcut form of its label (the
//!   label's own `[` directly follows that `]`, so it is never escaped)
//! - a shortcut link whose opening `[` is escaped is dropped entirely

use memchr::memchr;

use crate::escape::is_escaped;

/// An accepted reference link, in byte offsets of the scanned text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LinkMatch<'a> {
    /// Offset of the opening `[`.
    pub start: usize,
    /// Offset just past the final `]`.
    pub end: usize,
    /// Offset of the `]` closing the inner text. Inner text is
    /// `start + 1..inner_end`.
    pub inner_end: usize,
    /// Raw reference key.
    pub reference: &'a str,
}

#[cfg(test)]
impl LinkMatch<'_> {
    #[inline]
    pub fn inner_start(&self) -> usize {
        self.start + 1
    }
}

/// Bracket structure found at one `[`, before escape validation.
#[derive(Debug, Clone, Copy)]
enum Candidate {
    /// `[inner][ref]`; `inner_end` is the `]` before `label_start`.
    Full {
        start: usize,
        inner_end: usize,
        label_start: usize,
        end: usize,
    },
    /// `[ref]`
    Shortcut { start: usize, end: usize },
}

impl Candidate {
    fn end(&self) -> usize {
        match *self {
            Candidate::Full { end, .. } | Candidate::Shortcut { end, .. } => end,
        }
    }
}

/// Scan `text` for reference links, ordered by start offset.
pub(crate) fn scan_reference_links(text: &str) -> Vec<LinkMatch<'_>> {
    let bytes = text.as_bytes();
    let mut links = Vec::new();
    let mut pos = 0;

    while let Some(offset) = memchr(b'[', &bytes[pos..]) {
        let start = pos + offset;

        let Some(candidate) = match_at(bytes, start) else {
            pos = start + 1;
            continue;
        };

        // A rejected candidate still consumes its brackets.
        pos = candidate.end();

        if let Some(link) = validate(text, candidate) {
            links.push(link);
        }
    }

    links
}

fn match_at(bytes: &[u8], start: usize) -> Option<Candidate> {
    full_at(bytes, start).or_else(|| {
        scan_label(bytes, start).map(|end| Candidate::Shortcut { start, end })
    })
}

/// Shortest inner text on the same line that is followed by `][ref]`.
fn full_at(bytes: &[u8], start: usize) -> Option<Candidate> {
    // Inner text holds at least one character, none of them a line break.
    if start + 1 >= bytes.len() || is_line_break(bytes, start + 1) {
        return None;
    }
    let mut pos = start + 2;

    while pos < bytes.len() {
        if is_line_break(bytes, pos) {
            return None;
        }

        if bytes[pos] == b']' && bytes.get(pos + 1) == Some(&b'[') {
            if let Some(end) = scan_label(bytes, pos + 1) {
                return Some(Candidate::Full {
                    start,
                    inner_end: pos,
                    label_start: pos + 1,
                    end,
                });
            }
        }

        pos += 1;
    }

    None
}

/// Scan a reference label opening at `open`. Returns the offset past its
/// closing `]`.
fn scan_label(bytes: &[u8], open: usize) -> Option<usize> {
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(open + 1) {
        match b {
            b'[' if !escaped => return None,
            b']' if !escaped => return (i > open + 1).then_some(i + 1),
            _ => {}
        }
        escaped = b == b'\\' && !escaped;
    }

    None
}

fn validate(text: &str, candidate: Candidate) -> Option<LinkMatch<'_>> {
    let bytes = text.as_bytes();

    match candidate {
        Candidate::Full {
            start,
            inner_end,
            label_start,
            end,
        } => {
            if is_escaped(bytes, start) || is_escaped(bytes, inner_end) {
                return Some(shortcut(text, label_start, end));
            }

            Some(LinkMatch {
                start,
                end,
                inner_end,
                reference: &text[label_start + 1..end - 1],
            })
        }
        Candidate::Shortcut { start, end } => {
            if is_escaped(bytes, start) {
                return None;
            }
            Some(shortcut(text, start, end))
        }
    }
}

fn shortcut(text: &str, start: usize, end: usize) -> LinkMatch<'_> {
    LinkMatch {
        start,
        end,
        inner_end: end - 1,
        reference: &text[start + 1..end - 1],
    }
}

/// Line terminators that end a full link's inner text: `\n`, `\r`, U+2028
/// and U+2029.
#[inline]
fn is_line_break(bytes: &[u8], pos: usize) -> bool {
    match bytes[pos] {
        b'\n' | b'\r' => true,
        0xE2 => {
            bytes.get(pos + 1) == Some(&0x80) && matches!(bytes.get(pos + 2), Some(0xA8 | 0xA9))
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(text: &str) -> Vec<(usize, usize, &str, &str)> {
        scan_reference_links(text)
            .into_iter()
            .map(|l| (l.start, l.end, &text[l.inner_start()..l.inner_end], l.reference))
            .collect()
    }

    #[test]
    fn test_full_and_shortcut_forms() {
        assert_eq!(scan("[foo][bar]"), vec![(0, 10, "foo", "bar")]);
        assert_eq!(
            scan("[foo] [bar]"),
            vec![(0, 5, "foo", "foo"), (6, 11, "bar", "bar")]
        );
    }

    #[test]
    fn test_inner_text_is_shortest_match() {
        assert_eq!(
            scan(r"[link [foo \[bar\]]][ref]"),
            vec![(0, 25, r"link [foo \[bar\]]", "ref")]
        );
    }

    #[test]
    fn test_label_rejects_unescaped_bracket() {
        assert_eq!(
            scan("[foo][ref[bar]]"),
            vec![(0, 5, "foo", "foo"), (9, 14, "bar", "bar")]
        );
    }

    #[test]
    fn test_label_keeps_escaped_bracket() {
        assert_eq!(scan(r"[foo][ref\[]"), vec![(0, 12, "foo", r"ref\[")]);
    }

    #[test]
    fn test_empty_label_never_matches() {
        assert!(scan("[]").is_empty());
        assert_eq!(scan("[a][]"), vec![(0, 3, "a", "a")]);
    }

    #[test]
    fn test_escaped_shortcut_is_dropped() {
        assert!(scan(r"\[foo]").is_empty());
    }

    #[test]
    fn test_escaped_inner_falls_back_to_label() {
        assert_eq!(scan(r"\[foo][bar]"), vec![(6, 11, "bar", "bar")]);
        assert_eq!(scan(r"[foo\][bar]"), vec![(6, 11, "bar", "bar")]);
    }

    #[test]
    fn test_escaped_label_close_prevents_full_link() {
        assert_eq!(scan(r"[foo][bar\]"), vec![(0, 5, "foo", "foo")]);
    }

    #[test]
    fn test_line_break_as_first_inner_character() {
        assert_eq!(
            scan("[\n][ref]"),
            vec![(0, 3, "\n", "\n"), (3, 8, "ref", "ref")]
        );
        assert_eq!(scan("[\u{2028}][ref]").len(), 2);
    }

    #[test]
    fn test_escaped_backslash_before_inner_close() {
        assert_eq!(scan(r"[foo\\][bar]"), vec![(0, 12, r"foo\\", "bar")]);
    }

    #[test]
    fn test_inner_text_stops_at_line_break() {
        assert_eq!(
            scan("[foo\nbar][baz]"),
            vec![(0, 9, "foo\nbar", "foo\nbar"), (9, 14, "baz", "baz")]
        );
    }
}
