//! Delimiter-stack matcher.
//!
//! Resolves the delimiter runs of one block into strong and emphasis
//! matches, following CommonMark's "process emphasis" procedure:
//!
//! 1. Each closer looks down the opener stack for the nearest run of the same
//!    marker.
//! 2. Rule of 3: if either run can both open and close, and the sum of their
//!    lengths is a multiple of 3, the pair is skipped unless both lengths are
//!    multiples of 3.
//! 3. A matched pair emits `n / 2` strong matches, innermost first, then one
//!    emphasis if `n` is odd, where `n` is the shorter run's length.

use crate::delimiter::Delimiter;
use crate::inline::{Match, MatchKind};

/// Pending opener on the stack. `both` is fixed at scan time.
#[derive(Debug, Clone, Copy)]
struct Opener {
    marker: u8,
    index: usize,
    length: usize,
    both: bool,
}

impl From<Delimiter> for Opener {
    fn from(d: Delimiter) -> Self {
        Self {
            marker: d.marker,
            index: d.index,
            length: d.length,
            both: d.is_both(),
        }
    }
}

/// Match the delimiters of one block, in source order, appending the
/// results to `matches`.
pub(crate) fn resolve_block<'a>(delimiters: &[Delimiter], matches: &mut Vec<Match<'a>>) {
    let mut stack: Vec<Opener> = Vec::new();

    for &delimiter in delimiters {
        let mut closer = delimiter;
        let mut matched = false;

        if closer.can_close {
            let mut i = stack.len();

            while i > 0 {
                i -= 1;
                let opener = &mut stack[i];

                if opener.marker != closer.marker {
                    continue;
                }

                // After its first match the closer no longer counts as both.
                let closer_both = closer.is_both() && !matched;
                if (opener.both || closer_both)
                    && (opener.length + closer.length) % 3 == 0
                    && (opener.length % 3 != 0 || closer.length % 3 != 0)
                {
                    continue;
                }

                matched = true;

                let mut width = opener.length.min(closer.length);
                while width > 1 {
                    matches.push(consume(MatchKind::Strong, opener, &mut closer));
                    width -= 2;
                }
                if width == 1 {
                    matches.push(consume(MatchKind::Emphasis, opener, &mut closer));
                }

                if opener.length > 0 {
                    stack.truncate(i + 1);
                    break;
                }

                stack.truncate(i);
                if closer.length == 0 {
                    break;
                }
            }
        }

        if !matched && closer.can_open {
            stack.push(Opener::from(closer));
        }
    }
}

/// Emit one match from the innermost unconsumed markers of both runs.
fn consume<'a>(kind: MatchKind<'a>, opener: &mut Opener, closer: &mut Delimiter) -> Match<'a> {
    let width = match kind {
        MatchKind::Strong => 2,
        _ => 1,
    };

    let inner_start = opener.index + opener.length;
    let inner_end = closer.index;

    opener.length -= width;
    closer.length -= width;
    closer.index += width;

    Match {
        kind,
        start: inner_start - width,
        end: inner_end + width,
        marker_width: width,
        inner_end,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delimiter::scan_delimiters;

    fn resolve(text: &str) -> Vec<(&'static str, usize, usize)> {
        let blocks = scan_delimiters(text, &[]);
        let mut matches = Vec::new();
        resolve_block(blocks.top_level(), &mut matches);
        matches
            .into_iter()
            .map(|m| {
                let kind = match m.kind {
                    MatchKind::Strong => "strong",
                    MatchKind::Emphasis => "em",
                    MatchKind::ReferenceLink(_) => "link",
                };
                (kind, m.start, m.end)
            })
            .collect()
    }

    #[test]
    fn test_simple_pairs() {
        assert_eq!(resolve("*foo*"), vec![("em", 0, 5)]);
        assert_eq!(resolve("**foo**"), vec![("strong", 0, 7)]);
    }

    #[test]
    fn test_triple_run_peels_strong_first() {
        assert_eq!(resolve("***foo***"), vec![("strong", 1, 8), ("em", 0, 9)]);
    }

    #[test]
    fn test_wider_opener_stays_on_stack() {
        assert_eq!(resolve("**foo*"), vec![("em", 1, 6)]);
        assert_eq!(resolve("****foo*"), vec![("em", 3, 8)]);
    }

    #[test]
    fn test_wider_closer_keeps_searching() {
        assert_eq!(
            resolve("*foo **bar***"),
            vec![("strong", 5, 12), ("em", 0, 13)]
        );
    }

    #[test]
    fn test_rule_of_three_skips_opener() {
        // `**` (both) against `*` sums to 3; the outer `*` is used instead.
        assert_eq!(resolve("*foo**bar*"), vec![("em", 0, 10)]);
    }

    #[test]
    fn test_rule_of_three_allows_multiples() {
        assert_eq!(
            resolve("foo***bar***baz"),
            vec![("strong", 4, 11), ("em", 3, 12)]
        );
    }

    #[test]
    fn test_markers_do_not_mix() {
        assert!(resolve("*foo_").is_empty());
        assert_eq!(resolve("*foo _bar* baz_"), vec![("em", 0, 10)]);
    }

    #[test]
    fn test_closer_remainder_stays_literal() {
        // The closer `**` matches once, its remainder stays literal.
        assert_eq!(resolve("*foo** bar*"), vec![("em", 0, 5)]);
    }
}
