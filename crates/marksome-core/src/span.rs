//! Source ranges for parsed segments.
//!
//! Every [`Segment`](crate::ast::Segment) records the byte range of the input
//! it was parsed from, markers included. This lets callers map rendered output
//! back to the original text.

/// A byte range in the input text, `[start, end)`.
///
/// Offsets are UTF-8 byte offsets. All markup characters are ASCII, so a span
/// produced by the parser always lies on `char` boundaries.
///
/// # Example
///
/// ```rust
/// use marksome_core::span::Span;
///
/// let span = Span::new(4, 9);
/// assert_eq!(span.len(), 5);
/// assert_eq!(span.slice("foo *bar* baz"), "*bar*");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Span {
    /// Starting byte offset (inclusive).
    pub start: u32,
    /// Ending byte offset (exclusive).
    pub end: u32,
}

impl Span {
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Build a span from `usize` offsets as used while scanning.
    ///
    /// Offsets must fit in `u32`: inputs are limited to 4 GiB.
    #[inline]
    pub(crate) fn from_range(start: usize, end: usize) -> Self {
        debug_assert!(
            end <= u32::MAX as usize,
            "offset {} does not fit in a span",
            end
        );
        Self::new(start as u32, end as u32)
    }

    #[inline]
    pub const fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Check if this span fully contains `other`.
    #[inline]
    pub const fn encloses(&self, other: Span) -> bool {
        other.start >= self.start && other.end <= self.end
    }

    /// The slice of `text` this span covers.
    ///
    /// Panics if the span is out of bounds for `text`, like slice indexing.
    #[inline]
    pub fn slice<'t>(&self, text: &'t str) -> &'t str {
        &text[self.start as usize..self.end as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_range() {
        let span = Span::from_range(3, 7);
        assert_eq!(span, Span::new(3, 7));
        assert!(Span::new(0, 10).encloses(span));
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "does not fit in a span")]
    fn test_from_range_rejects_offsets_past_u32() {
        Span::from_range(0, u32::MAX as usize + 1);
    }
}
