//! Summary statistics over a segment tree.

use crate::ast::Segment;

/// Counts of each segment kind in a tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SegmentStats {
    pub text: usize,
    pub strong: usize,
    pub emphasis: usize,
    pub reference_links: usize,
    /// Deepest markup nesting; 0 for plain text.
    pub max_depth: usize,
    /// Distinct reference keys in first-appearance order.
    pub references: Vec<String>,
}

impl SegmentStats {
    pub fn from_segments(segments: &[Segment<'_>]) -> Self {
        let mut stats = Self::default();
        let mut pending: Vec<(&Segment<'_>, usize)> =
            segments.iter().rev().map(|s| (s, 1)).collect();

        while let Some((segment, depth)) = pending.pop() {
            match segment {
                Segment::Text(_) => {
                    stats.text += 1;
                    continue;
                }
                Segment::Strong(_) => stats.strong += 1,
                Segment::Emphasis(_) => stats.emphasis += 1,
                Segment::ReferenceLink(link) => {
                    stats.reference_links += 1;
                    if !stats.references.iter().any(|r| *r == link.reference) {
                        stats.references.push(link.reference.to_string());
                    }
                }
            }

            stats.max_depth = stats.max_depth.max(depth);
            pending.extend(segment.content().iter().rev().map(|s| (s, depth + 1)));
        }

        stats
    }

    /// Total number of segments.
    pub fn total(&self) -> usize {
        self.text + self.strong + self.emphasis + self.reference_links
    }
}

/// Distinct reference keys used in `segments`, in first-appearance order.
pub fn collect_references<'s>(segments: &'s [Segment<'_>]) -> Vec<&'s str> {
    let mut keys: Vec<&'s str> = Vec::new();
    let mut pending: Vec<&'s Segment<'_>> = segments.iter().rev().collect();

    while let Some(segment) = pending.pop() {
        if let Segment::ReferenceLink(link) = segment {
            if !keys.contains(&link.reference.as_ref()) {
                keys.push(&link.reference);
            }
        }
        pending.extend(segment.content().iter().rev());
    }

    keys
}
