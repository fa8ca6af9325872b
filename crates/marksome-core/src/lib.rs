//! # Marksome Core
//!
//! A small inline markup parser for product copy and UI strings.
//!
//! Marksome understands a deliberately tiny subset of Markdown:
//!
//! - `*emphasis*` / `_emphasis_`
//! - `**strong**` / `__strong__`
//! - reference links, `[text][ref]` and `[ref]`
//! - backslash escapes for `* _ [ ] \`
//!
//! Emphasis follows the CommonMark delimiter-run rules (flanking, the
//! "rule of 3", partial matches). Anything that does not form markup is kept
//! as literal text: parsing never fails.
//!
//! ## Quick Start
//!
//! ```rust
//! use marksome_core::{parse, Segment};
//!
//! let segments = parse("foo *bar* [baz][1]");
//!
//! assert_eq!(segments.len(), 4);
//! assert!(matches!(segments[1], Segment::Emphasis(_)));
//! assert!(matches!(&segments[3], Segment::ReferenceLink(l) if l.reference == "1"));
//! ```
//!
//! ## Rendering
//!
//! ```rust
//! use marksome_core::render::{to_html, References};
//!
//! let references = References::new().with_url("docs", "https://example.com/docs");
//! let html = to_html("Read the **[docs]**.", &references);
//!
//! assert_eq!(
//!     html,
//!     r#"<span>Read the <strong><a href="https://example.com/docs">docs</a></strong>.</span>"#
//! );
//! ```

pub mod ast;
mod delimiter;
mod emphasis;
pub mod escape;
mod inline;
mod links;
pub mod render;
pub mod span;
pub mod stats;

pub use ast::{CowStr, Segment};
pub use render::{Reference, References};
pub use span::Span;

/// Parse inline markup into an ordered sequence of segments.
///
/// Total over all inputs: malformed markup is returned as literal text.
/// Segments borrow from `text` where no escape had to be removed.
/// Spans are `u32` byte offsets, so `text` must be shorter than 4 GiB.
#[inline]
pub fn parse(text: &str) -> Vec<Segment<'_>> {
    inline::parse_segments(text)
}
