//! HTML rendering of parsed segments.
//!
//! Reference links are resolved through a [`References`] table. A key maps
//! either to a URL, rendered as an anchor, or to a callback that builds the
//! markup itself from the rendered children. Keys missing from the table
//! fall back to a plain `<span>` and log a warning.

use std::collections::HashMap;
use std::fmt;

use crate::ast::Segment;

/// Callback for custom reference rendering.
///
/// Receives the segment's index among its siblings, usable as a stable key,
/// and the already-rendered children HTML.
pub type RenderFn = dyn Fn(usize, &str) -> String + Send + Sync;

/// Target of a reference key.
pub enum Reference {
    /// Render as `<a href="...">`.
    Url(String),
    /// Render with a custom callback.
    Render(Box<RenderFn>),
}

impl fmt::Debug for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reference::Url(url) => f.debug_tuple("Url").field(url).finish(),
            Reference::Render(_) => f.write_str("Render(..)"),
        }
    }
}

/// Lookup table from reference key to [`Reference`].
#[derive(Debug, Default)]
pub struct References {
    entries: HashMap<String, Reference>,
}

impl References {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`References::insert_url`].
    pub fn with_url(mut self, key: impl Into<String>, url: impl Into<String>) -> Self {
        self.insert_url(key, url);
        self
    }

    /// Builder-style [`References::insert_render`].
    pub fn with_render<F>(mut self, key: impl Into<String>, render: F) -> Self
    where
        F: Fn(usize, &str) -> String + Send + Sync + 'static,
    {
        self.insert_render(key, render);
        self
    }

    pub fn insert_url(&mut self, key: impl Into<String>, url: impl Into<String>) {
        self.entries.insert(key.into(), Reference::Url(url.into()));
    }

    pub fn insert_render<F>(&mut self, key: impl Into<String>, render: F)
    where
        F: Fn(usize, &str) -> String + Send + Sync + 'static,
    {
        self.entries
            .insert(key.into(), Reference::Render(Box::new(render)));
    }

    pub fn get(&self, key: &str) -> Option<&Reference> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for References
where
    K: Into<String>,
    V: Into<String>,
{
    /// Collect `(key, url)` pairs.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut references = References::new();
        for (key, url) in iter {
            references.insert_url(key, url);
        }
        references
    }
}

/// Parse `text` and render it inside an outer `<span>`.
pub fn to_html(text: &str, references: &References) -> String {
    let segments = crate::parse(text);
    let mut html = String::with_capacity(text.len() + 16);
    html.push_str("<span>");
    html.push_str(&render_html(&segments, references));
    html.push_str("</span>");
    html
}

enum Step<'s, 'a> {
    Enter(usize, &'s Segment<'a>),
    Exit(usize, &'s Segment<'a>),
}

/// Render `segments` to HTML.
///
/// Walks the tree with an explicit stack, so deeply nested input cannot
/// exhaust the call stack.
pub fn render_html(segments: &[Segment<'_>], references: &References) -> String {
    // One buffer per open container; the bottom one collects the result.
    let mut buffers = vec![String::new()];
    let mut steps: Vec<Step<'_, '_>> = segments
        .iter()
        .enumerate()
        .rev()
        .map(|(i, s)| Step::Enter(i, s))
        .collect();

    while let Some(step) = steps.pop() {
        match step {
            Step::Enter(_, Segment::Text(text)) => {
                if let Some(out) = buffers.last_mut() {
                    escape_html_into(out, &text.content);
                }
            }
            Step::Enter(index, segment) => {
                buffers.push(String::new());
                steps.push(Step::Exit(index, segment));
                steps.extend(
                    segment
                        .content()
                        .iter()
                        .enumerate()
                        .rev()
                        .map(|(i, s)| Step::Enter(i, s)),
                );
            }
            Step::Exit(index, segment) => {
                let children = buffers.pop().unwrap_or_default();
                if let Some(out) = buffers.last_mut() {
                    wrap(out, index, segment, &children, references);
                }
            }
        }
    }

    buffers.pop().unwrap_or_default()
}

fn wrap(out: &mut String, index: usize, segment: &Segment<'_>, children: &str, refs: &References) {
    match segment {
        Segment::Text(_) => out.push_str(children),
        Segment::Strong(_) => {
            out.push_str("<strong>");
            out.push_str(children);
            out.push_str("</strong>");
        }
        Segment::Emphasis(_) => {
            out.push_str("<em>");
            out.push_str(children);
            out.push_str("</em>");
        }
        Segment::ReferenceLink(link) => match refs.get(&link.reference) {
            Some(Reference::Url(url)) if !url.is_empty() => {
                out.push_str("<a href=\"");
                escape_html_into(out, url);
                out.push_str("\">");
                out.push_str(children);
                out.push_str("</a>");
            }
            Some(Reference::Render(render)) => out.push_str(&render(index, children)),
            _ => {
                log::warn!(
                    "reference `{}` is missing from references, falling back to span",
                    link.reference
                );
                out.push_str("<span>");
                out.push_str(children);
                out.push_str("</span>");
            }
        },
    }
}

/// Escape `& < > " '` for text and attribute positions.
pub fn escape_html_into(out: &mut String, text: &str) {
    let mut last = 0;

    for (i, c) in text.char_indices() {
        let escaped = match c {
            '&' => "&amp;",
            '<' => "&lt;",
            '>' => "&gt;",
            '"' => "&quot;",
            '\'' => "&#39;",
            _ => continue,
        };
        out.push_str(&text[last..i]);
        out.push_str(escaped);
        last = i + 1;
    }

    out.push_str(&text[last..]);
}
