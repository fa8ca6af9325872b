//! Backslash escapes.
//!
//! Only the markup characters `* _ [ ] \` can be escaped. Any other backslash
//! sequence is literal text, backslash included.

use std::borrow::Cow;

use memchr::memchr;

/// Characters that a backslash may escape.
pub const ESCAPABLE: &[u8] = b"*_[]\\";

/// Check whether the byte at `index` is escaped.
///
/// True iff the run of consecutive backslashes right before `index` has odd
/// length. `index` may equal `bytes.len()`.
#[inline]
pub fn is_escaped(bytes: &[u8], index: usize) -> bool {
    let run = bytes[..index]
        .iter()
        .rev()
        .take_while(|&&b| b == b'\\')
        .count();
    run % 2 == 1
}

/// Remove escaping backslashes in front of escapable characters.
///
/// Borrows the input when there is nothing to remove.
///
/// ```rust
/// use marksome_core::escape::unescape;
///
/// assert_eq!(unescape(r"\*foo\*"), "*foo*");
/// assert_eq!(unescape(r"a\b"), r"a\b");
/// ```
pub fn unescape(text: &str) -> Cow<'_, str> {
    let bytes = text.as_bytes();

    let Some(first) = memchr(b'\\', bytes) else {
        return Cow::Borrowed(text);
    };

    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    let mut pos = first;

    while pos < bytes.len() {
        if bytes[pos] == b'\\' && pos + 1 < bytes.len() && ESCAPABLE.contains(&bytes[pos + 1]) {
            out.push_str(&text[copied..pos]);
            // Keep the escaped character, drop the backslash.
            copied = pos + 1;
            pos += 2;
        } else {
            pos += 1;
        }
    }

    if copied == 0 {
        return Cow::Borrowed(text);
    }

    out.push_str(&text[copied..]);
    Cow::Owned(out)
}
