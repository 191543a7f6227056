use quick_xml::escape::{resolve_html5_entity, unescape_with};
use std::borrow::Cow;

// @module: Character reference decoding and escaping for text and attribute values

/// Longest reference name we try to resolve (`&` and `;` excluded)
const MAX_REFERENCE_LENGTH: usize = 32;

/// Decode character references in raw markup text.
///
/// Named references resolve against the HTML5 entity table. Unknown or malformed
/// references are kept literally; help archives in the wild are rarely well-formed.
pub fn decode(raw: &str) -> Cow<'_, str> {
    if !raw.contains('&') {
        return Cow::Borrowed(raw);
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(at) = rest.find('&') {
        out.push_str(&rest[..at]);
        let tail = &rest[at..];
        match reference(tail) {
            Some((resolved, consumed)) => {
                out.push_str(&resolved);
                rest = &tail[consumed..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);

    Cow::Owned(out)
}

/// Escape text content so it cannot be mistaken for markup
pub fn escape_text(text: &str) -> String {
    quick_xml::escape::partial_escape(text).into_owned()
}

/// Escape a value for a double-quoted attribute
pub fn escape_attribute(value: &str) -> String {
    quick_xml::escape::partial_escape(value).replace('"', "&quot;")
}

// @returns: Decoded reference at the start of `tail` and the bytes it spans
fn reference(tail: &str) -> Option<(Cow<'_, str>, usize)> {
    let end = tail[1..].find(';')? + 1;
    let name = &tail[1..end];
    if name.is_empty()
        || name.len() > MAX_REFERENCE_LENGTH
        || !name.chars().all(|c| c == '#' || c.is_ascii_alphanumeric())
    {
        return None;
    }

    let candidate = &tail[..=end];
    let resolved = unescape_with(candidate, resolve_html5_entity).ok()?;
    Some((resolved, end + 1))
}
