//! Rich-text sanitization boundary.
//!
//! Stored message and notification text is raw user input. Every textual
//! field must pass through [`sanitize`] before it is handed to a renderer.
//! The policy is allow-list only: a small fixed set of inline formatting
//! tags is restored in canonical form, everything else is escaped to its
//! literal text representation. Sanitization happens on read, never on
//! write, so raw content stays available if the allow-list changes.

use crate::constants::ALLOWED_INLINE_TAGS;

/// Convert raw rich text into render-safe text.
///
/// All markup-significant characters (`& < > " '`) are escaped first, then
/// the allow-listed inline tags (`<b>`, `<i>`, `<em>`, `<strong>`, `<u>`,
/// `<br>`, `<br/>` and matching closing forms) are re-emitted. Tag matching
/// is case-insensitive; the output tag is always lowercase with no
/// attributes, so `<B onclick=x>` is escaped rather than restored.
pub fn sanitize(raw: &str) -> String {
    let mut escaped = escape(raw);
    for tag in ALLOWED_INLINE_TAGS {
        escaped = restore_tag(&escaped, tag);
    }
    escaped
}

/// Escape every markup-significant character to its HTML entity.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Restore the escaped open/close/self-closing forms of one allowed tag.
///
/// Only the exact attribute-free forms are restored; anything with extra
/// content between the brackets stays escaped.
fn restore_tag(text: &str, tag: &str) -> String {
    let forms = [
        (format!("&lt;{tag}&gt;"), format!("<{tag}>")),
        (format!("&lt;/{tag}&gt;"), format!("</{tag}>")),
        (format!("&lt;{tag}/&gt;"), format!("<{tag}>")),
        (format!("&lt;{tag} /&gt;"), format!("<{tag}>")),
    ];

    // ASCII lowercasing preserves byte offsets, so one lowered copy can
    // be searched while slicing replacements out of the original.
    let lower = text.to_ascii_lowercase();
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    while cursor < text.len() {
        let mut best: Option<(usize, usize, &str)> = None;
        for (escaped_form, replacement) in &forms {
            if let Some(pos) = lower[cursor..].find(escaped_form.as_str()) {
                let start = cursor + pos;
                if best.map_or(true, |(bstart, _, _)| start < bstart) {
                    best = Some((start, escaped_form.len(), replacement.as_str()));
                }
            }
        }
        match best {
            Some((start, len, replacement)) => {
                out.push_str(&text[cursor..start]);
                out.push_str(replacement);
                cursor = start + len;
            }
            None => {
                out.push_str(&text[cursor..]);
                break;
            }
        }
    }
    out
}
