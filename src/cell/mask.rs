//! Partial disclosure: hide everything but the tail of a secret.
//!
//! Masking works on `char` boundaries so multi-byte UTF-8 text is never
//! split in the middle of a code point. `"supersecret"` with four visible
//! characters becomes `"*******cret"`.

/// Default character used to hide the masked prefix.
pub const DEFAULT_MASK_CHAR: char = '*';

/// Replace every character of `text` except the last `visible` with `mask`.
///
/// - `visible >= text.chars().count()` returns the text unchanged.
/// - `visible == 0` masks every character.
pub fn mask_suffix(text: &str, visible: usize, mask: char) -> String {
    let char_len = text.chars().count();
    if visible >= char_len {
        return text.to_string();
    }

    let hidden = char_len - visible;

    // Byte offset where the visible tail begins.
    let split = text
        .char_indices()
        .nth(hidden)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len());

    let mut out = String::with_capacity(hidden * mask.len_utf8() + (text.len() - split));
    out.extend(std::iter::repeat(mask).take(hidden));
    out.push_str(&text[split..]);
    out
}

// ── Tests ────────────────────────────────────────────────────────────
