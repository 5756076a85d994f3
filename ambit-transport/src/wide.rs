//! Wide-character to UTF-8 transcoding for HID string descriptors
//!
//! HID string descriptors arrive as `wchar_t` sequences. Consumers keep them
//! in fixed-size fields, so conversion is bounded: the result is the longest
//! prefix whose UTF-8 encoding fits the byte budget, shortened one wide
//! character at a time so a multi-byte sequence is never split.

use tracing::debug;

/// Convert a NUL-terminated (or full-length) wide string to UTF-8 of at most
/// `max_bytes` bytes.
///
/// Any code unit that is not a Unicode scalar value makes the whole string
/// undecodable and yields an empty string.
pub fn wide_to_utf8(src: &[u32], max_bytes: usize) -> String {
    let mut decoded = Vec::with_capacity(src.len());
    for (position, &unit) in src.iter().take_while(|&&u| u != 0).enumerate() {
        match char::from_u32(unit) {
            Some(c) => decoded.push(c),
            None => {
                debug!(
                    "undecodable wide character 0x{:08X} at position {}",
                    unit, position
                );
                return String::new();
            }
        }
    }

    let mut out = String::with_capacity(max_bytes.min(decoded.len() * 4));
    for c in decoded {
        if out.len() + c.len_utf8() > max_bytes {
            debug!("wide string truncated to {} bytes", out.len());
            break;
        }
        out.push(c);
    }
    out
}

/// Widen a UTF-8 string into one code unit per character
pub fn widen(s: &str) -> Vec<u32> {
    s.chars().map(u32::from).collect()
}
