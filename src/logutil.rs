//! Keeps player-typed text (names, codes, scanned payloads) on one log line.

const MAX_PREVIEW: usize = 120;

/// Escape a string for single-line logging.
///
/// Newlines, tabs and backslashes are escaped, other control characters are
/// written as `\xNN`. Anything past `MAX_PREVIEW` characters is cut with an
/// ellipsis; scanned QR payloads can be arbitrarily long.
pub fn escape_log(s: &str) -> String {
    use std::fmt::Write;

    let mut out = String::with_capacity(s.len().min(MAX_PREVIEW) + 4);
    for (count, ch) in s.chars().enumerate() {
        if count >= MAX_PREVIEW {
            out.push('…');
            break;
        }
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\x{:02X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}
