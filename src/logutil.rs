//! Logging helpers that keep remote text and world object names on a single log line.

/// Escape a string for single-line logging:
/// - `\n` => `\\n`
/// - `\r` => `\\r`
/// - `\t` => `\\t`
/// - backslash => `\\\\`
///   Strings longer than the preview cap are cut with an ellipsis.
pub fn escape_log(s: &str) -> String {
    escape_log_capped(s, 300)
}

/// Short preview of a raw inbound frame for debug output.
pub fn frame_preview(frame: &str) -> String {
    escape_log_capped(frame, 120)
}

fn escape_log_capped(s: &str, max_preview: usize) -> String {
    let mut out = String::with_capacity(s.len().min(max_preview) + 8);
    for (count, ch) in s.chars().enumerate() {
        if count >= max_preview {
            out.push('…');
            break;
        }
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                use std::fmt::Write;
                let _ = write!(&mut out, "\\x{:02X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}
