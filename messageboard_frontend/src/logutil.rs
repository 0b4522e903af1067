//! Keeps user-submitted text on a single log line.

const MAX_PREVIEW: usize = 120;

/// Preview of post content for log records: backslashes and control characters
/// are escaped, and anything past [`MAX_PREVIEW`] characters becomes `…`.
pub fn escape_log(content: &str) -> String {
    let mut chars = content.chars();
    let mut out = String::with_capacity(content.len().min(MAX_PREVIEW) + 4);
    for ch in chars.by_ref().take(MAX_PREVIEW) {
        if ch == '\\' || ch.is_control() {
            out.extend(ch.escape_default());
        } else {
            out.push(ch);
        }
    }
    if chars.next().is_some() {
        out.push('…');
    }
    out
}
