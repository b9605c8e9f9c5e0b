//! Reply splitting for transport size limits

/// Split `text` into parts of at most `limit` characters.
///
/// Each cut lands just after the last newline inside the window when there
/// is one past the first character; otherwise the window is cut hard.
/// Joining the parts yields `text` unchanged.
#[must_use]
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut parts = Vec::new();
    let mut rest = text;

    while let Some((end, _)) = rest.char_indices().nth(limit) {
        let cut = match rest[..end].rfind('\n') {
            Some(idx) if idx > 0 => idx + 1,
            _ => end,
        };
        parts.push(rest[..cut].to_string());
        rest = &rest[cut..];
    }

    if !rest.is_empty() || parts.is_empty() {
        parts.push(rest.to_string());
    }
    parts
}
