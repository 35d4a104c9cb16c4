pub const CODE_FENCE: &str = "```";

/// Truncates a string to at most `max_bytes` while ensuring it's a valid UTF-8 sequence.
/// Adds an ellipsis if truncated.
pub fn truncate_utf8_with_ellipsis(s: &str, max_bytes: usize) -> String {
    if s.len() <= max_bytes {
        return s.to_string();
    }

    let mut end = 0usize;
    for (i, ch) in s.char_indices() {
        let next = i + ch.len_utf8();
        if next <= max_bytes {
            end = next;
        } else {
            break;
        }
    }

    format!("{}...", &s[..end])
}

pub fn has_code_fence(text: &str) -> bool {
    text.contains(CODE_FENCE)
}

/// Removes one surrounding markdown fence (with or without a `python` tag)
/// from a model reply and trims the result. Unfenced text is only trimmed.
pub fn strip_code_fence(text: &str) -> String {
    let text = text.trim();
    let body = text
        .strip_prefix("```python")
        .or_else(|| text.strip_prefix(CODE_FENCE));

    let stripped = match body {
        Some(rest) => rest.strip_suffix(CODE_FENCE).unwrap_or(rest),
        None => text,
    };
    stripped.trim().to_string()
}
