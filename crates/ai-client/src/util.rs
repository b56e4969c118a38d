/// Truncate a string to at most `max_bytes` bytes at a character boundary.
pub(crate) fn truncate_to_char_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) && end > 0 {
        end -= 1;
    }
    &s[..end]
}

/// Shorten provider error bodies before they end up in logs or error messages.
pub(crate) fn error_excerpt(body: &str) -> String {
    const MAX_ERROR_BODY: usize = 500;
    let trimmed = body.trim();
    let excerpt = truncate_to_char_boundary(trimmed, MAX_ERROR_BODY);
    if excerpt.len() < trimmed.len() {
        format!("{excerpt}...")
    } else {
        excerpt.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_to_char_boundary() {
        let text = "Hello 世界";
        let truncated = truncate_to_char_boundary(text, 8);
        assert!(truncated.len() <= 8);
        assert!(text.starts_with(truncated));
    }

    #[test]
    fn test_truncate_within_bounds() {
        let text = "Hello";
        assert_eq!(truncate_to_char_boundary(text, 100), "Hello");
    }

    #[test]
    fn test_error_excerpt_marks_truncation() {
        let body = "x".repeat(600);
        let excerpt = error_excerpt(&body);
        assert_eq!(excerpt.len(), 503);
        assert!(excerpt.ends_with("..."));
        assert_eq!(error_excerpt("  short  "), "short");
    }
}
