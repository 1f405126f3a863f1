//! Log sanitization utilities
//!
//! Keeps API keys out of logs entirely and keeps large response bodies (full
//! zone listings can hold thousands of records) from flooding debug output.

/// Maximum number of bytes to include in truncated log output.
const TRUNCATE_LIMIT: usize = 256;

/// Largest char boundary not after `index`.
fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    (0..=index).rev().find(|&i| s.is_char_boundary(i)).unwrap_or(0)
}

/// Truncate a string to at most `limit` bytes, noting the original size.
pub fn truncate_to(s: &str, limit: usize) -> String {
    if s.len() <= limit {
        s.to_string()
    } else {
        format!(
            "{}... [truncated, total {} bytes]",
            &s[..floor_char_boundary(s, limit)],
            s.len()
        )
    }
}

/// Truncate a string for safe logging.
pub fn truncate_for_log(s: &str) -> String {
    truncate_to(s, TRUNCATE_LIMIT)
}

/// Replace a secret with a placeholder that only reveals its length.
pub fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        "<empty>".to_string()
    } else {
        format!("<redacted, {} chars>", secret.chars().count())
    }
}
