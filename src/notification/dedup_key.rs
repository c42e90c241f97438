//! Dedup key for forwarded messages
//!
//! Two notifications that differ only in whitespace (WhatsApp re-posts
//! the same message with reflowed lines on update) map to the same key.

use regex::Regex;
use std::sync::LazyLock;

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

/// Generate the dedup key from a normalized message
///
/// Collapses every whitespace run to a single space and trims the ends.
pub fn generate_dedup_key(message: &str) -> String {
    WHITESPACE.replace_all(message.trim(), " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_collapsed() {
        assert_eq!(generate_dedup_key("WA: Bob —  see\n you"), "WA: Bob — see you");
        assert_eq!(generate_dedup_key("\t a \r\n b  "), "a b");
    }

    #[test]
    fn test_same_content_same_key() {
        assert_eq!(
            generate_dedup_key("WA: Bob: hi"),
            generate_dedup_key("  WA:  Bob:\nhi ")
        );
        assert_ne!(generate_dedup_key("WA: Bob: hi"), generate_dedup_key("WA: Bob: hey"));
    }
}
