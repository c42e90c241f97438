//! Summary notification detection
//!
//! WhatsApp collapses a busy chat into an aggregate line such as
//! "4 new messages" / "4 новых сообщений" / "4 neue Nachrichten".
//! Those carry no message content and are never forwarded.

use regex::Regex;
use std::sync::LazyLock;

/// Exact summary patterns (EN/RU/DE), matched against trimmed, lowercased text
static SUMMARY_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^\d+\s+(new\s+messages|unread\s+messages)$",
        r"^\d+\s+нов(ых|ые|ое)\s+сообщени(й|я|е)$",
        r"^\d+\s+neue\s+nachrichten$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Invalid summary pattern"))
    .collect()
});

static DIGIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d").expect("Invalid digit regex"));

/// Returns `true` when `content` looks like an "N new messages" aggregate.
///
/// Besides the exact patterns, shorter Russian variants are caught by a
/// looser rule: the roots "нов" and "сообщ" together with any digit.
pub fn is_likely_summary(content: &str) -> bool {
    let s = content.trim().to_lowercase();
    if s.is_empty() {
        return false;
    }

    if SUMMARY_PATTERNS.iter().any(|re| re.is_match(&s)) {
        return true;
    }

    s.contains("нов") && s.contains("сообщ") && DIGIT.is_match(&s)
}
