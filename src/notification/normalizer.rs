//! 消息规范化 - 把标题和正文合并成一条可转发的短信文本
//!
//! 规则：
//! 1. 正文已经包含发送者标签时不再重复标题
//! 2. 来电类通知加上来电前缀，其余加普通转发前缀

use super::extractor::ExtractedMessage;

/// Forwarded message prefixes
pub mod msg {
    pub const FORWARD_PREFIX: &str = "WA: ";
    pub const CALL_PREFIX: &str = "WA: входящий звонок — ";
    /// Title/text separator
    pub const SEPARATOR: &str = " — ";
}

/// Lowercase markers of an incoming call notification
const CALL_KEYWORDS: [&str; 4] = ["calling", "voice call", "video call", "звон"];

/// 规范化提取结果
///
/// 返回 `None` 表示丢弃（摘要通知，或标题与正文均为空）。
pub fn normalize(message: &ExtractedMessage) -> Option<String> {
    if message.is_summary_only {
        return None;
    }

    let combined = merge_title(&message.title, &message.text)?;

    let prefix = if is_call(&combined) {
        msg::CALL_PREFIX
    } else {
        msg::FORWARD_PREFIX
    };
    Some(format!("{}{}", prefix, combined))
}

/// 合并标题和正文，避免重复发送者标签
///
/// 例如标题 `Alice`、正文 `Alice: hi` 只保留正文。
pub fn merge_title(title: &str, text: &str) -> Option<String> {
    let t = title.trim();
    let c = text.trim();

    let combined = match (t.is_empty(), c.is_empty()) {
        (true, true) => return None,
        (true, false) => c.to_string(),
        (false, true) => t.to_string(),
        (false, false) => {
            if c.starts_with(t)
                || c.starts_with(&format!("{}:", t))
                || c.starts_with(&format!("{}{}", t, msg::SEPARATOR.trim_end()))
            {
                c.to_string()
            } else {
                format!("{}{}{}", t, msg::SEPARATOR, c)
            }
        }
    };
    Some(combined)
}

/// 是否为来电通知（大小写不敏感）
pub fn is_call(text: &str) -> bool {
    let lower = text.to_lowercase();
    CALL_KEYWORDS.iter().any(|k| lower.contains(k))
}
