//! 通知内容提取 - 从原始 payload 中取出标题和正文

use super::payload::{NotificationPayload, SourceFilter};
use super::summary::is_likely_summary;

/// 提取出的候选消息（生成后不再修改）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedMessage {
    pub title: String,
    pub text: String,
    /// 是否只是 "N 条新消息" 之类的摘要
    pub is_summary_only: bool,
}

impl ExtractedMessage {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            is_summary_only: false,
        }
    }
}

/// 通知内容提取器
#[derive(Debug, Clone, Default)]
pub struct EventExtractor {
    sources: SourceFilter,
}

impl EventExtractor {
    pub fn new(sources: SourceFilter) -> Self {
        Self { sources }
    }

    /// 提取候选消息
    ///
    /// 返回 `None` 表示不处理此事件：来源应用不在允许列表中，
    /// 或者标题和正文都为空。
    pub fn extract(&self, payload: &NotificationPayload) -> Option<ExtractedMessage> {
        if !self.sources.accepts(&payload.package) {
            return None;
        }

        let title = payload.title.clone();

        // 1) MessagingStyle：取最后一条（分组会话中最新的消息）
        if let Some(text) = payload.messages.last().and_then(|last| {
            let sender = last.sender.trim();
            let body = last.text.trim();
            match (sender.is_empty(), body.is_empty()) {
                (false, false) => Some(format!("{}: {}", sender, body)),
                (true, false) => Some(body.to_string()),
                // 只有发送者也算有内容：用发送者作为正文，不再回退到 title/text
                (false, true) => Some(sender.to_string()),
                (true, true) => None,
            }
        }) {
            return Some(ExtractedMessage {
                title,
                text,
                is_summary_only: false,
            });
        }

        // 2) 回退到 bigText / text
        let text = if !payload.big_text.trim().is_empty() {
            payload.big_text.clone()
        } else {
            payload.text.clone()
        };

        if title.trim().is_empty() && text.trim().is_empty() {
            return None;
        }

        // 3) 摘要检测只作用于普通文本
        let is_summary_only = !text.trim().is_empty() && is_likely_summary(&text);

        Some(ExtractedMessage {
            title,
            text,
            is_summary_only,
        })
    }
}
