//! 通知 payload - 来自聊天应用的原始通知数据
//!
//! 字段名同时接受简写和 Android extras 键名：
//! ```json
//! {
//!   "package": "com.whatsapp",
//!   "android.title": "Bob",
//!   "android.text": "2 new messages",
//!   "android.bigText": "",
//!   "android.messages": [{ "sender": "Bob", "text": "see you at 5" }]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// WhatsApp package names (consumer + business)
pub const WHATSAPP_PACKAGES: [&str; 2] = ["com.whatsapp", "com.whatsapp.w4b"];

/// MessagingStyle 中的单条消息
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePart {
    /// 发送者
    #[serde(default)]
    pub sender: String,
    /// 消息正文
    #[serde(default)]
    pub text: String,
}

impl MessagePart {
    pub fn new(sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            text: text.into(),
        }
    }
}

/// 原始通知 payload（每个事件只接收一次，不可变）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    /// 来源应用 package name
    #[serde(default, alias = "packageName")]
    pub package: String,
    /// 标题（通常是联系人或群组名）
    #[serde(default, alias = "android.title")]
    pub title: String,
    /// 主文本
    #[serde(default, alias = "android.text")]
    pub text: String,
    /// 展开后的长文本
    #[serde(default, alias = "android.bigText", alias = "bigText")]
    pub big_text: String,
    /// 分组会话中的消息，按时间顺序
    #[serde(default, alias = "android.messages")]
    pub messages: Vec<MessagePart>,
}

impl NotificationPayload {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_big_text(mut self, big_text: impl Into<String>) -> Self {
        self.big_text = big_text.into();
        self
    }

    pub fn with_message(mut self, part: MessagePart) -> Self {
        self.messages.push(part);
        self
    }
}

/// 允许转发的来源应用列表
#[derive(Debug, Clone)]
pub struct SourceFilter {
    packages: HashSet<String>,
}

impl SourceFilter {
    pub fn new<I, S>(packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            packages: packages.into_iter().map(Into::into).collect(),
        }
    }

    /// 只接受 WhatsApp
    pub fn whatsapp() -> Self {
        Self::new(WHATSAPP_PACKAGES)
    }

    pub fn accepts(&self, package: &str) -> bool {
        self.packages.contains(package)
    }
}

impl Default for SourceFilter {
    fn default() -> Self {
        Self::whatsapp()
    }
}
