//! 通知转发层 - 把聊天应用通知转换为短信转发决策
//!
//! # 处理流程
//! 1. 提取：从 payload 中取出标题和正文（`EventExtractor`）
//! 2. 过滤：丢弃 "N 条新消息" 摘要（`is_likely_summary`）
//! 3. 规范化：合并标题和正文，加上前缀（`normalize`）
//! 4. 去重：窗口内同一条消息只转发一次（`DedupeGate`）
//! 5. 决策：结合配置给出转发或丢弃（`ForwardingEngine`）
//!
//! # 使用示例
//! ```ignore
//! use chat_sms_relay::notification::{DedupeGate, ForwardingConfig, ForwardingEngine, NotificationPayload};
//!
//! let engine = ForwardingEngine::new(Arc::new(DedupeGate::new()));
//! let payload = NotificationPayload::new("com.whatsapp").with_title("Bob").with_text("hi");
//! let decision = engine.decide(&payload, &ForwardingConfig::new(true, "+49151"));
//! ```

pub mod channel;
pub mod channels;
pub mod dedup_key;
pub mod deduplicator;
pub mod engine;
pub mod extractor;
pub mod listener;
pub mod normalizer;
pub mod payload;
pub mod summary;

pub use channel::{MessageSender, SendResult};
pub use channels::{CommandSender, CommandSenderConfig};
pub use dedup_key::generate_dedup_key;
pub use deduplicator::{Clock, DedupeGate, ManualClock, SystemClock};
pub use engine::{ConfigProvider, Decision, DropReason, ForwardingConfig, ForwardingEngine};
pub use extractor::{EventExtractor, ExtractedMessage};
pub use listener::NotificationListener;
pub use normalizer::normalize;
pub use payload::{MessagePart, NotificationPayload, SourceFilter, WHATSAPP_PACKAGES};
pub use summary::is_likely_summary;
