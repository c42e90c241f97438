//! Chat SMS Relay - 把 WhatsApp 通知转发到一个短信号码

pub mod cli;
pub mod notification;
pub mod settings;

pub use notification::{
    CommandSender, CommandSenderConfig, ConfigProvider, Decision, DedupeGate, DropReason,
    ForwardingConfig, ForwardingEngine, MessageSender, NotificationListener, NotificationPayload,
    SendResult,
};
pub use settings::{Settings, SettingsStore};
