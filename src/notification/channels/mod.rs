//! 具体渠道实现

pub mod command;

pub use command::{CommandSender, CommandSenderConfig, DEFAULT_SENDER_CMD};
