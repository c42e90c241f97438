//! 发送渠道 trait 定义

use anyhow::Result;

/// 发送结果
#[derive(Debug, Clone, PartialEq)]
pub enum SendResult {
    /// 发送成功
    Sent,
    /// 跳过（dry-run 等）
    Skipped(String),
    /// 发送失败
    Failed(String),
}

/// 短信发送能力
///
/// 转发流程只决定"是否发、发什么"，拆分和编码由实现方负责。
pub trait MessageSender: Send + Sync {
    /// 渠道名称（用于日志）
    fn name(&self) -> &str;

    /// 同步发送，等待结果
    fn send(&self, destination: &str, text: &str) -> Result<SendResult>;

    /// 异步发送（spawn 后立即返回）
    fn send_async(&self, destination: &str, text: &str) -> Result<()>;
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// 记录所有发送请求的 mock 渠道
    #[derive(Default)]
    pub struct RecordingSender {
        pub sent: Mutex<Vec<(String, String)>>,
    }

    impl RecordingSender {
        pub fn sent(&self) -> Vec<(String, String)> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl MessageSender for RecordingSender {
        fn name(&self) -> &str {
            "recording"
        }

        fn send(&self, destination: &str, text: &str) -> Result<SendResult> {
            self.sent
                .lock()
                .unwrap()
                .push((destination.to_string(), text.to_string()));
            Ok(SendResult::Sent)
        }

        fn send_async(&self, destination: &str, text: &str) -> Result<()> {
            self.send(destination, text).map(|_| ())
        }
    }
}
