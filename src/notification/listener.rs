//! 通知监听器 - 每个通知事件一个异步任务
//!
//! 事件之间互不阻塞；`shutdown()` 会取消所有尚未放行的事件。

use anyhow::Result;
use std::future::Future;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::channel::MessageSender;
use super::engine::{ConfigProvider, Decision, ForwardingEngine};
use super::payload::NotificationPayload;

/// 通知监听器
pub struct NotificationListener {
    engine: Arc<ForwardingEngine>,
    config: Arc<dyn ConfigProvider>,
    sender: Arc<dyn MessageSender>,
    cancel: CancellationToken,
}

impl NotificationListener {
    pub fn new(
        engine: Arc<ForwardingEngine>,
        config: Arc<dyn ConfigProvider>,
        sender: Arc<dyn MessageSender>,
    ) -> Self {
        Self {
            engine,
            config,
            sender,
            cancel: CancellationToken::new(),
        }
    }

    /// 处理新通知（spawn 后立即返回）
    pub fn on_notification_posted(&self, payload: NotificationPayload) -> JoinHandle<Decision> {
        tokio::spawn(self.event_task(payload))
    }

    /// 从 JSONL 流读取通知，每行一个 payload
    ///
    /// 每个事件完成时立即回调 `on_decision`。读到 EOF 或被取消后停止读取，
    /// 等待剩余事件完成后返回已接收的事件数；格式错误的行会被跳过。
    pub async fn run_jsonl<R, F>(&self, reader: R, mut on_decision: F) -> Result<usize>
    where
        R: AsyncBufRead + Unpin,
        F: FnMut(Decision),
    {
        let mut lines = reader.lines();
        let mut tasks = JoinSet::new();
        let mut reading = true;
        let mut events = 0usize;

        loop {
            tokio::select! {
                _ = self.cancel.cancelled(), if reading => {
                    reading = false;
                }
                line = lines.next_line(), if reading => {
                    let Some(line) = line? else {
                        reading = false;
                        continue;
                    };
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<NotificationPayload>(line) {
                        Ok(payload) => {
                            tasks.spawn(self.event_task(payload));
                            events += 1;
                        }
                        Err(e) => warn!(error = %e, "Skipping malformed notification payload"),
                    }
                }
                Some(joined) = tasks.join_next() => match joined {
                    Ok(decision) => on_decision(decision),
                    Err(e) => warn!(error = %e, "Notification task failed"),
                },
                else => break,
            }
        }

        info!(events, "Notification stream finished");
        Ok(events)
    }

    fn event_task(
        &self,
        payload: NotificationPayload,
    ) -> impl Future<Output = Decision> + Send + 'static {
        let engine = self.engine.clone();
        let config = self.config.clone();
        let sender = self.sender.clone();
        let cancel = self.cancel.child_token();

        async move {
            engine
                .handle(&payload, config.as_ref(), sender.as_ref(), &cancel)
                .await
        }
    }

    /// 取消所有进行中的事件
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

impl Drop for NotificationListener {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
