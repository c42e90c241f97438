//! 转发决策引擎 - 串联提取、规范化、去重，给出转发或丢弃的决定
//!
//! 检查顺序（任一步失败即丢弃）：
//! 1. 来源应用在允许列表中且提取到内容
//! 2. 转发已启用
//! 3. 目标号码非空
//! 4. 规范化后仍有文本（非摘要）
//! 5. 去重闸门放行
//!
//! 引擎本身不保存跨事件状态，只有 [`DedupeGate`] 会被修改。

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::channel::MessageSender;
use super::dedup_key::generate_dedup_key;
use super::deduplicator::DedupeGate;
use super::extractor::{EventExtractor, ExtractedMessage};
use super::normalizer::normalize;
use super::payload::{NotificationPayload, SourceFilter};

/// 转发配置快照
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForwardingConfig {
    pub enabled: bool,
    pub destination: String,
}

impl ForwardingConfig {
    pub fn new(enabled: bool, destination: impl Into<String>) -> Self {
        Self {
            enabled,
            destination: destination.into(),
        }
    }
}

/// 异步配置来源，两个字段可以独立读取
#[async_trait]
pub trait ConfigProvider: Send + Sync {
    async fn enabled(&self) -> Result<bool>;
    async fn destination(&self) -> Result<String>;
}

#[async_trait]
impl ConfigProvider for ForwardingConfig {
    async fn enabled(&self) -> Result<bool> {
        Ok(self.enabled)
    }

    async fn destination(&self) -> Result<String> {
        Ok(self.destination.clone())
    }
}

/// 丢弃原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// 来源不在允许列表，或没有可提取的内容
    NotApplicable,
    /// 转发未启用
    ConfigDisabled,
    /// 未设置目标号码
    NoDestination,
    /// 摘要通知或规范化后为空
    Suppressed,
    /// 窗口内重复
    DuplicateSuppressed,
    /// 读取配置失败
    ConfigUnavailable,
    /// 事件在放行前被取消
    Cancelled,
}

impl DropReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DropReason::NotApplicable => "not_applicable",
            DropReason::ConfigDisabled => "config_disabled",
            DropReason::NoDestination => "no_destination",
            DropReason::Suppressed => "suppressed",
            DropReason::DuplicateSuppressed => "duplicate_suppressed",
            DropReason::ConfigUnavailable => "config_unavailable",
            DropReason::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 转发决策
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Forward { destination: String, text: String },
    Drop(DropReason),
}

impl Decision {
    pub fn is_forward(&self) -> bool {
        matches!(self, Decision::Forward { .. })
    }
}

/// 转发决策引擎
pub struct ForwardingEngine {
    extractor: EventExtractor,
    gate: Arc<DedupeGate>,
}

impl ForwardingEngine {
    pub fn new(gate: Arc<DedupeGate>) -> Self {
        Self::with_sources(SourceFilter::default(), gate)
    }

    pub fn with_sources(sources: SourceFilter, gate: Arc<DedupeGate>) -> Self {
        Self {
            extractor: EventExtractor::new(sources),
            gate,
        }
    }

    pub fn gate(&self) -> &Arc<DedupeGate> {
        &self.gate
    }

    /// 根据配置快照做出决定
    pub fn decide(&self, payload: &NotificationPayload, config: &ForwardingConfig) -> Decision {
        match self.extractor.extract(payload) {
            Some(extracted) => self.decide_extracted(&extracted, config),
            None => Decision::Drop(DropReason::NotApplicable),
        }
    }

    /// 处理一个通知事件：读取配置、决策、转发
    ///
    /// 配置只读取一次，不重试；读取期间 `cancel` 被触发则放弃此事件。
    /// 去重闸门放行是调用发送渠道前的最后一步。
    pub async fn handle(
        &self,
        payload: &NotificationPayload,
        config: &dyn ConfigProvider,
        sender: &dyn MessageSender,
        cancel: &CancellationToken,
    ) -> Decision {
        let decision = self.resolve(payload, config, cancel).await;

        match &decision {
            Decision::Forward { destination, text } => {
                info!(
                    package = %payload.package,
                    channel = sender.name(),
                    "Forwarding notification"
                );
                if let Err(e) = sender.send_async(destination, text) {
                    warn!(channel = sender.name(), error = %e, "Send failed");
                }
            }
            Decision::Drop(reason) => {
                debug!(package = %payload.package, reason = %reason, "Notification dropped");
            }
        }

        decision
    }

    async fn resolve(
        &self,
        payload: &NotificationPayload,
        config: &dyn ConfigProvider,
        cancel: &CancellationToken,
    ) -> Decision {
        let Some(extracted) = self.extractor.extract(payload) else {
            return Decision::Drop(DropReason::NotApplicable);
        };

        let snapshot = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Decision::Drop(DropReason::Cancelled),
            snapshot = read_config(config) => snapshot,
        };

        match snapshot {
            Ok(snapshot) => self.decide_extracted(&extracted, &snapshot),
            Err(e) => {
                warn!(error = %e, "Failed to read forwarding config");
                Decision::Drop(DropReason::ConfigUnavailable)
            }
        }
    }

    fn decide_extracted(&self, extracted: &ExtractedMessage, config: &ForwardingConfig) -> Decision {
        if !config.enabled {
            return Decision::Drop(DropReason::ConfigDisabled);
        }

        let destination = config.destination.trim();
        if destination.is_empty() {
            return Decision::Drop(DropReason::NoDestination);
        }

        let Some(text) = normalize(extracted) else {
            return Decision::Drop(DropReason::Suppressed);
        };

        if !self.gate.admit(&generate_dedup_key(&text)) {
            return Decision::Drop(DropReason::DuplicateSuppressed);
        }

        Decision::Forward {
            destination: destination.to_string(),
            text,
        }
    }
}

/// 读取配置快照（先 enabled 后 destination，禁用时不读 destination）
async fn read_config(config: &dyn ConfigProvider) -> Result<ForwardingConfig> {
    let enabled = config.enabled().await?;
    if !enabled {
        return Ok(ForwardingConfig::default());
    }
    let destination = config.destination().await?;
    Ok(ForwardingConfig::new(enabled, destination))
}
