//! Process / Listen 命令 - 把通知 payload 送入转发流程

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::output::format_decision;
use crate::notification::channels::{CommandSender, CommandSenderConfig, DEFAULT_SENDER_CMD};
use crate::notification::{
    DedupeGate, ForwardingEngine, MessageSender, NotificationListener, NotificationPayload,
};
use crate::settings::SettingsStore;

/// Process 命令参数
#[derive(Args)]
pub struct ProcessArgs {
    /// payload JSON 文件（默认从 stdin 读取）
    #[arg(long, short)]
    pub file: Option<PathBuf>,

    /// 只打印不发送
    #[arg(long)]
    pub dry_run: bool,
}

/// Listen 命令参数
#[derive(Args)]
pub struct ListenArgs {
    /// 只打印不发送
    #[arg(long)]
    pub dry_run: bool,
}

/// 创建短信发送渠道
///
/// 命令行参数优先，其次是设置文件，最后使用默认命令。
pub fn build_sender(
    store: &SettingsStore,
    sender_cmd: Option<String>,
    dry_run: bool,
) -> Result<Arc<dyn MessageSender>> {
    let command = match sender_cmd {
        Some(cmd) => cmd,
        None => store
            .load()?
            .sender_cmd
            .unwrap_or_else(|| DEFAULT_SENDER_CMD.to_string()),
    };

    let sender = CommandSender::new(CommandSenderConfig { command, dry_run });
    info!(command = %sender.command(), dry_run, "Using SMS sender");
    Ok(Arc::new(sender))
}

/// 处理 process 命令：处理单个 payload 并打印决策
pub async fn handle_process(
    store: &SettingsStore,
    sender_cmd: Option<String>,
    args: ProcessArgs,
) -> Result<()> {
    let input = match &args.file {
        Some(path) => tokio::fs::read_to_string(path).await?,
        None => tokio::task::spawn_blocking(|| std::io::read_to_string(std::io::stdin())).await??,
    };
    let payload: NotificationPayload = serde_json::from_str(&input)?;

    let sender = build_sender(store, sender_cmd, args.dry_run)?;
    let engine = ForwardingEngine::new(Arc::new(DedupeGate::new()));

    let decision = engine
        .handle(&payload, store, sender.as_ref(), &CancellationToken::new())
        .await;
    println!("{}", format_decision(&decision));
    Ok(())
}

/// 处理 listen 命令：从 stdin 读取 JSONL，每行一个通知
pub async fn handle_listen(
    store: &SettingsStore,
    sender_cmd: Option<String>,
    args: ListenArgs,
) -> Result<()> {
    let sender = build_sender(store, sender_cmd, args.dry_run)?;
    let engine = Arc::new(ForwardingEngine::new(Arc::new(DedupeGate::new())));
    let listener = NotificationListener::new(engine, Arc::new(store.clone()), sender);

    let token = listener.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, shutting down listener");
            token.cancel();
        }
    });

    info!(settings = %store.path().display(), "Listening for notifications on stdin");
    let events = listener
        .run_jsonl(BufReader::new(tokio::io::stdin()), |decision| {
            println!("{}", format_decision(&decision))
        })
        .await?;

    info!(events, "Listener stopped");
    Ok(())
}
