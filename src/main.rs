//! Chat SMS Relay CLI
//!
//! 把 WhatsApp 通知转发到一个短信号码

use anyhow::Result;
use chat_sms_relay::cli::{
    handle_listen, handle_process, handle_set_enabled, handle_set_target, handle_status,
    ListenArgs, ProcessArgs, SetTargetArgs, StatusArgs,
};
use chat_sms_relay::SettingsStore;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "relay")]
#[command(about = "Chat SMS Relay - 把 WhatsApp 通知转发到短信")]
#[command(version)]
struct Cli {
    /// 设置文件路径（默认 ~/.config/chat-sms-relay/settings.json）
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// 短信网关命令（覆盖设置文件）
    #[arg(long, global = true)]
    sender_cmd: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 查看转发状态和目标号码
    Status(StatusArgs),
    /// 启动转发
    Enable,
    /// 停止转发
    Disable,
    /// 设置接收短信的号码
    SetTarget(SetTargetArgs),
    /// 处理单个通知 payload（JSON）
    Process(ProcessArgs),
    /// 从 stdin 持续读取通知（JSONL），Ctrl-C 退出
    Listen(ListenArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("chat_sms_relay=info,relay=info"));

    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    let cli = Cli::parse();
    let store = match cli.settings {
        Some(path) => SettingsStore::at(path),
        None => SettingsStore::open_default(),
    };

    match cli.command {
        Commands::Status(args) => handle_status(&store, args),
        Commands::Enable => handle_set_enabled(&store, true),
        Commands::Disable => handle_set_enabled(&store, false),
        Commands::SetTarget(args) => handle_set_target(&store, args),
        Commands::Process(args) => handle_process(&store, cli.sender_cmd, args).await,
        Commands::Listen(args) => handle_listen(&store, cli.sender_cmd, args).await,
    }
}
