//! Settings 命令 - 查看状态、启停转发、设置目标号码

use anyhow::Result;
use clap::Args;

use super::output::{format_output, format_status};
use crate::settings::SettingsStore;

/// Status 命令参数
#[derive(Args)]
pub struct StatusArgs {
    /// 输出 JSON 格式
    #[arg(long)]
    pub json: bool,
}

/// SetTarget 命令参数
#[derive(Args)]
pub struct SetTargetArgs {
    /// 接收短信的号码，例如 +49...
    pub number: String,
}

/// 处理 status 命令
pub fn handle_status(store: &SettingsStore, args: StatusArgs) -> Result<()> {
    let settings = store.load()?;
    if args.json {
        println!("{}", format_output(&settings));
    } else {
        println!("{}", format_status(&settings));
    }
    Ok(())
}

/// 处理 enable / disable 命令
pub fn handle_set_enabled(store: &SettingsStore, enabled: bool) -> Result<()> {
    let settings = store.set_enabled(enabled)?;
    if enabled && settings.target_number.trim().is_empty() {
        println!("⚠️  Forwarding enabled but no SMS target is set (use `relay set-target`)");
    }
    println!("{}", format_status(&settings));
    Ok(())
}

/// 处理 set-target 命令
pub fn handle_set_target(store: &SettingsStore, args: SetTargetArgs) -> Result<()> {
    if args.number.trim().is_empty() {
        anyhow::bail!("SMS target number must not be empty");
    }
    let settings = store.set_target_number(&args.number)?;
    println!("{}", format_status(&settings));
    Ok(())
}
