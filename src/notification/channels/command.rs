//! 外部命令短信渠道
//!
//! 调用短信网关命令：`{cmd} --to <number> --message <text>`

use crate::notification::channel::{MessageSender, SendResult};
use anyhow::Result;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::{error, info, warn};

/// Default gateway command name
pub const DEFAULT_SENDER_CMD: &str = "sms-send";

/// 外部命令渠道配置
#[derive(Debug, Clone)]
pub struct CommandSenderConfig {
    /// 网关命令路径
    pub command: String,
    /// 只打印不发送
    pub dry_run: bool,
}

impl Default for CommandSenderConfig {
    fn default() -> Self {
        Self {
            command: DEFAULT_SENDER_CMD.to_string(),
            dry_run: false,
        }
    }
}

/// 外部命令短信渠道
pub struct CommandSender {
    config: CommandSenderConfig,
}

impl CommandSender {
    pub fn new(config: CommandSenderConfig) -> Self {
        let command = Self::resolve_command(&config.command);
        Self {
            config: CommandSenderConfig { command, ..config },
        }
    }

    pub fn command(&self) -> &str {
        &self.config.command
    }

    pub fn is_dry_run(&self) -> bool {
        self.config.dry_run
    }

    /// 查找命令路径，优先使用 PATH 中的同名命令
    fn resolve_command(cmd: &str) -> String {
        if Path::new(cmd).is_absolute() {
            return cmd.to_string();
        }
        which::which(cmd)
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_else(|_| cmd.to_string())
    }

    fn build_command(&self, destination: &str, text: &str) -> Command {
        let mut command = Command::new(&self.config.command);
        command.args(["--to", destination, "--message", text]);
        command
    }
}

impl MessageSender for CommandSender {
    fn name(&self) -> &str {
        "sms-command"
    }

    fn send(&self, destination: &str, text: &str) -> Result<SendResult> {
        if self.config.dry_run {
            eprintln!("[DRY-RUN] Would send SMS to {}: {}", destination, text);
            return Ok(SendResult::Skipped("dry-run".to_string()));
        }

        let output = self.build_command(destination, text).output()?;

        if output.status.success() {
            info!(target_number = %destination, "SMS sent successfully");
            Ok(SendResult::Sent)
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!(
                target_number = %destination,
                error = %stderr,
                "Failed to send SMS"
            );
            Ok(SendResult::Failed(stderr.to_string()))
        }
    }

    fn send_async(&self, destination: &str, text: &str) -> Result<()> {
        if self.config.dry_run {
            eprintln!("[DRY-RUN] Would send SMS to {}: {}", destination, text);
            return Ok(());
        }

        // 使用 spawn() 异步发送，不阻塞调用方；后台线程负责回收子进程
        let mut child = self
            .build_command(destination, text)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        let target_number = destination.to_string();
        std::thread::Builder::new()
            .name("sms-send-reaper".to_string())
            .spawn(move || match child.wait() {
                Ok(status) if status.success() => {
                    info!(target_number = %target_number, "SMS sent successfully")
                }
                Ok(status) => {
                    error!(target_number = %target_number, status = %status, "Failed to send SMS")
                }
                Err(e) => warn!(error = %e, "Failed to wait for SMS sender"),
            })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dry_run_does_not_spawn() {
        let sender = CommandSender::new(CommandSenderConfig {
            command: "/nonexistent/sms-send".to_string(),
            dry_run: true,
        });

        assert_eq!(
            sender.send("+49151", "WA: hi").unwrap(),
            SendResult::Skipped("dry-run".to_string())
        );
        assert!(sender.send_async("+49151", "WA: hi").is_ok());
    }

    #[test]
    fn test_missing_command_is_an_error() {
        let sender = CommandSender::new(CommandSenderConfig {
            command: "/nonexistent/sms-send".to_string(),
            dry_run: false,
        });

        assert_eq!(sender.command(), "/nonexistent/sms-send");
        assert!(sender.send("+49151", "WA: hi").is_err());
        assert!(sender.send_async("+49151", "WA: hi").is_err());
    }

    #[test]
    fn test_build_command_arguments() {
        let sender = CommandSender::new(CommandSenderConfig {
            command: "/usr/local/bin/sms-send".to_string(),
            dry_run: false,
        });
        let command = sender.build_command("+49151", "WA: Bob — hi");
        let args: Vec<_> = command
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        assert_eq!(args, vec!["--to", "+49151", "--message", "WA: Bob — hi"]);
    }

    /// 统计本进程下处于 zombie 状态的子进程
    #[cfg(target_os = "linux")]
    fn zombie_children() -> usize {
        let me = std::process::id().to_string();
        std::fs::read_dir("/proc")
            .into_iter()
            .flatten()
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| std::fs::read_to_string(entry.path().join("stat")).ok())
            .filter(|stat| {
                // "pid (comm) S ppid ..."，comm 可能包含空格
                let rest = match stat.rfind(')') {
                    Some(idx) => &stat[idx + 1..],
                    None => return false,
                };
                let mut fields = rest.split_whitespace();
                fields.next() == Some("Z") && fields.next() == Some(me.as_str())
            })
            .count()
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_send_async_reaps_children() {
        let Ok(true_cmd) = which::which("true") else {
            return;
        };
        let sender = CommandSender::new(CommandSenderConfig {
            command: true_cmd.to_string_lossy().into_owned(),
            dry_run: false,
        });

        for _ in 0..5 {
            sender.send_async("+49151", "WA: hi").unwrap();
        }

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while zombie_children() > 0 && std::time::Instant::now() < deadline {
            std::thread::sleep(std::time::Duration::from_millis(50));
        }
        assert_eq!(zombie_children(), 0);
    }
}
