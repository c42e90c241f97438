//! 设置存储 - 本地 JSON 文件读写
//!
//! 保存转发开关、目标号码和短信网关命令。文件不存在时视为默认值
//! （未启用、无目标号码）。

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::notification::engine::ConfigProvider;

/// 设置内容
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// 是否启用转发
    #[serde(default)]
    pub enabled: bool,
    /// 接收短信的号码
    #[serde(default)]
    pub target_number: String,
    /// 短信网关命令（为空时使用默认命令）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_cmd: Option<String>,
}

/// 设置存储
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// 使用默认路径 `~/.config/chat-sms-relay/settings.json`
    pub fn open_default() -> Self {
        Self::at(Self::default_path())
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("chat-sms-relay")
            .join("settings.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 读取设置（共享锁）
    pub fn load(&self) -> Result<Settings> {
        use fs2::FileExt;

        if !self.path.exists() {
            return Ok(Settings::default());
        }

        let lock = self.open_lock()?;
        lock.lock_shared()?;
        let settings = self.read_unlocked();
        lock.unlock()?;
        settings
    }

    /// 写入设置（独占锁）
    pub fn save(&self, settings: &Settings) -> Result<()> {
        use fs2::FileExt;

        let lock = self.open_lock()?;
        lock.lock_exclusive()?;
        let result = self.write_unlocked(settings);
        lock.unlock()?;
        result
    }

    /// 启用/停止转发
    pub fn set_enabled(&self, enabled: bool) -> Result<Settings> {
        self.update(|s| s.enabled = enabled)
            .inspect(|_| info!(enabled, "Forwarding state changed"))
    }

    /// 设置目标号码（去除首尾空白）
    pub fn set_target_number(&self, number: &str) -> Result<Settings> {
        let number = number.trim().to_string();
        self.update(|s| s.target_number = number)
            .inspect(|s| info!(target_number = %s.target_number, "Target number saved"))
    }

    /// 设置短信网关命令
    pub fn set_sender_cmd(&self, cmd: Option<String>) -> Result<Settings> {
        self.update(|s| s.sender_cmd = cmd)
    }

    /// 读-改-写，整个过程持有独占锁
    fn update(&self, apply: impl FnOnce(&mut Settings)) -> Result<Settings> {
        use fs2::FileExt;

        let lock = self.open_lock()?;
        lock.lock_exclusive()?;
        let result = self.read_unlocked().and_then(|mut settings| {
            apply(&mut settings);
            self.write_unlocked(&settings)?;
            Ok(settings)
        });
        lock.unlock()?;
        result
    }

    /// 锁文件与设置文件同目录：`settings.json.lock`
    fn open_lock(&self) -> Result<File> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.sibling("lock"))?)
    }

    fn sibling(&self, ext: &str) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".");
        name.push(ext);
        self.path.with_file_name(name)
    }

    fn read_unlocked(&self) -> Result<Settings> {
        if !self.path.exists() {
            return Ok(Settings::default());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Settings::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    /// 先写临时文件再 rename，读者只会看到完整的旧文件或新文件
    fn write_unlocked(&self, settings: &Settings) -> Result<()> {
        let tmp = self.sibling("tmp");
        {
            let mut file = File::create(&tmp)?;
            writeln!(file, "{}", serde_json::to_string_pretty(settings)?)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    async fn load_async(&self) -> Result<Settings> {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.load()).await?
    }
}

#[async_trait]
impl ConfigProvider for SettingsStore {
    async fn enabled(&self) -> Result<bool> {
        Ok(self.load_async().await?.enabled)
    }

    async fn destination(&self) -> Result<String> {
        Ok(self.load_async().await?.target_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, SettingsStore) {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::at(dir.path().join("nested").join("settings.json"));
        (dir, store)
    }

    #[test]
    fn test_missing_file_is_default() {
        let (_dir, store) = store();
        let settings = store.load().unwrap();

        assert!(!settings.enabled);
        assert!(settings.target_number.is_empty());
        assert_eq!(settings.sender_cmd, None);
    }

    #[test]
    fn test_updates_persist() {
        let (_dir, store) = store();

        store.set_target_number("  +49 151 000  ").unwrap();
        store.set_enabled(true).unwrap();
        store.set_sender_cmd(Some("/opt/gw/send".to_string())).unwrap();

        let reopened = SettingsStore::at(store.path().to_path_buf());
        assert_eq!(
            reopened.load().unwrap(),
            Settings {
                enabled: true,
                target_number: "+49 151 000".to_string(),
                sender_cmd: Some("/opt/gw/send".to_string()),
            }
        );

        store.set_enabled(false).unwrap();
        assert!(!reopened.load().unwrap().enabled);
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let (_dir, store) = store();
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "{ not json").unwrap();

        assert!(store.load().is_err());
    }

    #[tokio::test]
    async fn test_config_provider() {
        let (_dir, store) = store();
        assert!(!store.enabled().await.unwrap());

        store.set_enabled(true).unwrap();
        store.set_target_number("+49151").unwrap();

        assert!(store.enabled().await.unwrap());
        assert_eq!(store.destination().await.unwrap(), "+49151");
    }

    #[test]
    fn test_reads_never_see_partial_writes() {
        let (_dir, store) = store();
        store.set_enabled(true).unwrap();
        store.set_target_number("+49151").unwrap();

        let writer = {
            let store = store.clone();
            std::thread::spawn(move || {
                for i in 0..500 {
                    let number = if i % 2 == 0 { "+49151" } else { "+49152" };
                    store.set_target_number(number).unwrap();
                }
            })
        };
        let reader = {
            let store = store.clone();
            std::thread::spawn(move || {
                for _ in 0..2_000 {
                    let settings = store.load().unwrap();
                    assert!(settings.enabled, "Reader saw forwarding disabled");
                    assert!(!settings.target_number.is_empty());
                }
            })
        };

        writer.join().unwrap();
        reader.join().unwrap();
    }

    #[test]
    fn test_concurrent_updates_are_not_lost() {
        let (_dir, store) = store();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for _ in 0..20 {
                        if i % 2 == 0 {
                            store.set_enabled(true).unwrap();
                        } else {
                            store.set_target_number("+49151").unwrap();
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let settings = store.load().unwrap();
        assert!(settings.enabled);
        assert_eq!(settings.target_number, "+49151");
    }
}
