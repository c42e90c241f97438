//! 转发去重闸门 - 同一条消息在时间窗口内最多转发一次
//!
//! WhatsApp 在消息更新、分组折叠时会重复发出同一条通知，
//! 多个事件任务可能同时处理同一条消息。
//!
//! ## 去重策略
//! 1. 以规范化后的消息文本（空白折叠）作为 key
//! 2. 默认 60 秒窗口
//! 3. 乐观并发：读取 → 条件写入（不存在时插入 / 时间戳未变时替换）→ 失败重试

use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Default dedup window
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);
/// Map size above which stale entries are swept before admission
pub const DEFAULT_MAX_ENTRIES: usize = 500;

/// Duration 转毫秒，超出 i64 范围时取 i64::MAX
fn duration_ms(d: Duration) -> i64 {
    i64::try_from(d.as_millis()).unwrap_or(i64::MAX)
}

/// 毫秒时钟（测试中可替换）
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// 系统时钟
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// 手动推进的时钟（用于测试）
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self {
            now: AtomicI64::new(start_ms),
        }
    }

    pub fn set(&self, ms: i64) {
        self.now.store(ms, Ordering::SeqCst);
    }

    pub fn advance(&self, by: Duration) {
        let by = duration_ms(by);
        let _ = self
            .now
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |now| {
                Some(now.saturating_add(by))
            });
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// 去重闸门
pub struct DedupeGate {
    /// 最近转发的消息: key -> 上次转发时间 (ms)
    recent: DashMap<String, i64>,
    /// 去重窗口（毫秒）
    window_ms: i64,
    /// 超过此数量时清理过期记录
    max_entries: usize,
    clock: Arc<dyn Clock>,
}

impl DedupeGate {
    /// 创建新的去重闸门，使用默认 60 秒窗口和系统时钟
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            recent: DashMap::new(),
            window_ms: duration_ms(DEFAULT_WINDOW),
            max_entries: DEFAULT_MAX_ENTRIES,
            clock,
        }
    }

    /// 设置去重窗口时长
    pub fn with_window(mut self, window: Duration) -> Self {
        self.window_ms = duration_ms(window);
        self
    }

    /// 设置触发清理的记录数
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// 检查是否允许转发
    ///
    /// 返回 `true` 表示本次调用获得转发权，`false` 表示窗口内重复。
    /// 同一 key 的并发调用在一个窗口内只有一个返回 `true`。
    pub fn admit(&self, key: &str) -> bool {
        let now = self.clock.now_ms();

        if self.recent.len() > self.max_entries {
            self.evict_stale(now);
        }

        loop {
            // 读取后立即释放分片锁，再做条件写入
            let last = self.recent.get(key).map(|entry| *entry.value());

            match last {
                Some(last) if now.saturating_sub(last) < self.window_ms => {
                    debug!(
                        key = %key,
                        elapsed_ms = now.saturating_sub(last),
                        "Duplicate within window"
                    );
                    return false;
                }
                None => match self.recent.entry(key.to_string()) {
                    Entry::Vacant(slot) => {
                        slot.insert(now);
                        return true;
                    }
                    // 另一个调用抢先插入
                    Entry::Occupied(_) => continue,
                },
                Some(last) => match self.recent.entry(key.to_string()) {
                    Entry::Occupied(mut slot) if *slot.get() == last => {
                        slot.insert(now);
                        return true;
                    }
                    // 时间戳已被更新或记录已被清理
                    _ => continue,
                },
            }
        }
    }

    /// 当前记录数
    pub fn len(&self) -> usize {
        self.recent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recent.is_empty()
    }

    /// 清理过期记录
    fn evict_stale(&self, now: i64) {
        let before = self.recent.len();
        self.recent
            .retain(|_, last| now.saturating_sub(*last) < self.window_ms);
        debug!(
            before,
            after = self.recent.len(),
            "Evicted stale dedup entries"
        );
    }
}

impl Default for DedupeGate {
    fn default() -> Self {
        Self::new()
    }
}
