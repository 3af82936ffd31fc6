//! 键值缓存
//!
//! 目前只用于注册验证码 (5 分钟有效)。

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

/// 键值缓存
#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> Option<String>;

    /// `ttl` 为 `None` 时永不过期
    async fn set(&self, key: &str, value: String, ttl: Option<Duration>);

    async fn remove(&self, key: &str);
}

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// 内存缓存
///
/// 过期项在读取时删除，写入时顺带清理全部过期项，
/// 不再被读取的键也不会一直留在内存里。
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: DashMap<String, Entry>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        let expired = match self.entries.get(key) {
            Some(entry) if !entry.is_expired(now) => return Some(entry.value.clone()),
            Some(_) => true,
            None => false,
        };

        if expired {
            self.entries.remove_if(key, |_, entry| entry.is_expired(now));
        }
        None
    }

    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) {
        let now = Instant::now();
        self.entries.retain(|_, entry| !entry.is_expired(now));

        let expires_at = ttl.map(|ttl| now + ttl);
        self.entries
            .insert(key.to_string(), Entry { value, expires_at });
    }

    async fn remove(&self, key: &str) {
        self.entries.remove(key);
    }
}
