// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::time::{Duration, Instant};
use tracing::warn;

use crate::domain::models::serp::SerpSnapshot;
use crate::infrastructure::cache::redis_client::RedisClient;

/// 计算缓存键
///
/// (region, query) 的纯函数：两边去除首尾空白并转小写，
/// 相同的逻辑查询总是落在同一条目上。
pub fn cache_key(region: &str, query: &str) -> String {
    format!(
        "serp:{}:{}",
        region.trim().to_lowercase(),
        query.trim().to_lowercase()
    )
}

/// 缓存统计信息
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub stores: u64,
}

/// 搜索结果缓存接口
///
/// 过期是硬边界：`get` 在对应 `set` 的 ttl 之后严格表现为未命中，
/// 任何实现都不允许返回过期值。并发写采用最后写者胜出，
/// 没有读-改-写。后端故障不在这里吞掉，由调用方决定降级策略。
#[async_trait]
pub trait SerpCache: Send + Sync {
    /// 查询缓存的结果快照
    async fn get(&self, region: &str, query: &str) -> Result<Option<SerpSnapshot>>;

    /// 写入结果快照并设置新鲜度窗口
    async fn set(
        &self,
        region: &str,
        query: &str,
        snapshot: &SerpSnapshot,
        ttl: Duration,
    ) -> Result<()>;

    /// 后端名称，用于日志
    fn backend(&self) -> &'static str;

    /// 获取缓存统计信息
    fn stats(&self) -> CacheStats;
}

/// 内存缓存条目
struct MemoryEntry {
    snapshot: SerpSnapshot,
    stored_at: Instant,
    ttl: Duration,
}

impl MemoryEntry {
    fn is_expired(&self) -> bool {
        self.stored_at.elapsed() > self.ttl
    }
}

/// 内存缓存实现
///
/// 过期在读取时裁决：到期条目被当场移除并按未命中处理，
/// 语义与服务端过期的 Redis 后端一致。主要用于测试和
/// 不依赖 Redis 的单机部署。
pub struct MemorySerpCache {
    entries: DashMap<String, MemoryEntry>,
    stats: Mutex<CacheStats>,
}

impl MemorySerpCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            stats: Mutex::new(CacheStats::default()),
        }
    }
}

impl Default for MemorySerpCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SerpCache for MemorySerpCache {
    async fn get(&self, region: &str, query: &str) -> Result<Option<SerpSnapshot>> {
        let key = cache_key(region, query);

        if let Some(entry) = self.entries.get(&key) {
            if entry.is_expired() {
                drop(entry);
                self.entries.remove(&key);
                self.stats.lock().misses += 1;
                return Ok(None);
            }

            self.stats.lock().hits += 1;
            return Ok(Some(entry.snapshot.clone()));
        }

        self.stats.lock().misses += 1;
        Ok(None)
    }

    async fn set(
        &self,
        region: &str,
        query: &str,
        snapshot: &SerpSnapshot,
        ttl: Duration,
    ) -> Result<()> {
        let key = cache_key(region, query);
        self.entries.insert(
            key,
            MemoryEntry {
                snapshot: snapshot.clone(),
                stored_at: Instant::now(),
                ttl,
            },
        );
        self.stats.lock().stores += 1;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }

    fn stats(&self) -> CacheStats {
        *self.stats.lock()
    }
}

/// Redis缓存实现
///
/// 快照序列化为JSON后经 SETEX 写入，过期由服务端强制执行。
pub struct RedisSerpCache {
    client: RedisClient,
    stats: Mutex<CacheStats>,
}

impl RedisSerpCache {
    pub fn new(client: RedisClient) -> Self {
        Self {
            client,
            stats: Mutex::new(CacheStats::default()),
        }
    }
}

#[async_trait]
impl SerpCache for RedisSerpCache {
    async fn get(&self, region: &str, query: &str) -> Result<Option<SerpSnapshot>> {
        let key = cache_key(region, query);

        let raw = match self.client.get(&key).await? {
            Some(raw) => raw,
            None => {
                self.stats.lock().misses += 1;
                return Ok(None);
            }
        };

        match serde_json::from_str::<SerpSnapshot>(&raw) {
            Ok(snapshot) => {
                self.stats.lock().hits += 1;
                Ok(Some(snapshot))
            }
            Err(e) => {
                // 损坏的缓存条目等同缺失，刷新时会被覆盖
                warn!(key = %key, error = %e, "Discarding undecodable cache entry");
                self.stats.lock().misses += 1;
                Ok(None)
            }
        }
    }

    async fn set(
        &self,
        region: &str,
        query: &str,
        snapshot: &SerpSnapshot,
        ttl: Duration,
    ) -> Result<()> {
        let key = cache_key(region, query);
        let raw = serde_json::to_string(snapshot)?;
        self.client.set(&key, &raw, ttl.as_secs()).await?;
        self.stats.lock().stores += 1;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "redis"
    }

    fn stats(&self) -> CacheStats {
        *self.stats.lock()
    }
}
