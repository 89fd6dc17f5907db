//! 积分结果缓存
//!
//! 进程内缓存完整的积分汇总结果，避免重复计算。
//!
//! ## 缓存策略
//!
//! - 容量上限：默认 50 条，初始分配 10 条；满时先清理过期条目，再淘汰最久未访问的条目
//! - 过期：写入后 1 小时（按写入时间计算，命中不续期）
//! - 准入：计算失败或总积分为负的结果不写入，但会返回给本次所有等待者
//! - 单飞：同一个键同一时刻只有一个计算在执行，其余请求等待其结果；
//!   计算方被取消时由一个等待者接手重新计算
//! - 全量清空：由 `CacheEvictWorker` 周期调用 [`RewardsCache::invalidate_all`]，
//!   不会中断正在进行的计算

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use rewards_shared::config::CacheConfig;
use rewards_shared::observability::metrics;
use serde::Serialize;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::debug;

use super::key::RewardsCacheKey;
use crate::error::{Result, RewardsError};
use crate::models::RewardsSummary;

type Outcome = Result<Arc<RewardsSummary>>;

/// 缓存参数
#[derive(Debug, Clone)]
pub struct RewardsCacheConfig {
    pub initial_capacity: usize,
    pub max_capacity: usize,
    pub ttl: Duration,
}

impl Default for RewardsCacheConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 10,
            max_capacity: 50,
            ttl: Duration::from_secs(3600),
        }
    }
}

impl From<&CacheConfig> for RewardsCacheConfig {
    fn from(config: &CacheConfig) -> Self {
        Self {
            initial_capacity: config.initial_capacity,
            max_capacity: config.max_capacity,
            ttl: Duration::from_secs(config.ttl_secs),
        }
    }
}

/// 缓存统计快照
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub size: usize,
    pub hits: u64,
    pub misses: u64,
    /// 完成的计算次数（含未准入的结果）
    pub loads: u64,
    pub load_failures: u64,
    pub evictions: u64,
    /// 未写入缓存的结果数
    pub rejected: u64,
    pub hit_rate: f64,
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    loads: AtomicU64,
    load_failures: AtomicU64,
    evictions: AtomicU64,
    rejected: AtomicU64,
}

impl Counters {
    fn add(counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }
}

#[derive(Debug)]
struct CacheEntry {
    value: Arc<RewardsSummary>,
    inserted_at: Instant,
    last_access: u64,
}

#[derive(Debug)]
struct CacheState {
    entries: HashMap<RewardsCacheKey, CacheEntry>,
    inflight: HashMap<RewardsCacheKey, watch::Receiver<Option<Outcome>>>,
    /// 访问序号，越大越新
    tick: u64,
}

impl CacheState {
    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    fn purge_expired(&mut self, now: Instant, ttl: Duration) -> u64 {
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| now.duration_since(entry.inserted_at) < ttl);
        (before - self.entries.len()) as u64
    }

    fn evict_least_recently_used(&mut self) -> Option<RewardsCacheKey> {
        let victim = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_access)
            .map(|(key, _)| key.clone())?;
        self.entries.remove(&victim);
        Some(victim)
    }
}

enum Acquired {
    Hit(Arc<RewardsSummary>),
    Leader(watch::Sender<Option<Outcome>>),
    Follower(watch::Receiver<Option<Outcome>>),
}

/// 计算方被取消时撤销在途登记，等待者随后重新竞争
struct InflightGuard<'a> {
    cache: &'a RewardsCache,
    key: &'a RewardsCacheKey,
    armed: bool,
}

impl Drop for InflightGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.cache.state.lock().inflight.remove(self.key);
            debug!(key = ?self.key, "Rewards computation abandoned before completion");
        }
    }
}

/// 积分结果缓存
pub struct RewardsCache {
    config: RewardsCacheConfig,
    state: Mutex<CacheState>,
    counters: Counters,
}

impl RewardsCache {
    pub fn new(config: RewardsCacheConfig) -> Self {
        Self {
            state: Mutex::new(CacheState {
                entries: HashMap::with_capacity(config.initial_capacity),
                inflight: HashMap::new(),
                tick: 0,
            }),
            counters: Counters::default(),
            config,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(RewardsCacheConfig::default())
    }

    pub fn config(&self) -> &RewardsCacheConfig {
        &self.config
    }

    /// 获取缓存结果，未命中时执行 `compute`
    ///
    /// 同一键的并发请求只触发一次 `compute`，所有请求得到同一结果（成功或错误）。
    pub async fn get_or_compute<F, Fut>(&self, key: RewardsCacheKey, compute: F) -> Outcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Outcome>,
    {
        let mut compute = Some(compute);

        loop {
            match self.acquire(&key) {
                Acquired::Hit(value) => return Ok(value),
                Acquired::Follower(mut rx) => {
                    debug!(key = ?key, "Waiting for in-flight rewards computation");
                    let outcome = rx
                        .wait_for(Option::is_some)
                        .await
                        .ok()
                        .and_then(|value| (*value).clone());
                    if let Some(outcome) = outcome {
                        return outcome;
                    }
                }
                Acquired::Leader(tx) => {
                    let compute = compute.take().ok_or_else(|| {
                        RewardsError::Internal("rewards loader already consumed".to_string())
                    })?;
                    return self.lead(&key, tx, compute).await;
                }
            }
        }
    }

    fn acquire(&self, key: &RewardsCacheKey) -> Acquired {
        let mut state = self.state.lock();
        let now = Instant::now();
        let tick = state.next_tick();

        let mut expired = false;
        if let Some(entry) = state.entries.get_mut(key) {
            if now.duration_since(entry.inserted_at) < self.config.ttl {
                entry.last_access = tick;
                Counters::add(&self.counters.hits, 1);
                metrics::record_cache_lookup(true);
                return Acquired::Hit(Arc::clone(&entry.value));
            }
            expired = true;
        }

        if expired {
            state.entries.remove(key);
            Counters::add(&self.counters.evictions, 1);
            metrics::record_cache_eviction("expired", 1);
        }

        Counters::add(&self.counters.misses, 1);
        metrics::record_cache_lookup(false);

        if let Some(rx) = state.inflight.get(key) {
            return Acquired::Follower(rx.clone());
        }

        let (tx, rx) = watch::channel(None);
        state.inflight.insert(key.clone(), rx);
        Acquired::Leader(tx)
    }

    async fn lead<F, Fut>(
        &self,
        key: &RewardsCacheKey,
        tx: watch::Sender<Option<Outcome>>,
        compute: F,
    ) -> Outcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Outcome>,
    {
        let mut guard = InflightGuard {
            cache: self,
            key,
            armed: true,
        };

        let outcome = compute().await;
        self.complete(key, &outcome);
        guard.armed = false;

        // 等待者可能都已离开
        let _ = tx.send(Some(outcome.clone()));
        outcome
    }

    /// 撤销在途登记，并按准入规则写入结果
    fn complete(&self, key: &RewardsCacheKey, outcome: &Outcome) {
        let mut state = self.state.lock();
        state.inflight.remove(key);

        let summary = match outcome {
            Ok(summary) => {
                Counters::add(&self.counters.loads, 1);
                summary
            }
            Err(e) => {
                Counters::add(&self.counters.load_failures, 1);
                Counters::add(&self.counters.rejected, 1);
                metrics::record_cache_rejection("error");
                debug!(key = ?key, error = %e, "Failed rewards computation not cached");
                return;
            }
        };

        if summary.total_points < 0 {
            Counters::add(&self.counters.rejected, 1);
            metrics::record_cache_rejection("negative_total");
            debug!(key = ?key, total_points = summary.total_points, "Negative rewards total not cached");
            return;
        }

        if self.config.max_capacity == 0 {
            Counters::add(&self.counters.rejected, 1);
            metrics::record_cache_rejection("zero_capacity");
            return;
        }

        let now = Instant::now();
        let tick = state.next_tick();

        if !state.entries.contains_key(key) && state.entries.len() >= self.config.max_capacity {
            let expired = state.purge_expired(now, self.config.ttl);
            if expired > 0 {
                Counters::add(&self.counters.evictions, expired);
                metrics::record_cache_eviction("expired", expired);
            }

            while state.entries.len() >= self.config.max_capacity {
                match state.evict_least_recently_used() {
                    Some(victim) => {
                        Counters::add(&self.counters.evictions, 1);
                        metrics::record_cache_eviction("size", 1);
                        debug!(key = ?victim, "Evicted least recently used rewards entry");
                    }
                    None => break,
                }
            }
        }

        state.entries.insert(
            key.clone(),
            CacheEntry {
                value: Arc::clone(summary),
                inserted_at: now,
                last_access: tick,
            },
        );
        metrics::set_cache_size(state.entries.len());
    }

    /// 移除单个键
    pub fn invalidate(&self, key: &RewardsCacheKey) -> bool {
        let removed = self.state.lock().entries.remove(key).is_some();
        if removed {
            Counters::add(&self.counters.evictions, 1);
            metrics::record_cache_eviction("explicit", 1);
        }
        removed
    }

    /// 清空全部条目，返回被清除的条目数
    ///
    /// 在途计算不受影响，其结果可能写入清空后的缓存
    pub fn invalidate_all(&self) -> usize {
        let removed = {
            let mut state = self.state.lock();
            let removed = state.entries.len();
            state.entries.clear();
            removed
        };

        Counters::add(&self.counters.evictions, removed as u64);
        metrics::record_cache_eviction("clear", removed as u64);
        metrics::set_cache_size(0);
        removed
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 当前在途计算数
    pub fn inflight_count(&self) -> usize {
        self.state.lock().inflight.len()
    }

    pub fn stats(&self) -> CacheStats {
        let hits = self.counters.hits.load(Ordering::Relaxed);
        let misses = self.counters.misses.load(Ordering::Relaxed);
        let requests = hits + misses;

        CacheStats {
            size: self.len(),
            hits,
            misses,
            loads: self.counters.loads.load(Ordering::Relaxed),
            load_failures: self.counters.load_failures.load(Ordering::Relaxed),
            evictions: self.counters.evictions.load(Ordering::Relaxed),
            rejected: self.counters.rejected.load(Ordering::Relaxed),
            hit_rate: if requests == 0 {
                0.0
            } else {
                hits as f64 / requests as f64
            },
        }
    }
}
