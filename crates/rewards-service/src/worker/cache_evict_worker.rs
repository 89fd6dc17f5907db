//! 积分缓存定期清空 Worker
//!
//! 以固定周期清空全部积分缓存条目，保证交易数据变化后结果最终得到刷新。
//! 清空不会中断正在进行的计算。

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::cache::RewardsCache;

/// 缓存清空 Worker
pub struct CacheEvictWorker {
    cache: Arc<RewardsCache>,
    /// 清空周期（默认 360000 毫秒）
    interval: Duration,
}

impl CacheEvictWorker {
    pub fn new(cache: Arc<RewardsCache>, interval: Duration) -> Self {
        Self { cache, interval }
    }

    /// 使用默认周期创建
    pub fn with_defaults(cache: Arc<RewardsCache>) -> Self {
        Self::new(cache, Duration::from_millis(360_000))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// 执行一次清空，返回清除的条目数
    pub fn evict_once(&self) -> usize {
        let removed = self.cache.invalidate_all();
        let next_clear = Utc::now()
            + chrono::Duration::from_std(self.interval).unwrap_or_else(|_| chrono::Duration::zero());
        info!(removed, next_clear = %next_clear, "Rewards cache cleared");
        removed
    }

    /// 主循环：首次清空在一个周期之后执行，此后按固定周期运行直到进程退出
    pub async fn run(&self) {
        if self.interval.is_zero() {
            warn!("Cache clear interval is zero, CacheEvictWorker not started");
            return;
        }
        info!(interval = ?self.interval, "CacheEvictWorker 已启动");

        let start = tokio::time::Instant::now() + self.interval;
        let mut ticker = tokio::time::interval_at(start, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            self.evict_once();
        }
    }
}
