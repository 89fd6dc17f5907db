//! 应用状态定义

use std::sync::Arc;

use crate::cache::RewardsCache;
use crate::service::RewardsProvider;

/// Axum 应用共享状态
#[derive(Clone)]
pub struct AppState {
    /// 积分计算入口（启用缓存时为带缓存的引擎）
    pub rewards: Arc<dyn RewardsProvider>,
    /// 积分缓存，禁用缓存时为 None
    pub cache: Option<Arc<RewardsCache>>,
}

impl AppState {
    pub fn new(rewards: Arc<dyn RewardsProvider>, cache: Option<Arc<RewardsCache>>) -> Self {
        Self { rewards, cache }
    }
}
