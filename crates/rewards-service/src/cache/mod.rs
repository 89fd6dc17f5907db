//! 积分结果缓存

pub mod key;
pub mod rewards_cache;

pub use key::RewardsCacheKey;
pub use rewards_cache::{CacheStats, RewardsCache, RewardsCacheConfig};
