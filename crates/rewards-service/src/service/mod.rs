//! 服务层
//!
//! ## 模块结构
//!
//! - `eligibility`: 交易资格筛选
//! - `aggregator`: 按月汇总积分
//! - `rewards_engine`: 编排与缓存装饰

pub mod aggregator;
pub mod eligibility;
pub mod rewards_engine;

pub use aggregator::MonthlyAggregator;
pub use eligibility::EligibilityFilter;
pub use rewards_engine::{CachedRewardsEngine, RewardsEngine, RewardsProvider};
