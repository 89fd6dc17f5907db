//! 积分计算服务
//!
//! 根据客户的已完成交易计算积分，按月汇总，并缓存计算结果。
//!
//! ## 核心功能
//!
//! - **积分计算**：两档积分公式（50 以上 1 倍、100 以上 2 倍）
//! - **资格筛选**：只统计 COMPLETED、金额大于 50、在时间窗口内的交易
//! - **月度汇总**：按自然月分组，最近的月份在前
//! - **结果缓存**：容量上限、写入后过期、单飞计算、周期性全量清空
//!
//! ## 模块结构
//!
//! - `models`: 领域模型定义
//! - `error`: 错误类型定义
//! - `calculator`: 积分公式
//! - `repository`: 仓储接口、内存实现与数据装载
//! - `service`: 资格筛选、月度汇总、计算编排
//! - `cache`: 积分结果缓存
//! - `worker`: 缓存定期清空
//! - `api`: HTTP 接口

pub mod api;
pub mod cache;
pub mod calculator;
pub mod error;
pub mod models;
pub mod repository;
pub mod service;
pub mod worker;

pub use cache::{CacheStats, RewardsCache, RewardsCacheConfig, RewardsCacheKey};
pub use calculator::PointsCalculator;
pub use error::{Result, RewardsError};
pub use models::*;
pub use repository::{
    CustomerRepositoryTrait, DateBounds, EligibilityCriteria, InMemoryRepository,
    NewTransaction, TransactionQuery, TransactionRepositoryTrait,
};
pub use service::{
    CachedRewardsEngine, EligibilityFilter, MonthlyAggregator, RewardsEngine, RewardsProvider,
};
pub use worker::CacheEvictWorker;
