//! 积分服务领域模型

pub mod customer;
pub mod rewards;
pub mod transaction;

pub use customer::Customer;
pub use rewards::{MonthlyPoints, RewardsRequest, RewardsSummary};
pub use transaction::{COMPLETED_STATUS, Transaction};
